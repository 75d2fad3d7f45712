//! Scripted gateway for tests
//!
//! `MockGateway` answers each operation from a per-operation queue of
//! scripted outcomes and records every call it receives, so tests can assert
//! both results and interaction order without a remote service.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    ChangeSetDescription, ChangeSetStatus, CreateChangeSetRequest, CreateStackRequest,
    ExecutionStatus, GatewayError, OperationAck, StackGateway, StackOperation, StackSnapshot,
};

/// One scripted outcome for a gateway operation
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Stack(StackSnapshot),
    Ack(OperationAck),
    ChangeSet(ChangeSetDescription),
    Unit,
    Error(GatewayError),
}

/// A call the mock has observed: operation name plus its identifiers
pub type RecordedCall = (String, Vec<String>);

/// Recording, scripted implementation of [`StackGateway`]
#[derive(Default)]
pub struct MockGateway {
    outcomes: Mutex<HashMap<&'static str, VecDeque<MockOutcome>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an outcome for the named operation. Outcomes are consumed in
    /// FIFO order; an operation with an exhausted queue fails the test.
    pub fn enqueue(&self, operation: &'static str, outcome: MockOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(outcome);
    }

    /// All calls observed so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the operations called so far, in order.
    pub fn called_operations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|(operation, _)| operation)
            .collect()
    }

    /// Number of times the named operation was called.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|(name, _)| name == operation)
            .count()
    }

    fn record(&self, operation: &str, args: &[&str]) {
        self.calls.lock().unwrap().push((
            operation.to_string(),
            args.iter().map(|arg| arg.to_string()).collect(),
        ));
    }

    fn next(&self, operation: &'static str) -> Result<MockOutcome, GatewayError> {
        self.outcomes
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| GatewayError::Transport {
                message: format!("MockGateway: no outcome queued for {}", operation),
                status_code: None,
            })
    }

    /// Convenience snapshot for a healthy stack.
    pub fn snapshot(name: &str, id: &str, status: &str) -> StackSnapshot {
        StackSnapshot {
            name: name.to_string(),
            id: Some(id.to_string()),
            status: status.to_string(),
            parameters: Vec::new(),
            change_set_id: None,
        }
    }

    /// Convenience description for a change set in the given states.
    pub fn change_set(
        status: ChangeSetStatus,
        execution_status: ExecutionStatus,
        status_reason: Option<&str>,
    ) -> ChangeSetDescription {
        ChangeSetDescription {
            status,
            execution_status,
            status_reason: status_reason.map(str::to_string),
            parameters: Vec::new(),
        }
    }
}

impl std::fmt::Debug for MockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGateway")
            .field("calls", &self.calls().len())
            .finish()
    }
}

#[async_trait]
impl StackGateway for MockGateway {
    async fn describe_stack(&self, name: &str) -> Result<StackSnapshot, GatewayError> {
        self.record("describe_stack", &[name]);
        match self.next("describe_stack")? {
            MockOutcome::Stack(snapshot) => Ok(snapshot),
            MockOutcome::Error(err) => Err(err),
            other => panic!("describe_stack: unexpected outcome {:?}", other),
        }
    }

    async fn create_stack(
        &self,
        request: &CreateStackRequest,
    ) -> Result<OperationAck, GatewayError> {
        self.record("create_stack", &[&request.stack_name]);
        match self.next("create_stack")? {
            MockOutcome::Ack(ack) => Ok(ack),
            MockOutcome::Error(err) => Err(err),
            other => panic!("create_stack: unexpected outcome {:?}", other),
        }
    }

    async fn create_change_set(
        &self,
        request: &CreateChangeSetRequest,
    ) -> Result<OperationAck, GatewayError> {
        self.record(
            "create_change_set",
            &[&request.stack_name, &request.change_set_name],
        );
        match self.next("create_change_set")? {
            MockOutcome::Ack(ack) => Ok(ack),
            MockOutcome::Error(err) => Err(err),
            other => panic!("create_change_set: unexpected outcome {:?}", other),
        }
    }

    async fn describe_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<ChangeSetDescription, GatewayError> {
        self.record("describe_change_set", &[change_set_name, stack_name]);
        match self.next("describe_change_set")? {
            MockOutcome::ChangeSet(description) => Ok(description),
            MockOutcome::Error(err) => Err(err),
            other => panic!("describe_change_set: unexpected outcome {:?}", other),
        }
    }

    async fn delete_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<(), GatewayError> {
        self.record("delete_change_set", &[change_set_name, stack_name]);
        match self.next("delete_change_set")? {
            MockOutcome::Unit => Ok(()),
            MockOutcome::Error(err) => Err(err),
            other => panic!("delete_change_set: unexpected outcome {:?}", other),
        }
    }

    async fn execute_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<OperationAck, GatewayError> {
        self.record("execute_change_set", &[change_set_name, stack_name]);
        match self.next("execute_change_set")? {
            MockOutcome::Ack(ack) => Ok(ack),
            MockOutcome::Error(err) => Err(err),
            other => panic!("execute_change_set: unexpected outcome {:?}", other),
        }
    }

    async fn wait_for_stack(
        &self,
        name: &str,
        operation: StackOperation,
    ) -> Result<StackSnapshot, GatewayError> {
        let operation_name = match operation {
            StackOperation::Create => "create",
            StackOperation::Update => "update",
        };
        self.record("wait_for_stack", &[name, operation_name]);
        match self.next("wait_for_stack")? {
            MockOutcome::Stack(snapshot) => Ok(snapshot),
            MockOutcome::Error(err) => Err(err),
            other => panic!("wait_for_stack: unexpected outcome {:?}", other),
        }
    }

    async fn wait_for_change_set(
        &self,
        change_set_name: &str,
        stack_name: &str,
    ) -> Result<ChangeSetDescription, GatewayError> {
        self.record("wait_for_change_set", &[change_set_name, stack_name]);
        match self.next("wait_for_change_set")? {
            MockOutcome::ChangeSet(description) => Ok(description),
            MockOutcome::Error(err) => Err(err),
            other => panic!("wait_for_change_set: unexpected outcome {:?}", other),
        }
    }
}
