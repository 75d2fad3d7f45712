//! Result rendering
//!
//! The deploy result goes to stdout (or a file) in either human or JSON
//! form; logs stay on stderr.

use std::fs;
use std::path::Path;

use crate::deploy::ReconcileResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_result(&self, result: &ReconcileResult) -> String {
        match self.format {
            OutputFormat::Json => {
                // ReconcileResult serialization cannot fail
                serde_json::to_string_pretty(result).unwrap_or_default()
            }
            OutputFormat::Human => {
                let mut out = format!("status: {}", result.status);
                if let Some(stack_id) = &result.stack_id {
                    out.push_str(&format!("\nstack-id: {}", stack_id));
                }
                out
            }
        }
    }

    /// Writes the rendered result to a file, or stdout when no path is
    /// given.
    pub fn emit(&self, result: &ReconcileResult, output: Option<&Path>) -> std::io::Result<()> {
        let rendered = self.format_result(result);
        match output {
            Some(path) => fs::write(path, rendered + "\n"),
            None => {
                println!("{}", rendered);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ReconcileResult {
        ReconcileResult {
            status: "200".to_string(),
            stack_id: Some("arn:aws:cloudformation:eu-central-1:123:stack/demo/1".to_string()),
        }
    }

    #[test]
    fn test_human_format() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let rendered = formatter.format_result(&result());
        assert!(rendered.contains("status: 200"));
        assert!(rendered.contains("stack-id: arn:aws:cloudformation"));
    }

    #[test]
    fn test_human_format_without_stack_id() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let rendered = formatter.format_result(&ReconcileResult {
            status: "500".to_string(),
            stack_id: None,
        });
        assert_eq!(rendered, "status: 500");
    }

    #[test]
    fn test_json_format() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let rendered = formatter.format_result(&result());
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["status"], "200");
        assert!(parsed["stack_id"].as_str().unwrap().contains("demo"));
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");

        let formatter = OutputFormatter::new(OutputFormat::Json);
        formatter.emit(&result(), Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"status\""));
    }
}
