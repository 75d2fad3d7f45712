//! Parameter override loading
//!
//! Deploy-time parameter overrides arrive as a JSON array of
//! `{"ParameterKey": ..., "ParameterValue": ...}` objects, either in a file
//! or as an inline JSON string. The file path takes precedence when both are
//! supplied. A missing, empty or malformed file is a fatal configuration
//! error; supplying neither source simply means "no overrides".

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single template parameter override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "ParameterKey")]
    pub key: String,

    #[serde(rename = "ParameterValue")]
    pub value: String,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Errors raised while loading parameter overrides
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The overrides file does not exist
    #[error("parameter overrides file {0} does not exist")]
    FileMissing(PathBuf),

    /// The overrides file exists but is empty
    #[error("parameter overrides file {0} is empty")]
    FileEmpty(PathBuf),

    /// The overrides file could not be read
    #[error("failed to read parameter overrides file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The overrides document is not a valid parameter array
    #[error("invalid parameter overrides JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads parameter overrides from a file path or an inline JSON string.
///
/// The file path wins when both are present. Returns `Ok(None)` when neither
/// source is supplied. Order of the parsed parameters is preserved.
pub fn parameter_overrides(
    file_path: Option<&Path>,
    inline: Option<&str>,
) -> Result<Option<Vec<Parameter>>, ParamsError> {
    if let Some(path) = file_path {
        return load_file(path).map(Some);
    }

    if let Some(json) = inline {
        let parameters = serde_json::from_str(json)?;
        return Ok(Some(parameters));
    }

    Ok(None)
}

fn load_file(path: &Path) -> Result<Vec<Parameter>, ParamsError> {
    if !path.exists() {
        return Err(ParamsError::FileMissing(path.to_path_buf()));
    }

    let data = fs::read_to_string(path).map_err(|source| ParamsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if data.trim().is_empty() {
        return Err(ParamsError::FileEmpty(path.to_path_buf()));
    }

    Ok(serde_json::from_str(&data)?)
}
