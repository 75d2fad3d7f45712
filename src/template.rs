//! Template source handling
//!
//! A stack template is supplied either as a local file or as a URL that the
//! stack-management service fetches itself. The two are mutually exclusive,
//! which the `TemplateSource` sum type enforces by construction; the only
//! place where "both" or "neither" can be expressed is the CLI boundary,
//! rejected in [`TemplateSource::from_parts`].

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while selecting or resolving a template source
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Neither a file path nor a URL was supplied
    #[error("a template file path or a template URL is required")]
    Missing,

    /// Both a file path and a URL were supplied
    #[error("template file path and template URL are mutually exclusive")]
    Ambiguous,

    /// The template file does not exist
    #[error("template file {0} does not exist")]
    FileMissing(PathBuf),

    /// The template file exists but is empty
    #[error("template file {0} is empty")]
    FileEmpty(PathBuf),

    /// The template file could not be read
    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the template comes from: exactly one variant, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Local file whose contents are sent as the template body
    File(PathBuf),
    /// URL passed through for the service to fetch
    Url(String),
}

/// A template ready to be placed into a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTemplate {
    /// Inline template body
    Body(String),
    /// Service-side URL
    Url(String),
}

impl TemplateSource {
    /// Builds a source from the two optional CLI inputs.
    ///
    /// Exactly one of `filepath` and `url` must be set; anything else is a
    /// configuration error raised before any remote call is attempted.
    pub fn from_parts(
        filepath: Option<PathBuf>,
        url: Option<String>,
    ) -> Result<Self, TemplateError> {
        match (filepath, url) {
            (Some(path), None) => Ok(TemplateSource::File(path)),
            (None, Some(url)) => Ok(TemplateSource::Url(url)),
            (Some(_), Some(_)) => Err(TemplateError::Ambiguous),
            (None, None) => Err(TemplateError::Missing),
        }
    }

    /// Resolves the source into request-ready form.
    ///
    /// File sources are read eagerly so that a missing or empty template
    /// fails the deploy before anything is submitted; URL sources pass
    /// through untouched.
    pub fn resolve(&self) -> Result<ResolvedTemplate, TemplateError> {
        match self {
            TemplateSource::File(path) => {
                if !path.exists() {
                    return Err(TemplateError::FileMissing(path.clone()));
                }
                let body = fs::read_to_string(path).map_err(|source| TemplateError::Io {
                    path: path.clone(),
                    source,
                })?;
                if body.trim().is_empty() {
                    return Err(TemplateError::FileEmpty(path.clone()));
                }
                Ok(ResolvedTemplate::Body(body))
            }
            TemplateSource::Url(url) => Ok(ResolvedTemplate::Url(url.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_parts_file() {
        let source = TemplateSource::from_parts(Some(PathBuf::from("stack.json")), None).unwrap();
        assert_eq!(source, TemplateSource::File(PathBuf::from("stack.json")));
    }

    #[test]
    fn test_from_parts_url() {
        let source =
            TemplateSource::from_parts(None, Some("https://example.com/t.json".to_string()))
                .unwrap();
        assert_eq!(
            source,
            TemplateSource::Url("https://example.com/t.json".to_string())
        );
    }

    #[test]
    fn test_from_parts_neither() {
        let err = TemplateSource::from_parts(None, None).unwrap_err();
        assert!(matches!(err, TemplateError::Missing));
    }

    #[test]
    fn test_from_parts_both() {
        let err = TemplateSource::from_parts(
            Some(PathBuf::from("stack.json")),
            Some("https://example.com/t.json".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::Ambiguous));
    }

    #[test]
    fn test_resolve_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"Resources": {{}}}}"#).unwrap();

        let source = TemplateSource::File(file.path().to_path_buf());
        let resolved = source.resolve().unwrap();
        assert_eq!(
            resolved,
            ResolvedTemplate::Body(r#"{"Resources": {}}"#.to_string())
        );
    }

    #[test]
    fn test_resolve_missing_file() {
        let source = TemplateSource::File(PathBuf::from("/nonexistent/template.json"));
        let err = source.resolve().unwrap_err();
        assert!(matches!(err, TemplateError::FileMissing(_)));
    }

    #[test]
    fn test_resolve_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let source = TemplateSource::File(file.path().to_path_buf());
        let err = source.resolve().unwrap_err();
        assert!(matches!(err, TemplateError::FileEmpty(_)));
    }

    #[test]
    fn test_resolve_url_passthrough() {
        let source = TemplateSource::Url("https://example.com/t.json".to_string());
        let resolved = source.resolve().unwrap();
        assert_eq!(
            resolved,
            ResolvedTemplate::Url("https://example.com/t.json".to_string())
        );
    }
}
