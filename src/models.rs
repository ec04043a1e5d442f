//! Request and response types for the generation endpoint.
//!
//! A [`GenerationRequest`] is the raw JSON body. [`GenerationRequest::validate`]
//! turns it into a [`ValidatedRequest`] whose [`Source`] is either a remote
//! repository or a local directory, never both.

use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};

fn default_output() -> String {
    "output".to_string()
}

/// Raw body of `POST /generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    /// URL of a public repository.
    #[serde(default)]
    pub repo_url: Option<String>,
    /// Path to a directory on the server host.
    #[serde(default)]
    pub local_dir: Option<String>,
    /// Project name. Derived from the source when omitted.
    #[serde(default)]
    pub name: Option<String>,
    /// Access token, only forwarded alongside `repo_url`.
    #[serde(default)]
    pub token: Option<String>,
    /// Base directory for generated output.
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    /// Maximum file size in bytes.
    #[serde(default)]
    pub max_size: Option<u64>,
}

/// Where the generator reads code from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Remote(s) | Source::Local(s) => s,
        }
    }
}

/// A request that passed validation. Empty strings have been folded to `None`.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub source: Source,
    pub name: Option<String>,
    pub token: Option<String>,
    pub output: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_size: Option<u64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl GenerationRequest {
    /// Check that exactly one source is given.
    pub fn validate(self) -> Result<ValidatedRequest> {
        let source = match (non_empty(self.repo_url), non_empty(self.local_dir)) {
            (None, None) => {
                return Err(GenerateError::ClientInput(
                    "Either 'repo_url' or 'local_dir' must be provided.".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(GenerateError::ClientInput(
                    "Provide either 'repo_url' or 'local_dir', not both.".to_string(),
                ))
            }
            (Some(url), None) => Source::Remote(url),
            (None, Some(dir)) => Source::Local(dir),
        };

        Ok(ValidatedRequest {
            source,
            name: non_empty(self.name),
            token: non_empty(self.token),
            output: self.output,
            include: self.include.unwrap_or_default(),
            exclude: self.exclude.unwrap_or_default(),
            max_size: self.max_size,
        })
    }
}

/// Success body of `POST /generate`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub message: String,
    /// Where the generator is expected to have written the HTML. Not checked.
    pub final_output_directory: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults() {
        let req = parse(r#"{"repo_url": "https://github.com/org/repo"}"#);
        assert_eq!(req.output, "output");
        assert!(req.include.is_none());
        assert!(req.max_size.is_none());
    }

    #[test]
    fn test_no_source_rejected() {
        let err = parse("{}").validate().unwrap_err();
        assert!(matches!(err, GenerateError::ClientInput(_)));
        assert!(err.to_string().contains("must be provided"));
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let err = parse(r#"{"repo_url": "", "local_dir": ""}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, GenerateError::ClientInput(_)));
    }

    #[test]
    fn test_both_sources_rejected() {
        let err = parse(r#"{"repo_url": "https://x.y/a/b", "local_dir": "/tmp/b"}"#)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_local_source() {
        let v = parse(r#"{"local_dir": "/src/proj", "name": "", "token": ""}"#)
            .validate()
            .unwrap();
        assert_eq!(v.source, Source::Local("/src/proj".to_string()));
        assert!(v.name.is_none());
        assert!(v.token.is_none());
        assert!(v.include.is_empty());
    }

    #[test]
    fn test_negative_max_size_fails_to_parse() {
        let res: std::result::Result<GenerationRequest, _> =
            serde_json::from_str(r#"{"local_dir": "/a", "max_size": -1}"#);
        assert!(res.is_err());
    }
}
