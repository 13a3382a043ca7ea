//! Response types shared by the HTTP API and the CLI.
//!
//! Every lookup request answers with the same shape:
//!
//! ```json
//! { "status": "SUCCESS", "messages": ["output/lookup/output_17093012_1a2b3c4d.csv"] }
//! ```
//!
//! On `SUCCESS` the first message is the output file location. `FAILED`
//! lists every problem found in the function or the input headers. `ERROR`
//! carries one message describing an unexpected failure.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ColumnError, DslError};

/// Outcome of one lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Failed,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
            Status::Error => "ERROR",
        })
    }
}

/// `{status, messages}` answer of a lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub status: Status,
    pub messages: Vec<String>,
}

impl ValidationResponse {
    pub fn success(messages: Vec<String>) -> Self {
        Self {
            status: Status::Success,
            messages,
        }
    }

    pub fn failed(messages: Vec<String>) -> Self {
        Self {
            status: Status::Failed,
            messages,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            messages: vec![message.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Output location of a successful run.
    pub fn output_path(&self) -> Option<&str> {
        match self.status {
            Status::Success => self.messages.first().map(String::as_str),
            _ => None,
        }
    }
}

impl From<Vec<DslError>> for ValidationResponse {
    fn from(errors: Vec<DslError>) -> Self {
        Self::failed(errors.iter().map(ToString::to_string).collect())
    }
}

impl From<Vec<ColumnError>> for ValidationResponse {
    fn from(errors: Vec<ColumnError>) -> Self {
        Self::failed(errors.iter().map(ToString::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let response = ValidationResponse::failed(vec!["bad".into()]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "FAILED");
        assert_eq!(json["messages"][0], "bad");
    }

    #[test]
    fn test_output_path_only_on_success() {
        let ok = ValidationResponse::success(vec!["out.csv".into(), "3 rows".into()]);
        assert_eq!(ok.output_path(), Some("out.csv"));

        let err = ValidationResponse::error("disk full");
        assert_eq!(err.output_path(), None);
        assert_eq!(err.messages, vec!["disk full"]);
    }

    #[test]
    fn test_from_dsl_errors() {
        let response: ValidationResponse = vec![DslError::grammar("one"), DslError::grammar("two")].into();
        assert_eq!(response.status, Status::Failed);
        assert_eq!(response.messages, vec!["one", "two"]);
    }
}
