//! Recoverable scheduling issues.
//!
//! Nothing in the planning core fails outright. When input is malformed or the
//! catalog has a hole, the core falls back to a default and records one of
//! these so callers can see what was papered over.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ScheduleIssue {
    /// Input could not be interpreted as given; a default was used.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A task kind has no catalog entry; generic defaults were used.
    #[error("configuration gap: {0}")]
    ConfigurationGap(String),
}

impl ScheduleIssue {
    pub fn malformed(msg: impl Into<String>) -> Self {
        ScheduleIssue::MalformedInput(msg.into())
    }

    pub fn gap(msg: impl Into<String>) -> Self {
        ScheduleIssue::ConfigurationGap(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_render_and_serialize() {
        let issue = ScheduleIssue::malformed("conditions had 4 fields, expected 6");
        assert_eq!(issue.to_string(), "malformed input: conditions had 4 fields, expected 6");

        let json = serde_json::to_string(&ScheduleIssue::gap("mulching")).unwrap();
        assert_eq!(json, r#"{"kind":"configuration_gap","detail":"mulching"}"#);
    }
}
