use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized issue as shown in the dashboard.
///
/// Rebuilt from the tracker on every fetch; nothing here is persisted
/// locally. `client` is derived from the first description line at read
/// time and is not authoritative tracker data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A sparse issue mutation. Fields left as `None` are not sent to the
/// tracker at all; `Some("")` for the description (or `Some(vec![])` for
/// labels) explicitly clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    pub status: Option<String>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.labels.is_none()
            && self.status.is_none()
    }
}

/// A new issue to submit. The description is plain text here; the tracker
/// implementation wraps it into whatever rich-text format the wire needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub project: String,
    pub summary: String,
    pub description: String,
    pub issue_type: String,
    pub labels: Vec<String>,
}

/// Acknowledgement of a successful mutation.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CreatedIssue {
    pub key: String,
    pub url: String,
}
