pub mod jira;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::JiraConfig;
use crate::model::issue::NewIssue;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tracker rejected the request ({status}): {message}")]
    Remote { status: u16, message: String },
    #[error("no transition named {name:?} is available from the current status of {key}")]
    TransitionNotAvailable { key: String, name: String },
}

/// An issue as decoded off the wire, before normalization. The tracker
/// implementation has already reduced rich-text descriptions to plain text
/// and parsed timestamps; `created` is `None` when the raw value would not
/// parse.
#[derive(Debug, Clone)]
pub struct RawIssue {
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    pub created: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub url: String,
}

/// A state transition currently available on an issue. The set depends on
/// the issue's present status, not on a global enum.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

/// The field portion of a mutation, with status handling split off.
/// Presence decides what is sent: `None` fields never reach the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.description.is_none() && self.labels.is_none()
    }
}

#[async_trait]
pub trait Tracker: Send + Sync {
    fn name(&self) -> &str;
    /// Deterministic browse URL for an issue key.
    fn browse_url(&self, key: &str) -> String;
    async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<RawIssue>, TrackerError>;
    async fn get_issue(&self, key: &str) -> Result<RawIssue, TrackerError>;
    async fn update_fields(&self, key: &str, fields: &FieldPatch) -> Result<(), TrackerError>;
    async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>, TrackerError>;
    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<(), TrackerError>;
    async fn add_worklog(
        &self,
        key: &str,
        time_spent: &str,
        comment: Option<&str>,
    ) -> Result<(), TrackerError>;
    /// Submit a new issue and return its key.
    async fn create_issue(&self, issue: &NewIssue) -> Result<String, TrackerError>;
}

pub fn create_tracker(config: &JiraConfig) -> Box<dyn Tracker> {
    Box::new(jira::JiraTracker::new(
        config.domain.clone(),
        config.email.clone(),
        config.api_token.clone(),
    ))
}
