use anyhow::Result;

use crate::model::issue::{CreatedIssue, NewIssue};
use crate::tracker::Tracker;

/// Submit a new issue and return its key and browse URL. The tracker
/// accepts the creation only with its dedicated success status; any other
/// response surfaces the rejection detail.
pub async fn create_issue(tracker: &dyn Tracker, issue: NewIssue) -> Result<CreatedIssue> {
    let key = tracker.create_issue(&issue).await?;
    let url = tracker.browse_url(&key);
    Ok(CreatedIssue { key, url })
}
