use anyhow::{ensure, Result};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::issue::IssueRecord;
use crate::tracker::{RawIssue, Tracker};
use crate::util::client::derive_client;

/// Fetch the issues created in `[start, end]` (day granularity, both ends
/// inclusive) for a project and normalize them into dashboard records.
///
/// `max_results` is a hard cap enforced by the tracker, not a pagination
/// cursor; narrow the window to see more. An empty window is an empty
/// `Vec`, not an error. A single record that fails to normalize is logged
/// and skipped, never aborting the batch.
pub async fn fetch_issues(
    tracker: &dyn Tracker,
    project: &str,
    start: NaiveDate,
    end: NaiveDate,
    max_results: u32,
) -> Result<Vec<IssueRecord>> {
    ensure!(start <= end, "start date {start} is after end date {end}");

    let jql = window_jql(project, start, end);
    let raw = tracker.search(&jql, max_results).await?;
    Ok(raw.into_iter().filter_map(normalize).collect())
}

fn window_jql(project: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "project = \"{project}\" AND created >= \"{}\" AND created <= \"{}\"",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

fn normalize(raw: RawIssue) -> Option<IssueRecord> {
    let Some(created) = raw.created else {
        warn!(key = %raw.key, "no parseable created timestamp, skipping");
        return None;
    };

    let client = derive_client(raw.description.as_deref());
    if client.is_none() {
        debug!(key = %raw.key, "description empty, or client not specified");
    }

    Some(IssueRecord {
        client,
        created,
        key: raw.key,
        summary: raw.summary,
        status: raw.status,
        labels: raw.labels,
        url: raw.url,
        description: raw.description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jql_selects_project_and_created_window() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            window_jql("OPS", start, end),
            "project = \"OPS\" AND created >= \"2024-01-01\" AND created <= \"2024-01-31\""
        );
    }
}
