use anyhow::Result;

use crate::model::issue::{Confirmation, FieldUpdate};
use crate::tracker::{FieldPatch, Tracker, TrackerError};

/// Apply a sparse update to an existing issue, then resolve and apply a
/// status transition when one is requested.
///
/// Only fields present in the update are sent. A requested status is
/// matched by display name against the transitions currently available on
/// the issue; a name with no match is a `TransitionNotAvailable` error.
/// The field update and the transition are two independent remote calls:
/// field changes already applied are not rolled back when the transition
/// step fails.
pub async fn modify_issue(
    tracker: &dyn Tracker,
    key: &str,
    update: FieldUpdate,
) -> Result<Confirmation> {
    // Read first so an unknown key fails before any write.
    tracker.get_issue(key).await?;

    let patch = FieldPatch {
        summary: update.summary,
        description: update.description,
        labels: update.labels,
    };
    if !patch.is_empty() {
        tracker.update_fields(key, &patch).await?;
    }

    if let Some(status) = update.status {
        let transitions = tracker.list_transitions(key).await?;
        let transition = transitions
            .into_iter()
            .find(|t| t.name == status)
            .ok_or_else(|| TrackerError::TransitionNotAvailable {
                key: key.to_string(),
                name: status,
            })?;
        tracker.apply_transition(key, &transition.id).await?;
    }

    Ok(Confirmation {
        key: key.to_string(),
        message: format!("Issue {key} updated successfully"),
    })
}

/// Append a worklog entry to an issue. The duration shorthand (`"2h 30m"`)
/// is not validated here; an invalid string surfaces the tracker's
/// rejection. Existing entries are never edited or removed.
pub async fn log_work(
    tracker: &dyn Tracker,
    key: &str,
    time_spent: &str,
    comment: Option<&str>,
) -> Result<Confirmation> {
    tracker.add_worklog(key, time_spent, comment).await?;
    Ok(Confirmation {
        key: key.to_string(),
        message: format!("Logged {time_spent} on issue {key}"),
    })
}
