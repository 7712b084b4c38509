use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{FieldPatch, RawIssue, Tracker, TrackerError, Transition};
use crate::model::issue::NewIssue;
use crate::util::adf::{extract_text_from_adf, text_to_adf};

pub struct JiraTracker {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl JiraTracker {
    pub fn new(domain: String, email: String, api_token: String) -> Self {
        let creds = format!("{email}:{api_token}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            base_url: format!("https://{domain}.atlassian.net"),
            auth_header: format!("Basic {encoded}"),
            client: reqwest::Client::new(),
        }
    }

    fn issue_url(&self, key: &str) -> String {
        format!("{}/rest/api/3/issue/{key}", self.base_url)
    }

    fn to_raw(&self, issue: JiraIssue) -> RawIssue {
        let url = self.browse_url(&issue.key);
        let description = issue.fields.description.as_ref().and_then(extract_text_from_adf);
        let created = issue.fields.created.as_deref().and_then(parse_created);
        RawIssue {
            url,
            description,
            created,
            key: issue.key,
            summary: issue.fields.summary.unwrap_or_default(),
            status: issue.fields.status.map(|s| s.name).unwrap_or_default(),
            labels: issue.fields.labels,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    issues: Vec<JiraIssue>,
}

#[derive(Deserialize)]
struct JiraIssue {
    key: String,
    fields: IssueFields,
}

#[derive(Deserialize)]
struct IssueFields {
    summary: Option<String>,
    description: Option<Value>,
    status: Option<StatusField>,
    created: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct StatusField {
    name: String,
}

#[derive(Deserialize)]
struct TransitionsResponse {
    transitions: Vec<TransitionEntry>,
}

#[derive(Deserialize)]
struct TransitionEntry {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct CreatedResponse {
    key: String,
}

/// Jira timestamps come as `2024-01-15T10:30:00.000+0000`; self-hosted
/// instances sometimes return RFC 3339 instead.
fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Pull the human-readable part out of a Jira error payload, falling back
/// to the raw body when it is not the usual {errorMessages, errors} shape.
fn rejection_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    let mut parts: Vec<String> = Vec::new();
    if let Some(messages) = value.get("errorMessages").and_then(Value::as_array) {
        parts.extend(messages.iter().filter_map(Value::as_str).map(String::from));
    }
    if let Some(errors) = value.get("errors").and_then(Value::as_object) {
        for (field, detail) in errors {
            match detail.as_str() {
                Some(s) => parts.push(format!("{field}: {s}")),
                None => parts.push(format!("{field}: {detail}")),
            }
        }
    }
    if parts.is_empty() {
        body.to_string()
    } else {
        parts.join("; ")
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(TrackerError::Remote {
        status: status.as_u16(),
        message: rejection_detail(&body),
    })
}

#[async_trait]
impl Tracker for JiraTracker {
    fn name(&self) -> &str {
        "Jira"
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url)
    }

    async fn search(&self, jql: &str, max_results: u32) -> Result<Vec<RawIssue>, TrackerError> {
        let url = format!(
            "{}/rest/api/3/search?jql={}&maxResults={}&fields=summary,description,status,created,labels",
            self.base_url,
            urlencoding::encode(jql),
            max_results
        );
        debug!(%jql, max_results, "searching issues");

        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await?;
        let search: SearchResponse = check(resp).await?.json().await?;

        Ok(search.issues.into_iter().map(|i| self.to_raw(i)).collect())
    }

    async fn get_issue(&self, key: &str) -> Result<RawIssue, TrackerError> {
        let url = format!(
            "{}?fields=summary,description,status,created,labels",
            self.issue_url(key)
        );
        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await?;
        let issue: JiraIssue = check(resp).await?.json().await?;
        Ok(self.to_raw(issue))
    }

    async fn update_fields(&self, key: &str, fields: &FieldPatch) -> Result<(), TrackerError> {
        let mut body = serde_json::Map::new();
        if let Some(summary) = &fields.summary {
            body.insert("summary".into(), json!(summary));
        }
        if let Some(description) = &fields.description {
            body.insert("description".into(), text_to_adf(description));
        }
        if let Some(labels) = &fields.labels {
            body.insert("labels".into(), json!(labels));
        }

        let resp = self
            .client
            .put(self.issue_url(key))
            .header("Authorization", &self.auth_header)
            .json(&json!({ "fields": Value::Object(body) }))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>, TrackerError> {
        let url = format!("{}/transitions", self.issue_url(key));
        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await?;
        let listed: TransitionsResponse = check(resp).await?.json().await?;
        Ok(listed
            .transitions
            .into_iter()
            .map(|t| Transition { id: t.id, name: t.name })
            .collect())
    }

    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<(), TrackerError> {
        let url = format!("{}/transitions", self.issue_url(key));
        let resp = self
            .client
            .post(&url)
            .header("Authorization", &self.auth_header)
            .json(&json!({ "transition": { "id": transition_id } }))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn add_worklog(
        &self,
        key: &str,
        time_spent: &str,
        comment: Option<&str>,
    ) -> Result<(), TrackerError> {
        let mut body = serde_json::Map::new();
        body.insert("timeSpent".into(), json!(time_spent));
        if let Some(comment) = comment {
            body.insert("comment".into(), text_to_adf(comment));
        }

        let url = format!("{}/worklog", self.issue_url(key));
        let resp = self
            .client
            .post(&url)
            .header("Authorization", &self.auth_header)
            .json(&Value::Object(body))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<String, TrackerError> {
        let body = json!({
            "fields": {
                "project": { "key": issue.project },
                "summary": issue.summary,
                "description": text_to_adf(&issue.description),
                "issuetype": { "name": issue.issue_type },
                "labels": issue.labels,
            }
        });

        let url = format!("{}/rest/api/3/issue", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        // Creation is acknowledged by 201 specifically; anything else is a
        // failure even if nominally 2xx.
        let status = resp.status();
        if status != reqwest::StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(TrackerError::Remote {
                status: status.as_u16(),
                message: rejection_detail(&body),
            });
        }
        let created: CreatedResponse = resp.json().await?;
        Ok(created.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_jira_cloud_timestamp() {
        let parsed = parse_created("2024-01-15T10:30:00.000+0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_timestamp() {
        let parsed = parse_created("2024-01-15T10:30:00+01:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert_eq!(parse_created("yesterday"), None);
    }

    #[test]
    fn rejection_detail_joins_error_messages() {
        let body = r#"{"errorMessages":["Issue does not exist"],"errors":{}}"#;
        assert_eq!(rejection_detail(body), "Issue does not exist");
    }

    #[test]
    fn rejection_detail_includes_field_errors() {
        let body = r#"{"errorMessages":[],"errors":{"issuetype":"The issue type selected is invalid."}}"#;
        assert_eq!(
            rejection_detail(body),
            "issuetype: The issue type selected is invalid."
        );
    }

    #[test]
    fn rejection_detail_falls_back_to_raw_body() {
        assert_eq!(rejection_detail("<html>Bad Gateway</html>"), "<html>Bad Gateway</html>");
        assert_eq!(rejection_detail(r#"{"unexpected":true}"#), r#"{"unexpected":true}"#);
    }
}
