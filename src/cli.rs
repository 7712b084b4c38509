use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, Utc};

use crate::config::{self, AppConfig, JiraConfig};
use crate::issues::{create_issue, fetch_issues, log_work, modify_issue};
use crate::model::issue::{FieldUpdate, IssueRecord, NewIssue};
use crate::tracker;

const DEFAULT_MAX_RESULTS: u32 = 2000;
const DEFAULT_ISSUE_TYPE: &str = "Task";

#[derive(Debug, PartialEq)]
pub enum TimeFrame {
    LastWeek,
    LastMonth,
    Custom { from: NaiveDate, to: NaiveDate },
}

#[derive(Debug, PartialEq)]
pub struct FetchArgs {
    pub frame: TimeFrame,
    pub max: u32,
    pub json: bool,
}

#[derive(Debug, PartialEq)]
pub struct CreateArgs {
    pub summary: String,
    pub description: String,
    pub issue_type: String,
    pub client: Option<String>,
    pub labels: Vec<String>,
}

/// Fetch issues created in a date window and print them with aggregate
/// counts.
pub async fn handle_fetch(args: &[String]) -> Result<()> {
    let parsed = parse_fetch_args(args)?;
    let (start, end) = resolve_window(&parsed.frame, Utc::now().date_naive());

    let config = config::load_config()?;
    let jira = require_jira(&config)?;
    let tracker = tracker::create_tracker(jira);

    let issues = fetch_issues(tracker.as_ref(), &jira.project, start, end, parsed.max).await?;

    if parsed.json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }
    if issues.is_empty() {
        println!("No issues found in {} between {start} and {end}.", jira.project);
        return Ok(());
    }

    println!(
        "{} {} issues in {} between {start} and {end}\n",
        issues.len(),
        tracker.name(),
        jira.project
    );
    print_issues(&issues);
    print_summary(&issues);
    Ok(())
}

/// Parse CLI args for `jiradash create` and submit the new issue.
pub async fn handle_create(args: &[String]) -> Result<()> {
    let parsed = parse_create_args(args)?;

    let config = config::load_config()?;
    let jira = require_jira(&config)?;

    ensure_allowed("label", &parsed.labels, &config.labels)?;
    if let Some(client) = &parsed.client {
        ensure_allowed("client", std::slice::from_ref(client), &config.clients)?;
    }

    let description = compose_description(parsed.client.as_deref(), &parsed.description);
    let issue = NewIssue {
        project: jira.project.clone(),
        summary: parsed.summary,
        description,
        issue_type: parsed.issue_type,
        labels: parsed.labels,
    };

    let tracker = tracker::create_tracker(jira);
    let created = create_issue(tracker.as_ref(), issue).await?;

    println!("Created {}: {}", tracker.name(), created.key);
    println!("  {}", created.url);
    Ok(())
}

/// Parse CLI args for `jiradash modify` and apply the partial update.
pub async fn handle_modify(args: &[String]) -> Result<()> {
    let (key, update) = parse_modify_args(args)?;

    let config = config::load_config()?;
    let jira = require_jira(&config)?;
    if let Some(labels) = &update.labels {
        ensure_allowed("label", labels, &config.labels)?;
    }

    let tracker = tracker::create_tracker(jira);
    let confirmation = modify_issue(tracker.as_ref(), &key, update).await?;

    println!("{}", confirmation.message);
    println!("  {}", tracker.browse_url(&confirmation.key));
    Ok(())
}

/// Parse CLI args for `jiradash log` and append the worklog entry.
pub async fn handle_log(args: &[String]) -> Result<()> {
    let (key, time_spent, comment) = parse_log_args(args)?;

    let config = config::load_config()?;
    let jira = require_jira(&config)?;
    let tracker = tracker::create_tracker(jira);

    let confirmation = log_work(tracker.as_ref(), &key, &time_spent, comment.as_deref()).await?;

    println!("{}", confirmation.message);
    Ok(())
}

fn require_jira(config: &AppConfig) -> Result<&JiraConfig> {
    config
        .jira
        .as_ref()
        .context("No tracker configured. Add a [jira] block to ~/.jiradash/config.toml")
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.as_str()),
        None => bail!("Missing value for {flag}"),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date {raw:?}, expected YYYY-MM-DD"))
}

pub fn parse_fetch_args(args: &[String]) -> Result<FetchArgs> {
    let mut from: Option<NaiveDate> = None;
    let mut to: Option<NaiveDate> = None;
    let mut last_week = false;
    let mut last_month = false;
    let mut max = DEFAULT_MAX_RESULTS;
    let mut json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--last-week" => last_week = true,
            "--last-month" => last_month = true,
            "--json" => json = true,
            "--from" => from = Some(parse_date(take_value(args, &mut i, "--from")?)?),
            "--to" => to = Some(parse_date(take_value(args, &mut i, "--to")?)?),
            "--max" => {
                let raw = take_value(args, &mut i, "--max")?;
                max = raw
                    .parse()
                    .with_context(|| format!("Invalid value for --max: {raw:?}"))?;
            }
            other => bail!("Unknown fetch option {other}"),
        }
        i += 1;
    }

    if last_week && last_month {
        bail!("--last-week and --last-month are mutually exclusive");
    }
    if (last_week || last_month) && (from.is_some() || to.is_some()) {
        bail!("Use either a time-frame shortcut or --from/--to, not both");
    }

    let frame = match (last_month, from, to) {
        (true, _, _) => TimeFrame::LastMonth,
        (false, None, None) => TimeFrame::LastWeek,
        (false, Some(from), Some(to)) => TimeFrame::Custom { from, to },
        _ => bail!("A custom range needs both --from and --to"),
    };

    Ok(FetchArgs { frame, max, json })
}

pub fn resolve_window(frame: &TimeFrame, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match frame {
        TimeFrame::LastWeek => (today - Duration::weeks(1), today),
        TimeFrame::LastMonth => (today - Duration::weeks(4), today),
        TimeFrame::Custom { from, to } => (*from, *to),
    }
}

/// Parse `jiradash create` arguments.
///
/// Supported forms:
///   jiradash create "Fix the login bug"
///   jiradash create Fix the login bug
///   jiradash create "Fix login" -d "SSO fails" -t Bug -c "Acme Corp" -l auth -l backend
pub fn parse_create_args(args: &[String]) -> Result<CreateArgs> {
    if args.is_empty() {
        bail!(
            "Usage: jiradash create <summary> [-d <description>] [-t <type>] [-c <client>] [-l <label>]..."
        );
    }

    let mut summary_parts: Vec<String> = Vec::new();
    let mut description = String::new();
    let mut issue_type = DEFAULT_ISSUE_TYPE.to_string();
    let mut client: Option<String> = None;
    let mut labels: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--desc" | "--description" => {
                description = take_value(args, &mut i, "-d/--desc")?.to_string();
            }
            "-t" | "--type" => {
                issue_type = take_value(args, &mut i, "-t/--type")?.to_string();
            }
            "-c" | "--client" => {
                client = Some(take_value(args, &mut i, "-c/--client")?.to_string());
            }
            "-l" | "--label" => {
                labels.push(take_value(args, &mut i, "-l/--label")?.to_string());
            }
            _ => summary_parts.push(args[i].clone()),
        }
        i += 1;
    }

    let summary = summary_parts.join(" ");
    if summary.is_empty() {
        bail!("Issue summary cannot be empty");
    }

    Ok(CreateArgs { summary, description, issue_type, client, labels })
}

/// Compose the conventional description: a `client:` first line when a
/// client was chosen, the user's text after it.
pub fn compose_description(client: Option<&str>, description: &str) -> String {
    match client {
        Some(client) => format!("client: {client}\ndescription: {description}"),
        None => description.to_string(),
    }
}

/// Parse `jiradash modify` arguments into an issue key and a sparse update.
/// Absent flags stay absent fields; `--description ""` clears the
/// description and `--labels ""` clears the labels.
pub fn parse_modify_args(args: &[String]) -> Result<(String, FieldUpdate)> {
    let Some(key) = args.first().filter(|a| !a.starts_with('-')) else {
        bail!("Usage: jiradash modify <key> [--summary S] [--description D] [--labels a,b] [--status NAME]");
    };

    let mut update = FieldUpdate::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--summary" => update.summary = Some(take_value(args, &mut i, "--summary")?.to_string()),
            "-d" | "--description" => {
                update.description = Some(take_value(args, &mut i, "--description")?.to_string());
            }
            "--labels" => update.labels = Some(split_labels(take_value(args, &mut i, "--labels")?)),
            "--status" => update.status = Some(take_value(args, &mut i, "--status")?.to_string()),
            other => bail!("Unknown modify option {other}"),
        }
        i += 1;
    }

    if update.is_empty() {
        bail!("Nothing to change: provide at least one of --summary, --description, --labels, --status");
    }

    Ok((key.clone(), update))
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `jiradash log` arguments: key, duration shorthand (quoting
/// optional, trailing words are joined), and an optional comment.
pub fn parse_log_args(args: &[String]) -> Result<(String, String, Option<String>)> {
    let Some(key) = args.first().filter(|a| !a.starts_with('-')) else {
        bail!("Usage: jiradash log <key> <time-spent> [-m <comment>]\n\nExample:\n  jiradash log OPS-12 2h 30m -m \"pairing session\"");
    };

    let mut time_parts: Vec<String> = Vec::new();
    let mut comment: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-m" | "--message" => {
                comment = Some(take_value(args, &mut i, "-m/--message")?.to_string());
            }
            _ => time_parts.push(args[i].clone()),
        }
        i += 1;
    }

    let time_spent = time_parts.join(" ");
    if time_spent.is_empty() {
        bail!("Time spent cannot be empty (e.g. \"2h 30m\")");
    }

    Ok((key.clone(), time_spent, comment))
}

/// Reject values outside the configured option list. An empty list means
/// the tracker's own validation is the only gate.
fn ensure_allowed(kind: &str, values: &[String], allowed: &[String]) -> Result<()> {
    if allowed.is_empty() {
        return Ok(());
    }
    for value in values {
        if !allowed.iter().any(|a| a == value) {
            bail!("Unknown {kind} {value:?}. Configured {kind}s: {}", allowed.join(", "));
        }
    }
    Ok(())
}

fn print_issues(issues: &[IssueRecord]) {
    println!(
        "{:<12} {:<42} {:<14} {:<16} {:<24} {:<12} URL",
        "KEY", "SUMMARY", "STATUS", "CLIENT", "LABELS", "CREATED"
    );
    for issue in issues {
        println!(
            "{:<12} {:<42} {:<14} {:<16} {:<24} {:<12} {}",
            issue.key,
            truncate(&issue.summary, 40),
            truncate(&issue.status, 14),
            truncate(issue.client.as_deref().unwrap_or("-"), 16),
            truncate(&issue.labels.join(","), 22),
            issue.created.format("%Y-%m-%d"),
            issue.url
        );
    }
}

fn print_summary(issues: &[IssueRecord]) {
    print_counts("By status", &count_by(issues, |i| vec![i.status.clone()]));
    print_counts("By label", &count_by(issues, |i| i.labels.clone()));
    print_counts("By client", &count_by(issues, |i| i.client.clone().into_iter().collect()));
}

fn print_counts(title: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    println!("\n{title}:");
    for (bucket, count) in counts {
        println!("  {bucket:<24} {count}");
    }
}

/// Count issues per bucket; an issue lands in every bucket `f` yields for
/// it, so label counts overlap the way a stacked chart would.
fn count_by<F>(issues: &[IssueRecord], f: F) -> BTreeMap<String, usize>
where
    F: Fn(&IssueRecord) -> Vec<String>,
{
    let mut counts = BTreeMap::new();
    for issue in issues {
        for bucket in f(issue) {
            *counts.entry(bucket).or_insert(0) += 1;
        }
    }
    counts
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

pub fn print_help() {
    println!("jiradash — dashboard for a Jira project\n");
    println!("USAGE:");
    println!("  jiradash fetch [--last-week|--last-month|--from D --to D] [--max N] [--json]");
    println!("  jiradash create <summary> [-d <desc>] [-t <type>] [-c <client>] [-l <label>]...");
    println!("  jiradash modify <key> [--summary S] [-d D] [--labels a,b] [--status NAME]");
    println!("  jiradash log <key> <time-spent> [-m <comment>]");
    println!();
    println!("EXAMPLES:");
    println!("  jiradash fetch --last-month");
    println!("  jiradash create \"Fix login\" -d \"SSO fails\" -t Bug -c \"Acme Corp\" -l auth");
    println!("  jiradash modify OPS-12 --status \"In Progress\"");
    println!("  jiradash log OPS-12 2h 30m -m \"pairing session\"");
    println!();
    println!("Dates are YYYY-MM-DD; the default window is the last week.");
    println!("Config lives at ~/.jiradash/config.toml.");
}
