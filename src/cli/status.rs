use crate::core::models::SubmissionRecord;
use crate::core::settings::{Credentials, Settings};
use crate::providers::{PracticumProvider, StatusSource};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct StatusOutput {
    #[serde(with = "chrono::serde::ts_seconds")]
    since: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    fetched_at: DateTime<Utc>,
    homeworks: Vec<HomeworkLine>,
}

#[derive(Serialize)]
struct HomeworkLine {
    id: String,
    homework_name: String,
    status: &'static str,
    verdict: &'static str,
    updated_at: DateTime<Utc>,
}

impl From<SubmissionRecord> for HomeworkLine {
    fn from(record: SubmissionRecord) -> Self {
        Self {
            id: record.submission_id.to_string(),
            verdict: record.status.verdict(),
            homework_name: record.homework_name,
            status: record.status.as_str(),
            updated_at: record.status_updated_at,
        }
    }
}

pub async fn run(
    settings: Settings,
    credentials: Credentials,
    json: bool,
    since_hours: Option<u32>,
) -> Result<()> {
    let since = resolve_since(&settings, since_hours, Utc::now())?;

    let provider = PracticumProvider::new(
        &settings.endpoints.status_url,
        &credentials.practicum_token,
        settings.polling.request_timeout(),
    )
    .context("Failed to set up status API client")?;

    let records = provider
        .fetch(since)
        .await
        .with_context(|| format!("Failed to fetch statuses from {}", provider.name()))?;

    let output = StatusOutput {
        since,
        fetched_at: Utc::now(),
        homeworks: records.into_iter().map(HomeworkLine::from).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_output(&output);
    }

    Ok(())
}

fn resolve_since(
    settings: &Settings,
    since_hours: Option<u32>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let lookback = match since_hours {
        Some(hours) => TimeDelta::try_hours(i64::from(hours))
            .with_context(|| format!("--since-hours {hours} is out of range"))?,
        None => settings
            .polling
            .lookback()
            .context("polling.lookback_secs is out of range")?,
    };

    now.checked_sub_signed(lookback)
        .with_context(|| format!("Looking back {lookback} from {now} is out of range"))
}

fn print_text_output(output: &StatusOutput) {
    if output.homeworks.is_empty() {
        println!(
            "No status changes since {}",
            output.since.format("%Y-%m-%d %H:%M UTC")
        );
        return;
    }

    for line in &output.homeworks {
        println!("{} (#{})", line.homework_name, line.id);
        println!(
            "  {:<15} {}",
            format!("{}:", line.status),
            line.updated_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!("  {}", line.verdict);
    }
}
