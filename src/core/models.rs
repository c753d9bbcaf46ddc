use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HomeworkStatus {
    #[serde(rename = "reviewing", alias = "pending_review")]
    PendingReview,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
}

impl HomeworkStatus {
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
            HomeworkStatus::PendingReview => "Работа взята на проверку.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::PendingReview => "pending_review",
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream identifier, kept opaque. The API sends integers today but
/// nothing here depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    #[allow(dead_code)]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[allow(dead_code)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SubmissionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Str(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Ok(SubmissionId(n.to_string())),
            RawId::Str(s) if !s.is_empty() => Ok(SubmissionId(s)),
            RawId::Str(_) => Err(serde::de::Error::custom("submission id is empty")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(rename = "id")]
    pub submission_id: SubmissionId,
    pub homework_name: String,
    pub status: HomeworkStatus,
    #[serde(rename = "date_updated")]
    pub status_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub submission_id: SubmissionId,
    pub status: HomeworkStatus,
    pub text: String,
}

impl NotificationMessage {
    pub fn for_record(record: &SubmissionRecord) -> Self {
        Self {
            submission_id: record.submission_id.clone(),
            status: record.status,
            text: format!("{} / {}", record.homework_name, record.status.verdict()),
        }
    }
}
