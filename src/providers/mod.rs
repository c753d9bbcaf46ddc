mod practicum;

use crate::core::error::FetchError;
use crate::core::models::SubmissionRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use practicum::PracticumProvider;

#[async_trait]
pub trait StatusSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submissions whose status was checked at or after `since`, in the
    /// order upstream returned them.
    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<SubmissionRecord>, FetchError>;
}
