use crate::core::error::FetchError;
use crate::notifier::Notifier;
use std::sync::Arc;

/// Forwards cycle failures to an optional operator chat, once per distinct
/// error text. The end chat never sees these.
pub struct ErrorReporter {
    operator: Option<Arc<dyn Notifier>>,
    last_reported: Option<String>,
}

impl ErrorReporter {
    pub fn new(operator: Option<Arc<dyn Notifier>>) -> Self {
        Self {
            operator,
            last_reported: None,
        }
    }

    #[allow(dead_code)]
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub async fn report(&mut self, error: &FetchError) {
        let text = format!("Сбой в работе программы: {error}");

        if self.last_reported.as_deref() == Some(text.as_str()) {
            tracing::debug!("Same failure already reported to operator");
            return;
        }

        if let Some(operator) = &self.operator {
            match operator.send(&text).await {
                Ok(()) => {
                    tracing::info!(chat_id = operator.chat_id(), "Reported failure to operator")
                }
                Err(e) => tracing::warn!(error = %e, "Failed to report failure to operator"),
            }
        }

        self.last_reported = Some(text);
    }

    pub fn clear(&mut self) {
        self.last_reported = None;
    }
}
