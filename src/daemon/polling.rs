use crate::core::detector::detect;
use crate::core::state::PollState;
use crate::daemon::reporter::ErrorReporter;
use crate::notifier::Notifier;
use crate::providers::StatusSource;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    FetchFailed,
    Completed {
        detected: usize,
        delivered: usize,
        failed: usize,
    },
}

pub struct PollLoop {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    reporter: ErrorReporter,
    state: PollState,
    interval: Duration,
}

impl PollLoop {
    pub fn new(
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
        reporter: ErrorReporter,
        state: PollState,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            notifier,
            reporter,
            state,
            interval,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// One fetch, detect, notify pass. Never fails: every error is logged
    /// here and folded into the outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let since = self.state.last_poll_timestamp;
        tracing::debug!(source = self.source.name(), %since, "Fetching statuses");

        let records = match self.source.fetch(since).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, %since, "Fetch failed, retrying next cycle");
                self.reporter.report(&e).await;
                return CycleOutcome::FetchFailed;
            }
        };
        let fetched_at = Utc::now();
        self.reporter.clear();

        let messages = detect(&records, &mut self.state);
        self.state.advance_to(fetched_at);

        let mut delivered = 0;
        let mut failed = 0;

        for message in &messages {
            match self.notifier.send(&message.text).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        error = %e,
                        submission = %message.submission_id,
                        status = %message.status,
                        "Notification lost"
                    );
                }
            }
        }

        tracing::info!(
            fetched = records.len(),
            detected = messages.len(),
            delivered,
            failed,
            known = self.state.known_count(),
            "Cycle complete"
        );

        CycleOutcome::Completed {
            detected: messages.len(),
            delivered,
            failed,
        }
    }

    /// Cycles until `shutdown` resolves. Shutdown is only observed while
    /// sleeping, so a cycle in flight always finishes.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            interval = ?self.interval,
            since = %self.state.last_poll_timestamp,
            "Polling loop started"
        );

        tokio::pin!(shutdown);

        let mut failed_fetches: u32 = 0;

        loop {
            match self.run_cycle().await {
                CycleOutcome::FetchFailed => {
                    failed_fetches = failed_fetches.saturating_add(1);
                    tracing::warn!(
                        consecutive = failed_fetches,
                        next_attempt_in = ?self.interval,
                        "No statuses this cycle"
                    );
                }
                CycleOutcome::Completed {
                    detected,
                    delivered,
                    failed,
                } => {
                    if failed_fetches > 0 {
                        tracing::info!(after = failed_fetches, "Status API reachable again");
                    }
                    failed_fetches = 0;
                    if failed > 0 {
                        tracing::warn!(detected, delivered, failed, "Some notifications were lost");
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping polling loop");
                    break;
                }
            }
        }
    }
}
