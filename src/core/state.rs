use crate::core::models::{HomeworkStatus, SubmissionId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Everything the loop remembers between cycles. Lives only as long as the
/// process does.
#[derive(Debug, Clone)]
pub struct PollState {
    pub last_poll_timestamp: DateTime<Utc>,
    known_status: HashMap<SubmissionId, HomeworkStatus>,
}

impl PollState {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            last_poll_timestamp: start,
            known_status: HashMap::new(),
        }
    }

    /// `None` when `lookback` reaches past the earliest representable time.
    pub fn starting_now(lookback: Duration) -> Option<Self> {
        Utc::now().checked_sub_signed(lookback).map(Self::new)
    }

    pub fn known_status(&self, id: &SubmissionId) -> Option<HomeworkStatus> {
        self.known_status.get(id).copied()
    }

    pub fn known_count(&self) -> usize {
        self.known_status.len()
    }

    pub(crate) fn record_status(&mut self, id: SubmissionId, status: HomeworkStatus) {
        self.known_status.insert(id, status);
    }

    pub fn advance_to(&mut self, timestamp: DateTime<Utc>) {
        if timestamp > self.last_poll_timestamp {
            self.last_poll_timestamp = timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_state_is_empty() {
        let start = Utc.with_ymd_and_hms(2026, 1, 18, 12, 0, 0).unwrap();
        let state = PollState::new(start);
        assert_eq!(state.last_poll_timestamp, start);
        assert_eq!(state.known_count(), 0);
        assert_eq!(state.known_status(&SubmissionId::new("1")), None);
    }

    #[test]
    fn test_starting_now_applies_lookback() {
        let before = Utc::now();
        let state = PollState::starting_now(Duration::hours(2)).unwrap();
        assert!(state.last_poll_timestamp >= before - Duration::hours(2));
        assert!(state.last_poll_timestamp <= Utc::now() - Duration::hours(2));
    }

    #[test]
    fn test_starting_now_rejects_out_of_range_lookback() {
        let huge = Duration::try_seconds(10_000_000_000_000).unwrap();
        assert!(PollState::starting_now(huge).is_none());
        assert!(PollState::starting_now(Duration::MAX).is_none());
    }

    #[test]
    fn test_advance_never_moves_backwards() {
        let start = Utc.with_ymd_and_hms(2026, 1, 18, 12, 0, 0).unwrap();
        let mut state = PollState::new(start);

        state.advance_to(start - Duration::minutes(5));
        assert_eq!(state.last_poll_timestamp, start);

        state.advance_to(start + Duration::minutes(10));
        assert_eq!(state.last_poll_timestamp, start + Duration::minutes(10));
    }
}
