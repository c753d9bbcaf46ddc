use crate::core::models::{NotificationMessage, SubmissionId, SubmissionRecord};
use crate::core::state::PollState;
use std::collections::HashMap;

/// Compares a fetched batch against what has already been reported and
/// returns one message per submission whose status is new or changed.
///
/// Records sharing an id are collapsed first: the last one in the batch
/// wins, so a submission never produces two messages in one cycle. Messages
/// come out in order of each id's first appearance.
pub fn detect(records: &[SubmissionRecord], state: &mut PollState) -> Vec<NotificationMessage> {
    let mut order: Vec<&SubmissionId> = Vec::new();
    let mut latest: HashMap<&SubmissionId, &SubmissionRecord> = HashMap::new();

    for record in records {
        if latest.insert(&record.submission_id, record).is_none() {
            order.push(&record.submission_id);
        }
    }

    let mut messages = Vec::new();

    for id in order {
        let record = latest[id];

        if state.known_status(id) == Some(record.status) {
            tracing::debug!(submission = %id, status = %record.status, "Status unchanged");
            continue;
        }

        tracing::info!(
            submission = %id,
            homework = %record.homework_name,
            previous = ?state.known_status(id),
            status = %record.status,
            "Homework status changed"
        );

        messages.push(NotificationMessage::for_record(record));
        state.record_status(id.clone(), record.status);
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::HomeworkStatus;
    use chrono::Utc;

    fn record(id: &str, name: &str, status: HomeworkStatus) -> SubmissionRecord {
        SubmissionRecord {
            submission_id: SubmissionId::new(id),
            homework_name: name.to_string(),
            status,
            status_updated_at: Utc::now(),
        }
    }

    fn empty_state() -> PollState {
        PollState::new(Utc::now())
    }

    #[test]
    fn test_new_submission_notifies_once() {
        for status in [
            HomeworkStatus::PendingReview,
            HomeworkStatus::Approved,
            HomeworkStatus::Rejected,
        ] {
            let mut state = empty_state();
            let messages = detect(&[record("1", "hw1", status)], &mut state);

            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].status, status);
            assert_eq!(state.known_status(&SubmissionId::new("1")), Some(status));
        }
    }

    #[test]
    fn test_same_status_does_not_renotify() {
        let mut state = empty_state();
        state.record_status(SubmissionId::new("1"), HomeworkStatus::Approved);

        let messages = detect(&[record("1", "hw1", HomeworkStatus::Approved)], &mut state);

        assert!(messages.is_empty());
        assert_eq!(state.known_count(), 1);
    }

    #[test]
    fn test_status_change_notifies_with_new_verdict() {
        let mut state = empty_state();
        state.record_status(SubmissionId::new("1"), HomeworkStatus::Approved);

        let messages = detect(&[record("1", "hw1", HomeworkStatus::Rejected)], &mut state);

        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].text,
            "hw1 / Работа проверена: у ревьюера есть замечания."
        );
        assert_eq!(
            state.known_status(&SubmissionId::new("1")),
            Some(HomeworkStatus::Rejected)
        );
    }

    #[test]
    fn test_batch_duplicates_collapse_to_last_status() {
        let mut state = empty_state();
        let batch = [
            record("1", "hw1", HomeworkStatus::PendingReview),
            record("1", "hw1", HomeworkStatus::Approved),
        ];

        let messages = detect(&batch, &mut state);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].status, HomeworkStatus::Approved);
        assert_eq!(
            state.known_status(&SubmissionId::new("1")),
            Some(HomeworkStatus::Approved)
        );
    }

    #[test]
    fn test_batch_collapsing_to_known_status_is_silent() {
        let mut state = empty_state();
        state.record_status(SubmissionId::new("1"), HomeworkStatus::Approved);
        let batch = [
            record("1", "hw1", HomeworkStatus::Rejected),
            record("1", "hw1", HomeworkStatus::Approved),
        ];

        assert!(detect(&batch, &mut state).is_empty());
    }

    #[test]
    fn test_messages_follow_first_appearance_order() {
        let mut state = empty_state();
        let batch = [
            record("2", "second", HomeworkStatus::PendingReview),
            record("1", "first", HomeworkStatus::PendingReview),
            record("2", "second", HomeworkStatus::Approved),
        ];

        let messages = detect(&batch, &mut state);
        let ids: Vec<&str> = messages.iter().map(|m| m.submission_id.as_str()).collect();

        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(messages[0].status, HomeworkStatus::Approved);
        assert_eq!(state.known_count(), 2);
    }

    #[test]
    fn test_empty_batch_changes_nothing() {
        let mut state = empty_state();
        assert!(detect(&[], &mut state).is_empty());
        assert_eq!(state.known_count(), 0);
    }
}
