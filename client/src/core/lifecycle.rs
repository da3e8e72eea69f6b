//! Reconciliation of store observations against cached records
//!
//! Pure logic, no I/O. The store is the source of truth, but a cached record
//! only moves to a status the lifecycle allows from its current one. A
//! terminal record therefore never changes status.

use shared::{Submission, UploadReceipt, UserIdentity};

/// What applying one observation did to the cached list
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// Not cached before; inserted at its timestamp position
    Insert(Submission),
    /// Cached record overwritten with the store's data
    Replace(Submission),
    /// Observation identical to the cached record
    Unchanged(Submission),
    /// Observation would make a transition the lifecycle forbids; the cached
    /// record stands
    Stale(Submission),
}

impl Reconciliation {
    /// The record now considered current
    pub fn record(&self) -> &Submission {
        match self {
            Reconciliation::Insert(s)
            | Reconciliation::Replace(s)
            | Reconciliation::Unchanged(s)
            | Reconciliation::Stale(s) => s,
        }
    }

    pub fn into_record(self) -> Submission {
        match self {
            Reconciliation::Insert(s)
            | Reconciliation::Replace(s)
            | Reconciliation::Unchanged(s)
            | Reconciliation::Stale(s) => s,
        }
    }

    pub fn changes_cache(&self) -> bool {
        matches!(self, Reconciliation::Insert(_) | Reconciliation::Replace(_))
    }
}

/// Decide how an observed record relates to the cached one with the same id
pub fn reconcile(cached: Option<&Submission>, observed: Submission) -> Reconciliation {
    match cached {
        None => Reconciliation::Insert(observed),
        Some(current) if *current == observed => Reconciliation::Unchanged(observed),
        Some(current)
            if current.status != observed.status && !current.status.can_transition_to(observed.status) =>
        {
            Reconciliation::Stale(current.clone())
        }
        Some(_) => Reconciliation::Replace(observed),
    }
}

/// Apply an observation to an owner's list in place
pub fn apply_observation(list: &mut Vec<Submission>, observed: Submission) -> Reconciliation {
    let position = list.iter().position(|s| s.id == observed.id);
    let outcome = reconcile(position.map(|i| &list[i]), observed);

    match (&outcome, position) {
        (Reconciliation::Replace(record), Some(i)) => list[i] = record.clone(),
        (Reconciliation::Insert(record), _) => {
            let at = list
                .iter()
                .position(|s| s.submitted_at < record.submitted_at)
                .unwrap_or(list.len());
            list.insert(at, record.clone());
        }
        _ => {}
    }
    outcome
}

/// Put a freshly acknowledged record at the head, dropping any same-id entry
pub fn prepend(list: &mut Vec<Submission>, record: Submission) {
    list.retain(|s| s.id != record.id);
    list.insert(0, record);
}

/// `Created -> Processing`: the record built from a store acknowledgment
pub fn acknowledge(receipt: &UploadReceipt, owner: &UserIdentity) -> Submission {
    Submission::processing(
        receipt.submission_id.clone(),
        owner.uid.clone(),
        owner.owner_name(),
        receipt.file_name.clone(),
        receipt.submitted_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use shared::{Scores, SubmissionStatus};

    fn processing(id: &str, minutes: i64) -> Submission {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        Submission::processing(id, "u1", "Ada", "model.zip", at)
    }

    fn completed(id: &str, minutes: i64) -> Submission {
        processing(id, minutes)
            .complete(Scores::new(0.8, 0.7, 0.6).unwrap(), "done", None)
            .unwrap()
    }

    #[test]
    fn test_store_wins_while_processing() {
        let cached = processing("a", 0);
        let observed = completed("a", 0);
        assert_eq!(
            reconcile(Some(&cached), observed.clone()),
            Reconciliation::Replace(observed)
        );
    }

    #[test]
    fn test_same_state_refresh_updates_data() {
        let cached = processing("a", 0);
        let mut observed = processing("a", 0);
        observed.logs = Some("step 2".into());
        assert!(reconcile(Some(&cached), observed).changes_cache());
    }

    #[test]
    fn test_terminal_record_ignores_stale_observation() {
        let cached = completed("a", 0);
        let outcome = reconcile(Some(&cached), processing("a", 0));
        assert_eq!(outcome, Reconciliation::Stale(cached));
        assert!(!outcome.changes_cache());
    }

    #[test]
    fn test_processing_record_does_not_regress_to_created() {
        let cached = processing("a", 0);
        let mut observed = processing("a", 0);
        observed.status = SubmissionStatus::Created;

        let outcome = reconcile(Some(&cached), observed);
        assert_eq!(outcome, Reconciliation::Stale(cached.clone()));

        let mut list = vec![cached.clone()];
        let mut regressed = cached.clone();
        regressed.status = SubmissionStatus::Created;
        apply_observation(&mut list, regressed);
        assert_eq!(list, vec![cached]);
    }

    #[test]
    fn test_terminal_record_takes_same_state_corrections() {
        let cached = completed("a", 0);
        let corrected = processing("a", 0)
            .complete(Scores::new(0.9, 0.7, 0.6).unwrap(), "rescored", None)
            .unwrap();
        assert_eq!(
            reconcile(Some(&cached), corrected.clone()),
            Reconciliation::Replace(corrected)
        );
    }

    #[test]
    fn test_insert_keeps_newest_first() {
        let mut list = vec![processing("c", 30), processing("a", 0)];
        apply_observation(&mut list, processing("b", 15));
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);

        apply_observation(&mut list, processing("old", -10));
        assert_eq!(list.last().unwrap().id, "old");
    }

    #[test]
    fn test_replace_is_in_place() {
        let mut list = vec![processing("c", 30), processing("a", 0)];
        apply_observation(&mut list, completed("a", 0));
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].status, SubmissionStatus::Completed);
    }

    #[test]
    fn test_prepend_deduplicates() {
        let mut list = vec![processing("x", 0), processing("y", -5)];
        let mut newer = processing("y", 10);
        newer.file_name = "v2.zip".into();
        prepend(&mut list, newer);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "y");
        assert_eq!(list[0].file_name, "v2.zip");
    }

    #[test]
    fn test_acknowledge_builds_processing_record() {
        let receipt = UploadReceipt {
            submission_id: "s-1".into(),
            file_name: "model.zip".into(),
            submitted_at: Utc::now(),
            message: None,
        };
        let owner = UserIdentity::new("u1").with_email("ada@example.com");
        let record = acknowledge(&receipt, &owner);

        assert_eq!(record.status, SubmissionStatus::Processing);
        assert_eq!(record.user_name, "ada@example.com");
        assert_eq!(record.submitted_at, receipt.submitted_at);
        assert!(record.validate().is_ok());
    }
}
