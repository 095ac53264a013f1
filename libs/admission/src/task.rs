//! Reconciliation work items.
//!
//! [`ReconcileTask`] is the unit of background work the platform's worker
//! pools push through the admission scheduler: bring one object's copy on
//! one site back in line with its replicas. The free functions in this
//! module are the standard scheduling policies; every service wires them
//! through [`ReconcileTask::scheduler`].

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use replistore_id::{BucketId, ObjectId, SiteId, TaskId};

use crate::error::AdmissionError;
use crate::scheduler::AdmissionScheduler;

/// One pending reconciliation action against a remote site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileTask {
    /// Stable handle used for cancellation and deduplication.
    pub id: TaskId,

    /// Site whose copy needs attention.
    pub site: SiteId,

    pub bucket: BucketId,
    pub object: ObjectId,

    /// Dispatch rank; lower runs earlier. Rewritten by decay passes while
    /// the task waits in the backlog.
    pub rank: i64,

    /// Dispatch attempts completed so far.
    pub attempts: u32,

    pub created_at: DateTime<Utc>,
}

impl ReconcileTask {
    pub fn new(site: SiteId, bucket: BucketId, object: ObjectId, rank: i64) -> Self {
        Self {
            id: TaskId::new(),
            site,
            bucket,
            object,
            rank,
            attempts: 0,
            created_at: Utc::now(),
        }
    }

    /// Records one more dispatch attempt.
    pub fn bump(&mut self) {
        self.attempts += 1;
    }

    /// Builds a scheduler wired with the standard policies: ascending
    /// rank, identity by task ID, halving decay.
    pub fn scheduler(capacity: usize) -> Result<AdmissionScheduler<Self>, AdmissionError> {
        AdmissionScheduler::builder()
            .capacity(capacity)
            .priority(rank_order)
            .identity(same_task)
            .decay(halve_rank)
            .build()
    }
}

/// Ascending rank: the lowest rank leaves the backlog first.
pub fn rank_order(a: &ReconcileTask, b: &ReconcileTask) -> Ordering {
    a.rank.cmp(&b.rank)
}

/// Two values are the same unit of work when their task IDs match, no
/// matter how far their ranks have drifted apart.
pub fn same_task(a: &ReconcileTask, b: &ReconcileTask) -> bool {
    a.id == b.id
}

/// Halves the rank so work that keeps missing admission moves toward the
/// front of the backlog.
pub fn halve_rank(mut task: ReconcileTask) -> ReconcileTask {
    task.rank /= 2;
    task
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(rank: i64) -> ReconcileTask {
        ReconcileTask::new(SiteId::new(), BucketId::new(), ObjectId::new(), rank)
    }

    #[test]
    fn rank_order_sorts_ascending() {
        let low = task(1);
        let high = task(9);
        assert_eq!(rank_order(&low, &high), Ordering::Less);
        assert_eq!(rank_order(&high, &low), Ordering::Greater);
        assert_eq!(rank_order(&low, &low.clone()), Ordering::Equal);
    }

    #[test]
    fn same_task_ignores_rank_drift() {
        let original = task(10);
        let mut decayed = original.clone();
        decayed.rank = -3;
        assert!(same_task(&original, &decayed));

        let other = task(10);
        assert!(!same_task(&original, &other));
    }

    #[test]
    fn halve_rank_rounds_toward_zero() {
        assert_eq!(halve_rank(task(38)).rank, 19);
        assert_eq!(halve_rank(task(1)).rank, 0);
        assert_eq!(halve_rank(task(0)).rank, 0);
    }

    #[test]
    fn bump_counts_attempts() {
        let mut t = task(0);
        t.bump();
        t.bump();
        assert_eq!(t.attempts, 2);
    }

    #[test]
    fn scheduler_preset_rejects_zero_capacity() {
        assert!(matches!(
            ReconcileTask::scheduler(0),
            Err(AdmissionError::InvalidCapacity { got: 0 })
        ));
    }

    #[test]
    fn single_slot_walkthrough() {
        let sched = ReconcileTask::scheduler(1).unwrap();
        let t20 = task(20);
        let t30 = task(30);
        sched.add_all(vec![t20.clone(), t30.clone(), task(38), task(50)]);
        assert_eq!(sched.len(), 4);

        // one decay pass halves the whole backlog before the first
        // admission, so the front task comes out at half its rank
        let first = sched.poll().unwrap();
        assert!(same_task(&first, &t20));
        assert_eq!(first.rank, 10);

        let second = sched.poll().unwrap();
        assert!(same_task(&second, &t30));
        assert_eq!(second.rank, 7);

        // a plain add returns the task to the backlog at its current rank
        sched.add(first);
        assert!(sched.contains(&t20));
        assert_eq!(sched.len(), 3);
    }

    #[test]
    fn wide_window_admits_lowest_rank_first() {
        let sched = ReconcileTask::scheduler(10).unwrap();
        for rank in 0..50 {
            sched.add(task(rank));
        }

        let polled = sched.poll().unwrap();
        assert_eq!(polled.rank, 0);
        assert_eq!(sched.len(), 49);
        assert_eq!(sched.active_len(), 9);

        sched.add_continue(Some(polled));
        assert_eq!(sched.len(), 50);
        assert!(sched.is_full());
    }

    #[test]
    fn json_roundtrip() {
        let t = task(12);
        let json = serde_json::to_string(&t).unwrap();
        let parsed: ReconcileTask = serde_json::from_str(&json).unwrap();
        assert!(same_task(&t, &parsed));
        assert_eq!(parsed.rank, 12);
        assert_eq!(parsed.site, t.site);
    }
}
