//! Bounded round-robin admission scheduling.
//!
//! [`AdmissionScheduler`] sits between producers of background work and
//! the worker loop that executes it. Work enters a priority backlog via
//! `add`; the worker calls `poll` to obtain the next eligible item. When
//! the active window has free slots, `poll` first runs one decay pass
//! over the whole backlog and then promotes minima until the window is
//! full, so the re-ranking cost is paid once per refill. Draining the
//! window FIFO guarantees every admitted item is dispatched once before
//! any of them comes around again.
//!
//! After executing an item the worker either drops it, sends it back
//! through `add` for normal re-ranking, or calls `add_continue` to slot
//! it straight onto the window tail for another immediate turn.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::error::AdmissionError;
use crate::queue::{CompareFn, DecayQueue};

/// Equivalence check used for cancellation and membership lookups.
///
/// Deliberately separate from the priority ordering: decay rewrites an
/// item's rank over time, and a rank-based lookup would stop recognizing
/// the item it was asked to cancel.
pub type MatchFn<E> = Arc<dyn Fn(&E, &E) -> bool + Send + Sync>;

/// Rewrites one backlog item during an aging pass. Must return a value
/// the identity matcher still recognizes as the same logical item.
pub type DecayFn<E> = Arc<dyn Fn(E) -> E + Send + Sync>;

/// Builder for [`AdmissionScheduler`].
///
/// Capacity and all three policy functions are required; `build` is the
/// single place configuration mistakes surface.
pub struct AdmissionSchedulerBuilder<E> {
    capacity: usize,
    priority: Option<CompareFn<E>>,
    identity: Option<MatchFn<E>>,
    decay: Option<DecayFn<E>>,
}

impl<E> Default for AdmissionSchedulerBuilder<E> {
    fn default() -> Self {
        Self {
            capacity: 0,
            priority: None,
            identity: None,
            decay: None,
        }
    }
}

impl<E> AdmissionSchedulerBuilder<E> {
    /// Target size of the active window. Must be at least 1.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Ordering used to rank backlog items; the minimum is admitted first.
    pub fn priority(mut self, f: impl Fn(&E, &E) -> Ordering + Send + Sync + 'static) -> Self {
        self.priority = Some(Arc::new(f));
        self
    }

    /// Equivalence used by `remove` and `contains`.
    pub fn identity(mut self, f: impl Fn(&E, &E) -> bool + Send + Sync + 'static) -> Self {
        self.identity = Some(Arc::new(f));
        self
    }

    /// Transform applied to every backlog item during a refill pass.
    pub fn decay(mut self, f: impl Fn(E) -> E + Send + Sync + 'static) -> Self {
        self.decay = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<AdmissionScheduler<E>, AdmissionError> {
        if self.capacity == 0 {
            return Err(AdmissionError::InvalidCapacity { got: self.capacity });
        }
        let priority = self.priority.ok_or(AdmissionError::MissingPriority)?;
        let identity = self.identity.ok_or(AdmissionError::MissingIdentity)?;
        let decay = self.decay.ok_or(AdmissionError::MissingDecay)?;
        Ok(AdmissionScheduler {
            capacity: self.capacity,
            backlog: DecayQueue::new(priority),
            active: Mutex::new(VecDeque::new()),
            identity,
            decay,
        })
    }
}

/// A capacity-bounded FIFO dispatch window in front of a priority backlog.
///
/// Safe to share across producer and consumer threads. The scheduler owns
/// no threads and never blocks: `poll` returns `None` instead of waiting,
/// and `add_continue` grows the window past capacity instead of rejecting.
pub struct AdmissionScheduler<E> {
    capacity: usize,
    backlog: DecayQueue<E>,
    active: Mutex<VecDeque<E>>,
    identity: MatchFn<E>,
    decay: DecayFn<E>,
}

impl<E> std::fmt::Debug for AdmissionScheduler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionScheduler")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<E> AdmissionScheduler<E> {
    pub fn builder() -> AdmissionSchedulerBuilder<E> {
        AdmissionSchedulerBuilder::default()
    }

    // Exclusive scheduler lock, held for the whole duration of every
    // public operation so the multi-step poll stays atomic against
    // concurrent producers. Always acquired before the backlog's own
    // lock; no path takes them in the reverse order.
    fn lock_window(&self) -> MutexGuard<'_, VecDeque<E>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configured target size of the active window.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes and returns the next eligible item, or `None` when nothing
    /// is tracked.
    ///
    /// When the window is under capacity this first ages the whole backlog
    /// with the decay function, then promotes minima until the window is
    /// full or the backlog is empty, and only then dequeues the window
    /// head.
    pub fn poll(&self) -> Option<E> {
        let mut window = self.lock_window();
        if window.len() < self.capacity {
            self.backlog.reprioritize(&*self.decay);
            let mut promoted = 0usize;
            while window.len() < self.capacity {
                match self.backlog.pop() {
                    Some(item) => {
                        window.push_back(item);
                        promoted += 1;
                    }
                    None => break,
                }
            }
            if promoted > 0 {
                debug!(
                    promoted,
                    window = window.len(),
                    backlog = self.backlog.len(),
                    "refilled admission window"
                );
            }
        }
        window.pop_front()
    }

    /// Enqueues one item into the backlog.
    pub fn add(&self, item: E) {
        let _window = self.lock_window();
        self.backlog.push(item);
    }

    /// Enqueues every item from `items` into the backlog.
    pub fn add_all(&self, items: impl IntoIterator<Item = E>) {
        let _window = self.lock_window();
        self.backlog.extend(items);
    }

    /// Appends a previously dispatched item to the window tail for another
    /// immediate turn, skipping the backlog and its decay.
    ///
    /// `None` is accepted and ignored so a worker loop can call this
    /// unconditionally. This is the one operation that may push the window
    /// past capacity; the scheduler never blocks the caller instead.
    pub fn add_continue(&self, item: Option<E>) {
        let Some(item) = item else { return };
        let mut window = self.lock_window();
        window.push_back(item);
        trace!(window = window.len(), "item re-admitted to window");
    }

    /// Removes the first tracked item the identity matcher considers equal
    /// to `target`, searching the window in FIFO order and then the
    /// backlog. Returns whether anything was removed.
    pub fn remove(&self, target: &E) -> bool {
        let mut window = self.lock_window();
        if let Some(pos) = window.iter().position(|item| (self.identity)(target, item)) {
            window.remove(pos);
            trace!("item cancelled from window");
            return true;
        }
        let removed = self
            .backlog
            .remove_first(|item| (self.identity)(target, item))
            .is_some();
        if removed {
            trace!("item cancelled from backlog");
        }
        removed
    }

    /// Returns true if any tracked item matches `target` under the
    /// identity matcher.
    pub fn contains(&self, target: &E) -> bool {
        let window = self.lock_window();
        if window.iter().any(|item| (self.identity)(target, item)) {
            return true;
        }
        self.backlog.contains(|item| (self.identity)(target, item))
    }

    /// Number of tracked items across backlog and window.
    pub fn len(&self) -> usize {
        let window = self.lock_window();
        window.len() + self.backlog.len()
    }

    pub fn is_empty(&self) -> bool {
        let window = self.lock_window();
        window.is_empty() && self.backlog.is_empty()
    }

    /// True once the window holds at least `capacity` items.
    pub fn is_full(&self) -> bool {
        self.lock_window().len() >= self.capacity
    }

    /// Number of items currently in the active window.
    pub fn active_len(&self) -> usize {
        self.lock_window().len()
    }

    /// Drops every tracked item.
    pub fn clear(&self) {
        let mut window = self.lock_window();
        window.clear();
        self.backlog.clear();
    }
}
