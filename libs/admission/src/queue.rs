//! Reprioritizable priority queue.
//!
//! [`DecayQueue`] orders items by a caller-supplied comparator and supports
//! a bulk `reprioritize` pass that rewrites every item and rebuilds the
//! ordering in one step. The scheduler runs that pass each time its window
//! refills, so rank aging is paid once per refill rather than on every
//! insert.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Comparator deciding which of two items leaves the queue first.
pub type CompareFn<E> = Arc<dyn Fn(&E, &E) -> Ordering + Send + Sync>;

/// A thread-safe min-queue over a caller-supplied ordering.
///
/// Internally a binary heap laid out in a `Vec`, guarded by a single
/// mutex. Every operation, including the predicate scans, runs while
/// holding the lock, so a concurrent caller can never observe a
/// half-rebuilt heap or race a scan against a mutation.
pub struct DecayQueue<E> {
    inner: Mutex<Heap<E>>,
}

struct Heap<E> {
    items: Vec<E>,
    cmp: CompareFn<E>,
}

impl<E> Heap<E> {
    fn push(&mut self, item: E) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    fn pop(&mut self) -> Option<E> {
        if self.items.is_empty() {
            return None;
        }
        let min = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    /// Removes the item at `idx`. The hole is filled with the last item,
    /// which may need to move in either direction to restore heap order.
    fn remove_at(&mut self, idx: usize) -> E {
        let removed = self.items.swap_remove(idx);
        if idx < self.items.len() {
            self.sift_up(idx);
            self.sift_down(idx);
        }
        removed
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if (self.cmp)(&self.items[idx], &self.items[parent]) == Ordering::Less {
                self.items.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut smallest = idx;
            if (self.cmp)(&self.items[left], &self.items[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && (self.cmp)(&self.items[right], &self.items[smallest]) == Ordering::Less
            {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.items.swap(idx, smallest);
            idx = smallest;
        }
    }

    /// Floyd heap construction over whatever is currently in `items`.
    fn rebuild(&mut self) {
        for idx in (0..self.items.len() / 2).rev() {
            self.sift_down(idx);
        }
    }
}

impl<E> DecayQueue<E> {
    /// Creates an empty queue ordered by `cmp`.
    pub fn new(cmp: CompareFn<E>) -> Self {
        Self {
            inner: Mutex::new(Heap {
                items: Vec::new(),
                cmp,
            }),
        }
    }

    // A caller-supplied closure that panics must not wedge every later
    // caller of the queue.
    fn lock(&self) -> MutexGuard<'_, Heap<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts one item. Always succeeds.
    pub fn push(&self, item: E) {
        self.lock().push(item);
    }

    /// Inserts every item from `items`.
    pub fn extend(&self, items: impl IntoIterator<Item = E>) {
        let mut heap = self.lock();
        for item in items {
            heap.push(item);
        }
    }

    /// Removes and returns the minimum item, or `None` when empty.
    pub fn pop(&self) -> Option<E> {
        self.lock().pop()
    }

    /// Removes and returns the first item matching the predicate,
    /// scanning in heap layout order.
    pub fn remove_first(&self, matches: impl Fn(&E) -> bool) -> Option<E> {
        let mut heap = self.lock();
        let idx = heap.items.iter().position(|item| matches(item))?;
        Some(heap.remove_at(idx))
    }

    /// Returns true if any item matches the predicate. The whole scan runs
    /// under the queue's lock.
    pub fn contains(&self, matches: impl Fn(&E) -> bool) -> bool {
        self.lock().items.iter().any(|item| matches(item))
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn clear(&self) {
        self.lock().items.clear();
    }

    /// Rewrites every item with `f` and rebuilds the ordering.
    ///
    /// This is the aging mechanism: a decay function that lowers ranks
    /// lets items that were never promoted sort toward the front over
    /// repeated passes. Cost is a full drain, map, and heapify.
    pub fn reprioritize(&self, f: impl Fn(E) -> E) {
        let mut heap = self.lock();
        let drained = std::mem::take(&mut heap.items);
        heap.items = drained.into_iter().map(f).collect();
        heap.rebuild();
    }
}
