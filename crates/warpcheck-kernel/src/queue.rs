//! Dispatch predictor.
//!
//! The simulator is expected to always dispatch the largest pending
//! timestamp. [`PriorityQueue`] is a binary max-heap over an index-addressed
//! `Vec` that reproduces that choice independently of the simulator, so each
//! observed dispatch can be compared against the predicted one.
//!
//! The same queue drives the hardware testbench vector generator, so its
//! tie-breaking must stay exactly as written: sift-down prefers the left child
//! unless the right one is strictly larger.

use warpcheck_types::Timestamp;

/// Returned by [`PriorityQueue::pop_max`] when nothing is pending.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("deque from empty queue")]
pub struct EmptyQueue;

/// Binary max-heap of pending dispatch timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityQueue {
    /// Heap-ordered storage: `elements[i] >= elements[2i+1], elements[2i+2]`.
    elements: Vec<Timestamp>,
}

impl PriorityQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Adds a pending timestamp. O(log n).
    pub fn push(&mut self, value: Timestamp) {
        self.elements.push(value);
        self.sift_up(self.elements.len() - 1);

        debug_assert!(self.is_heap(), "heap order broken after push");
    }

    /// Removes and returns the largest pending timestamp. O(log n).
    pub fn pop_max(&mut self) -> Result<Timestamp, EmptyQueue> {
        let last = self.elements.len().checked_sub(1).ok_or(EmptyQueue)?;
        self.elements.swap(0, last);
        let max = self.elements.pop().ok_or(EmptyQueue)?;
        self.sift_down(0);

        debug_assert!(self.is_heap(), "heap order broken after pop");
        Ok(max)
    }

    /// Returns the largest pending timestamp without removing it.
    pub fn peek(&self) -> Option<Timestamp> {
        self.elements.first().copied()
    }

    /// Returns the number of pending timestamps.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.elements[index] <= self.elements[parent] {
                break;
            }
            self.elements.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.elements.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let child = if right < len && self.elements[right] > self.elements[left] {
                right
            } else {
                left
            };

            if self.elements[index] >= self.elements[child] {
                break;
            }
            self.elements.swap(index, child);
            index = child;
        }
    }

    fn is_heap(&self) -> bool {
        (1..self.elements.len()).all(|i| self.elements[(i - 1) / 2] >= self.elements[i])
    }
}

impl Extend<Timestamp> for PriorityQueue {
    fn extend<I: IntoIterator<Item = Timestamp>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl FromIterator<Timestamp> for PriorityQueue {
    fn from_iter<I: IntoIterator<Item = Timestamp>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(v: u64) -> Timestamp {
        Timestamp::new(v)
    }

    #[test]
    fn pops_in_descending_order() {
        let mut queue = PriorityQueue::new();
        queue.push(ts(5));
        queue.push(ts(3));
        queue.push(ts(8));

        assert_eq!(queue.pop_max(), Ok(ts(8)));
        assert_eq!(queue.pop_max(), Ok(ts(5)));
        assert_eq!(queue.pop_max(), Ok(ts(3)));
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_on_empty_fails() {
        let mut queue = PriorityQueue::new();
        assert_eq!(queue.pop_max(), Err(EmptyQueue));
        assert_eq!(queue.peek(), None);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut queue: PriorityQueue = [4, 4, 1].into_iter().map(ts).collect();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop_max(), Ok(ts(4)));
        assert_eq!(queue.pop_max(), Ok(ts(4)));
        assert_eq!(queue.pop_max(), Ok(ts(1)));
    }

    #[test]
    fn peek_tracks_maximum() {
        let mut queue = PriorityQueue::with_capacity(4);
        queue.push(ts(2));
        assert_eq!(queue.peek(), Some(ts(2)));
        queue.push(ts(9));
        assert_eq!(queue.peek(), Some(ts(9)));
        queue.push(ts(6));
        assert_eq!(queue.peek(), Some(ts(9)));
    }

    proptest! {
        #[test]
        fn pop_max_always_returns_current_maximum(
            values in prop::collection::vec(0u64..1_000, 0..64),
        ) {
            let mut queue = PriorityQueue::new();
            for (i, v) in values.iter().enumerate() {
                queue.push(ts(*v));
                prop_assert_eq!(queue.len(), i + 1);
            }

            let mut sorted = values.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));

            for (i, expected) in sorted.iter().enumerate() {
                prop_assert_eq!(queue.pop_max(), Ok(ts(*expected)));
                prop_assert_eq!(queue.len(), values.len() - i - 1);
            }
            prop_assert_eq!(queue.pop_max(), Err(EmptyQueue));
        }

        #[test]
        fn interleaved_operations_match_sorted_model(
            ops in prop::collection::vec(prop::option::of(0u64..50), 0..128),
        ) {
            let mut queue = PriorityQueue::new();
            let mut model: Vec<u64> = Vec::new();

            for op in ops {
                match op {
                    Some(v) => {
                        queue.push(ts(v));
                        model.push(v);
                    }
                    None => {
                        let expected = model.iter().copied().max();
                        if let Some(max) = expected {
                            let pos = model.iter().position(|x| *x == max).unwrap();
                            model.swap_remove(pos);
                        }
                        prop_assert_eq!(queue.pop_max().ok(), expected.map(ts));
                    }
                }
                prop_assert_eq!(queue.len(), model.len());
            }
        }
    }
}
