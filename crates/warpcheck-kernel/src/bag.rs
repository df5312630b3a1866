//! Ordered multiset of timestamps.
//!
//! Executed histories, pending cancellations and rollback sets all need
//! duplicates (the same timestamp can be scheduled twice for an LP) together
//! with ordered range operations ("everything above T", "drop everything
//! below GVT"). A `BTreeMap` from timestamp to occurrence count gives both.

use std::collections::BTreeMap;
use std::fmt::Display;

use warpcheck_types::Timestamp;

/// Multiset of timestamps, ordered by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampBag {
    counts: BTreeMap<Timestamp, usize>,
    len: usize,
}

impl TimestampBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `ts`.
    pub fn insert(&mut self, ts: Timestamp) {
        *self.counts.entry(ts).or_insert(0) += 1;
        self.len += 1;
    }

    /// Removes one occurrence of `ts`. Returns false if it was absent.
    pub fn remove_one(&mut self, ts: Timestamp) -> bool {
        let Some(count) = self.counts.get_mut(&ts) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&ts);
        }
        self.len -= 1;
        true
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.counts.contains_key(&ts)
    }

    /// Occurrences of `ts`.
    pub fn count(&self, ts: Timestamp) -> usize {
        self.counts.get(&ts).copied().unwrap_or(0)
    }

    pub fn max(&self) -> Option<Timestamp> {
        self.counts.last_key_value().map(|(ts, _)| *ts)
    }

    pub fn min(&self) -> Option<Timestamp> {
        self.counts.first_key_value().map(|(ts, _)| *ts)
    }

    /// Total number of occurrences.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every occurrence strictly below `floor`.
    pub fn retain_at_least(&mut self, floor: Timestamp) {
        let kept = self.counts.split_off(&floor);
        self.counts = kept;
        self.len = self.counts.values().sum();
    }

    /// Removes and returns every occurrence strictly above `ts`.
    pub fn split_above(&mut self, ts: Timestamp) -> TimestampBag {
        let mut above = self.counts.split_off(&ts);
        if let Some(count) = above.remove(&ts) {
            self.counts.insert(ts, count);
        }

        let moved: usize = above.values().sum();
        self.len -= moved;
        TimestampBag {
            counts: above,
            len: moved,
        }
    }

    /// Iterates occurrences in ascending order, repeating duplicates.
    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.counts
            .iter()
            .flat_map(|(ts, count)| std::iter::repeat_n(*ts, *count))
    }

    /// Returns true if no occurrence appears in both bags.
    pub fn is_disjoint(&self, other: &TimestampBag) -> bool {
        self.counts.keys().all(|ts| !other.contains(*ts))
    }
}

impl FromIterator<Timestamp> for TimestampBag {
    fn from_iter<I: IntoIterator<Item = Timestamp>>(iter: I) -> Self {
        let mut bag = Self::new();
        for ts in iter {
            bag.insert(ts);
        }
        bag
    }
}

impl Display for TimestampBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, ts) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{ts}")?;
        }
        write!(f, "]")
    }
}
