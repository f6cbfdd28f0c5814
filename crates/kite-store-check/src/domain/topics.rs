//! Topic authorization snapshot.
//!
//! Holds the set of topics the broker currently accepts. The set is replaced
//! whole by the topic feed and queried by every inbound message.
//!
//! ## Invariants
//!
//! - The stored sequence is always sorted and deduplicated, so `query` is a
//!   binary search.
//! - `refresh` swaps the whole sequence under the write lock. Readers see the
//!   previous set or the new one, never a mix.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Read-mostly set of accepted topic names.
#[derive(Debug, Default)]
pub struct TopicAuthorization {
    topics: RwLock<Vec<String>>,
    generation: AtomicU64,
}

impl TopicAuthorization {
    /// Creates a snapshot from an initial topic list, in any order.
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: RwLock::new(normalize(topics)),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns true iff `topic` is in the current snapshot.
    pub fn query(&self, topic: &str) -> bool {
        self.topics
            .read()
            .binary_search_by(|t| t.as_str().cmp(topic))
            .is_ok()
    }

    /// Replaces the entire topic set.
    ///
    /// Sorting happens before the lock is taken so readers only contend with
    /// the pointer swap.
    pub fn refresh<I, S>(&self, topics: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted = normalize(topics);
        let previous = std::mem::replace(&mut *self.topics.write(), sorted);
        self.generation.fetch_add(1, Ordering::Release);
        drop(previous);
    }

    /// Number of topics in the current snapshot.
    pub fn len(&self) -> usize {
        self.topics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }

    /// Owned copy of the current snapshot, sorted.
    pub fn topics(&self) -> Vec<String> {
        self.topics.read().clone()
    }

    /// Number of refreshes applied since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

fn normalize<I, S>(topics: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut sorted: Vec<String> = topics.into_iter().map(Into::into).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}
