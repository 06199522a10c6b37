//! Request generations used to discard stale responses.
//!
//! Every new request for a slot takes a fresh ticket. A response is applied
//! only if it carries the slot's current ticket; anything older is dropped.

use std::collections::HashMap;
use std::hash::Hash;

/// Generation number attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct SelectionTracker<K> {
    next: u64,
    current: HashMap<K, Ticket>,
}

impl<K: Eq + Hash + Copy> SelectionTracker<K> {
    pub fn new() -> Self {
        Self {
            next: 0,
            current: HashMap::new(),
        }
    }

    /// Issue one new ticket and make it current for every key in `keys`.
    pub fn begin(&mut self, keys: impl IntoIterator<Item = K>) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        for key in keys {
            self.current.insert(key, ticket);
        }
        ticket
    }

    pub fn is_current(&self, key: K, ticket: Ticket) -> bool {
        self.current.get(&key) == Some(&ticket)
    }
}

impl<K: Eq + Hash + Copy> Default for SelectionTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
