//! Bounded-window reordering
//!
//! [`ReorderBuffer`] approximates a full chronological sort of a packet stream
//! while holding at most `capacity` records.
//!
//! ## Displacement bound
//!
//! A record can only be emitted after `capacity - 1` later arrivals have been
//! compared against it, so a packet is moved at most `capacity - 1` positions
//! from its arrival position. If the input contains a packet whose sorted
//! position is further away than that, the output is only approximately
//! ordered. This is not detected: the capacity is a tuning parameter and must
//! cover the actual disorder of the input. With a capacity of `k + 1`, an input
//! where no packet is displaced by more than `k` positions comes out fully
//! sorted.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::record::PacketRecord;

/// Sorted window of records, newest at the front, oldest at the back
#[derive(Debug)]
pub struct ReorderBuffer {
    window: VecDeque<PacketRecord>,
    capacity: NonZeroUsize,
}

impl ReorderBuffer {
    pub fn new(capacity: NonZeroUsize) -> Self {
        ReorderBuffer {
            window: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Insert a record, returning the oldest record if the window is full.
    ///
    /// The insertion point is found by a linear scan from the newest end: the
    /// record goes right before the first record whose timestamp is not greater
    /// than its own, so records with equal timestamps keep their arrival order.
    pub fn insert(&mut self, record: PacketRecord) -> Option<PacketRecord> {
        let ts = record.timestamp();
        let pos = self
            .window
            .iter()
            .position(|r| r.timestamp() <= ts)
            .unwrap_or(self.window.len());
        self.window.insert(pos, record);
        if self.window.len() >= self.capacity.get() {
            self.window.pop_back()
        } else {
            None
        }
    }

    /// Remove all remaining records, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = PacketRecord> + '_ {
        self.window.drain(..).rev()
    }
}
