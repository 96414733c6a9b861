use std::collections::VecDeque;

use serde::Serialize;

use crate::model::{BookingId, SlotKey};
use crate::tree::IndexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub slot: SlotKey,
    pub booking_id: BookingId,
    pub priority: u8,
}

/// Priority-ordered booking report. Entries stay sorted by non-decreasing
/// priority; equal priorities keep arrival order.
#[derive(Debug, Clone, Default)]
pub struct BookingQueue {
    entries: VecDeque<QueueEntry>,
}

impl BookingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert before the first entry whose priority exceeds `priority`.
    pub fn enqueue(&mut self, slot: SlotKey, booking_id: BookingId, priority: u8) {
        let pos = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(
            pos,
            QueueEntry {
                slot,
                booking_id,
                priority,
            },
        );
    }

    pub fn dequeue(&mut self) -> Result<QueueEntry, IndexError> {
        self.entries.pop_front().ok_or(IndexError::EmptyQueue)
    }

    pub fn peek(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeue_empty_fails() {
        let mut q = BookingQueue::new();
        assert_eq!(q.dequeue(), Err(IndexError::EmptyQueue));
    }

    #[test]
    fn equal_priority_keeps_arrival_order() {
        let mut q = BookingQueue::new();
        for (i, slot) in [2_403_013, 2_403_011, 2_403_012].into_iter().enumerate() {
            q.enqueue(SlotKey(slot), i as BookingId + 1, 3);
        }
        let order: Vec<u32> = std::iter::from_fn(|| q.dequeue().ok())
            .map(|e| e.slot.0)
            .collect();
        assert_eq!(order, vec![2_403_013, 2_403_011, 2_403_012]);
        assert!(q.is_empty());
    }

    #[test]
    fn lower_priority_jumps_ahead() {
        let mut q = BookingQueue::new();
        q.enqueue(SlotKey(10), 1, 3);
        q.enqueue(SlotKey(20), 2, 3);
        q.enqueue(SlotKey(30), 3, 1);
        q.enqueue(SlotKey(40), 4, 2);
        q.enqueue(SlotKey(50), 5, 5);

        let ids: Vec<BookingId> = q.iter().map(|e| e.booking_id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2, 5]);
        assert_eq!(q.peek().map(|e| e.priority), Some(1));
        assert_eq!(q.len(), 5);
    }
}
