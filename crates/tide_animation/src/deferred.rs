//! Deferred work for the end of the current turn
//!
//! Work that should happen "after the current callback returns" is queued in
//! a [`DeferredQueue`] and flushed by its owner once the turn is over. A
//! [`DeferredSlot`] coalesces repeated requests: scheduling through a slot
//! cancels whatever that slot scheduled before, so several triggers within
//! one turn produce a single execution.
//!
//! Nothing here is tied to a timer or frame callback, so tests flush the
//! queue explicitly.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a queued task
    pub struct TaskId;
}

struct Entry<T> {
    seq: u64,
    task: T,
}

/// FIFO queue of tasks waiting for the end of the turn
pub struct DeferredQueue<T> {
    tasks: SlotMap<TaskId, Entry<T>>,
    next_seq: u64,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.insert(Entry { seq, task })
    }

    /// Remove a task before it runs
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        self.tasks.remove(id).map(|entry| entry.task)
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Take every pending task in scheduling order
    pub fn drain(&mut self) -> Vec<T> {
        let mut entries: Vec<Entry<T>> = self.tasks.drain().map(|(_, entry)| entry).collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.task).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-slot handle into a [`DeferredQueue`]
///
/// At most one task per slot is pending at any time.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeferredSlot {
    pending: Option<TaskId>,
}

impl DeferredSlot {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule `task`, cancelling this slot's previous task if still queued
    pub fn schedule<T>(&mut self, queue: &mut DeferredQueue<T>, task: T) -> TaskId {
        if let Some(previous) = self.pending.take() {
            if queue.cancel(previous).is_some() {
                tracing::trace!("deferred task {:?} superseded", previous);
            }
        }
        let id = queue.schedule(task);
        self.pending = Some(id);
        id
    }

    /// Cancel this slot's pending task, if any
    pub fn cancel<T>(&mut self, queue: &mut DeferredQueue<T>) -> Option<T> {
        self.pending.take().and_then(|id| queue.cancel(id))
    }

    pub fn is_scheduled<T>(&self, queue: &DeferredQueue<T>) -> bool {
        self.pending.is_some_and(|id| queue.is_pending(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule("a");
        let b = queue.schedule("b");
        queue.schedule("c");
        queue.cancel(b);
        queue.schedule("d");

        assert_eq!(queue.drain(), vec!["a", "c", "d"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_slot_coalesces_within_turn() {
        let mut queue = DeferredQueue::new();
        let mut slot = DeferredSlot::new();

        slot.schedule(&mut queue, 1);
        slot.schedule(&mut queue, 2);
        slot.schedule(&mut queue, 3);
        assert_eq!(queue.len(), 1);
        assert!(slot.is_scheduled(&queue));

        assert_eq!(queue.drain(), vec![3]);
        assert!(!slot.is_scheduled(&queue));
    }

    #[test]
    fn test_slot_cancel() {
        let mut queue = DeferredQueue::new();
        let mut slot = DeferredSlot::new();
        let mut other = DeferredSlot::new();

        slot.schedule(&mut queue, "mine");
        other.schedule(&mut queue, "theirs");

        assert_eq!(slot.cancel(&mut queue), Some("mine"));
        assert_eq!(slot.cancel(&mut queue), None);
        assert_eq!(queue.drain(), vec!["theirs"]);
    }
}
