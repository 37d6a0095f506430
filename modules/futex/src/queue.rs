//! FIFO wait queue with O(1) arbitrary-node removal.
//!
//! Backed by a small slab instead of raw intrusive pointers: each live
//! waiter occupies one slot, slots link into a doubly linked list via
//! indices, and freed slots are recycled through a free list. A
//! [`WaiterId`] pairs a slot index with the generation it was allocated
//! under, so a stale id (one referring to a slot that has since been freed
//! and handed to a different waiter) is detected rather than silently
//! unlinking the wrong node.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::waiter::{WaiterId, WaiterShared};

struct Node<P> {
    shared: Arc<WaiterShared<P>>,
    generation: u32,
    prev: Option<u32>,
    next: Option<u32>,
}

/// An ordered (FIFO) sequence of waiters sharing one key.
///
/// A pure data structure: it knows nothing about which key it belongs to,
/// or which bucket lock protects it. That association lives in
/// [`FutexTable`](crate::table::FutexTable)'s bucket maps.
pub(crate) struct WaitQueue<P> {
    slots: Vec<Option<Node<P>>>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl<P> Default for WaitQueue<P> {
    fn default() -> Self {
        Self { slots: Vec::new(), free: Vec::new(), head: None, tail: None, len: 0 }
    }
}

impl<P> WaitQueue<P> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn alloc_slot(&mut self, shared: Arc<WaiterShared<P>>) -> (u32, u32) {
        if let Some(index) = self.free.pop() {
            let slot = self.slots[index as usize].as_mut().unwrap();
            // Slot was vacated, not removed from `slots`; bump the
            // generation so any WaiterId still referencing the old
            // occupant is rejected by `remove`.
            slot.generation = slot.generation.wrapping_add(1);
            slot.shared = shared;
            slot.prev = None;
            slot.next = None;
            (index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(Node { shared, generation: 0, prev: None, next: None }));
            (index, 0)
        }
    }

    /// Appends `shared` to the back of the queue. Returns the id the caller
    /// must remember to later `remove` this exact waiter.
    pub fn push_back(&mut self, shared: Arc<WaiterShared<P>>) -> WaiterId {
        let (index, generation) = self.alloc_slot(shared);
        match self.tail {
            None => {
                self.head = Some(index);
                self.tail = Some(index);
            }
            Some(tail) => {
                self.slots[tail as usize].as_mut().unwrap().next = Some(index);
                self.slots[index as usize].as_mut().unwrap().prev = Some(tail);
                self.tail = Some(index);
            }
        }
        self.len += 1;
        WaiterId { index, generation }
    }

    /// Unlinks the node at `index`, fixing up neighbours' links and the
    /// head/tail pointers. Does not validate the generation or touch
    /// `self.free`/`self.len` (callers do that).
    fn unlink(&mut self, index: u32) -> Node<P> {
        let (prev, next) = {
            let node = self.slots[index as usize].as_ref().unwrap();
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.slots[p as usize].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n as usize].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
        self.slots[index as usize].take().unwrap()
    }

    /// Removes the waiter at `id` from anywhere in the queue. Returns
    /// `None` if `id` is stale (already removed, or belongs to a slot that
    /// has since been recycled for a different waiter): a safe no-op, not
    /// an error, since that is exactly what a racing requeue/wake looks
    /// like from here.
    pub fn remove(&mut self, id: WaiterId) -> Option<Arc<WaiterShared<P>>> {
        let occupied = self.slots.get(id.index as usize)?.as_ref()?;
        if occupied.generation != id.generation {
            return None;
        }
        let node = self.unlink(id.index);
        self.free.push(id.index);
        self.len -= 1;
        Some(node.shared)
    }

    /// Removes and returns the front waiter, if any.
    pub fn pop_front(&mut self) -> Option<(WaiterId, Arc<WaiterShared<P>>)> {
        let index = self.head?;
        let generation = self.slots[index as usize].as_ref().unwrap().generation;
        let node = self.unlink(index);
        self.free.push(index);
        self.len -= 1;
        Some((WaiterId { index, generation }, node.shared))
    }

    /// Pops up to `n` waiters from the front.
    pub fn drain_upto(&mut self, n: usize) -> Vec<Arc<WaiterShared<P>>> {
        let mut out = Vec::with_capacity(n.min(self.len));
        for _ in 0..n {
            match self.pop_front() {
                Some((_, shared)) => out.push(shared),
                None => break,
            }
        }
        out
    }

    /// Moves up to `n` waiters from the front of `self` onto the back of
    /// `dest`, preserving relative order. Returns the new `(old key's)
    /// shared handle, new id in dest` pairs so the caller can update each
    /// moved waiter's recorded location.
    pub fn splice_upto(&mut self, n: usize, dest: &mut WaitQueue<P>) -> Vec<(Arc<WaiterShared<P>>, WaiterId)> {
        let mut moved = Vec::with_capacity(n.min(self.len));
        for _ in 0..n {
            let Some((_, shared)) = self.pop_front() else { break };
            let new_id = dest.push_back(shared.clone());
            moved.push((shared, new_id));
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::sync::Arc;

    use super::*;
    use crate::key::{AddressSpaceId, FutexAddress, Key};
    use crate::waiter::WaiterId;

    fn key(addr: usize) -> Key {
        Key::new(AddressSpaceId(0), FutexAddress::validate(addr).unwrap())
    }

    fn shared(tag: u32) -> Arc<WaiterShared<u32>> {
        Arc::new(WaiterShared::new(key(4), WaiterId { index: 0, generation: 0 }, tag))
    }

    #[test]
    fn fifo_order_preserved() {
        let mut q = WaitQueue::default();
        q.push_back(shared(1));
        q.push_back(shared(2));
        q.push_back(shared(3));
        let order: std::vec::Vec<u32> =
            core::iter::from_fn(|| q.pop_front().map(|(_, s)| s.park_token())).collect();
        assert_eq!(order, std::vec![1, 2, 3]);
    }

    #[test]
    fn remove_middle_keeps_tail_consistent() {
        let mut q = WaitQueue::default();
        let id1 = q.push_back(shared(1));
        let _id2 = q.push_back(shared(2));
        let id3 = q.push_back(shared(3));

        // Remove the tail directly: tail must move back to id2's slot.
        let removed = q.remove(id3).unwrap();
        assert_eq!(removed.park_token(), 3);
        assert_eq!(q.len(), 2);

        // Now remove the (new) head: head must move to id2's slot, and a
        // subsequent push_back must land after it, not corrupt the list.
        let removed = q.remove(id1).unwrap();
        assert_eq!(removed.park_token(), 1);

        q.push_back(shared(4));
        let order: std::vec::Vec<u32> =
            core::iter::from_fn(|| q.pop_front().map(|(_, s)| s.park_token())).collect();
        assert_eq!(order, std::vec![2, 4]);
    }

    #[test]
    fn stale_id_after_recycle_is_noop() {
        let mut q = WaitQueue::default();
        let id1 = q.push_back(shared(1));
        let _ = q.remove(id1).unwrap();
        // Slot 0 is now free; allocate a new waiter into it.
        let _id2 = q.push_back(shared(2));
        // The old id (same index, stale generation) must not remove the
        // new occupant.
        assert!(q.remove(id1).is_none());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn splice_moves_prefix_in_order() {
        let mut src = WaitQueue::default();
        src.push_back(shared(1));
        src.push_back(shared(2));
        src.push_back(shared(3));
        let mut dest = WaitQueue::default();

        let moved = src.splice_upto(2, &mut dest);
        assert_eq!(moved.len(), 2);
        assert_eq!(src.len(), 1);
        assert_eq!(dest.len(), 2);

        let order: std::vec::Vec<u32> =
            core::iter::from_fn(|| dest.pop_front().map(|(_, s)| s.park_token())).collect();
        assert_eq!(order, std::vec![1, 2]);
    }

    #[test]
    fn empty_queue_pop_and_remove_are_none() {
        let mut q: WaitQueue<u32> = WaitQueue::default();
        assert!(q.pop_front().is_none());
        assert!(q.remove(WaiterId { index: 0, generation: 0 }).is_none());
        assert!(q.is_empty());
    }
}
