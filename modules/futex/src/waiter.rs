//! Per-blocked-thread records and their shared wakeup state.

use core::sync::atomic::{AtomicU8, Ordering};

use spin::Mutex;

use crate::key::Key;

/// Why a waiter left its queue. Transitions out of `Unset` exactly once,
/// under the bucket lock that governs whatever queue the waiter is in at
/// the time: that single transition is the linearization point of the
/// wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum WokenBy {
    Unset = 0,
    Wake = 1,
    Timeout = 2,
}

impl WokenBy {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => WokenBy::Unset,
            1 => WokenBy::Wake,
            _ => WokenBy::Timeout,
        }
    }
}

/// Identifies a node within one [`WaitQueue`](crate::queue::WaitQueue)'s
/// slab. Carries a generation counter so a removal racing a slot reuse
/// (freed by one waiter, handed to the next `push_back`) is detected as
/// stale instead of silently unlinking the wrong waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WaiterId {
    pub index: u32,
    pub generation: u32,
}

/// Where a waiter currently lives: which key's queue, and which slot of
/// that queue's slab. Requeue updates both fields together, under the
/// locks of both buckets it holds, so a reader never observes a key from
/// one move paired with an id from another.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Location {
    pub key: Key,
    pub id: WaiterId,
}

/// The state shared between a blocked thread's stack frame and whichever
/// [`WaitQueue`](crate::queue::WaitQueue) currently holds it.
///
/// A plain `Waiter` living only on the stack cannot be reached by the
/// thread that wakes it, so the fields a remover must touch (`woken_by`
/// and the current `(key, id)`) live here instead, behind a reference
/// count shared between the stack and the queue. Every field is only ever
/// mutated while the relevant bucket lock is held; `location` additionally
/// has its own leaf lock so the pair updates atomically without requiring
/// the reader to already hold a bucket lock to see a consistent snapshot.
pub(crate) struct WaiterShared<P> {
    woken_by: AtomicU8,
    location: Mutex<Location>,
    park_token: P,
}

impl<P: Copy> WaiterShared<P> {
    pub fn new(key: Key, id: WaiterId, park_token: P) -> Self {
        Self {
            woken_by: AtomicU8::new(WokenBy::Unset as u8),
            location: Mutex::new(Location { key, id }),
            park_token,
        }
    }

    pub fn park_token(&self) -> P {
        self.park_token
    }

    pub fn location(&self) -> Location {
        *self.location.lock()
    }

    pub fn set_location(&self, key: Key, id: WaiterId) {
        *self.location.lock() = Location { key, id };
    }

    pub(crate) fn woken_by(&self) -> WokenBy {
        WokenBy::from_u8(self.woken_by.load(Ordering::Relaxed))
    }

    /// Sets `woken_by` if it is still `Unset`. Returns whether this call won
    /// the race. Always called with the bucket lock for the waiter's
    /// current key held, which is what makes the plain `Relaxed` ordering
    /// here sufficient: the mutex's own acquire/release already orders this
    /// write against any later read taken under the same lock.
    pub(crate) fn try_set_woken_by(&self, reason: WokenBy) -> bool {
        self.woken_by
            .compare_exchange(
                WokenBy::Unset as u8,
                reason as u8,
                Ordering::Relaxed,
                Ordering::Relaxed,
            )
            .is_ok()
    }
}
