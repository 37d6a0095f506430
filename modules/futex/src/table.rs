//! The futex table: bucketed wait queues plus the `wait`/`wake`/`requeue`
//! operations that manipulate them.

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use spin::Mutex;

use crate::error::FutexError;
use crate::host::{Host, Timeout};
use crate::key::{AddressSpaceId, FutexAddress, Key};
use crate::queue::WaitQueue;
use crate::waiter::{WaiterId, WaiterShared, WokenBy};

/// Number of lock-sharded buckets in the table. A fixed power of two lets
/// [`Key::bucket_mix`] pick a bucket with a shift instead of a division, and
/// is large enough that unrelated keys rarely contend on the same bucket
/// lock even under many concurrently blocked threads.
const NUM_BUCKETS: usize = 64;
/// `log2(NUM_BUCKETS)`. Kept in sync with `NUM_BUCKETS` by hand, there being
/// no `ilog2` in a const context on every supported toolchain yet.
const NUM_BUCKETS_BITS: u32 = 6;

type Bucket<P> = Mutex<HashMap<Key, WaitQueue<P>>>;

/// A collection of per-key FIFO wait queues, addressed by [`Key`] and
/// sharded across [`NUM_BUCKETS`] independent locks.
///
/// Every operation takes the [`Host`] it should use for memory access,
/// timekeeping and scheduling as an explicit argument; the table itself
/// holds no reference to one, which is what lets the same table type be
/// exercised against both a booted kernel and a plain `std::thread` test
/// harness.
pub struct FutexTable<H: Host> {
    buckets: [Bucket<H::ParkToken>; NUM_BUCKETS],
}

impl<H: Host> Default for FutexTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> FutexTable<H> {
    pub fn new() -> Self {
        Self { buckets: core::array::from_fn(|_| Mutex::new(HashMap::new())) }
    }

    fn bucket_index(key: Key) -> usize {
        // Fibonacci hashing: the high bits of a multiplicative hash mix in
        // every input bit, the low bits do not. Shifting down keeps the
        // well-mixed half instead of masking in the unmixed one.
        (key.bucket_mix() >> (u64::BITS - NUM_BUCKETS_BITS)) as usize
    }

    fn bucket(&self, key: Key) -> &Bucket<H::ParkToken> {
        &self.buckets[Self::bucket_index(key)]
    }

    /// Blocks the current thread on `addr` as long as the word there still
    /// equals `expected`, until woken by a matching [`wake`](Self::wake) or
    /// [`requeue`](Self::requeue), or until `timeout` elapses.
    ///
    /// The value check and the enqueue happen under the same bucket lock,
    /// so a `wake` cannot slip in between "value still matches" and "waiter
    /// is in the queue" and be missed.
    pub fn wait(
        &self,
        host: &H,
        aspace: AddressSpaceId,
        addr: usize,
        expected: u32,
        timeout: Timeout,
    ) -> Result<crate::error::WaitOutcome, FutexError> {
        use crate::error::WaitOutcome;

        let addr = FutexAddress::validate(addr)?;
        host.validate_addr(addr.addr(), 4).map_err(|_| FutexError::InvalidArgs)?;
        let key = Key::new(aspace, addr);
        let deadline = timeout.deadline_ns(host);
        let token = host.current_park_token();

        let shared = {
            let mut map = self.bucket(key).lock();
            let current = host.load_u32(addr.addr()).map_err(|_| FutexError::InvalidArgs)?;
            if current != expected {
                log::trace!("[futex::wait] {:?} busy: expected {} found {}", key, expected, current);
                return Err(FutexError::Busy);
            }
            let placeholder = WaiterId { index: 0, generation: 0 };
            let shared = Arc::new(WaiterShared::new(key, placeholder, token));
            let queue = map.entry(key).or_default();
            let id = queue.push_back(shared.clone());
            shared.set_location(key, id);
            log::trace!("[futex::wait] {:?} enqueued, queue len {}", key, queue.len());
            shared
        };

        loop {
            let park_result = host.park(token, deadline);

            let loc = shared.location();
            let mut map = self.bucket(loc.key).lock();

            if shared.woken_by() == WokenBy::Wake {
                return Ok(WaitOutcome::Woken);
            }

            let removed = match map.get_mut(&loc.key) {
                Some(queue) => {
                    let removed = queue.remove(loc.id).is_some();
                    if removed && queue.is_empty() {
                        map.remove(&loc.key);
                    }
                    removed
                }
                None => false,
            };

            if !removed {
                // Someone relocated or is in the process of waking us
                // between our unlocked read of `woken_by` and taking this
                // lock. Drop it and re-read the (now current) location.
                drop(map);
                continue;
            }

            match park_result {
                crate::host::ParkResult::TimedOut => {
                    drop(map);
                    shared.try_set_woken_by(WokenBy::Timeout);
                    log::trace!("[futex::wait] {:?} timed out", loc.key);
                    return Ok(WaitOutcome::TimedOut);
                }
                crate::host::ParkResult::Unparked => {
                    // We own the removal, but no wake claimed us and the
                    // deadline hasn't passed: a spurious wakeup. Re-enqueue
                    // at the same key and keep waiting for it.
                    let queue = map.entry(loc.key).or_default();
                    let new_id = queue.push_back(shared.clone());
                    shared.set_location(loc.key, new_id);
                    drop(map);
                    continue;
                }
            }
        }
    }

    /// Wakes up to `count` waiters blocked on `addr`, FIFO. Returns the
    /// number actually woken.
    pub fn wake(
        &self,
        host: &H,
        aspace: AddressSpaceId,
        addr: usize,
        count: usize,
    ) -> Result<usize, FutexError> {
        let addr = FutexAddress::validate(addr)?;
        let key = Key::new(aspace, addr);

        let woken = {
            let mut map = self.bucket(key).lock();
            let woken = match map.get_mut(&key) {
                Some(queue) => {
                    let woken = queue.drain_upto(count);
                    if queue.is_empty() {
                        map.remove(&key);
                    }
                    woken
                }
                None => Vec::new(),
            };
            woken
        };

        for shared in &woken {
            let won = shared.try_set_woken_by(WokenBy::Wake);
            debug_assert!(won, "waiter removed from its queue under our own lock must still be Unset");
        }
        let count = woken.len();
        log::trace!("[futex::wake] {:?} woke {} waiter(s)", key, count);
        for shared in woken {
            host.unpark(shared.park_token());
        }
        Ok(count)
    }

    /// Wakes up to `wake_count` waiters blocked on `addr_from` (if its word
    /// still equals `expected`), then moves up to `requeue_count` of the
    /// remaining waiters there onto `addr_to`'s queue without waking them.
    /// Returns the number woken.
    ///
    /// `addr_from` and `addr_to` must name different keys; requeuing a key
    /// onto itself is rejected as a degenerate request.
    pub fn requeue(
        &self,
        host: &H,
        aspace: AddressSpaceId,
        addr_from: usize,
        wake_count: usize,
        expected: u32,
        addr_to: usize,
        requeue_count: usize,
    ) -> Result<usize, FutexError> {
        let addr_from = FutexAddress::validate(addr_from)?;
        let addr_to = FutexAddress::validate(addr_to)?;
        let key_from = Key::new(aspace, addr_from);
        let key_to = Key::new(aspace, addr_to);
        if key_from == key_to {
            log::warn!("[futex::requeue] rejected degenerate requeue onto {:?}", key_from);
            return Err(FutexError::InvalidArgs);
        }

        let idx_from = Self::bucket_index(key_from);
        let idx_to = Self::bucket_index(key_to);

        if idx_from == idx_to {
            let mut map = self.buckets[idx_from].lock();
            let current = host.load_u32(addr_from.addr()).map_err(|_| FutexError::InvalidArgs)?;
            if current != expected {
                return Err(FutexError::Busy);
            }
            let Some(mut queue_from) = map.remove(&key_from) else {
                return Ok(0);
            };

            let woken = queue_from.drain_upto(wake_count);
            for shared in &woken {
                shared.try_set_woken_by(WokenBy::Wake);
            }

            if requeue_count > 0 && !queue_from.is_empty() {
                let queue_to = map.entry(key_to).or_default();
                let moved = queue_from.splice_upto(requeue_count, queue_to);
                for (shared, new_id) in moved {
                    shared.set_location(key_to, new_id);
                }
            }
            if !queue_from.is_empty() {
                map.insert(key_from, queue_from);
            }
            drop(map);

            let count = woken.len();
            for shared in woken {
                host.unpark(shared.park_token());
            }
            return Ok(count);
        }

        let (lo, hi) = if idx_from < idx_to { (idx_from, idx_to) } else { (idx_to, idx_from) };
        let mut lo_guard = self.buckets[lo].lock();
        let mut hi_guard = self.buckets[hi].lock();
        let (map_from, map_to) = if idx_from < idx_to {
            (&mut *lo_guard, &mut *hi_guard)
        } else {
            (&mut *hi_guard, &mut *lo_guard)
        };

        let current = host.load_u32(addr_from.addr()).map_err(|_| FutexError::InvalidArgs)?;
        if current != expected {
            return Err(FutexError::Busy);
        }

        let Some(queue_from) = map_from.get_mut(&key_from) else {
            return Ok(0);
        };

        let woken = queue_from.drain_upto(wake_count);
        for shared in &woken {
            shared.try_set_woken_by(WokenBy::Wake);
        }

        if requeue_count > 0 && !queue_from.is_empty() {
            let queue_to = map_to.entry(key_to).or_default();
            let moved = queue_from.splice_upto(requeue_count, queue_to);
            for (shared, new_id) in moved {
                shared.set_location(key_to, new_id);
            }
        }
        if queue_from.is_empty() {
            map_from.remove(&key_from);
        }

        drop(lo_guard);
        drop(hi_guard);

        let count = woken.len();
        for shared in woken {
            host.unpark(shared.park_token());
        }
        Ok(count)
    }
}
