//! Collaborator interfaces consumed from the embedding kernel.
//!
//! [`FutexTable`](crate::table::FutexTable) never touches a scheduler, a
//! clock, or user memory directly. Everything it needs from the rest of the
//! kernel comes in through these three traits, supplied by the caller at
//! every entry point. This keeps the table testable with a handful of
//! `std::thread`-backed stand-ins instead of a booted kernel.

use core::time::Duration;

/// A 32-bit load from a user address, or why it couldn't be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault;

/// Safe access to the 32-bit futex word living in the caller's address space.
///
/// Implementations own whatever page-fault handling, copy-from-user, or
/// permission checks their address space model requires.
pub trait UserMemory {
    /// Reads the current value of the 32-bit word at `addr`.
    fn load_u32(&self, addr: usize) -> Result<u32, Fault>;

    /// Checks that `addr` is non-null and aligned to `align` bytes without
    /// reading it.
    fn validate_addr(&self, addr: usize, align: usize) -> Result<(), Fault>;
}

/// A monotonic time source, used only to turn relative timeouts into
/// absolute deadlines.
pub trait Clock {
    /// Nanoseconds since an arbitrary, fixed epoch. Must never go backwards.
    fn now_ns(&self) -> u64;
}

/// The result of parking a thread until it is unparked or a deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkResult {
    /// `unpark` was called for this token (or the scheduler otherwise
    /// decided to resume the thread early, including spuriously).
    Unparked,
    /// The deadline passed before any unpark arrived.
    TimedOut,
}

/// Blocking and resuming a specific thread.
///
/// `wait` is the only [`FutexTable`](crate::table::FutexTable) operation that
/// may suspend the caller, and only through this trait.
pub trait Scheduler {
    /// A handle identifying one blockable thread. Cheap to copy and share;
    /// `wake`/`requeue` hand it to `unpark` without the waiting thread's
    /// involvement.
    type ParkToken: Copy + Send + Sync;

    /// The token for the thread calling this method.
    fn current_park_token(&self) -> Self::ParkToken;

    /// Blocks the current thread until `unpark(token)` is called or
    /// `deadline_ns` (monotonic, per [`Clock::now_ns`]) passes. `None` means
    /// block forever. May return spuriously with `Unparked` even absent a
    /// matching `unpark` call; callers must re-check their own condition.
    fn park(&self, token: Self::ParkToken, deadline_ns: Option<u64>) -> ParkResult;

    /// Resumes the thread identified by `token`. Never blocks.
    fn unpark(&self, token: Self::ParkToken);
}

/// A bundle of the three collaborator traits, implemented once by the
/// embedding kernel (or by a test harness) and threaded through every
/// [`FutexTable`](crate::table::FutexTable) call.
pub trait Host: Scheduler + Clock + UserMemory {}
impl<T: Scheduler + Clock + UserMemory> Host for T {}

/// How long [`FutexTable::wait`](crate::table::FutexTable::wait) should
/// block before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Block until a matching wake arrives.
    Infinite,
    /// Block for at most this long. `Duration::ZERO` polls without blocking.
    Relative(Duration),
}

impl Timeout {
    /// Turns a relative timeout into an absolute deadline using `clock`.
    /// `Infinite` has no deadline.
    pub(crate) fn deadline_ns(self, clock: &impl Clock) -> Option<u64> {
        match self {
            Timeout::Infinite => None,
            Timeout::Relative(d) => {
                Some(clock.now_ns().saturating_add(d.as_nanos().min(u64::MAX as u128) as u64))
            }
        }
    }
}
