//! Errors and outcomes returned by the three public operations.
//!
//! Kept deliberately small: the kernel-facing error taxonomy a syscall layer
//! needs (see `man 2 futex`) is `EINVAL`/`EAGAIN`/`ETIMEDOUT`, and that is
//! all [`FutexTable`](crate::table::FutexTable) ever produces.

use core::fmt;

/// Why a futex operation was rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutexError {
    /// Null, misaligned, unmapped or faulting address; degenerate
    /// `requeue(addr, ..., addr)`; malformed counts.
    InvalidArgs,
    /// The value check in `wait`/`requeue` observed a mismatch.
    Busy,
}

impl fmt::Display for FutexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FutexError::InvalidArgs => f.write_str("invalid futex address or arguments"),
            FutexError::Busy => f.write_str("futex value did not match the expected value"),
        }
    }
}

impl FutexError {
    /// The Linux errno this condition corresponds to, for callers bridging
    /// to a POSIX-shaped syscall ABI.
    pub const fn errno(self) -> i32 {
        match self {
            FutexError::InvalidArgs => 22, // EINVAL
            FutexError::Busy => 11,        // EAGAIN
        }
    }
}

/// Outcome of a successful [`FutexTable::wait`](crate::table::FutexTable::wait).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Woken by a matching `wake` or `requeue`.
    Woken,
    /// The deadline passed with no matching wake.
    TimedOut,
}

impl WaitOutcome {
    pub const fn is_woken(self) -> bool {
        matches!(self, WaitOutcome::Woken)
    }
}
