//! Address-keyed fast userspace mutex (futex) wait queues.
//!
//! This crate implements the kernel-side half of a futex subsystem: the
//! table of per-address wait queues and the `wait`/`wake`/`requeue`
//! operations used to block and resume threads on a 32-bit word in user
//! memory. It does not implement a userspace mutex itself, a syscall ABI,
//! or robust-list/PI futex variants: those are the embedding kernel's
//! concern, built on top of [`FutexTable`].
//!
//! The table never touches a scheduler, clock or user address space
//! directly; callers supply an implementation of [`Host`] (bundling
//! [`Scheduler`], [`Clock`] and [`UserMemory`]) at every call. See
//! `tests/` for a `std::thread`-backed implementation exercising the full
//! table against real concurrent waiters.
#![no_std]

extern crate alloc;

mod error;
mod host;
mod key;
mod queue;
mod table;
mod waiter;

pub use error::{FutexError, WaitOutcome};
pub use host::{Clock, Fault, Host, ParkResult, Scheduler, Timeout, UserMemory};
pub use key::{AddressSpaceId, FutexAddress, Key};
pub use table::FutexTable;
