//! Identity of a futex location.
//!
//! Keys identify *where*, not *what*: two addresses holding the same value
//! are different keys, and the same address revisited later is the same
//! key. Only private (address-space-local) futexes are modeled here; a
//! shared, file-backed key variant is a drop-in extension that would not
//! touch [`WaitQueue`](crate::queue::WaitQueue) or
//! [`FutexTable`](crate::table::FutexTable).

use crate::error::FutexError;

/// Identifies the address space a futex word lives in. Private futexes in
/// different address spaces never alias even at the same virtual address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressSpaceId(pub u64);

/// A validated, 4-byte-aligned user address of a futex word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FutexAddress(usize);

impl FutexAddress {
    /// Validates `addr` is non-null and 4-byte aligned. Does not check that
    /// it is mapped; that is left to [`UserMemory::load_u32`](crate::host::UserMemory::load_u32).
    pub fn validate(addr: usize) -> Result<Self, FutexError> {
        if addr == 0 || addr % 4 != 0 {
            return Err(FutexError::InvalidArgs);
        }
        Ok(Self(addr))
    }

    pub fn addr(self) -> usize {
        self.0
    }
}

/// The identity of one futex location: an address space plus an aligned
/// address within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    aspace: AddressSpaceId,
    addr: usize,
}

impl Key {
    pub fn new(aspace: AddressSpaceId, addr: FutexAddress) -> Self {
        Self { aspace, addr: addr.addr() }
    }

    /// A cheap multiplicative mix of the key's fields, used only to pick a
    /// bucket. Not a cryptographic or collision-resistant hash. Callers
    /// should use the high bits of the result, not the low ones: the low
    /// bits of `x * MUL` depend only on the low bits of `x`.
    pub(crate) fn bucket_mix(self) -> u64 {
        const MUL: u64 = 0x9E37_79B9_7F4A_7C15;
        (self.aspace.0 ^ (self.addr as u64 >> 2)).wrapping_mul(MUL)
    }
}
