pub mod aux;
pub mod info;
use alloc::{sync::Arc, vec::Vec};
use core::panic;

use memory::VirtAddr;
use systype::SysResult;
use vfs_core::File;

use crate::{mm::memory_space::vm_area::MapPerm, processor::env::SumGuard};
