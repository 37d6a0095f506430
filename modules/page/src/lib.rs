#![no_std]
#![no_main]

extern crate alloc;

mod buffer_cache;
mod page;
mod page_cache;

pub use buffer_cache::*;
pub use page::*;
pub use page_cache::*;
