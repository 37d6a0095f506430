#![no_std]
#![no_main]

pub mod board;
pub mod fs;
pub mod mm;
pub mod process;
pub mod processor;
pub mod signal;
pub mod time;
mod utils;
