pub mod ctx;
pub mod env;
pub mod hart;

pub use self::hart::{current_task, local_env_mut, local_hart, HARTS};
