/// process
pub const CLONE_STACK_SIZE: usize = 1024;

/// Syscall string arg's max length
pub const SYSCALL_STR_ARG_MAX_LEN: usize = 4096;

/// Init proc's pid
pub const INIT_PROC_PID: usize = 1;
