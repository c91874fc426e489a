//! Command executor infrastructure module

mod shell;

pub use shell::{validate_command, ShellExecutor};
