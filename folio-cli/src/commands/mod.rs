//! CLI command implementations.

pub mod compile;
pub mod repl;

pub use compile::compile_file;
pub use repl::run_repl;
