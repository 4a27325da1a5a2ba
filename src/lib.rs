#[macro_use]
extern crate lazy_static;

pub mod addr;
pub mod allocator;
pub mod cli;
pub mod codec;
pub mod error;
pub mod log;
pub mod memory_map;
pub mod ptrace_session;
pub mod registers;
pub mod session;
pub mod string_reader;
pub mod symbol;
pub mod trace_scope;
pub mod trampoline;

pub use error::{Error, Result};
pub use session::read_remote_env;
