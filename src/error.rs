//! Tagged error surface for the whole session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ptrace(ATTACH, {pid}) denied: Operation not permitted{advisory}")]
    PermissionDenied { pid: i32, advisory: String },

    #[error("could not locate libc in the target's memory map")]
    LibraryNotFound,

    #[error("relative displacement {0:#x} does not fit in a 32-bit signed field")]
    RangeOverflow(i64),

    #[error("ptrace request failed: {0}")]
    KernelRefused(#[from] nix::Error),

    #[error("unexpected stop waiting for {expected}: got {actual}")]
    UnexpectedStop { expected: &'static str, actual: String },

    #[error("mmap in target failed")]
    MapFailed,

    #[error("pivot to scratch address failed: rip is {actual:#x}, expected {expected:#x}")]
    PivotFailed { expected: u64, actual: u64 },

    #[error("{0}")]
    BadArgs(String),
}

pub type Result<T> = std::result::Result<T, Error>;
