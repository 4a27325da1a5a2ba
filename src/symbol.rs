//! Symbol resolver. Bridges `SelfAddr` and `RemoteAddr` through the one
//! arithmetic operation permitted between them.

use crate::addr::{resolve_symbol, RemoteAddr, SelfAddr};
use crate::error::{Error, Result};
use crate::memory_map::{self, LIBC_NEEDLE};

/// The address of `getenv` as linked into this very process, and the
/// load base of the libc that provides it, also in this process.
pub struct LocalLookup {
    pub getenv: SelfAddr,
    pub libc_base: SelfAddr,
}

pub fn local_lookup() -> Result<LocalLookup> {
    let getenv = libc::getenv as *const () as usize;
    let maps = std::fs::read_to_string("/proc/self/maps").map_err(|_| Error::LibraryNotFound)?;
    let libc_base = memory_map::find_library_base(&maps, LIBC_NEEDLE).ok_or(Error::LibraryNotFound)?;
    Ok(LocalLookup {
        getenv: SelfAddr(getenv),
        libc_base: SelfAddr(libc_base.0),
    })
}

/// Resolves the target-space address of `getenv`, given this process's
/// view of it and the target's libc load base.
pub fn resolve_getenv_in_target(local: &LocalLookup, target_libc_base: RemoteAddr) -> RemoteAddr {
    resolve_symbol(local.getenv, local.libc_base, target_libc_base)
}

pub fn find_target_libc_base(pid: i32) -> Result<RemoteAddr> {
    memory_map::find_library_base_in(pid, LIBC_NEEDLE)
        .map_err(|_| Error::LibraryNotFound)?
        .ok_or(Error::LibraryNotFound)
}
