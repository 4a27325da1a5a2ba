//! Cross-address-space pointer arithmetic. `SelfAddr` values live in this
//! process's address space; `RemoteAddr` values live in the target's.
//! The two are never compared or mixed directly — the only bridge is
//! [`resolve_symbol`].

use std::fmt;
use std::ops::Add;

#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct SelfAddr(pub usize);

#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct RemoteAddr(pub usize);

impl fmt::Debug for SelfAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SelfAddr({:#x})", self.0)
    }
}

impl fmt::Debug for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemoteAddr({:#x})", self.0)
    }
}

impl Add<usize> for RemoteAddr {
    type Output = RemoteAddr;
    fn add(self, rhs: usize) -> RemoteAddr {
        RemoteAddr(self.0 + rhs)
    }
}

impl Add<usize> for SelfAddr {
    type Output = SelfAddr;
    fn add(self, rhs: usize) -> SelfAddr {
        SelfAddr(self.0 + rhs)
    }
}

/// Given the lookup symbol's address as linked into this process
/// (`self_symbol`), this process's library base (`self_base`), and the
/// target's library base (`target_base`), returns the symbol's address
/// in the target. Correctness requires both processes to have loaded
/// the same on-disk library image; this is a documented prerequisite,
/// not verified here.
pub fn resolve_symbol(self_symbol: SelfAddr, self_base: SelfAddr, target_base: RemoteAddr) -> RemoteAddr {
    let offset = self_symbol.0 as isize - self_base.0 as isize;
    RemoteAddr((target_base.0 as isize + offset) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_aslr_offset() {
        let self_base = SelfAddr(0x7f0000000000);
        let self_symbol = self_base + 0x1234;
        let target_base = RemoteAddr(0x7fa000000000);
        let resolved = resolve_symbol(self_symbol, self_base, target_base);
        assert_eq!(resolved, RemoteAddr(0x7fa000001234));
    }
}
