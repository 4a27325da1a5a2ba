//! Trampoline builder & caller. Composes the call-then-breakpoint blob,
//! writes it into scratch, pivots the target there, and runs to the
//! breakpoint to capture the result register.

use crate::addr::RemoteAddr;
use crate::codec::{encode_call_rel32, INT3};
use crate::error::Result;
use crate::ptrace_session::PtraceSession;
use crate::registers::Registers;

/// Offset of the argument string within the blob (past the 5-byte
/// `call rel32` and the 1-byte `int3`).
pub const ARGV_OFFSET: usize = 6;

/// Rounds the blob size up to the next power of two, with a floor of 32,
/// so the scratch allocation comfortably clears a page-aligned minimum
/// regardless of name length.
fn blob_len(name_len: usize) -> usize {
    let minimum = (name_len + ARGV_OFFSET + 1).max(32); // +1 for the trailing NUL this crate adds
    minimum.next_power_of_two()
}

/// Builds the blob: `call rel32` to `resolved_symbol`, `int3`, then the
/// NUL-terminated variable name, zero-padded to `blob_len`.
fn build_blob(scratch: RemoteAddr, resolved_symbol: RemoteAddr, name: &str) -> Result<Vec<u8>> {
    let call_src = scratch.0 + 5; // address of the byte after the call instruction
    let call = encode_call_rel32(call_src, resolved_symbol.0)?;

    let mut blob = vec![0u8; blob_len(name.len())];
    blob[0..5].copy_from_slice(&call);
    blob[5] = INT3;
    blob[ARGV_OFFSET..ARGV_OFFSET + name.len()].copy_from_slice(name.as_bytes());
    // blob[ARGV_OFFSET + name.len()] is already 0 from the zero-fill above,
    // giving the argument string an explicit NUL terminator.
    Ok(blob)
}

/// Writes the trampoline into `scratch`, points the target's
/// instruction pointer at it with the name-string pointer in the first
/// argument register, runs to the breakpoint, and returns the
/// resulting accumulator value (the raw `getenv` return: a target-space
/// pointer, or zero if unset). The scratch page is unmapped wholesale
/// at teardown, so the bytes written here are never individually
/// restored.
pub fn call_getenv(
    session: &PtraceSession,
    scratch: RemoteAddr,
    resolved_symbol: RemoteAddr,
    name: &str,
) -> Result<u64> {
    let blob = build_blob(scratch, resolved_symbol, name)?;
    session.poke_region(scratch.0 as u64, &blob, None)?;

    let mut regs: Registers = session.get_regs()?;
    regs.set_ip(scratch.0 as u64);
    regs.set_arg1((scratch.0 + ARGV_OFFSET) as u64);
    session.set_regs(&regs)?;

    session.continue_to_breakpoint()?;

    let result = session.get_regs()?;
    Ok(result.syscall_result())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_is_at_least_32_bytes_and_a_power_of_two() {
        assert_eq!(blob_len(1), 32);
        assert_eq!(blob_len(30), 64);
    }

    #[test]
    fn blob_layout_places_call_int3_and_name() {
        let scratch = RemoteAddr(0x5000_0000);
        let symbol = RemoteAddr(0x7f00_0000_0000);
        let blob = build_blob(scratch, symbol, "FOO").unwrap();
        assert_eq!(blob[0], 0xe8);
        assert_eq!(blob[5], INT3);
        assert_eq!(&blob[6..9], b"FOO");
        assert_eq!(blob[9], 0);
    }
}
