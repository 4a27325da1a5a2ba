//! Instruction codec. Emits the exact byte sequences for the handful of
//! x86_64 instructions this tool ever injects.

use crate::error::{Error, Result};

/// `syscall` -- two bytes, direct system-call invocation.
pub const SYSCALL: [u8; 2] = [0x0f, 0x05];

/// `jmp *%rax` -- two bytes, indirect jump through the accumulator.
pub const JMP_RAX: [u8; 2] = [0xff, 0xe0];

/// `int3` -- one byte, software breakpoint.
pub const INT3: u8 = 0xcc;

/// Encodes `call rel32` (five bytes: opcode + 32-bit signed
/// little-endian displacement) from `src` (the address of the byte
/// *after* this instruction) to `dest`.
pub fn encode_call_rel32(src: usize, dest: usize) -> Result<[u8; 5]> {
    let disp = rel32(src, dest)?;
    let mut bytes = [0u8; 5];
    bytes[0] = 0xe8;
    bytes[1..5].copy_from_slice(&disp.to_le_bytes());
    Ok(bytes)
}

/// Computes the signed 32-bit displacement from `src` to `dest`,
/// failing fatally if it doesn't fit -- the signal that position-
/// independent code wasn't used, or the library is out of range.
pub fn rel32(src: usize, dest: usize) -> Result<i32> {
    let delta = dest as i64 - src as i64;
    i32::try_from(delta).map_err(|_| Error::RangeOverflow(delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel32_roundtrips_within_2gib() {
        let src = 0x1000;
        let dest = src + (1 << 30);
        assert_eq!(rel32(src, dest).unwrap(), 1 << 30);

        let dest_back = src - (1 << 30);
        assert_eq!(rel32(src, dest_back).unwrap(), -(1 << 30));
    }

    #[test]
    fn rel32_rejects_out_of_range() {
        let src = 0usize;
        let dest = src + (3usize << 31);
        assert!(matches!(rel32(src, dest), Err(Error::RangeOverflow(_))));
    }

    #[test]
    fn call_rel32_encodes_opcode_and_le_displacement() {
        let bytes = encode_call_rel32(0x1000, 0x1000 + 10).unwrap();
        assert_eq!(bytes[0], 0xe8);
        assert_eq!(i32::from_le_bytes(bytes[1..5].try_into().unwrap()), 10);
    }
}
