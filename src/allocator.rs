//! Remote allocator. Executes an anonymous mapping (and later
//! unmapping) system call inside the target by overwriting its
//! current instruction pointer with a two-instruction `syscall; jmp
//! *%rax` stub, single-stepping through both, and restoring the
//! overwritten word unconditionally.

use crate::addr::RemoteAddr;
use crate::codec::{JMP_RAX, SYSCALL};
use crate::error::{Error, Result};
use crate::ptrace_session::PtraceSession;
use crate::registers::Registers;

pub const PAGE_SIZE: u64 = 4096;

/// Maps one anonymous, read+execute page inside the target and returns
/// its address. Leaves the target's registers and the pivot word
/// exactly as found; the caller is responsible for deciding whether to
/// keep or restore the two-instruction stub this leaves at the pivot
/// (it is always restored by `Session` on teardown).
pub fn remote_mmap(session: &PtraceSession, saved_pivot: &mut Vec<(u64, i64)>) -> Result<RemoteAddr> {
    let orig_regs = session.get_regs()?;
    let pivot = orig_regs.ip();

    let mut stub = Vec::with_capacity(4);
    stub.extend_from_slice(&SYSCALL);
    stub.extend_from_slice(&JMP_RAX);
    session.poke_region(pivot, &stub, Some(saved_pivot))?;

    let mut regs = orig_regs;
    regs.set_syscallno(libc::SYS_mmap);
    regs.set_arg1(0);
    regs.set_arg2(PAGE_SIZE);
    regs.set_arg3((libc::PROT_READ | libc::PROT_EXEC) as u64);
    regs.set_arg4((libc::MAP_PRIVATE | libc::MAP_ANONYMOUS) as u64);
    regs.set_arg5(u64::MAX); // fd = -1
    regs.set_arg6(0);
    session.set_regs(&regs)?;

    session.single_step()?; // executes `syscall`
    let result = session.get_regs()?;
    let scratch = result.syscall_result();
    if scratch >= (-4095i64 as u64) {
        return Err(Error::MapFailed);
    }

    session.single_step()?; // executes `jmp *%rax`
    let after_jmp = session.get_regs()?;
    if after_jmp.ip() != scratch {
        return Err(Error::PivotFailed {
            expected: scratch,
            actual: after_jmp.ip(),
        });
    }

    Ok(RemoteAddr(scratch as usize))
}

/// Unmaps the page allocated by `remote_mmap`, reusing the same pivot
/// address. Mirrors `remote_mmap`'s stub shape, but only single-steps
/// the `syscall` half: on success `rax` is `0`, and `jmp *%rax` would
/// fault the target by jumping to address zero. The unmap only needs
/// the syscall's side effect; restoring the pivot's original bytes and
/// registers is `Session`'s job at final teardown, using the bytes it
/// captured the first time `remote_mmap` overwrote this same pivot.
pub fn remote_munmap(session: &PtraceSession, pivot_regs: &Registers, scratch: RemoteAddr) -> Result<()> {
    let pivot = pivot_regs.ip();

    let mut stub = Vec::with_capacity(4);
    stub.extend_from_slice(&SYSCALL);
    stub.extend_from_slice(&JMP_RAX);
    session.poke_region(pivot, &stub, None)?;

    let mut regs = *pivot_regs;
    regs.set_syscallno(libc::SYS_munmap);
    regs.set_arg1(scratch.0 as u64);
    regs.set_arg2(PAGE_SIZE);
    session.set_regs(&regs)?;

    session.single_step()?; // executes `syscall` only
    let result = session.get_regs()?;
    let retval = result.syscall_result_signed();

    if retval != 0 {
        return Err(Error::MapFailed);
    }
    Ok(())
}
