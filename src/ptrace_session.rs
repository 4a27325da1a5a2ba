//! Process controller. A thin, synchronous contract over the kernel
//! debugging interface: every wait operation here blocks the caller
//! until the tracee actually stops.

use crate::error::{Error, Result};
use crate::log::log;
use crate::log::LogLevel::LogTrace;
use crate::registers::Registers;
use nix::sys::ptrace;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use std::ffi::c_void;

pub struct PtraceSession {
    pid: Pid,
}

impl PtraceSession {
    /// Attaches to `pid` and blocks until the kernel reports it stopped.
    /// `PTRACE_ATTACH` always delivers `SIGSTOP` to the target, so --
    /// unlike `single_step`/`continue_to_breakpoint` below -- any stop
    /// signal here counts as success, not just `SIGTRAP`.
    pub fn attach(pid: i32) -> Result<PtraceSession> {
        let pid = Pid::from_raw(pid);
        ptrace::attach(pid).map_err(|e| {
            if e == nix::Error::EPERM {
                Error::PermissionDenied {
                    pid: pid.as_raw(),
                    advisory: crate::trace_scope::advisory(),
                }
            } else {
                Error::KernelRefused(e)
            }
        })?;

        match waitpid(pid, None)? {
            WaitStatus::Stopped(_, sig) => {
                log!(LogTrace, "attach: pid {} stopped by {:?}", pid, sig);
                Ok(PtraceSession { pid })
            }
            other => Err(Error::UnexpectedStop {
                expected: "stopped",
                actual: format!("{:?}", other),
            }),
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }

    pub fn get_regs(&self) -> Result<Registers> {
        Ok(Registers::from_ptrace(ptrace::getregs(self.pid)?))
    }

    pub fn set_regs(&self, regs: &Registers) -> Result<()> {
        ptrace::setregs(self.pid, regs.get_ptrace())?;
        Ok(())
    }

    /// Reads one machine word at a word-aligned `addr`.
    pub fn peek_word(&self, addr: u64) -> Result<i64> {
        Ok(ptrace::read(self.pid, addr as ptrace::AddressType)?)
    }

    /// Writes one machine word at a word-aligned `addr`.
    pub fn poke_word(&self, addr: u64, word: i64) -> Result<()> {
        unsafe {
            ptrace::write(self.pid, addr as ptrace::AddressType, word as *mut c_void)?;
        }
        Ok(())
    }

    /// Writes `new_bytes` starting at `addr` via word-sized pokes,
    /// padding the final word with the existing tail bytes so only the
    /// intended range is overwritten. If `capture_old` is `Some`, the
    /// prior word at each touched offset is pushed there first, giving
    /// an exact undo buffer.
    pub fn poke_region(
        &self,
        addr: u64,
        new_bytes: &[u8],
        mut capture_old: Option<&mut Vec<(u64, i64)>>,
    ) -> Result<()> {
        const WORD: usize = 8;
        let mut offset = 0usize;
        while offset < new_bytes.len() {
            let word_addr = addr + offset as u64;
            let old = self.peek_word(word_addr)?;
            if let Some(ref mut out) = capture_old {
                out.push((word_addr, old));
            }

            let mut word_bytes = old.to_le_bytes();
            let remaining = new_bytes.len() - offset;
            let take = remaining.min(WORD);
            word_bytes[..take].copy_from_slice(&new_bytes[offset..offset + take]);

            self.poke_word(word_addr, i64::from_le_bytes(word_bytes))?;
            offset += WORD;
        }
        Ok(())
    }

    /// Restores words previously captured by `poke_region`'s
    /// `capture_old` buffer, in reverse order.
    pub fn restore_words(&self, saved: &[(u64, i64)]) -> Result<()> {
        for &(addr, word) in saved.iter().rev() {
            self.poke_word(addr, word)?;
        }
        Ok(())
    }

    /// Advances one instruction and waits for the implied trap-stop.
    pub fn single_step(&self) -> Result<()> {
        ptrace::step(self.pid, None)?;
        self.wait_for_trap("single-step")
    }

    /// Resumes and waits for the next stop, which is expected to be the
    /// software breakpoint planted by the trampoline.
    pub fn continue_to_breakpoint(&self) -> Result<()> {
        ptrace::cont(self.pid, None)?;
        self.wait_for_trap("continue")
    }

    fn wait_for_trap(&self, what: &'static str) -> Result<()> {
        match waitpid(self.pid, None)? {
            WaitStatus::Stopped(_, Signal::SIGTRAP) => {
                log!(LogTrace, "{}: pid {} trapped", what, self.pid);
                Ok(())
            }
            other => Err(Error::UnexpectedStop {
                expected: "SIGTRAP",
                actual: format!("{:?}", other),
            }),
        }
    }

    pub fn detach(&self) -> Result<()> {
        ptrace::detach(self.pid, None)?;
        Ok(())
    }
}
