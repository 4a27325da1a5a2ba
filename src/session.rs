//! Session orchestrator. Sequences the scanner, resolver, allocator,
//! trampoline and reader into the full protocol, with strict
//! restore-on-failure carried by a `Drop`-based cleanup guard so every
//! exit path -- success, early `?`, or panic unwind -- restores the
//! target.

use crate::addr::RemoteAddr;
use crate::allocator;
use crate::error::Result;
use crate::log::log;
use crate::log::LogLevel::{LogDebug, LogInfo};
use crate::ptrace_session::PtraceSession;
use crate::registers::Registers;
use crate::string_reader;
use crate::symbol;
use crate::trampoline;

/// Named states, used only for logging; control flow itself is plain
/// sequential code with `?`, and correctness doesn't depend on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Attached,
    Stopped,
    ScratchMapped,
    PivotedToScratch,
    BreakpointHit,
    ResultCaptured,
}

/// Owns every piece of target state this tool mutates. Dropping a
/// `Session` -- whether from a normal return or an early `?` exit --
/// restores everything that was overwritten, unmaps any scratch page,
/// and detaches. Teardown is idempotent: a `Session` already torn down
/// does nothing on a second `drop`.
struct Session {
    ptrace: PtraceSession,
    orig_regs: Registers,
    pivot_bytes: Option<Vec<(u64, i64)>>,
    scratch: Option<RemoteAddr>,
    torn_down: bool,
}

impl Session {
    fn attach(pid: i32) -> Result<Session> {
        let ptrace = PtraceSession::attach(pid)?;
        log!(LogInfo, "attached to pid {}", pid);
        let orig_regs = ptrace.get_regs()?;
        log!(LogDebug, "{:?}: saved original registers", State::Attached);
        Ok(Session {
            ptrace,
            orig_regs,
            pivot_bytes: None,
            scratch: None,
            torn_down: false,
        })
    }

    fn run(&mut self, name: &str) -> Result<Option<String>> {
        log!(LogDebug, "{:?}", State::Stopped);

        let target_libc_base = symbol::find_target_libc_base(self.ptrace.pid())?;
        let local = symbol::local_lookup()?;
        let resolved = symbol::resolve_getenv_in_target(&local, target_libc_base);
        log!(LogDebug, "resolved getenv in target at {:?}", resolved);

        let mut pivot_bytes = Vec::new();
        let mmap_result = allocator::remote_mmap(&self.ptrace, &mut pivot_bytes);
        if !pivot_bytes.is_empty() {
            self.pivot_bytes = Some(pivot_bytes);
        }
        let scratch = mmap_result?;
        self.scratch = Some(scratch);
        log!(LogDebug, "{:?}: scratch at {:?}", State::ScratchMapped, scratch);
        log!(LogDebug, "{:?}", State::PivotedToScratch);

        let ptr = trampoline::call_getenv(&self.ptrace, scratch, resolved, name)?;
        log!(LogDebug, "{:?}", State::BreakpointHit);

        let value = string_reader::read_c_string(&self.ptrace, ptr)?;
        log!(LogDebug, "{:?}: {:?}", State::ResultCaptured, value);
        Ok(value)
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(scratch) = self.scratch.take() {
            if let Err(e) = allocator::remote_munmap(&self.ptrace, &self.orig_regs, scratch) {
                log!(LogInfo, "munmap of scratch page failed, leaking it: {}", e);
            }
        }
        if let Some(bytes) = self.pivot_bytes.take() {
            let _ = self.ptrace.restore_words(&bytes);
        }
        let _ = self.ptrace.set_regs(&self.orig_regs);
        let _ = self.ptrace.detach();
        self.torn_down = true;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Reads `name` from the environment of the running process `pid`.
/// Returns `Ok(None)` if the variable is unset (success, empty output);
/// `Ok(Some(value))` if it's set; `Err` on any failure, with the target
/// left exactly as found either way.
pub fn read_remote_env(pid: i32, name: &str) -> Result<Option<String>> {
    let mut session = Session::attach(pid)?;
    session.run(name)
}
