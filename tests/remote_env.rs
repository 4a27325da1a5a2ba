//! End-to-end scenarios. Spawns a real child, reads its live environment
//! through `rgetenv::read_remote_env`, and checks the restoration
//! invariant directly with our own `ptrace` calls.
//!
//! These tests need `CAP_SYS_PTRACE` over a same-UID child (or root),
//! and a permissive `kernel.yama.ptrace_scope`. They're written to pass
//! in that environment; a locked-down `ptrace_scope` makes attach fail
//! with `EPERM` before any of this logic runs.

use nix::sys::ptrace;
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

struct ParkedChild {
    child: Child,
    pid: i32,
}

impl ParkedChild {
    fn spawn() -> ParkedChild {
        let mut child = Command::new(env!("CARGO_BIN_EXE_park_helper"))
            .stdout(Stdio::piped())
            .spawn()
            .expect("failed to spawn park_helper");

        let stdout = child.stdout.take().unwrap();
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        reader.read_line(&mut line).expect("failed to read helper pid");
        let pid: i32 = line.trim().parse().expect("helper printed a non-pid line");

        // Give the helper time to call set_var and enter its park loop.
        std::thread::sleep(Duration::from_millis(200));

        ParkedChild { child, pid }
    }
}

impl Drop for ParkedChild {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn reads_a_variable_set_after_exec() {
    let target = ParkedChild::spawn();
    let value = rgetenv::read_remote_env(target.pid, "LIVE_ONLY").unwrap();
    assert_eq!(value.as_deref(), Some("livevalue"));
}

#[test]
fn unset_variable_reads_as_none() {
    let target = ParkedChild::spawn();
    let value = rgetenv::read_remote_env(target.pid, "QUUX_NEVER_SET").unwrap();
    assert_eq!(value, None);
}

#[test]
fn long_value_is_read_in_full() {
    let target = ParkedChild::spawn();
    let value = rgetenv::read_remote_env(target.pid, "LONG").unwrap();
    assert_eq!(value.as_deref(), Some("x".repeat(1000).as_str()));
}

#[test]
fn target_registers_are_unchanged_after_a_run() {
    let target = ParkedChild::spawn();

    let pid = Pid::from_raw(target.pid);
    ptrace::attach(pid).unwrap();
    waitpid(pid, None).unwrap();
    let before = ptrace::getregs(pid).unwrap();
    ptrace::detach(pid, None).unwrap();

    rgetenv::read_remote_env(target.pid, "LIVE_ONLY").unwrap();

    ptrace::attach(pid).unwrap();
    waitpid(pid, None).unwrap();
    let after = ptrace::getregs(pid).unwrap();
    ptrace::detach(pid, None).unwrap();

    assert_eq!(before.rip, after.rip);
    assert_eq!(before.rsp, after.rsp);
    assert_eq!(before.rbp, after.rbp);
}

#[test]
fn target_keeps_running_after_teardown() {
    let mut target = ParkedChild::spawn();
    rgetenv::read_remote_env(target.pid, "LIVE_ONLY").unwrap();

    // A parked loop keeps incrementing its own liveness: confirm the
    // process hasn't exited or been left stopped by a stray SIGTRAP.
    std::thread::sleep(Duration::from_millis(100));
    match target.child.try_wait() {
        Ok(None) => {} // still running, as expected
        other => panic!("target did not survive teardown: {:?}", other),
    }
}

#[test]
fn teardown_is_idempotent() {
    // Exercises the Drop-based teardown path twice in a row against the
    // same target; a second teardown on an already-restored session
    // must be a no-op. We approximate "twice" by running two
    // independent sessions back-to-back against one target, each of
    // which tears itself down on drop.
    let target = ParkedChild::spawn();
    rgetenv::read_remote_env(target.pid, "LIVE_ONLY").unwrap();
    rgetenv::read_remote_env(target.pid, "LIVE_ONLY").unwrap();
}
