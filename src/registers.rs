//! A typed wrapper over the kernel's fixed `user_regs_struct` ABI layout,
//! narrowed to x86_64 only. Exposes named accessors for the registers
//! that matter to a System V call injection (`rdi`..`r9`, `rip`, `rax`)
//! behind `rd_get_reg!`/`rd_set_reg!` macros rather than raw field
//! access, so callers read as `regs.set_arg1(x)` instead of `regs.raw.rdi = x`.

use libc::user_regs_struct;

macro_rules! rd_get_reg {
    ($slf:expr, $field:ident) => {
        $slf.raw.$field
    };
}

macro_rules! rd_set_reg {
    ($slf:expr, $field:ident, $val:expr) => {
        $slf.raw.$field = $val
    };
}

/// System V x86_64 argument registers, in calling-convention order.
#[derive(Copy, Clone)]
pub struct Registers {
    raw: user_regs_struct,
}

impl Registers {
    pub fn from_ptrace(raw: user_regs_struct) -> Registers {
        Registers { raw }
    }

    pub fn get_ptrace(&self) -> user_regs_struct {
        self.raw
    }

    pub fn ip(&self) -> u64 {
        rd_get_reg!(self, rip)
    }

    pub fn set_ip(&mut self, value: u64) {
        rd_set_reg!(self, rip, value);
    }

    /// The syscall number register (rax on entry to a direct syscall).
    pub fn set_syscallno(&mut self, nr: i64) {
        rd_set_reg!(self, rax, nr as u64);
    }

    /// rax after a syscall or call returns.
    pub fn syscall_result(&self) -> u64 {
        rd_get_reg!(self, rax)
    }

    pub fn syscall_result_signed(&self) -> i64 {
        rd_get_reg!(self, rax) as i64
    }

    pub fn set_arg1(&mut self, value: u64) {
        rd_set_reg!(self, rdi, value);
    }

    pub fn set_arg2(&mut self, value: u64) {
        rd_set_reg!(self, rsi, value);
    }

    pub fn set_arg3(&mut self, value: u64) {
        rd_set_reg!(self, rdx, value);
    }

    pub fn set_arg4(&mut self, value: u64) {
        rd_set_reg!(self, r10, value);
    }

    pub fn set_arg5(&mut self, value: u64) {
        rd_set_reg!(self, r8, value);
    }

    pub fn set_arg6(&mut self, value: u64) {
        rd_set_reg!(self, r9, value);
    }
}
