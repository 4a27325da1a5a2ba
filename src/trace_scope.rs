//! Reads the kernel's trace-scope sysctl to build the advisory hint
//! attached to `Error::PermissionDenied`.

use std::fs;

const SYSCTL_PATH: &str = "/proc/sys/kernel/yama/ptrace_scope";

/// Returns a short, human-readable suffix to append to a permission
/// error, or an empty string if the sysctl is absent or already
/// permissive (value `0`).
pub fn advisory() -> String {
    match fs::read_to_string(SYSCTL_PATH) {
        Ok(contents) => {
            let value = contents.trim();
            if value == "0" {
                String::new()
            } else {
                format!(
                    " (kernel.yama.ptrace_scope is {}; a non-root tracer can only attach to its \
                     own descendants at this setting -- see {})",
                    value, SYSCTL_PATH
                )
            }
        }
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_constant_is_the_documented_sysctl() {
        assert_eq!(SYSCTL_PATH, "/proc/sys/kernel/yama/ptrace_scope");
    }
}
