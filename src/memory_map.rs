//! Memory-map scanner. Parses `/proc/<pid>/maps` to find the load base
//! of a named shared library in a given process.

use crate::addr::RemoteAddr;
use std::fs;
use std::io;

/// Finds the first `maps` line whose pathname contains `needle` (e.g.
/// `/libc`) as a whole library-name component -- i.e. the match is not
/// immediately followed by a lowercase letter, which would mean the
/// match was only a prefix of a longer name such as `libcrypt` -- AND
/// whose permissions are executable and non-writable. Returns the
/// mapping's start address, or `None` if no line qualifies.
pub fn find_library_base(maps_contents: &str, needle: &str) -> Option<RemoteAddr> {
    for line in maps_contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }
        let range = fields[0];
        let perms = fields[1];
        let pathname = fields[5];

        if !pathname.contains('/') {
            continue;
        }
        let Some(pos) = pathname.find(needle) else {
            continue;
        };
        let after = pathname.as_bytes().get(pos + needle.len()).copied();
        if let Some(b) = after {
            if b.is_ascii_lowercase() {
                continue;
            }
        }

        let executable = perms.as_bytes().get(2) == Some(&b'x');
        let writable = perms.as_bytes().get(1) == Some(&b'w');
        if !executable || writable {
            continue;
        }

        let start_hex = range.split('-').next()?;
        let start = usize::from_str_radix(start_hex, 16).ok()?;
        return Some(RemoteAddr(start));
    }
    None
}

/// Reads and scans `/proc/<pid>/maps` for the process identified by `pid`.
pub fn find_library_base_in(pid: i32, needle: &str) -> io::Result<Option<RemoteAddr>> {
    let contents = fs::read_to_string(format!("/proc/{}/maps", pid))?;
    Ok(find_library_base(&contents, needle))
}

pub const LIBC_NEEDLE: &str = "/libc";

#[cfg(test)]
mod tests {
    use super::*;

    const MAPS: &str = "\
7f1a2b400000-7f1a2b41f000 r--p 00000000 08:01 123 /usr/lib/x86_64-linux-gnu/libcrypt.so.1
7f1a2b420000-7f1a2b44f000 r-xp 00000000 08:01 124 /usr/lib/x86_64-linux-gnu/libcrypt.so.1
7f1a2b600000-7f1a2b61f000 r--p 00000000 08:01 200 /usr/lib/x86_64-linux-gnu/libc-2.31.so
7f1a2b620000-7f1a2b7a0000 r-xp 00020000 08:01 200 /usr/lib/x86_64-linux-gnu/libc-2.31.so
7f1a2b7a0000-7f1a2b7f0000 rw-p 001a0000 08:01 200 /usr/lib/x86_64-linux-gnu/libc-2.31.so
";

    #[test]
    fn prefers_libc_over_libcrypt() {
        let base = find_library_base(MAPS, LIBC_NEEDLE).unwrap();
        assert_eq!(base, RemoteAddr(0x7f1a2b620000));
    }

    #[test]
    fn libcrypt_only_is_not_found() {
        const ONLY_CRYPT: &str = "\
7f1a2b400000-7f1a2b41f000 r--p 00000000 08:01 123 /usr/lib/x86_64-linux-gnu/libcrypt.so.1
7f1a2b420000-7f1a2b44f000 r-xp 00000000 08:01 124 /usr/lib/x86_64-linux-gnu/libcrypt.so.1
";
        assert!(find_library_base(ONLY_CRYPT, LIBC_NEEDLE).is_none());
    }

    #[test]
    fn skips_writable_executable_segment() {
        const WRITABLE_ONLY: &str = "\
7f1a2b600000-7f1a2b7f0000 rwxp 00000000 08:01 200 /usr/lib/x86_64-linux-gnu/libc-2.31.so
";
        assert!(find_library_base(WRITABLE_ONLY, LIBC_NEEDLE).is_none());
    }
}
