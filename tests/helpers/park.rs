//! Test fixture only: sets an environment variable after it has already
//! started (so it can never appear in `/proc/<pid>/environ`, only in
//! glibc's live `environ`), prints its own pid, then parks in a tight
//! sleep loop until killed.

use std::io::Write;
use std::time::Duration;

fn main() {
    std::env::set_var("LIVE_ONLY", "livevalue");
    std::env::set_var("LONG", "x".repeat(1000));

    println!("{}", std::process::id());
    std::io::stdout().flush().ok();

    loop {
        std::thread::sleep(Duration::from_millis(50));
    }
}
