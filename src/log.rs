//! Minimal leveled logging: no `log`/`env_logger` dependency, just an
//! environment-gated level and an `eprintln!`-based macro.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Debug)]
pub enum LogLevel {
    LogError = 0,
    LogWarn = 1,
    LogInfo = 2,
    LogDebug = 3,
    LogTrace = 4,
}

impl LogLevel {
    fn from_str(s: &str) -> Option<LogLevel> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::LogError),
            "warn" => Some(LogLevel::LogWarn),
            "info" => Some(LogLevel::LogInfo),
            "debug" => Some(LogLevel::LogDebug),
            "trace" => Some(LogLevel::LogTrace),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            LogLevel::LogError => "error",
            LogLevel::LogWarn => "warn",
            LogLevel::LogInfo => "info",
            LogLevel::LogDebug => "debug",
            LogLevel::LogTrace => "trace",
        }
    }
}

lazy_static! {
    static ref DEFAULT_LEVEL: LogLevel = env::var("RGETENV_LOG")
        .ok()
        .and_then(|v| LogLevel::from_str(&v))
        .unwrap_or(LogLevel::LogWarn);
}

static OVERRIDE_LEVEL: AtomicUsize = AtomicUsize::new(usize::MAX);

/// Called once from `main` when `-v`/`--verbose` is passed; raises the
/// floor to `LogDebug` regardless of `RGETENV_LOG`.
pub fn set_verbose() {
    OVERRIDE_LEVEL.store(LogLevel::LogDebug as usize, Ordering::Relaxed);
}

pub fn enabled(level: LogLevel) -> bool {
    let floor = OVERRIDE_LEVEL.load(Ordering::Relaxed);
    let floor = if floor == usize::MAX {
        *DEFAULT_LEVEL
    } else {
        // SAFETY-free: floor was only ever stored from a LogLevel discriminant.
        match floor {
            0 => LogLevel::LogError,
            1 => LogLevel::LogWarn,
            2 => LogLevel::LogInfo,
            3 => LogLevel::LogDebug,
            _ => LogLevel::LogTrace,
        }
    };
    level <= floor
}

macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        if $crate::log::enabled($level) {
            eprintln!("[{}] {}", $crate::log::tag_of($level), format!($($arg)+));
        }
    };
}

pub fn tag_of(level: LogLevel) -> &'static str {
    level.tag()
}

pub(crate) use log;
