use std::{fmt, str::FromStr, sync::OnceLock};

use crate::error::Error;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const BLACK: &str = "\x1b[30m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Off = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Off => "OFF",
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Level::Off => "",
            Level::Trace => BLACK,
            Level::Debug => CYAN,
            Level::Info => GREEN,
            Level::Warn => YELLOW,
            Level::Error => RED,
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Level::Off),
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(Error::Other(format!("unknown log level '{}'", s))),
        }
    }
}

static THRESHOLD: OnceLock<Level> = OnceLock::new();

fn get_threshold() -> Level {
    THRESHOLD.get().copied().unwrap_or(Level::Warn)
}

/// Sets the global threshold. Only the first call takes effect.
pub fn log_init(level: Level) {
    let _ = THRESHOLD.set(level);
}

pub fn log(
    level: Level,
    args: fmt::Arguments<'_>,
    file: &'static str,
    line: u32,
) {
    let threshold = get_threshold();
    if threshold == Level::Off || level < threshold {
        return;
    }
    eprintln!(
        "{}{}\t[{}:{}]\t{}{}",
        level.color_code(),
        level.as_str(),
        file,
        line,
        args,
        RESET,
    );
}

// Usable unqualified after `#[macro_use] mod log`, and as `gedbg_core::info!` from the cli.

#[macro_export]
macro_rules! trace {
    ($($args:tt)*) => {
        $crate::log::log($crate::log::Level::Trace, format_args!($($args)*), file!(), line!())
    };
}

#[macro_export]
macro_rules! debug {
    ($($args:tt)*) => {
        $crate::log::log($crate::log::Level::Debug, format_args!($($args)*), file!(), line!())
    };
}

#[macro_export]
macro_rules! info {
    ($($args:tt)*) => {
        $crate::log::log($crate::log::Level::Info, format_args!($($args)*), file!(), line!())
    };
}

#[macro_export]
macro_rules! warn {
    ($($args:tt)*) => {
        $crate::log::log($crate::log::Level::Warn, format_args!($($args)*), file!(), line!())
    };
}

#[macro_export]
macro_rules! error {
    ($($args:tt)*) => {
        $crate::log::log($crate::log::Level::Error, format_args!($($args)*), file!(), line!())
    };
}
