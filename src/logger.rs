//! Structured logging implementation
//!
//! Log lines go through the platform console. Records are kept if they pass the global level, or
//! if their target is listed in the per-level module overrides of the configuration.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Metadata, Record};

use crate::config;
use crate::platform::{Plat, Platform};

// ————————————————————————————————— Logger ————————————————————————————————— //

pub struct Logger {}

impl Logger {
    const GLOBAL_LOG_LEVEL: LevelFilter = match config::LOG_LEVEL {
        Some(s) => match s.as_bytes() {
            b"trace" => LevelFilter::Trace,
            b"debug" => LevelFilter::Debug,
            b"info" => LevelFilter::Info,
            b"warn" => LevelFilter::Warn,
            b"error" => LevelFilter::Error,
            b"off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        },
        _ => LevelFilter::Info,
    };

    fn contains_target<const N: usize>(log_modules: &[&str; N], target: &str) -> bool {
        log_modules.iter().any(|module| *module == target)
    }

    fn filter_by_module(&self, record: &Record) -> bool {
        let level = record.metadata().level();
        let target = record.target();

        (level <= LevelFilter::Trace && Self::contains_target(config::LOG_TRACE, target))
            || (level <= LevelFilter::Debug && Self::contains_target(config::LOG_DEBUG, target))
            || (level <= LevelFilter::Info && Self::contains_target(config::LOG_INFO, target))
            || (level <= LevelFilter::Warn && Self::contains_target(config::LOG_WARN, target))
            || (level <= LevelFilter::Error && Self::contains_target(config::LOG_ERROR, target))
    }

    fn filter_by_global_level(&self, record: &Record) -> bool {
        Self::GLOBAL_LOG_LEVEL >= record.metadata().level()
    }
}

impl log::Log for Logger {
    fn enabled(&self, _: &Metadata) -> bool {
        // Every record reaches `log`, filtering happens there.
        true
    }

    fn log(&self, record: &Record) {
        if self.filter_by_global_level(record) || self.filter_by_module(record) {
            Plat::debug_print(format_args!(
                "[{} | {}] {}\n",
                level_display(record.level()),
                record.target(),
                record.args()
            ))
        }
    }

    fn flush(&self) {}
}

/// Install the logger, subsequent calls are ignored.
///
/// The target has no compare-and-swap, the flag is only loaded and stored. This is sound as the
/// harness runs on a single hart with interrupts disabled.
pub fn init() {
    static IS_INITIALIZED: AtomicBool = AtomicBool::new(false);
    static LOGGER: Logger = Logger {};

    if !claim(&IS_INITIALIZED) {
        log::warn!("Logger is already initialized, skipping init");
        return;
    }

    // SAFETY: single hart, no other thread can call into `log` concurrently.
    if unsafe { log::set_logger_racy(&LOGGER) }.is_ok() {
        unsafe { log::set_max_level_racy(LevelFilter::Trace) };
    }
}

// ————————————————————————————————— Utils —————————————————————————————————— //

/// Sets `flag`, returns false if it was already set.
fn claim(flag: &AtomicBool) -> bool {
    if flag.load(Ordering::Acquire) {
        return false;
    }
    flag.store(true, Ordering::Release);
    true
}

fn level_display(level: Level) -> &'static str {
    if config::LOG_COLOR {
        // We log with colors, using ANSI escape sequences
        match level {
            Level::Error => "\x1b[31;1mError\x1b[0m",
            Level::Warn => "\x1b[33;1mWarn\x1b[0m ",
            Level::Info => "\x1b[32;1mInfo\x1b[0m ",
            Level::Debug => "\x1b[34;1mDebug\x1b[0m",
            Level::Trace => "\x1b[35;1mTrace\x1b[0m",
        }
    } else {
        match level {
            Level::Error => "Error",
            Level::Warn => "Warn ",
            Level::Info => "Info ",
            Level::Debug => "Debug",
            Level::Trace => "Trace",
        }
    }
}
