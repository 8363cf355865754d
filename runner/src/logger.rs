use std::sync::Mutex;

use log::{Level, LevelFilter, Metadata, Record};

/// The runner logger
pub struct RunnerLogger {
    state: Mutex<LoggerState>,
}

/// The inner state of the logger
struct LoggerState {
    level: LevelFilter,
}

/// The global logger
static LOGGER: RunnerLogger = RunnerLogger {
    state: Mutex::new(LoggerState {
        level: LevelFilter::Info,
    }),
};

impl RunnerLogger {
    pub fn init(level: LevelFilter) {
        if let Ok(mut state) = LOGGER.state.lock() {
            state.level = level;
        }
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }

    fn level(&self) -> LevelFilter {
        self.state
            .lock()
            .map(|state| state.level)
            .unwrap_or(LevelFilter::Info)
    }
}

impl log::Log for RunnerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            match record.level() {
                Level::Error => {
                    eprintln!("\x1b[31m{}\x1b[0m", record.args());
                }
                Level::Warn => {
                    println!("\x1b[33m{}\x1b[0m", record.args());
                }
                Level::Info => {
                    println!("{}", record.args());
                }
                Level::Debug | Level::Trace => {
                    println!("\x1b[2m{}\x1b[0m", record.args());
                }
            }
        }
    }

    fn flush(&self) {}
}
