use std::collections::VecDeque;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

const CAPACITY: usize = 64;

/// Keeps the most recent log lines in memory; the terminal owns stdout, so
/// they're drawn in the status panel instead.
pub struct RingLogger {
    lines: Mutex<VecDeque<String>>,
}

impl RingLogger {
    const fn new() -> Self {
        Self {
            lines: Mutex::new(VecDeque::new()),
        }
    }

    /// Up to `n` lines, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.iter().skip(lines.len().saturating_sub(n)).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == CAPACITY {
                lines.pop_front();
            }

            lines.push_back(format!("{:<5} {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

pub static LOGGER: RingLogger = RingLogger::new();

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn second_install_reports_with_context() {
        let _ = init(LevelFilter::Info);

        let err = init(LevelFilter::Info)
            .context("installing logger")
            .unwrap_err();

        assert_eq!(err.to_string(), "installing logger");
        assert!(err.root_cause().to_string().contains("logger"));
    }

    #[test]
    fn recent_returns_newest_lines_in_order() {
        log::set_max_level(LevelFilter::Info);
        let logger = RingLogger::new();

        for i in 0..CAPACITY + 3 {
            logger.log(
                &Record::builder()
                    .args(format_args!("line {i}"))
                    .level(log::Level::Error)
                    .build(),
            );
        }

        let recent = logger.recent(2);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].ends_with(&format!("line {}", CAPACITY + 1)));
        assert!(recent[1].ends_with(&format!("line {}", CAPACITY + 2)));
    }
}
