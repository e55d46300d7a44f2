use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::PROGRESS_BAR;

/// Prints log records above the progress bar, so that they don't break its
/// rendering.
struct ProgressBarLogger;

impl ProgressBarLogger {
    fn target<'a>(record: &'a Record) -> &'a str {
        record
            .target()
            .strip_prefix("seqstream::")
            .unwrap_or_else(|| record.target())
    }
}

impl log::Log for ProgressBarLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!(
            "{} {:<5} [{}] {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            Self::target(record),
            record.args()
        );

        if PROGRESS_BAR.is_hidden() {
            eprintln!("{}", msg);
        } else {
            PROGRESS_BAR.println(msg);
        }
    }

    fn flush(&self) {}
}

static LOGGER: ProgressBarLogger = ProgressBarLogger;

pub fn init_logging(filter: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);

    Ok(())
}
