use log::{self, Log, Metadata, Record, SetLoggerError};
use std::sync::Once;
#[cfg(target_os = "linux")]
use systemd_journal_logger::JournalLog;

use crate::progbase;

static INIT: Once = Once::new();

struct CombinedLogger {
    env_logger: env_logger::Logger,
    #[cfg(target_os = "linux")]
    journal_logger: Option<JournalLog>,
}

impl Log for CombinedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if self.env_logger.enabled(metadata) {
            return true;
        }
        #[cfg(target_os = "linux")]
        if let Some(journal_logger) = &self.journal_logger {
            return journal_logger.enabled(metadata);
        }
        false
    }

    fn log(&self, record: &Record) {
        if self.env_logger.enabled(record.metadata()) {
            self.env_logger.log(record);
        }
        #[cfg(target_os = "linux")]
        if let Some(journal_logger) = &self.journal_logger {
            // journalctl -o verbose shows the record with
            // MM_EXE=movingmedian MM_ID=def SYSLOG_IDENTIFIER=movingmedian.def
            if journal_logger.enabled(record.metadata()) {
                journal_logger.log(record);
            }
        }
    }

    fn flush(&self) {
        self.env_logger.flush();
        #[cfg(target_os = "linux")]
        if let Some(journal_logger) = &self.journal_logger {
            journal_logger.flush();
        }
    }
}

#[cfg(target_os = "linux")]
fn journal_logger() -> Option<JournalLog> {
    match JournalLog::new() {
        Ok(journal) => Some(
            journal
                .with_extra_fields(vec![
                    ("MM_EXE", progbase::exe_name()),
                    ("MM_ID", progbase::proc_name()),
                ])
                .with_syslog_identifier(format!(
                    "{}.{}",
                    progbase::exe_name(),
                    progbase::proc_name()
                )),
        ),
        Err(e) => {
            eprintln!("journal logging unavailable: {}", e);
            None
        }
    }
}

/// Installs stderr logging (when `--stdout` is given) together with the
/// systemd journal on Linux. Calling it again is a no-op.
pub fn init_combined_logger() -> Result<(), SetLoggerError> {
    let mut result = Ok(());
    INIT.call_once(|| {
        let env_logger: env_logger::Logger =
            env_logger::Builder::from_env(env_logger::Env::default())
                .filter_level(if progbase::stdout() {
                    progbase::log_lvl()
                } else {
                    log::LevelFilter::Off
                })
                .build();

        let combined_logger = CombinedLogger {
            env_logger,
            #[cfg(target_os = "linux")]
            journal_logger: journal_logger(),
        };

        result = log::set_boxed_logger(Box::new(combined_logger))
            .map(|()| log::set_max_level(progbase::log_lvl()));
    });

    result
}

/// Logger for unit and integration tests, output is captured by the test harness.
pub fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
