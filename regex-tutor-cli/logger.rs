// A stderr logger for the `log` facade. Filtering happens entirely through
// `log::set_max_level`, which `main` derives from RUST_LOG.

use log::{Log, Metadata, Record};

#[derive(Debug)]
pub struct Logger(());

static LOGGER: Logger = Logger(());

impl Logger {
    /// Install the stderr logger as the global logger. Fails if some other
    /// logger was installed first.
    pub fn init() -> Result<(), log::SetLoggerError> {
        log::set_logger(&LOGGER)
    }
}

impl Log for Logger {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => format!("|{}:{}", file, line),
            (Some(file), None) => format!("|{}", file),
            _ => String::new(),
        };
        eprintln!(
            "{}|{}{}: {}",
            record.level(),
            record.target(),
            location,
            record.args(),
        );
    }

    fn flush(&self) {}
}
