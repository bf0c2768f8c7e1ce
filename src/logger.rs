use core::fmt;

use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Once;

/// Where formatted log lines end up, normally the serial console.
pub type Sink = fn(fmt::Arguments);

static LOGGER: Logger = Logger;
static SINK: Once<Sink> = Once::new();

pub struct Logger;

pub fn init(level: LevelFilter, sink: Sink) -> Result<(), log::SetLoggerError> {
    SINK.call_once(|| sink);
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

pub const fn marker(level: Level) -> char {
    match level {
        Level::Info => '*',
        Level::Warn => 'W',
        Level::Error => 'E',
        Level::Debug => 'D',
        Level::Trace => 'T',
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = SINK.get() {
            sink(format_args!("[{}] {}\n", marker(record.level()), record.args()));
        }
    }

    fn flush(&self) {}
}
