//! Logging sink construction: a `slog_term` drain wrapped in `slog_async`,
//! built for stdout, syslog, or both per [`crate::config::LogSink`].

use crate::config::LogSink;
use slog::{o, Drain};

/// Maps the 0-7 `logging_level` configuration key (RFC 5424 severities) onto
/// `slog::Level`; values above `Debug` collapse to `Trace`.
pub fn level_from_u8(level: u8) -> slog::Level {
    match level {
        0 => slog::Level::Critical,
        1 => slog::Level::Critical,
        2 => slog::Level::Critical,
        3 => slog::Level::Error,
        4 => slog::Level::Warning,
        5 => slog::Level::Info,
        6 => slog::Level::Debug,
        _ => slog::Level::Trace,
    }
}

pub fn build_logger(sink: LogSink, level: slog::Level) -> slog::Logger {
    match sink {
        LogSink::Stdout => slog::Logger::root(stdout_drain(level), o!()),
        LogSink::Syslog => slog::Logger::root(syslog_drain(level), o!()),
        LogSink::Both => {
            let drain = slog::Duplicate::new(stdout_drain(level), syslog_drain(level)).fuse();
            slog::Logger::root(drain, o!())
        }
        LogSink::None => slog::Logger::root(slog::Discard, o!()),
    }
}

fn stdout_drain(level: slog::Level) -> impl Drain<Ok = (), Err = slog::Never> {
    let decorator = slog_term::PlainDecorator::new(std::io::stdout());
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    slog_async::Async::new(drain)
        .build()
        .filter_level(level)
        .fuse()
}

fn syslog_drain(level: slog::Level) -> impl Drain<Ok = (), Err = slog::Never> {
    let drain = slog_syslog::unix_3164(slog_syslog::Facility::LOG_DAEMON)
        .expect("unable to connect to syslog")
        .fuse();
    slog_async::Async::new(drain)
        .build()
        .filter_level(level)
        .fuse()
}
