//! Responsible for behaviour related to logging statistics with a specific pre-fix and closing
//! lines.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::RwLock;

use convert_case::Case;
use convert_case::Casing;
use log::debug;

/// Where and how statistics are written; statistics are written as `{prefix} {name}={value}`.
struct StatisticSink {
    prefix: &'static str,
    /// A closing line which is printed after all of the statistics have been printed
    closing_line: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send + Sync>,
}

impl Debug for StatisticSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticSink")
            .field("prefix", &self.prefix)
            .field("closing_line", &self.closing_line)
            .field("casing", &self.casing)
            .field("writer", &"<Writer>")
            .finish()
    }
}

static STATISTIC_SINK: OnceLock<RwLock<StatisticSink>> = OnceLock::new();

/// Configures the logging of the statistics.
///
/// Statistics are only written once this has been called; subsequent calls have no effect. In
/// case no writer is specified, stdout is used.
pub fn configure_statistic_logging(
    prefix: &'static str,
    closing_line: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_SINK.get_or_init(|| {
        RwLock::new(StatisticSink {
            prefix,
            closing_line,
            casing,
            writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

/// Logs the provided statistic with name `name` and value `value` in the format
/// `PREFIX NAME=VALUE`.
pub fn log_statistic(name: impl Display, value: impl Display) {
    let Some(sink) = STATISTIC_SINK.get() else {
        return;
    };

    if let Ok(mut sink) = sink.write() {
        let name = match sink.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let prefix = sink.prefix;
        if let Err(e) = writeln!(sink.writer, "{prefix} {name}={value}") {
            debug!("Could not write statistic: {e}");
        }
    }
}

/// Writes the closing line of a block of statistics, if one was configured.
pub fn log_statistic_postfix() {
    let Some(sink) = STATISTIC_SINK.get() else {
        return;
    };

    if let Ok(mut sink) = sink.write() {
        if let Some(closing_line) = sink.closing_line {
            if let Err(e) = writeln!(sink.writer, "{closing_line}") {
                debug!("Could not write statistic: {e}");
            }
        }
    }
}

/// Returns whether or not statistics should be logged by determining whether statistic logging
/// has been configured.
pub fn should_log_statistics() -> bool {
    STATISTIC_SINK.get().is_some()
}
