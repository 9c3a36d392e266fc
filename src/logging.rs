use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::MakeWriter;

/// Routes log lines to stderr so stdout stays clean for reports and JSON.
#[derive(Clone)]
pub(crate) struct StderrMakeWriter {
    pub quiet: bool,
}

impl<'a> MakeWriter<'a> for StderrMakeWriter {
    type Writer = StderrWriter;

    fn make_writer(&'a self) -> Self::Writer {
        StderrWriter { quiet: self.quiet }
    }
}

pub(crate) struct StderrWriter {
    quiet: bool,
}

impl std::io::Write for StderrWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if !self.quiet {
            std::io::stderr().write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.quiet {
            std::io::stderr().flush()?;
        }
        Ok(())
    }
}

pub(crate) fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(level: &str, quiet: bool) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(false)
        .with_ansi(!quiet && console::colors_enabled_stderr())
        .with_writer(StderrMakeWriter { quiet })
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
