use indicatif::ProgressBar;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Stderr writer that hides `progress` while a log line is printed, so log
/// output and the bar never interleave on the terminal.
#[derive(Clone)]
pub struct ProgressWriter {
    progress: ProgressBar,
}

impl ProgressWriter {
    pub fn new(progress: ProgressBar) -> Self {
        Self { progress }
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.progress.suspend(|| io::stderr().lock().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.progress.suspend(|| io::stderr().lock().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for ProgressWriter {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global `tracing` subscriber, drawing around `progress`.
///
/// `RUST_LOG` takes precedence over `log_level`. An unparseable level falls
/// back to `info` with a warning instead of aborting startup.
pub fn init(log_level: &str, progress: &ProgressBar) {
    let (env_filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(log_level) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new("info"), Some(e)),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(ProgressWriter::new(progress.clone()))
        .init();

    if let Some(e) = rejected {
        tracing::warn!(log_level, error = %e, "invalid log level, using info");
    }
}
