use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive; drop it at process exit to flush.
#[derive(Debug)]
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

impl TelemetryGuard {
    fn disabled() -> Self {
        Self { _guard: None }
    }
}

/// Install the process subscriber. `RUST_LOG` overrides `default_level`;
/// `AXBRIDGE_LOG` redirects output to a file. Later calls are no-ops.
pub fn init_tracing(default_level: &str) -> TelemetryGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (writer, guard) = log_writer(log_file_path_from_env().as_deref());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_ansi(guard.is_none() && std::io::stderr().is_terminal())
        .with_writer(writer);

    if subscriber.try_init().is_err() {
        return TelemetryGuard::disabled();
    }

    TelemetryGuard { _guard: guard }
}

fn log_writer(path: Option<&Path>) -> (BoxMakeWriter, Option<WorkerGuard>) {
    let Some(path) = path else {
        return (BoxMakeWriter::new(std::io::stderr), None);
    };
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        Err(err) => {
            eprintln!(
                "Warning: failed to open log file {}: {}",
                path.display(),
                err
            );
            (BoxMakeWriter::new(std::io::stderr), None)
        }
    }
}

fn log_file_path_from_env() -> Option<PathBuf> {
    std::env::var("AXBRIDGE_LOG").ok().map(PathBuf::from)
}
