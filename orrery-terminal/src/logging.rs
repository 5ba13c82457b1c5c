/// Logging initialization.
use orrery_core::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The render loop owns the terminal, so logs go to `log_file` when one is
/// given (default level `info`) and otherwise only warnings reach stderr.
/// `RUST_LOG` overrides either default.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter_or("info,orrery_core=debug"))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter_or("warn"))
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
