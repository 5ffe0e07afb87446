use crate::utils::error::{ReaderError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("view_reader=debug,info")
        } else {
            EnvFilter::new("view_reader=info")
        }
    })
}

pub fn init_logger(verbose: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| ReaderError::ConfigError {
            message: format!("logger already initialised: {}", e),
        })
}

/// JSON output for log collectors; honours `RUST_LOG` like [`init_logger`].
pub fn init_json_logger() -> Result<()> {
    tracing_subscriber::registry()
        .with(default_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .try_init()
        .map_err(|e| ReaderError::ConfigError {
            message: format!("logger already initialised: {}", e),
        })
}
