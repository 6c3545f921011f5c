//! Tracing subscriber bootstrap.

use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LEVEL: &str = "info,tower_http=debug";

/// Initialize the global tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_LEVEL`]. Subsequent calls are
/// no-ops.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails harmlessly if a subscriber is already installed
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
        tracing::info!(target: "darkroom_server", "still logging");
    }
}
