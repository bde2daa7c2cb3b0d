//! Tracing subscriber setup.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs a stderr subscriber.
///
/// `RUST_LOG` directives are honored; `--verbose` raises the floor to
/// DEBUG, otherwise only warnings are shown.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
