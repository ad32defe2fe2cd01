use tracing_subscriber::fmt::{self, MakeWriter, TestWriter};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Install a subscriber printing fixture logs to stderr.
///
/// `RUST_LOG` selects the level, defaulting to "info". Fails if a global
/// subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    install("info", std::io::stderr)
}

/// Route fixture logs through the test harness's captured output.
///
/// Defaults to "warn" so only cleanup problems show up unless `RUST_LOG`
/// asks for more. Safe to call from every test; only the first call
/// installs a subscriber.
pub fn init_for_tests() {
    let _ = install("warn", TestWriter::new());
}

fn install<W>(default_directive: &str, writer: W) -> Result<(), TryInitError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
}
