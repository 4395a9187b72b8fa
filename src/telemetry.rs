//! Log output for the `qrlive` binary.
//!
//! Events go to stderr so they never interleave with the symbols printed on
//! stdout. The level defaults to `info` and follows `RUST_LOG` when set, e.g.
//!
//! ```bash
//! RUST_LOG=qrlive=trace qrlive
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;

    Ok(())
}
