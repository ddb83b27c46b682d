//! Logging setup
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG` overrides the configured level.

use rad_core::LoggingConfig;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub fn init(config: &LoggingConfig, interactive: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer(interactive))
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

/// The terminal viewer draws on the same terminal as stderr, so its log
/// lines are discarded. Errors it hits are shown in the viewer's footer.
fn writer(interactive: bool) -> BoxMakeWriter {
    if interactive {
        BoxMakeWriter::new(std::io::sink)
    } else {
        BoxMakeWriter::new(std::io::stderr)
    }
}

