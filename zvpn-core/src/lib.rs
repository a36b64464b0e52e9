//! Core library for the zvpn supervisor
//!
//! This crate provides persisted state, supervision of the single tracked
//! OpenVPN client, interactive configuration selection and command dispatch.

pub mod error;

pub mod config;
pub mod process;
pub mod router;
pub mod selection;
pub mod state;

/// Initialize logging infrastructure
///
/// Sets up tracing with systemd journal logging when running under systemd.
/// Otherwise logs to stderr so stdout stays reserved for operator messages.
/// `ZVPN_LOG` accepts an `EnvFilter` directive; the default level is WARN.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_env("ZVPN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(filter)
                .try_init()?;
            return Ok(());
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
