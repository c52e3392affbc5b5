//! Ballot Registry
//!
//! An owner-gated registry of named candidates with per-candidate vote
//! tallies. Every successful mutation is published to a notification sink.

pub mod config;
pub mod errors;
pub mod notification;
pub mod registry;
pub mod shared;
pub mod types;

// Re-export commonly used types
pub use errors::{Error, Result};
pub use notification::{Notification, NotificationLog, NotificationSink, TracingSink};
pub use registry::BallotRegistry;
pub use shared::SharedRegistry;
pub use types::{Candidate, CandidateId, Identity, VoteResult};

use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from `RUST_LOG`, defaulting to `ballot=info`
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ballot=info".into()),
        )
        .try_init()
        .map_err(|e| crate::internal_error!("Failed to install subscriber: {}", e))?;

    tracing::info!("🗳️  Ballot registry v{} initialized", VERSION);
    Ok(())
}

/// Initialize logging from explicit configuration
pub fn init_with(logging: &config::LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&logging.level)
        .map_err(|e| crate::config_error!("Invalid LOG_LEVEL {:?}: {}", logging.level, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match logging.format.as_str() {
        "json" => builder.json().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };
    installed.map_err(|e| crate::internal_error!("Failed to install subscriber: {}", e))?;

    tracing::info!(
        "🗳️  Ballot registry v{} initialized (format={})",
        VERSION,
        logging.format
    );
    Ok(())
}
