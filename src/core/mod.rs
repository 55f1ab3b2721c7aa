//! Core module - session state, configuration, and progress aggregation

pub mod config;
pub mod progress;
pub mod session;

pub use config::{Config, ConfigError, MinterConfig};
pub use progress::{ProgressId, ProgressRegistry, ProgressSink, TransferProgress};
pub use session::ProjectSession;
