//! Error types for the aggregation engine

use thiserror::Error;

use crate::model::{ConsoleId, ConsoleSource, GameId};

/// Aggregation error
#[derive(Debug, Error)]
pub enum HubError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// A fetched game references a console absent from the registry
    #[error("Console {console_id} not found for {catalog}")]
    MissingConsole {
        catalog: ConsoleSource,
        console_id: ConsoleId,
    },

    /// No adapter registered for the requested source
    #[error("No adapter registered for {0}")]
    NoAdapter(ConsoleSource),

    /// The console owning a game has no resolvable adapter
    #[error("No adapter can serve game {game_id} of console {console_id}")]
    NoAdapterForGame {
        console_id: ConsoleId,
        game_id: GameId,
    },

    /// One or more adapters failed during a fan-out
    #[error("{operation} failed for {}", format_failures(.failures))]
    PartialFailure {
        operation: &'static str,
        failures: Vec<(ConsoleSource, String)>,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

fn format_failures(failures: &[(ConsoleSource, String)]) -> String {
    failures
        .iter()
        .map(|(source, reason)| format!("{} ({})", source, reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for aggregation operations
pub type Result<T> = std::result::Result<T, HubError>;
