//! Scenario-layer error types.

/// Errors raised while loading configuration or scenario documents. All of
/// these are fatal at startup; nothing here escapes into the running
/// simulation.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The configuration or scenario file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is present but not valid JSON.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The scenario document is missing a mandatory section.
    #[error("scenario document missing mandatory section: {0}")]
    Schema(String),
}
