//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of a run so `main` can
//! propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: unrest_core::ConfigError,
    },

    /// Writing an output file failed.
    #[error("output error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing a record failed.
    #[error("serialization error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
