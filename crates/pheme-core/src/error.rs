use thiserror::Error;

/// Application-wide error types for Pheme.
///
/// Only *hard* failures are represented here. Expected absences (a consent
/// banner that never shows, a missing language filter, a "next" control
/// that is gone or disabled) are modeled as `Option`/`bool` returns at the
/// call site and never become errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Navigating the browser page to a URL failed.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// The browser session itself misbehaved (CDP fault, dead handler).
    #[error("Browser driver error: {0}")]
    Driver(String),

    /// A page element the scrape depends on was missing or unreadable.
    #[error("Extraction error: {0}")]
    Extract(String),

    /// A review fragment's raw data could not be decoded into a `Review`.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The input entity list could not be loaded.
    #[error("Input error: {0}")]
    Input(String),

    /// Writing the checkpoint artifact failed.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The whole-run retry budget is spent.
    #[error("Scrape failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}
