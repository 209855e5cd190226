//! Error types for gguf-warden.

use std::path::PathBuf;

use thiserror::Error;

/// gguf-warden error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Reference string has an empty repository id or variant
    #[error("Invalid model reference '{0}': expected owner/repo[:variant]")]
    InvalidReference(String),

    /// No reference was configured and the artifact is not on disk
    #[error("No model reference configured and no local artifact at {}", .path.display())]
    NoReference { path: PathBuf },

    /// Every candidate filename came back not-found
    #[error("{}", describe_exhaustion(.reference, .tried, .available.as_deref()))]
    CandidateExhausted {
        reference: String,
        tried: Vec<String>,
        available: Option<Vec<String>>,
    },

    /// List mode found nothing with the artifact extension
    #[error("Repository {repo} has no {extension} files")]
    EmptyRepository { repo: String, extension: String },

    /// Transport failure talking to the hub
    #[error("Network error for {location}: {source}")]
    Network {
        location: String,
        #[source]
        source: crate::model::hub::HubError,
    },

    /// Filesystem failure while persisting the artifact
    #[error("Failed to write {}: {source}", .path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Server or process manager could not be started
    #[error("Launch error: {0}")]
    Launch(#[from] crate::engine::launcher::LaunchError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process manager config template error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gguf-warden operations.
pub type Result<T> = std::result::Result<T, Error>;

fn describe_exhaustion(reference: &str, tried: &[String], available: Option<&[String]>) -> String {
    let mut message = format!(
        "No artifact found for '{}'; tried: {}",
        reference,
        tried.join(", ")
    );
    match available {
        Some([]) => message.push_str("; repository lists no matching files"),
        Some(files) => {
            message.push_str("; available: ");
            message.push_str(&files.join(", "));
        }
        None => {}
    }
    message
}
