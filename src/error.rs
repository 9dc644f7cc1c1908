//! Error types for secretinject operations

use secretinject_core::ResolutionErrors;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for secretinject operations
///
/// Resolution failures inside a single document are not errors of this type;
/// they are collected per document and only surface here, all at once, as
/// [`SecretInjectError::Unresolved`].
#[derive(Error, Debug)]
pub enum SecretInjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Could not walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("No YAML files were found in {}", .0.display())]
    NoManifests(PathBuf),
    #[error("Could not read {}: {message}", .path.display())]
    InvalidManifest { path: PathBuf, message: String },
    #[error(
        "No provider backend configured.\n\nTo fix this, either:\n  1. Set `provider` in a config file passed with --config-path\n  2. Use --provider flag or SECRETINJECT_PROVIDER (e.g., 'secretinject generate --provider env:// ./manifests')"
    )]
    NoProviderConfigured,
    #[error("Provider backend '{0}' not found")]
    ProviderNotFound(String),
    #[error("Provider operation failed: {0}")]
    ProviderOperationFailed(String),
    #[error("Secret path '{0}' not found")]
    SecretPathNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration secret '{0}' not found")]
    ConfigSecretNotFound(String),
    #[error("{} placeholder(s) could not be resolved:\n{}", count_errors(.0), format_unresolved(.0))]
    Unresolved(Vec<(String, ResolutionErrors)>),
}

/// A type alias for `Result<T, SecretInjectError>`
pub type Result<T> = std::result::Result<T, SecretInjectError>;

fn count_errors(unresolved: &[(String, ResolutionErrors)]) -> usize {
    unresolved.iter().map(|(_, errors)| errors.len()).sum()
}

fn format_unresolved(unresolved: &[(String, ResolutionErrors)]) -> String {
    unresolved
        .iter()
        .flat_map(|(location, errors)| {
            errors
                .iter()
                .map(move |error| format!("  {}: {}", location, error))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
