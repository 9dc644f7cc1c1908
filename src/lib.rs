//! # secretinject
//!
//! Injects secret values into YAML manifests.
//!
//! Manifests are read from a file or a directory, each document is mapped to
//! a secret path, the secrets stored at that path are fetched from a
//! [`provider`], and every `<key>` placeholder is replaced by the
//! [`secretinject_core`] engine. The result is printed as one YAML stream.
//!
//! ```no_run
//! use secretinject::{Config, ConfigSources};
//! use std::path::Path;
//!
//! let config = Config::load(&ConfigSources {
//!     provider: Some("file:///etc/secretinject/secrets".to_string()),
//!     ..ConfigSources::default()
//! })?;
//! let output = secretinject::generate(Path::new("manifests/"), &config)?;
//! print!("{}", output);
//! # Ok::<(), secretinject::SecretInjectError>(())
//! ```

pub mod config;
mod error;
pub mod generate;
pub mod manifest;
pub mod provider;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Config, ConfigSources};
pub use error::{Result, SecretInjectError};
pub use generate::{Resolved, generate, resolve_manifests};
pub use manifest::Manifest;

pub use secretinject_core::{
    Document, PlaceholderSyntax, ResolutionErrors, Resolve, SecretValues, UnresolvedPlaceholder,
    Value, ValuePath,
};
