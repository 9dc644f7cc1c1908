//! # Provider System
//!
//! Providers fetch the secret values a manifest is resolved against. A
//! provider is addressed with a URI-style specification and returns the whole
//! table stored at a secret path; the substitution engine only ever sees that
//! table.
//!
//! ## Available Providers
//!
//! - [`EnvProvider`]: process environment variables, optionally filtered by prefix
//! - [`DotEnvProvider`]: one `.env` file per secret path
//! - [`FileProvider`]: one YAML or JSON file per secret path, value types preserved
//!
//! ```text
//! env://?prefix=APP_
//! dotenv:/etc/secretinject/secrets
//! file:///etc/secretinject/secrets
//! ```

use crate::{Result, SecretInjectError};
use secretinject_core::SecretValues;
use std::path::{Component, Path, PathBuf};
use url::Url;

pub mod dotenv;
pub mod env;
pub mod file;
pub mod registry;


pub use dotenv::{DotEnvConfig, DotEnvProvider};
pub use env::{EnvConfig, EnvProvider};
pub use file::{FileConfig, FileProvider};
pub use registry::{ProviderInfo, ProviderRegistry};

/// Trait defining the interface for secrets backends.
///
/// Providers must be `Send + Sync`: one provider serves every manifest of an
/// invocation, and manifests may be resolved on several threads.
pub trait Provider: Send + Sync {
    /// Returns every secret value stored at `path`.
    ///
    /// A path that does not exist is an error
    /// ([`SecretInjectError::SecretPathNotFound`]); an existing but empty
    /// path is an empty table.
    fn fetch(&self, path: &str) -> Result<SecretValues>;

    /// Returns the name of this provider for display purposes
    fn name(&self) -> &'static str;

    /// Returns a brief description of this provider
    fn description(&self) -> &'static str;
}

/// Joins a secret path below `dir`, refusing paths that would leave it.
pub(crate) fn secret_file(dir: &Path, path: &str, extension: &str) -> Result<PathBuf> {
    let relative = Path::new(path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.is_empty() || escapes {
        return Err(SecretInjectError::ProviderOperationFailed(format!(
            "Invalid secret path '{}'",
            path
        )));
    }
    Ok(dir.join(format!("{}.{}", path, extension)))
}

/// Directory named by a provider URI.
///
/// `dotenv:///etc/secrets` and `dotenv://localhost/etc/secrets` name an
/// absolute directory; `dotenv://secrets` names `secrets` relative to the
/// working directory. An empty URI names the working directory.
pub(crate) fn base_dir(url: &Url) -> PathBuf {
    let host = url.host_str().filter(|h| !h.is_empty() && *h != "localhost");
    let path = url.path();
    match host {
        Some(host) => PathBuf::from(format!("{}{}", host, path)),
        None if path.is_empty() => PathBuf::from("."),
        None => PathBuf::from(path),
    }
}
