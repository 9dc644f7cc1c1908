use super::{Provider, base_dir, secret_file};
use crate::{Result, SecretInjectError};
use secretinject_core::SecretValues;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Configuration for the dotenv provider.
///
/// Secrets for the path `apps/deployment` live in
/// `<dir>/apps/deployment.env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotEnvConfig {
    pub dir: PathBuf,
}

impl Default for DotEnvConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl DotEnvConfig {
    pub fn from_path_string(path: &str) -> Self {
        Self {
            dir: PathBuf::from(path),
        }
    }
}

impl TryFrom<&Url> for DotEnvConfig {
    type Error = SecretInjectError;

    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "dotenv" {
            return Err(SecretInjectError::ProviderOperationFailed(format!(
                "Invalid scheme '{}' for dotenv provider",
                url.scheme()
            )));
        }

        Ok(Self { dir: base_dir(url) })
    }
}

/// Provider reading one `.env` file per secret path.
///
/// Every value is a string; use the file provider when placeholders must
/// resolve to numbers or booleans.
pub struct DotEnvProvider {
    config: DotEnvConfig,
}

impl DotEnvProvider {
    pub fn new(config: DotEnvConfig) -> Self {
        Self { config }
    }
}

impl Provider for DotEnvProvider {
    fn fetch(&self, path: &str) -> Result<SecretValues> {
        let file = secret_file(&self.config.dir, path, "env")?;
        if !file.is_file() {
            return Err(SecretInjectError::SecretPathNotFound(path.to_string()));
        }

        let mut values = SecretValues::new();
        for item in dotenvy::from_path_iter(&file)? {
            let (key, value) = item?;
            values.insert(key, value);
        }

        debug!(file = %file.display(), keys = values.len(), "loaded dotenv secrets");
        Ok(values)
    }

    fn name(&self) -> &'static str {
        "dotenv"
    }

    fn description(&self) -> &'static str {
        "One .env file per secret path"
    }
}
