use super::{Provider, base_dir, secret_file};
use crate::{Result, SecretInjectError};
use secretinject_core::{SecretValues, Value};
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Extensions tried, in order, for a secret path.
const EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Configuration for the structured file provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub dir: PathBuf,
}

impl TryFrom<&Url> for FileConfig {
    type Error = SecretInjectError;

    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "file" {
            return Err(SecretInjectError::ProviderOperationFailed(format!(
                "Invalid scheme '{}' for file provider",
                url.scheme()
            )));
        }

        Ok(Self { dir: base_dir(url) })
    }
}

/// Provider reading one YAML or JSON mapping per secret path.
///
/// Values keep their types, so `replicas: 3` in the secret file turns the
/// template string `"<replicas>"` into the integer `3`.
pub struct FileProvider {
    config: FileConfig,
}

impl FileProvider {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }
}

impl Provider for FileProvider {
    fn fetch(&self, path: &str) -> Result<SecretValues> {
        for extension in EXTENSIONS {
            let file = secret_file(&self.config.dir, path, extension)?;
            if !file.is_file() {
                continue;
            }

            let content = fs::read_to_string(&file)?;
            let value: Value = if *extension == "json" {
                serde_json::from_str(&content)?
            } else {
                serde_yaml::from_str(&content)?
            };

            let values = match value {
                Value::Mapping(map) => SecretValues::from(map),
                Value::Null => SecretValues::new(),
                other => {
                    return Err(SecretInjectError::ProviderOperationFailed(format!(
                        "Secret file {} must hold a mapping, found a {}",
                        file.display(),
                        other.kind()
                    )));
                }
            };

            debug!(file = %file.display(), keys = values.len(), "loaded file secrets");
            return Ok(values);
        }

        Err(SecretInjectError::SecretPathNotFound(path.to_string()))
    }

    fn name(&self) -> &'static str {
        "file"
    }

    fn description(&self) -> &'static str {
        "YAML or JSON file per secret path, value types preserved"
    }
}
