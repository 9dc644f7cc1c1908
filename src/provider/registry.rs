use crate::provider::{
    DotEnvConfig, DotEnvProvider, EnvConfig, EnvProvider, FileConfig, FileProvider, Provider,
};
use crate::{Result, SecretInjectError};
use url::Url;

#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub examples: Vec<&'static str>,
}

impl ProviderInfo {
    pub fn display_with_examples(&self) -> String {
        if self.examples.is_empty() {
            format!("{}: {}", self.name, self.description)
        } else {
            format!(
                "{}: {} (e.g., {})",
                self.name,
                self.description,
                self.examples.join(", ")
            )
        }
    }
}

pub struct ProviderRegistry;

impl ProviderRegistry {
    pub fn providers() -> Vec<ProviderInfo> {
        vec![
            ProviderInfo {
                name: "env",
                description: "Read-only environment variables",
                examples: vec!["env://", "env://?prefix=APP_"],
            },
            ProviderInfo {
                name: "dotenv",
                description: "One .env file per secret path",
                examples: vec!["dotenv:/etc/secretinject/secrets", "dotenv://secrets"],
            },
            ProviderInfo {
                name: "file",
                description: "YAML or JSON file per secret path, value types preserved",
                examples: vec!["file:///etc/secretinject/secrets", "file:secrets"],
            },
        ]
    }

    pub fn get_info(name: &str) -> Option<ProviderInfo> {
        Self::providers().into_iter().find(|p| p.name == name)
    }

    pub fn create_from_string(s: &str) -> Result<Box<dyn Provider>> {
        // Filesystem providers accept a bare path after the colon
        if !s.contains("://") {
            if let Some(path) = s.strip_prefix("dotenv:") {
                let config = if path.is_empty() {
                    DotEnvConfig::default()
                } else {
                    DotEnvConfig::from_path_string(path)
                };
                return Ok(Box::new(DotEnvProvider::new(config)));
            }
            if let Some(path) = s.strip_prefix("file:").filter(|p| !p.is_empty()) {
                let config = FileConfig {
                    dir: path.into(),
                };
                return Ok(Box::new(FileProvider::new(config)));
            }
        }

        // Normalize the input to ensure it's a valid URI
        let normalized = if s.contains("://") {
            s.to_string()
        } else if let Some(name) = s.strip_suffix(':') {
            format!("{}://", name)
        } else {
            format!("{}://", s)
        };

        let url = Url::parse(&normalized).map_err(|e| {
            SecretInjectError::ProviderOperationFailed(format!(
                "Invalid provider specification '{}': {}",
                s, e
            ))
        })?;

        match url.scheme() {
            "env" => Ok(Box::new(EnvProvider::new(EnvConfig::try_from(&url)?))),
            "dotenv" => Ok(Box::new(DotEnvProvider::new(DotEnvConfig::try_from(&url)?))),
            "file" => Ok(Box::new(FileProvider::new(FileConfig::try_from(&url)?))),
            scheme => Err(SecretInjectError::ProviderNotFound(scheme.to_string())),
        }
    }
}
