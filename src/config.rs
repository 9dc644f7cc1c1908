//! # Configuration
//!
//! Settings come from four places, in increasing order of precedence:
//!
//! 1. a configuration secret (`--secret-name`), read from the directory the
//!    secret is mounted at, one file per key;
//! 2. a configuration file (`--config-path`, or the user config file when it
//!    exists) in YAML, JSON, TOML or envfile form;
//! 3. `SECRETINJECT_*` environment variables;
//! 4. command-line flags.
//!
//! ```yaml
//! provider: file:///etc/secretinject/secrets
//! path_prefix: apps/production
//! ```

use crate::provider::env::process_vars;
use crate::{Result, SecretInjectError};
use directories::ProjectDirs;
use secretinject_core::PlaceholderSyntax;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of every environment variable read by secretinject.
pub const ENV_PREFIX: &str = "SECRETINJECT_";

/// Directory configuration secrets are mounted under unless
/// `SECRETINJECT_SECRETS_DIR` says otherwise.
pub const DEFAULT_SECRETS_DIR: &str = "/var/run/secretinject";

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Provider specification, e.g. `env://`, `dotenv:/secrets`,
    /// `file:///etc/secretinject/secrets`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Prepended to the lower-cased manifest kind to build the secret path.
    #[serde(default, alias = "pathPrefix", skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
    #[serde(default, alias = "placeholderOpen", skip_serializing_if = "Option::is_none")]
    pub placeholder_open: Option<char>,
    #[serde(default, alias = "placeholderClose", skip_serializing_if = "Option::is_none")]
    pub placeholder_close: Option<char>,
}

/// Where [`Config::load`] should look.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Explicit configuration file; overrides the user config file.
    pub config_path: Option<PathBuf>,
    /// Name of a mounted configuration secret.
    pub secret_name: Option<String>,
    /// Provider given on the command line.
    pub provider: Option<String>,
}

impl Config {
    /// Loads and merges every configuration source.
    pub fn load(sources: &ConfigSources) -> Result<Self> {
        let mut config = Config {
            provider: sources.provider.clone(),
            ..Config::default()
        };

        config.merge_with(Self::from_env()?);

        let file = match &sources.config_path {
            Some(path) => Some(Self::from_path(path)?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(Self::from_path(&path)?),
                _ => None,
            },
        };
        if let Some(file) = file {
            config.merge_with(file);
        }

        if let Some(name) = &sources.secret_name {
            config.merge_with(Self::from_secret(name, &secrets_dir())?);
        }

        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Reads a configuration file, choosing the format from its extension.
    ///
    /// `.yaml`/`.yml`, `.json` and `.toml` are parsed as such; anything else
    /// is treated as an envfile.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "reading configuration file");

        let extension = path.extension().and_then(|e| e.to_str());
        match extension {
            Some("yaml") | Some("yml") => {
                if content.trim().is_empty() {
                    return Ok(Self::default());
                }
                Ok(serde_yaml::from_str(&content)?)
            }
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => {
                let mut pairs = Vec::new();
                for item in dotenvy::from_read_iter(content.as_bytes()) {
                    pairs.push(item?);
                }
                Self::from_pairs(pairs)
            }
        }
    }

    /// Reads `SECRETINJECT_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_pairs(process_vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)))
    }

    /// Reads a configuration secret mounted at `<secrets_dir>/<name>/`.
    ///
    /// Every regular file in that directory is one key of the secret, the
    /// file content its value. Hidden entries (the `..data` links Kubernetes
    /// creates) are skipped.
    pub fn from_secret(name: &str, secrets_dir: &Path) -> Result<Self> {
        let dir = secrets_dir.join(name);
        if !dir.is_dir() {
            return Err(SecretInjectError::ConfigSecretNotFound(name.to_string()));
        }

        let mut entries: Vec<_> = fs::read_dir(&dir)?.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut pairs = Vec::new();
        for entry in entries {
            let key = entry.file_name().to_string_lossy().to_string();
            if key.starts_with('.') || !entry.path().is_file() {
                continue;
            }
            let value = fs::read_to_string(entry.path())?;
            pairs.push((key, value.trim_end_matches(['\n', '\r']).to_string()));
        }

        debug!(secret = name, keys = pairs.len(), "read configuration secret");
        Self::from_pairs(pairs)
    }

    /// Builds a configuration from flat key/value pairs.
    ///
    /// Keys are matched without the `SECRETINJECT_` prefix and case-insensitively,
    /// so `SECRETINJECT_PATH_PREFIX`, `PATH_PREFIX` and `path_prefix` are the
    /// same setting. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Config::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let name = key.strip_prefix(ENV_PREFIX).unwrap_or(key).to_ascii_lowercase();
            let value = value.into();
            match name.as_str() {
                "provider" => config.provider = Some(value),
                "path_prefix" | "pathprefix" => config.path_prefix = Some(value),
                "placeholder_open" => config.placeholder_open = Some(parse_marker(key, &value)?),
                "placeholder_close" => config.placeholder_close = Some(parse_marker(key, &value)?),
                _ => debug!(key, "ignoring unknown configuration key"),
            }
        }
        Ok(config)
    }

    /// Fills every unset field from `other`; fields already set win.
    pub fn merge_with(&mut self, other: Config) {
        if self.provider.is_none() {
            self.provider = other.provider;
        }
        if self.path_prefix.is_none() {
            self.path_prefix = other.path_prefix;
        }
        if self.placeholder_open.is_none() {
            self.placeholder_open = other.placeholder_open;
        }
        if self.placeholder_close.is_none() {
            self.placeholder_close = other.placeholder_close;
        }
    }

    /// The provider specification, or an error when none is configured.
    pub fn provider_spec(&self) -> Result<&str> {
        self.provider
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(SecretInjectError::NoProviderConfigured)
    }

    /// Placeholder markers, defaulting to `<` and `>`.
    pub fn syntax(&self) -> Result<PlaceholderSyntax> {
        let default = PlaceholderSyntax::default();
        let open = self.placeholder_open.unwrap_or(default.open);
        let close = self.placeholder_close.unwrap_or(default.close);
        if open == '\n' || close == '\n' {
            return Err(SecretInjectError::InvalidConfig(
                "placeholder markers cannot be line breaks".to_string(),
            ));
        }
        Ok(PlaceholderSyntax::new(open, close))
    }
}

fn parse_marker(key: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SecretInjectError::InvalidConfig(format!(
            "{key} must be a single character, got '{value}'"
        ))),
    }
}

/// Path of the user configuration file, typically
/// `~/.config/secretinject/config.yaml` on Unix systems.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "secretinject").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Directory configuration secrets are mounted under.
pub fn secrets_dir() -> PathBuf {
    std::env::var_os(format!("{ENV_PREFIX}SECRETS_DIR"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_pairs_accepts_prefixed_and_bare_keys() {
        let config = Config::from_pairs([
            ("SECRETINJECT_PROVIDER", "env://"),
            ("path_prefix", "apps"),
            ("PLACEHOLDER_OPEN", "{"),
            ("unrelated", "x"),
        ])
        .unwrap();
        assert_eq!(config.provider.as_deref(), Some("env://"));
        assert_eq!(config.path_prefix.as_deref(), Some("apps"));
        assert_eq!(config.placeholder_open, Some('{'));
        assert_eq!(config.placeholder_close, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_environment_is_skipped() {
        use crate::provider::env::utf8_vars;
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("SECRETINJECT_PATH_PREFIX"), OsString::from_vec(vec![b'a', 0xff])),
            (OsString::from("SECRETINJECT_PROVIDER"), OsString::from("env://")),
        ];
        let config = Config::from_pairs(utf8_vars(vars)).unwrap();
        assert_eq!(config.provider.as_deref(), Some("env://"));
        assert_eq!(config.path_prefix, None);
    }

    #[test]
    fn test_from_pairs_rejects_long_marker() {
        let err = Config::from_pairs([("placeholder_close", "}}")]).unwrap_err();
        assert!(err.to_string().contains("single character"));
    }

    #[test]
    fn test_from_path_by_extension() {
        let temp_dir = TempDir::new().unwrap();

        let yaml = temp_dir.path().join("config.yaml");
        fs::write(&yaml, "provider: env://\npathPrefix: apps\n").unwrap();
        let config = Config::from_path(&yaml).unwrap();
        assert_eq!(config.provider.as_deref(), Some("env://"));
        assert_eq!(config.path_prefix.as_deref(), Some("apps"));

        let json = temp_dir.path().join("config.json");
        fs::write(&json, r#"{"provider": "dotenv:/secrets"}"#).unwrap();
        assert_eq!(
            Config::from_path(&json).unwrap().provider.as_deref(),
            Some("dotenv:/secrets")
        );

        let toml = temp_dir.path().join("config.toml");
        fs::write(&toml, "provider = \"file:///srv\"\nplaceholder_open = \"{\"\n").unwrap();
        let config = Config::from_path(&toml).unwrap();
        assert_eq!(config.provider.as_deref(), Some("file:///srv"));
        assert_eq!(config.placeholder_open, Some('{'));

        let envfile = temp_dir.path().join("config.env");
        fs::write(&envfile, "SECRETINJECT_PROVIDER=env://\nPATH_PREFIX=team\n").unwrap();
        let config = Config::from_path(&envfile).unwrap();
        assert_eq!(config.provider.as_deref(), Some("env://"));
        assert_eq!(config.path_prefix.as_deref(), Some("team"));
    }

    #[test]
    fn test_from_secret_reads_mounted_keys() {
        let temp_dir = TempDir::new().unwrap();
        let secret = temp_dir.path().join("secretinject-config");
        fs::create_dir_all(&secret).unwrap();
        fs::write(secret.join("PROVIDER"), "env://\n").unwrap();
        fs::write(secret.join("PATH_PREFIX"), "apps").unwrap();
        fs::write(secret.join("..data"), "ignored").unwrap();

        let config = Config::from_secret("secretinject-config", temp_dir.path()).unwrap();
        assert_eq!(config.provider.as_deref(), Some("env://"));
        assert_eq!(config.path_prefix.as_deref(), Some("apps"));
    }

    #[test]
    fn test_from_secret_missing() {
        let temp_dir = TempDir::new().unwrap();
        match Config::from_secret("absent", temp_dir.path()) {
            Err(SecretInjectError::ConfigSecretNotFound(name)) => assert_eq!(name, "absent"),
            other => panic!("Expected ConfigSecretNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_keeps_higher_precedence() {
        let mut config = Config {
            provider: Some("env://".into()),
            ..Config::default()
        };
        config.merge_with(Config {
            provider: Some("dotenv:/x".into()),
            path_prefix: Some("apps".into()),
            ..Config::default()
        });
        assert_eq!(config.provider.as_deref(), Some("env://"));
        assert_eq!(config.path_prefix.as_deref(), Some("apps"));
    }

    #[test]
    fn test_load_flag_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "provider: dotenv:/from-file\npath_prefix: file\n").unwrap();

        let sources = ConfigSources {
            config_path: Some(path),
            secret_name: None,
            provider: Some("file:///from-flag".into()),
        };
        let config = Config::load(&sources).unwrap();
        assert_eq!(config.provider.as_deref(), Some("file:///from-flag"));
        assert!(config.path_prefix.is_some());
    }

    #[test]
    fn test_provider_spec_required() {
        assert!(matches!(
            Config::default().provider_spec(),
            Err(SecretInjectError::NoProviderConfigured)
        ));
    }

    #[test]
    fn test_syntax_defaults() {
        let syntax = Config::default().syntax().unwrap();
        assert_eq!(syntax, PlaceholderSyntax::default());
    }
}
