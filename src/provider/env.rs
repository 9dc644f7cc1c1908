use super::Provider;
use crate::{Result, SecretInjectError};
use secretinject_core::SecretValues;
use std::env;
use std::ffi::OsString;
use tracing::trace;
use url::Url;

/// Configuration for the environment variables provider.
///
/// `env://?prefix=APP_` keeps only variables starting with `APP_` and strips
/// the prefix, so `APP_TOKEN` answers the placeholder `<TOKEN>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub prefix: Option<String>,
}

impl TryFrom<&Url> for EnvConfig {
    type Error = SecretInjectError;

    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "env" {
            return Err(SecretInjectError::ProviderOperationFailed(format!(
                "Invalid scheme '{}' for env provider",
                url.scheme()
            )));
        }

        let prefix = url
            .query_pairs()
            .find(|(key, _)| key == "prefix")
            .map(|(_, value)| value.into_owned())
            .filter(|p| !p.is_empty());

        Ok(Self { prefix })
    }
}

/// A read-only provider backed by the process environment.
///
/// Environment variables are global to the process, so the secret path is
/// ignored: every manifest sees the same table.
pub struct EnvProvider {
    config: EnvConfig,
}

impl EnvProvider {
    pub fn new(config: EnvConfig) -> Self {
        Self { config }
    }

    /// Builds the table from an explicit set of variables.
    pub(crate) fn collect<I>(&self, vars: I) -> SecretValues
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| match &self.config.prefix {
                Some(prefix) => key
                    .strip_prefix(prefix.as_str())
                    .map(|stripped| (stripped.to_string(), value)),
                None => Some((key, value)),
            })
            .collect()
    }
}

/// Keeps the variables whose name and value are valid UTF-8.
pub(crate) fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                trace!(key = ?key, "skipping environment variable that is not valid UTF-8");
                None
            }
        })
}

/// The process environment, without variables that are not valid UTF-8.
pub(crate) fn process_vars() -> impl Iterator<Item = (String, String)> {
    utf8_vars(env::vars_os())
}

impl Provider for EnvProvider {
    fn fetch(&self, path: &str) -> Result<SecretValues> {
        trace!(path, "env provider ignores the secret path");
        Ok(self.collect(process_vars()))
    }

    fn name(&self) -> &'static str {
        "env"
    }

    fn description(&self) -> &'static str {
        "Read-only environment variables"
    }
}
