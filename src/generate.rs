//! The `generate` pipeline: discover manifests, fetch their secrets, resolve
//! every placeholder and render the result.

use crate::config::Config;
use crate::manifest::{self, Manifest};
use crate::provider::{Provider, ProviderRegistry};
use crate::{Result, SecretInjectError};
use rayon::prelude::*;
use secretinject_core::{Document, ResolutionErrors, SecretValues, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// One manifest after its resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// `path` or `path#index` of the source document.
    pub location: String,
    pub value: Value,
    pub errors: ResolutionErrors,
}

impl Resolved {
    pub fn is_resolved(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolves every manifest found below `path` and renders them as one YAML
/// stream.
///
/// Nothing is rendered when a placeholder is left unresolved: the error lists
/// every failure of every manifest.
pub fn generate(path: &Path, config: &Config) -> Result<String> {
    let files = manifest::discover(path)?;
    let manifests = manifest::load(&files)?;
    let provider = ProviderRegistry::create_from_string(config.provider_spec()?)?;
    info!(
        files = files.len(),
        documents = manifests.len(),
        provider = provider.name(),
        "generating manifests"
    );

    let resolved = resolve_manifests(manifests, provider.as_ref(), config)?;

    let unresolved: Vec<(String, ResolutionErrors)> = resolved
        .iter()
        .filter(|r| !r.is_resolved())
        .map(|r| (r.location.clone(), r.errors.clone()))
        .collect();
    if !unresolved.is_empty() {
        return Err(SecretInjectError::Unresolved(unresolved));
    }

    manifest::render_stream(resolved.iter().map(|r| &r.value))
}

/// Runs the resolution pass over each manifest, keeping input order.
///
/// Secrets are fetched once per distinct secret path. A path the provider
/// does not know resolves as an empty table, so its placeholders are
/// reported individually rather than aborting the run.
pub fn resolve_manifests(
    manifests: Vec<Manifest>,
    provider: &dyn Provider,
    config: &Config,
) -> Result<Vec<Resolved>> {
    let syntax = config.syntax()?;
    let prefix = config.path_prefix.as_deref();

    let paths: Vec<Option<String>> = manifests.iter().map(|m| m.secret_path(prefix)).collect();
    let tables = fetch_tables(provider, paths.iter().flatten())?;
    let empty = SecretValues::new();

    let resolved = manifests
        .into_par_iter()
        .zip(paths.into_par_iter())
        .map(|(manifest, path)| {
            let location = manifest.location();
            let secrets = path.as_ref().and_then(|p| tables.get(p)).unwrap_or(&empty);

            let mut document = Document::new(manifest.value, secrets).with_syntax(syntax);
            document.replace();
            let (value, errors) = document.into_parts();

            for error in &errors {
                warn!(location = %location, key = %error.key, path = %error.path, "unresolved placeholder");
            }
            debug!(location = %location, secret_path = ?path, errors = errors.len(), "resolved manifest");

            Resolved {
                location,
                value,
                errors,
            }
        })
        .collect();

    Ok(resolved)
}

fn fetch_tables<'a, I>(provider: &dyn Provider, paths: I) -> Result<HashMap<String, SecretValues>>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut tables = HashMap::new();
    for path in paths {
        if tables.contains_key(path) {
            continue;
        }
        let table = match provider.fetch(path) {
            Ok(table) => table,
            Err(SecretInjectError::SecretPathNotFound(missing)) => {
                warn!(secret_path = %missing, provider = provider.name(), "secret path not found");
                SecretValues::new()
            }
            Err(e) => return Err(e),
        };
        debug!(secret_path = %path, values = table.len(), "fetched secrets");
        tables.insert(path.clone(), table);
    }
    Ok(tables)
}
