//! Loading manifests from disk and rendering them back to YAML.

use crate::{Result, SecretInjectError};
use secretinject_core::Value;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Annotation overriding the secret path of a manifest.
pub const PATH_ANNOTATION: &str = "secretinject.io/path";

/// One YAML document read from a manifest file.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// File the document was read from.
    pub source: PathBuf,
    /// Position of the document within its file, starting at 0.
    pub index: usize,
    pub value: Value,
}

impl Manifest {
    /// The `kind` field, when present.
    pub fn kind(&self) -> Option<&str> {
        self.value.get("kind").and_then(Value::as_str)
    }

    /// A `metadata.annotations` entry, when present and a string.
    pub fn annotation(&self, name: &str) -> Option<&str> {
        self.value
            .get("metadata")
            .and_then(|m| m.get("annotations"))
            .and_then(|a| a.get(name))
            .and_then(Value::as_str)
    }

    /// Secret path this manifest is resolved against.
    ///
    /// The path annotation wins; otherwise the lower-cased kind, below
    /// `path_prefix` when one is configured. `None` when the manifest has
    /// neither.
    pub fn secret_path(&self, path_prefix: Option<&str>) -> Option<String> {
        if let Some(path) = self.annotation(PATH_ANNOTATION) {
            return Some(path.to_string());
        }

        let kind = self.kind()?.to_lowercase();
        match path_prefix.map(|p| p.trim_end_matches('/')) {
            Some(prefix) if !prefix.is_empty() => Some(format!("{}/{}", prefix, kind)),
            _ => Some(kind),
        }
    }

    /// Human-readable location, `path` or `path#index` for later documents.
    pub fn location(&self) -> String {
        if self.index == 0 {
            self.source.display().to_string()
        } else {
            format!("{}#{}", self.source.display(), self.index)
        }
    }
}

/// Lists the manifest files below `path`.
///
/// A file is returned as is. A directory is searched recursively for `.yaml`
/// and `.yml` files, returned sorted by path.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|source| SecretInjectError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_yaml(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(SecretInjectError::NoManifests(path.to_path_buf()));
    }
    debug!(path = %path.display(), files = files.len(), "discovered manifest files");
    Ok(files)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parses every non-empty YAML document of `content`.
pub fn parse(source: &Path, content: &str) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(document).map_err(|e| SecretInjectError::InvalidManifest {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;
        if value == Value::Null {
            continue;
        }
        manifests.push(Manifest {
            source: source.to_path_buf(),
            index,
            value,
        });
    }
    Ok(manifests)
}

/// Reads and parses every file.
pub fn load(files: &[PathBuf]) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::new();
    for file in files {
        let content = fs::read_to_string(file)?;
        let parsed = parse(file, &content)?;
        debug!(file = %file.display(), documents = parsed.len(), "loaded manifest file");
        manifests.extend(parsed);
    }
    Ok(manifests)
}

/// Renders one document as YAML.
pub fn to_yaml(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Renders documents as a YAML stream, each followed by a `---` line.
pub fn render_stream<'a, I>(values: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut output = String::new();
    for value in values {
        output.push_str(&to_yaml(value)?);
        output.push_str("---\n");
    }
    Ok(output)
}
