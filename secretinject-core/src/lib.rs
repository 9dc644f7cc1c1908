//! # secretinject core
//!
//! The placeholder substitution engine behind `secretinject`.
//!
//! A template is any tree of mappings, sequences and scalars. Every string
//! scalar is scanned for placeholders (`<key>`), and each key is looked up in
//! a table of secret values that was resolved beforehand:
//!
//! - a string that is exactly one placeholder is replaced by the secret value
//!   with its own type, so `replicas: <replicas>` can become an integer;
//! - placeholders embedded in other text are spliced in as text;
//! - missing keys leave the placeholder untouched and are reported, one
//!   record per occurrence, without stopping the pass.
//!
//! This crate performs no I/O. Loading documents, fetching secrets and
//! rendering output belong to the `secretinject` crate.
//!
//! ```
//! use secretinject_core::{Document, SecretValues, Value};
//!
//! let template: Value = serde_yaml::from_str(
//!     "image: foo.io/<name>:<tag>\nreplicas: <replicas>",
//! ).unwrap();
//!
//! let mut secrets = SecretValues::new();
//! secrets.insert("name", "app");
//! secrets.insert("tag", "latest");
//! secrets.insert("replicas", 3i64);
//!
//! let resolved = Document::new(template, &secrets).into_result().unwrap();
//! assert_eq!(resolved.get("image"), Some(&Value::from("foo.io/app:latest")));
//! assert_eq!(resolved.get("replicas"), Some(&Value::Integer(3)));
//! ```

mod document;
mod errors;
mod placeholder;
mod resolver;
mod value;
mod walker;

pub use document::Document;
pub use errors::{ResolutionErrors, Segment, UnresolvedPlaceholder, ValuePath};
pub use placeholder::{Placeholder, PlaceholderSyntax};
pub use resolver::{Resolve, SecretValues};
pub use value::{Mapping, Value};
pub use walker::{Walker, resolve};
