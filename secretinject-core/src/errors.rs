//! Resolution failures.
//!
//! A pass never stops on a missing value. Every failed placeholder occurrence
//! becomes one [`UnresolvedPlaceholder`], and the records of a pass are kept
//! in traversal order in a [`ResolutionErrors`] list.

use std::fmt;
use thiserror::Error;

/// One step from a parent node to a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a node inside a document, e.g. `spec.containers[0].image`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuePath(Vec<Segment>);

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A placeholder whose key has no entry in the secret values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing secret value for placeholder '{key}' in string {path}: {text}")]
pub struct UnresolvedPlaceholder {
    /// Key named by the placeholder.
    pub key: String,
    /// Location of the string scalar holding the placeholder.
    pub path: ValuePath,
    /// The string scalar as it appeared in the template.
    pub text: String,
}

/// Ordered, append-only list of failures from one resolution pass.
///
/// Displays as one record per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join_lines(.0))]
pub struct ResolutionErrors(Vec<UnresolvedPlaceholder>);

impl ResolutionErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: UnresolvedPlaceholder) {
        self.0.push(error);
    }

    /// Appends all records of `other`, keeping their order.
    pub fn merge(&mut self, other: ResolutionErrors) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnresolvedPlaceholder> {
        self.0.iter()
    }

    /// Missing keys in record order, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.key.as_str())
    }
}

fn join_lines(errors: &[UnresolvedPlaceholder]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl IntoIterator for ResolutionErrors {
    type Item = UnresolvedPlaceholder;
    type IntoIter = std::vec::IntoIter<UnresolvedPlaceholder>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolutionErrors {
    type Item = &'a UnresolvedPlaceholder;
    type IntoIter = std::slice::Iter<'a, UnresolvedPlaceholder>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<UnresolvedPlaceholder> for ResolutionErrors {
    fn from_iter<I: IntoIterator<Item = UnresolvedPlaceholder>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
