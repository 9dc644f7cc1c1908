//! Secret value lookup.

use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Looks a placeholder key up in a table of already-resolved secret values.
///
/// `None` means the key is absent. Implementations are pure lookups: no
/// coercion and no defaults.
pub trait Resolve {
    fn resolve(&self, key: &str) -> Option<&Value>;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, key: &str) -> Option<&Value> {
        (**self).resolve(key)
    }
}

impl Resolve for HashMap<String, Value> {
    fn resolve(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl Resolve for BTreeMap<String, Value> {
    fn resolve(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl Resolve for IndexMap<String, Value> {
    fn resolve(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// Flat table of secret values keyed by the names used in placeholders.
///
/// Keys are matched literally; a key such as `db.password` is one name, not a
/// path into a nested value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValues(IndexMap<String, Value>);

impl SecretValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Resolve for SecretValues {
    fn resolve(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SecretValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for SecretValues {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl From<IndexMap<String, Value>> for SecretValues {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl IntoIterator for SecretValues {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_found_and_missing() {
        let secrets: SecretValues = [("namespace", "default")].into_iter().collect();
        assert_eq!(secrets.resolve("namespace"), Some(&Value::from("default")));
        assert_eq!(secrets.resolve("replicas"), None);
    }

    #[test]
    fn test_resolve_is_literal() {
        let mut secrets = SecretValues::new();
        secrets.insert("db.password", "hunter2");
        assert_eq!(secrets.resolve("db.password"), Some(&Value::from("hunter2")));
        assert_eq!(secrets.resolve("db"), None);
        assert_eq!(secrets.resolve(" db.password"), None);
    }

    #[test]
    fn test_resolve_keeps_value_type() {
        let mut secrets = SecretValues::new();
        secrets.insert("replicas", 3i64);
        assert_eq!(secrets.resolve("replicas"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_resolve_for_std_maps() {
        let mut map = HashMap::new();
        map.insert("key".to_string(), Value::Bool(true));
        assert_eq!(map.resolve("key"), Some(&Value::Bool(true)));
        assert_eq!((&map).resolve("other"), None);
    }

    #[test]
    fn test_deserialize_transparent() {
        let secrets: SecretValues =
            serde_yaml::from_str("name: app\nreplicas: 2\n").unwrap();
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets.get("replicas"), Some(&Value::Integer(2)));
    }
}
