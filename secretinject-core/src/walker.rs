//! Structural walk and string substitution.
//!
//! The walk rebuilds the tree bottom-up: every call takes ownership of a node,
//! returns the resolved node together with the failures found below it, and
//! the parent merges those lists in traversal order. Mapping keys, mapping
//! order and sequence length never change; only leaf scalars do.

use crate::errors::{ResolutionErrors, Segment, UnresolvedPlaceholder, ValuePath};
use crate::placeholder::PlaceholderSyntax;
use crate::resolver::Resolve;
use crate::value::{Mapping, Value};
use tracing::trace;

/// Resolves placeholders of one tree against one secret table.
pub struct Walker<'a, R: Resolve + ?Sized> {
    resolver: &'a R,
    syntax: PlaceholderSyntax,
    path: ValuePath,
}

impl<'a, R: Resolve + ?Sized> Walker<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self::with_syntax(resolver, PlaceholderSyntax::default())
    }

    pub fn with_syntax(resolver: &'a R, syntax: PlaceholderSyntax) -> Self {
        Self {
            resolver,
            syntax,
            path: ValuePath::root(),
        }
    }

    /// Walks `value` and returns the resolved tree with its failures.
    pub fn walk(&mut self, value: Value) -> (Value, ResolutionErrors) {
        match value {
            Value::Mapping(map) => self.walk_mapping(map),
            Value::Sequence(items) => self.walk_sequence(items),
            Value::String(s) => self.substitute(s),
            scalar => (scalar, ResolutionErrors::new()),
        }
    }

    fn walk_mapping(&mut self, map: Mapping) -> (Value, ResolutionErrors) {
        let mut errors = ResolutionErrors::new();
        let mut resolved = Mapping::with_capacity(map.len());

        for (key, child) in map {
            self.path.push(Segment::Key(key.clone()));
            let (child, child_errors) = self.walk(child);
            self.path.pop();

            errors.merge(child_errors);
            resolved.insert(key, child);
        }

        (Value::Mapping(resolved), errors)
    }

    fn walk_sequence(&mut self, items: Vec<Value>) -> (Value, ResolutionErrors) {
        let mut errors = ResolutionErrors::new();
        let mut resolved = Vec::with_capacity(items.len());

        for (index, child) in items.into_iter().enumerate() {
            self.path.push(Segment::Index(index));
            let (child, child_errors) = self.walk(child);
            self.path.pop();

            errors.merge(child_errors);
            resolved.push(child);
        }

        (Value::Sequence(resolved), errors)
    }

    /// Substitutes the placeholders of a string scalar.
    ///
    /// A string that is exactly one found placeholder takes the resolved
    /// value, type included. Otherwise found placeholders are spliced in as
    /// text and the result stays a string. Missing keys leave their
    /// placeholder text in place and yield one failure each.
    fn substitute(&mut self, s: String) -> (Value, ResolutionErrors) {
        let mut errors = ResolutionErrors::new();
        let found = self.syntax.scan(&s);

        if found.is_empty() {
            return (Value::String(s), errors);
        }

        if let [only] = found.as_slice() {
            if only.is_whole(&s) {
                if let Some(value) = self.resolver.resolve(only.key) {
                    trace!(path = %self.path, key = only.key, kind = value.kind(), "replaced whole string");
                    return (value.clone(), errors);
                }
                errors.push(self.missing(only.key, &s));
                return (Value::String(s), errors);
            }
        }

        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        for placeholder in &found {
            out.push_str(&s[last..placeholder.span.start]);
            match self.resolver.resolve(placeholder.key) {
                Some(value) => out.push_str(&value.to_text()),
                None => {
                    out.push_str(&s[placeholder.span.clone()]);
                    errors.push(self.missing(placeholder.key, &s));
                }
            }
            last = placeholder.span.end;
        }
        out.push_str(&s[last..]);

        trace!(path = %self.path, placeholders = found.len(), failed = errors.len(), "spliced string");
        (Value::String(out), errors)
    }

    fn missing(&self, key: &str, text: &str) -> UnresolvedPlaceholder {
        UnresolvedPlaceholder {
            key: key.to_string(),
            path: self.path.clone(),
            text: text.to_string(),
        }
    }
}

/// Resolves `value` with the default placeholder syntax.
pub fn resolve<R: Resolve + ?Sized>(value: Value, resolver: &R) -> (Value, ResolutionErrors) {
    Walker::new(resolver).walk(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SecretValues;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn secrets(s: &str) -> SecretValues {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_whole_placeholder_string() {
        let (value, errors) = resolve(Value::from("<name>"), &secrets("name: app"));
        assert!(errors.is_empty());
        assert_eq!(value, Value::from("app"));
    }

    #[test]
    fn test_whole_placeholder_keeps_type() {
        let values = secrets("replicas: 1\nratio: 0.5\nenabled: false\nextra: ~\nlist: [a, b]");
        assert_eq!(resolve(Value::from("<replicas>"), &values).0, Value::Integer(1));
        assert_eq!(resolve(Value::from("<ratio>"), &values).0, Value::Float(0.5));
        assert_eq!(resolve(Value::from("<enabled>"), &values).0, Value::Bool(false));
        assert_eq!(resolve(Value::from("<extra>"), &values).0, Value::Null);
        assert_eq!(resolve(Value::from("<list>"), &values).0, yaml("[a, b]"));
    }

    #[test]
    fn test_embedded_placeholders_are_spliced() {
        let values = secrets("name: app\ntag: latest\nport: 8080");
        let (value, errors) = resolve(Value::from("foo.io/<name>:<tag>"), &values);
        assert!(errors.is_empty());
        assert_eq!(value, Value::from("foo.io/app:latest"));

        let (value, _) = resolve(Value::from("port <port>"), &values);
        assert_eq!(value, Value::from("port 8080"));
    }

    #[test]
    fn test_two_adjacent_placeholders_stay_a_string() {
        let values = secrets("a: 1\nb: 2");
        let (value, errors) = resolve(Value::from("<a><b>"), &values);
        assert!(errors.is_empty());
        assert_eq!(value, Value::from("12"));
    }

    #[test]
    fn test_spliced_floats_keep_their_fraction() {
        let values = secrets("ratio: 1.0\nlimit: 0.25");
        let (value, errors) = resolve(Value::from("ratio=<ratio>,limit=<limit>"), &values);
        assert!(errors.is_empty());
        assert_eq!(value, Value::from("ratio=1.0,limit=0.25"));
    }

    #[test]
    fn test_container_spliced_as_flow_text() {
        let values = secrets("hosts: [a, b]");
        let (value, _) = resolve(Value::from("hosts=<hosts>"), &values);
        assert_eq!(value, Value::from(r#"hosts=["a", "b"]"#));
    }

    #[test]
    fn test_spliced_values_are_not_rescanned() {
        let values = secrets("outer: '<inner>'\ninner: nope");
        let (value, errors) = resolve(Value::from("x-<outer>"), &values);
        assert!(errors.is_empty());
        assert_eq!(value, Value::from("x-<inner>"));
    }

    #[test]
    fn test_missing_whole_placeholder_left_verbatim() {
        let (value, errors) = resolve(Value::from("<missing>"), &SecretValues::new());
        assert_eq!(value, Value::from("<missing>"));
        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.key, "missing");
        assert_eq!(error.text, "<missing>");
        assert!(error.path.is_root());
    }

    #[test]
    fn test_partial_failure_within_one_string() {
        let values = secrets("name: app");
        let (value, errors) = resolve(Value::from("<registry>/<name>:<tag>"), &values);
        assert_eq!(value, Value::from("<registry>/app:<tag>"));
        assert_eq!(errors.keys().collect::<Vec<_>>(), ["registry", "tag"]);
    }

    #[test]
    fn test_non_string_scalars_untouched() {
        let values = secrets("name: app");
        for scalar in [Value::Null, Value::Bool(true), Value::Integer(7), Value::Float(2.5)] {
            let (value, errors) = resolve(scalar.clone(), &values);
            assert_eq!(value, scalar);
            assert!(errors.is_empty());
        }
    }

    #[test]
    fn test_mapping_keys_are_not_substituted() {
        let values = secrets("name: app");
        let (value, errors) = resolve(yaml("'<name>': '<name>'"), &values);
        assert!(errors.is_empty());
        assert_eq!(value, yaml("'<name>': app"));
    }

    #[test]
    fn test_error_paths_and_order() {
        let template = yaml(
            r#"
metadata:
  name: <name>
spec:
  containers:
    - image: <registry>/app
      env:
        - value: <token>
  replicas: <replicas>
"#,
        );
        let (_, errors) = resolve(template, &SecretValues::new());
        let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(
            paths,
            [
                "metadata.name",
                "spec.containers[0].image",
                "spec.containers[0].env[0].value",
                "spec.replicas",
            ]
        );
        assert_eq!(
            errors.keys().collect::<Vec<_>>(),
            ["name", "registry", "token", "replicas"]
        );
    }

    #[test]
    fn test_custom_syntax() {
        let values = secrets("name: app");
        let mut walker = Walker::with_syntax(&values, PlaceholderSyntax::new('{', '}'));
        let (value, errors) = walker.walk(yaml("a: '{name}'\nb: <name>"));
        assert!(errors.is_empty());
        assert_eq!(value, yaml("a: app\nb: <name>"));
    }
}
