//! The per-document envelope handed between the walker and its caller.

use crate::errors::ResolutionErrors;
use crate::placeholder::PlaceholderSyntax;
use crate::resolver::{Resolve, SecretValues};
use crate::value::Value;
use crate::walker::Walker;
use tracing::debug;

/// A template document together with the secret values it is resolved
/// against and the failures of its resolution pass.
///
/// An envelope is created per document and walked once. The secret values
/// are only borrowed, so one table can back many envelopes, including
/// envelopes resolved on different threads.
///
/// # Example
///
/// ```
/// use secretinject_core::{Document, SecretValues, Value};
///
/// let mut secrets = SecretValues::new();
/// secrets.insert("tag", "latest");
///
/// let mut document = Document::new(Value::from("app:<tag>"), &secrets);
/// document.replace();
/// assert!(document.is_resolved());
/// assert_eq!(document.template_data(), &Value::from("app:latest"));
/// ```
#[derive(Debug)]
pub struct Document<'s, R: Resolve + ?Sized = SecretValues> {
    template_data: Value,
    secret_values: &'s R,
    syntax: PlaceholderSyntax,
    errors: ResolutionErrors,
    replaced: bool,
}

impl<'s, R: Resolve + ?Sized> Document<'s, R> {
    pub fn new(template_data: Value, secret_values: &'s R) -> Self {
        Self {
            template_data,
            secret_values,
            syntax: PlaceholderSyntax::default(),
            errors: ResolutionErrors::new(),
            replaced: false,
        }
    }

    /// Uses other placeholder markers than `<` and `>`.
    pub fn with_syntax(mut self, syntax: PlaceholderSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Runs the resolution pass.
    ///
    /// The pass runs once; later calls return the errors of the first pass
    /// without walking again, so values that themselves look like
    /// placeholders are never substituted a second time.
    pub fn replace(&mut self) -> &ResolutionErrors {
        if self.replaced {
            return &self.errors;
        }

        let template = std::mem::take(&mut self.template_data);
        let (resolved, errors) = Walker::with_syntax(self.secret_values, self.syntax).walk(template);
        debug!(failed = errors.len(), "resolution pass finished");

        self.template_data = resolved;
        self.errors = errors;
        self.replaced = true;
        &self.errors
    }

    pub fn template_data(&self) -> &Value {
        &self.template_data
    }

    pub fn secret_values(&self) -> &R {
        self.secret_values
    }

    pub fn errors(&self) -> &ResolutionErrors {
        &self.errors
    }

    pub fn is_replaced(&self) -> bool {
        self.replaced
    }

    /// True once the pass has run without failures.
    pub fn is_resolved(&self) -> bool {
        self.replaced && self.errors.is_empty()
    }

    /// Splits the envelope into the (possibly partially) resolved document
    /// and its failures.
    pub fn into_parts(self) -> (Value, ResolutionErrors) {
        (self.template_data, self.errors)
    }

    /// Runs the pass if needed and returns the document only when every
    /// placeholder resolved.
    pub fn into_result(mut self) -> Result<Value, ResolutionErrors> {
        self.replace();
        if self.errors.is_empty() {
            Ok(self.template_data)
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_new_document_is_unresolved() {
        let secrets = SecretValues::new();
        let document = Document::new(yaml("a: 1"), &secrets);
        assert!(!document.is_replaced());
        assert!(!document.is_resolved());
        assert!(document.errors().is_empty());
    }

    #[test]
    fn test_replace_runs_once() {
        let mut secrets = SecretValues::new();
        secrets.insert("a", "<b>");
        secrets.insert("b", "too far");

        let mut document = Document::new(yaml("key: <a>"), &secrets);
        assert!(document.replace().is_empty());
        assert!(document.replace().is_empty());
        assert_eq!(document.template_data(), &yaml("key: <b>"));
    }

    #[test]
    fn test_into_result_reports_failures() {
        let secrets = SecretValues::new();
        let errors = Document::new(yaml("a: <x>\nb: <y>"), &secrets)
            .into_result()
            .unwrap_err();
        assert_eq!(errors.keys().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn test_into_parts_keeps_partial_document() {
        let mut secrets = SecretValues::new();
        secrets.insert("x", 1i64);
        let mut document = Document::new(yaml("a: <x>\nb: <y>"), &secrets);
        document.replace();
        let (value, errors) = document.into_parts();
        assert_eq!(value, yaml("a: 1\nb: <y>"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_dyn_resolver() {
        let mut secrets = SecretValues::new();
        secrets.insert("x", "y");
        let resolver: &dyn Resolve = &secrets;
        let value = Document::new(Value::from("<x>"), resolver)
            .into_result()
            .unwrap();
        assert_eq!(value, Value::from("y"));
    }
}
