//! Queue document model
//!
//! A [`QueueDocument`] wraps the parsed JSON tree without imposing a schema.
//! Only the handful of paths the transforms touch are ever interpreted; every
//! other value is carried through as-is.

use serde_json::Value;

use crate::path::FieldPath;
use crate::section::Section;

/// Top-level shape of a queue document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// At least one known section key is present (listed in traversal order)
    Sectioned(Vec<Section>),
    /// No known section: the whole document is one job
    Implicit,
}

/// Saved queue document
#[derive(Debug, Clone, PartialEq)]
pub struct QueueDocument {
    root: Value,
}

impl QueueDocument {
    /// Wrap an already parsed value
    #[inline]
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse from JSON text
    ///
    /// # Errors
    /// Returns [`DocumentError::Parse`] if the text is not valid JSON
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let root: Value = serde_json::from_str(text).map_err(DocumentError::Parse)?;
        Ok(Self::new(root))
    }

    /// Root value
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Value at a path, if present
    #[inline]
    #[must_use]
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.root.pointer(&path.to_pointer())
    }

    /// Mutable value at a path, if present
    #[inline]
    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut Value> {
        self.root.pointer_mut(&path.to_pointer())
    }

    /// Replace an existing value, returning the previous one
    ///
    /// Never creates intermediate containers.
    ///
    /// # Errors
    /// Returns [`DocumentError::NotFound`] if nothing exists at `path`
    pub fn replace(&mut self, path: &FieldPath, value: Value) -> Result<Value, DocumentError> {
        let slot = self
            .get_mut(path)
            .ok_or_else(|| DocumentError::NotFound(path.to_pointer()))?;
        Ok(std::mem::replace(slot, value))
    }

    /// Detect which top-level layout this document uses
    #[must_use]
    pub fn layout(&self) -> Layout {
        let present: Vec<Section> = match &self.root {
            Value::Object(map) => Section::ALL
                .into_iter()
                .filter(|s| map.contains_key(s.key()))
                .collect(),
            _ => Vec::new(),
        };
        if present.is_empty() {
            Layout::Implicit
        } else {
            Layout::Sectioned(present)
        }
    }

    /// Serialize with two-space indentation and a trailing newline
    ///
    /// # Errors
    /// Returns [`DocumentError::Serialize`] if serialization fails
    pub fn to_pretty_json(&self) -> Result<String, DocumentError> {
        let mut text = serde_json::to_string_pretty(&self.root).map_err(DocumentError::Serialize)?;
        text.push('\n');
        Ok(text)
    }
}

/// Document errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Input is not valid JSON
    #[error("invalid queue document: {0}")]
    Parse(#[source] serde_json::Error),

    /// Output could not be produced
    #[error("failed to serialize queue document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Path does not resolve
    #[error("no value at {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_and_get() {
        let doc = QueueDocument::parse(r#"{"queue_pending": [[1, "id", {}]]}"#).unwrap();
        let path = FieldPath::root().child("queue_pending").index(0).index(1);
        assert_eq!(doc.get(&path), Some(&json!("id")));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            QueueDocument::parse("{not json"),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn layout_detection() {
        let sectioned = QueueDocument::new(json!({"queue_pending": [], "queue_running": []}));
        assert_eq!(
            sectioned.layout(),
            Layout::Sectioned(vec![Section::Running, Section::Pending])
        );
        let implicit = QueueDocument::new(json!({"3": {"class_type": "KSampler"}}));
        assert_eq!(implicit.layout(), Layout::Implicit);
        assert_eq!(QueueDocument::new(json!([1, 2])).layout(), Layout::Implicit);
    }

    #[test]
    fn replace_returns_old_value() {
        let mut doc = QueueDocument::new(json!({"a": {"b": 1}}));
        let path = FieldPath::root().extend(&["a", "b"]);
        let old = doc.replace(&path, json!(2)).unwrap();
        assert_eq!(old, json!(1));
        assert_eq!(doc.get(&path), Some(&json!(2)));
    }

    #[test]
    fn replace_never_creates() {
        let mut doc = QueueDocument::new(json!({"a": {}}));
        let path = FieldPath::root().extend(&["a", "b"]);
        assert!(matches!(doc.replace(&path, json!(2)), Err(DocumentError::NotFound(_))));
        assert_eq!(doc.root(), &json!({"a": {}}));
    }

    #[test]
    fn key_order_survives_round_trip() {
        let text = r#"{"zeta": 1, "alpha": 2, "mid": {"y": 1, "b": 2}}"#;
        let doc = QueueDocument::parse(text).unwrap();
        let out = doc.to_pretty_json().unwrap();
        let zeta = out.find("zeta").unwrap();
        let alpha = out.find("alpha").unwrap();
        assert!(zeta < alpha);
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn numbers_survive_verbatim() {
        let text = r#"{"cfg": 7.50, "seed": 18446744073709551615, "denoise": 1e-3}"#;
        let doc = QueueDocument::parse(text).unwrap();
        let again = QueueDocument::parse(&doc.to_pretty_json().unwrap()).unwrap();
        assert_eq!(doc, again);
        assert_eq!(doc.root()["seed"].as_u64(), Some(u64::MAX));
    }
}
