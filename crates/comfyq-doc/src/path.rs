//! Field paths for addressing values inside a queue document
//!
//! Provides [`FieldPath`], rendered as an RFC 6901 JSON pointer so it can be
//! handed straight to [`serde_json::Value::pointer`].

use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path from the document root to a single value
///
/// Segments are mapping keys or sequence indices, stored as strings.
///
/// # Examples
/// - `["queue_pending", "0", "2", "3", "inputs", "seed"]` → `/queue_pending/0/2/3/inputs/seed`
/// - `["a/b"]` → `/a~1b`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path one key deeper
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.into());
        Self(segments)
    }

    /// Path into a sequence element
    #[inline]
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// Path several keys deeper
    #[must_use]
    pub fn extend(&self, keys: &[impl AsRef<str>]) -> Self {
        Self(
            self.0
                .iter()
                .cloned()
                .chain(keys.iter().map(|k| k.as_ref().to_owned()))
                .collect(),
        )
    }

    /// Render as a JSON pointer
    #[must_use]
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for seg in &self.0 {
            out.push('/');
            for c in seg.chars() {
                match c {
                    '~' => out.push_str("~0"),
                    '/' => out.push_str("~1"),
                    _ => out.push(c),
                }
            }
        }
        out
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    /// Parse a JSON pointer; the empty string is the root
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathError::MissingLeadingSlash(s.to_string()));
        };

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            let mut seg = String::with_capacity(raw.len());
            let mut chars = raw.chars();
            while let Some(c) = chars.next() {
                if c != '~' {
                    seg.push(c);
                    continue;
                }
                match chars.next() {
                    Some('0') => seg.push('~'),
                    Some('1') => seg.push('/'),
                    _ => return Err(PathError::InvalidEscape(s.to_string())),
                }
            }
            segments.push(seg);
        }
        Ok(Self(segments))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Path parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Non-empty pointer that does not start with `/`
    #[error("pointer must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// `~` not followed by `0` or `1`
    #[error("invalid '~' escape in pointer: {0}")]
    InvalidEscape(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pointer_rendering() {
        let path = FieldPath::root().child("queue_pending").index(0).index(2);
        assert_eq!(path.to_pointer(), "/queue_pending/0/2");
    }

    #[test]
    fn pointer_escaping() {
        let path = FieldPath::root().child("a/b").child("c~d");
        assert_eq!(path.to_string(), "/a~1b/c~0d");
    }

    #[test]
    fn root_is_empty_pointer() {
        assert_eq!(FieldPath::root().to_pointer(), "");
        assert_eq!(FieldPath::from_str("").unwrap(), FieldPath::root());
    }

    #[test]
    fn parse_unescapes() {
        let path = FieldPath::from_str("/a~1b/c~0d/3").unwrap();
        assert_eq!(path, FieldPath::root().extend(&["a/b", "c~d", "3"]));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            FieldPath::from_str("no-slash"),
            Err(PathError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            FieldPath::from_str("/bad~2"),
            Err(PathError::InvalidEscape(_))
        ));
    }

    #[test]
    fn pointer_resolves_in_value() {
        let value = json!({"nodes": {"3/x": {"inputs": {"seed": 7}}}});
        let path = FieldPath::root().extend(&["nodes", "3/x", "inputs", "seed"]);
        assert_eq!(value.pointer(&path.to_pointer()), Some(&json!(7)));
    }

    #[test]
    fn serializes_as_pointer_string() {
        let path = FieldPath::root().extend(&["x", "y"]);
        assert_eq!(serde_json::to_value(&path).unwrap(), json!("/x/y"));
    }
}
