//! Structured cache keys.

use std::fmt;

/// A cache key made of text parts, e.g. `privateMessages / <peer> / 100 / 0`.
///
/// Keys are compared part by part, so `publicProfile` never matches
/// `publicProfiles`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Appends one part.
    pub fn with(mut self, part: impl fmt::Display) -> Self {
        self.0.push(part.to_string());
        self
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix`'s parts are a leading run of this key's parts.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for QueryKey {
    fn from(root: &str) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching_is_part_wise() {
        let key = QueryKey::new("privateMessages").with("p1").with(100).with(0);
        assert!(key.starts_with(&QueryKey::new("privateMessages")));
        assert!(key.starts_with(&QueryKey::new("privateMessages").with("p1")));
        assert!(!key.starts_with(&QueryKey::new("privateMessages").with("p2")));
        assert!(key.starts_with(&key));

        let profiles = QueryKey::new("publicProfiles");
        assert!(!profiles.starts_with(&QueryKey::new("publicProfile")));
        assert!(!QueryKey::new("publicProfile").starts_with(&profiles));
    }

    #[test]
    fn test_display() {
        let key = QueryKey::new("globalMessages").with(100).with(0);
        assert_eq!(key.to_string(), "globalMessages/100/0");
    }
}
