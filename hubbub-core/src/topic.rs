//! Topic names.

use std::{borrow::Borrow, fmt, ops::Deref, sync::Arc};

/// The name of an event channel.
///
/// Topics are compared by exact string value; there is no hierarchy and no
/// wildcard matching, so `"foo"` and `"foo/bar"` are unrelated channels.
/// Cloning is O(1).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
    /// Create a topic from any string-like value.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The topic name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Topic {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Topic {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}

impl From<&Topic> for Topic {
    fn from(topic: &Topic) -> Self {
        topic.clone()
    }
}

impl Borrow<str> for Topic {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Topic {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Topic {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Topic {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_topic_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(Topic::from("foo/bar"), 1);

        assert_eq!(map.get("foo/bar"), Some(&1));
        assert_eq!(map.get("foo"), None);
    }

    #[test]
    fn test_topic_is_flat() {
        assert_ne!(Topic::from("foo"), Topic::from("foo/bar"));
        assert_eq!(Topic::from("foo/bar"), "foo/bar");
    }
}
