//! Named values attached to an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// Collection of named values associated with an error.
///
/// Values feed message templates and stay available for programmatic
/// inspection. Keys are kept sorted so every rendering is deterministic.
///
/// Info is meant to be filled at construction; [`crate::Error::info_mut`]
/// exists, but errors are expected to be treated as read-only once returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Info(BTreeMap<String, Value>);

impl Info {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a value, returning the previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a value only if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
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

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Borrow the underlying map, e.g. as a template context.
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }
}

/// Renders as `map[key:value ...]`.
///
/// String values are written without quotes, other values as JSON text.
impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map[")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match value {
                Value::String(s) => write!(f, "{}:{}", key, s)?,
                other => write!(f, "{}:{}", key, other)?,
            }
        }
        write!(f, "]")
    }
}

impl<K, V> FromIterator<(K, V)> for Info
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut info = Info::new();
        info.extend(iter);
        info
    }
}

impl<K, V> Extend<(K, V)> for Info
where
    K: Into<String>,
    V: Into<Value>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Info {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Info {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Build an [`Info`] from `key => value` pairs.
///
/// ```rust
/// let info = ergo::err_info!("name" => "disk", "retries" => 3);
/// assert_eq!(info.to_string(), "map[name:disk retries:3]");
/// ```
#[macro_export]
macro_rules! err_info {
    () => {
        $crate::Info::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut info = $crate::Info::new();
        $( info.insert($key, $value); )+
        info
    }};
}
