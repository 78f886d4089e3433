//! Raw request parameters.

use serde::{Deserialize, Serialize};

/// Request parameters as received from the host, before normalization.
///
/// Keys keep their first-seen order. Repeated keys accumulate values, and a
/// trailing `[]` (PHP-style list syntax) is stripped so that `entity[]=1`
/// and `entity=1` land under the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    params: Vec<(String, Vec<String>)>,
}

impl RawRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a request from key/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut request = Self::new();
        for (key, value) in pairs {
            request.push(key.as_ref(), value);
        }
        request
    }

    /// Appends a value to `key`.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let key = normalize_key(key);
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.params.push((key.to_string(), vec![value])),
        }
    }

    /// Replaces every value of `key`.
    pub fn set(&mut self, key: &str, values: Vec<String>) {
        let key = normalize_key(key);
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.params.push((key.to_string(), values)),
        }
    }

    /// Returns the values of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Returns the first value of `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Returns `true` if `key` was supplied, whatever its value.
    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let idx = self.params.iter().position(|(k, _)| k == key)?;
        Some(self.params.remove(idx).1)
    }

    /// Iterates keys and their values in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no parameter was supplied.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

fn normalize_key(key: &str) -> &str {
    key.trim().strip_suffix("[]").unwrap_or(key.trim())
}
