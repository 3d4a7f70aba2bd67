//! Query-protocol parameter encoding.
//!
//! Inputs are flattened into `key=value` pairs. Lists use 1-based member
//! numbers (`AttributeName.1`, `AttributeName.2`), structures nest with dots
//! (`SendMessageBatchRequestEntry.1.MessageBody`) and maps are written as
//! numbered name/value pairs (`Attribute.1.Name`, `Attribute.1.Value`).

use std::collections::BTreeMap;
use std::fmt;

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;

/// Ordered set of query parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Set a parameter only when a value is present
    pub fn insert_opt<T: fmt::Display>(&mut self, key: impl Into<String>, value: Option<T>) {
        if let Some(value) = value {
            self.params.insert(key.into(), value.to_string());
        }
    }

    /// Write `values` as `{prefix}.1`, `{prefix}.2`, ...
    pub fn insert_list<S: AsRef<str>>(&mut self, prefix: &str, values: &[S]) {
        for (idx, value) in values.iter().enumerate() {
            self.insert(format!("{}.{}", prefix, idx + 1), value.as_ref());
        }
    }

    /// Write a string map as `{prefix}.N.{key_name}` / `{prefix}.N.Value`
    pub fn insert_map(&mut self, prefix: &str, key_name: &str, map: &BTreeMap<String, String>) {
        for (idx, (key, value)) in map.iter().enumerate() {
            self.insert(format!("{}.{}.{}", prefix, idx + 1, key_name), key.as_str());
            self.insert(format!("{}.{}.Value", prefix, idx + 1), value.as_str());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as an `application/x-www-form-urlencoded` body
    pub fn to_form_body(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
