use crate::base::error::HopError;
use http::header::{HeaderName, HeaderValue};
use std::str::FromStr;

/// A case-insensitive header map that strictly preserves insertion order
/// and allows repeated names.
///
/// Request construction and redirect sanitization both operate on this
/// container; it converts losslessly from the raw `http::HeaderMap` a
/// transport returns.
#[derive(Debug, Clone, Default)]
pub struct OrderedHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl OrderedHeaders {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from ordered name/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, HopError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.append(name, value)?;
        }
        Ok(headers)
    }

    /// Copy every entry of a raw `http::HeaderMap`, preserving its order.
    pub fn from_header_map(map: &http::HeaderMap) -> Self {
        let entries = map
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self { entries }
    }

    /// Append a value, keeping any existing values for the same name.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), HopError> {
        let (name, value) = parse_pair(name, value)?;
        self.entries.push((name, value));
        Ok(())
    }

    /// Set a single value: replaces the first occurrence in place, drops any
    /// later duplicates, appends if absent.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HopError> {
        let (name, value) = parse_pair(name, value)?;
        let mut found = false;
        self.entries.retain_mut(|(n, v)| {
            if *n == name {
                if found {
                    return false;
                }
                *v = value.clone();
                found = true;
            }
            true
        });
        if !found {
            self.entries.push((name, value));
        }
        Ok(())
    }

    /// Remove every value for `name`. Unknown or invalid names are a no-op.
    pub fn remove(&mut self, name: &str) {
        if let Ok(target) = HeaderName::from_str(name) {
            self.entries.retain(|(n, _)| *n != target);
        }
    }

    /// First value for `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let target = HeaderName::from_str(name).ok()?;
        self.entries
            .iter()
            .find(|(n, _)| *n == target)
            .map(|(_, v)| v)
    }

    /// First value for `name` as a string, when it is valid UTF-8.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> {
        let target = HeaderName::from_str(name).ok();
        self.entries
            .iter()
            .filter(move |(n, _)| Some(n) == target.as_ref())
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HopError> {
    let name_header = HeaderName::from_str(name).map_err(|_| {
        HopError::invalid_argument("invalid header name").with_context("header", name)
    })?;
    let value_header = HeaderValue::from_str(value).map_err(|_| {
        HopError::invalid_argument("invalid header value").with_context("header", name)
    })?;
    Ok((name_header, value_header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_get() {
        let mut headers = OrderedHeaders::new();
        headers.append("Content-Type", "application/json").unwrap();
        assert_eq!(
            headers.get("Content-Type").unwrap().to_str().unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_case_insensitive_get() {
        let mut headers = OrderedHeaders::new();
        headers.append("ACCEPT", "text/html").unwrap();
        assert!(headers.get("accept").is_some());
        assert!(headers.get("Accept").is_some());
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let mut headers = OrderedHeaders::new();
        headers.append("Set-Cookie", "a=1").unwrap();
        headers.append("Set-Cookie", "b=2").unwrap();
        let values: Vec<_> = headers
            .get_all("set-cookie")
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_set_replaces_all_occurrences() {
        let mut headers = OrderedHeaders::new();
        headers.append("Host", "example.com").unwrap();
        headers.append("Host", "other.com").unwrap();
        headers.set("Host", "updated.com").unwrap();
        assert_eq!(headers.get_str("Host"), Some("updated.com"));
        assert_eq!(headers.get_all("host").count(), 1);
    }

    #[test]
    fn test_set_appends_when_absent() {
        let mut headers = OrderedHeaders::new();
        headers.set("X-New", "value").unwrap();
        assert_eq!(headers.get_str("x-new"), Some("value"));
    }

    #[test]
    fn test_remove_header() {
        let mut headers = OrderedHeaders::new();
        headers.append("X-Custom", "value").unwrap();
        headers.remove("X-Custom");
        assert!(headers.get("X-Custom").is_none());
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut headers = OrderedHeaders::new();
        headers.append("Host", "example.com").unwrap();
        headers.append("Accept", "text/html").unwrap();
        headers.append("User-Agent", "test").unwrap();

        let names: Vec<_> = headers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["host", "accept", "user-agent"]);
    }

    #[test]
    fn test_invalid_header_name() {
        let mut headers = OrderedHeaders::new();
        assert!(headers.append("Invalid Header", "value").is_err());
    }

    #[test]
    fn test_invalid_header_value() {
        let mut headers = OrderedHeaders::new();
        assert!(headers.append("Valid", "invalid\nvalue").is_err());
    }

    #[test]
    fn test_from_header_map_preserves_entries() {
        let mut raw = http::HeaderMap::new();
        raw.insert("content-type", "text/plain".parse().unwrap());
        raw.append("set-cookie", "a=1".parse().unwrap());
        raw.append("set-cookie", "b=2".parse().unwrap());

        let headers = OrderedHeaders::from_header_map(&raw);
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get_all("set-cookie").count(), 2);
    }

    #[test]
    fn test_clone() {
        let mut headers = OrderedHeaders::new();
        headers.append("Test", "value").unwrap();
        let cloned = headers.clone();
        assert!(cloned.get("Test").is_some());
    }
}
