//! Default request headers and the merge rule for custom headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::error::{Error, Result};

pub const JSON: &str = "application/json";

/// Header name → value mapping with case-insensitive names.
///
/// Always starts from `Accept` and `Content-Type` set to JSON; merged entries
/// replace existing ones with the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSet {
    map: HeaderMap,
}

impl Default for HeaderSet {
    fn default() -> Self {
        Self::json_defaults()
    }
}

impl HeaderSet {
    pub fn json_defaults() -> Self {
        let mut map = HeaderMap::new();
        map.insert(ACCEPT, HeaderValue::from_static(JSON));
        map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        Self { map }
    }

    /// Set one header, replacing any value under the same name.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<()> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.map.insert(header_name, header_value);
        Ok(())
    }

    /// Merge `custom` over the current entries; custom values win.
    pub fn merge<I, K, V>(mut self, custom: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in custom {
            self.insert(name.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.map
    }
}
