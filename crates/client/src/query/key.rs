//! Query keys.

use std::fmt;

use sha2::{Digest, Sha256};

/// Identity of a cached query: resource name plus every parameter that
/// affects the response, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: &'static str,
    params: Vec<(&'static str, String)>,
}

impl QueryKey {
    pub fn new(resource: &'static str) -> Self {
        Self { resource, params: Vec::new() }
    }

    /// Append a parameter.
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// Append a parameter only when present.
    pub fn with_opt(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Stable SHA-256 hex digest of the key, for logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.resource.as_bytes());
        for (name, value) in &self.params {
            hasher.update(b"\n");
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource)?;
        for (idx, (name, value)) in self.params.iter().enumerate() {
            let sep = if idx == 0 { '?' } else { '&' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}
