//! Credential lookup.
//!
//! Secrets are fetched by name so callers never read the process environment
//! directly; tests substitute a [`StaticCredentials`] map.

use std::collections::HashMap;

/// Source of named secrets such as API keys.
pub trait CredentialSource: Send + Sync {
    /// Look up a credential. Returns `None` when it is not set.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads credentials from environment variables of the same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        match std::env::var(name) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(e) => {
                tracing::warn!("Credential {} is not valid unicode: {}", name, e);
                None
            }
        }
    }
}

/// Fixed in-memory credentials.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
