//! Credential bundles for platform connections.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque credential bundle for one platform connection.
///
/// Each platform declares its required keys via
/// `PlatformAdapter::required_credentials`; the bundle itself is
/// schema-free so one storage shape covers all vendors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformCredentials(HashMap<String, String>);

impl PlatformCredentials {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Required field, empty strings count as missing.
    pub fn require(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Names of required keys that are absent or empty.
    pub fn missing_keys(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| self.require(key).is_none())
            .map(|key| key.to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for PlatformCredentials {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys() {
        let creds = PlatformCredentials::new()
            .with("access_token", "tok")
            .with("account_id", "");

        let missing = creds.missing_keys(&["access_token", "account_id", "app_secret"]);
        assert_eq!(missing, vec!["account_id", "app_secret"]);
    }

    #[test]
    fn test_complete_bundle_has_no_missing_keys() {
        let creds = PlatformCredentials::new()
            .with("access_token", "tok")
            .with("account_id", "123");
        assert!(creds.missing_keys(&["access_token", "account_id"]).is_empty());
    }
}
