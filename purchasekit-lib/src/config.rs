//! Store configuration types.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoreError};

/// Which generation of the backend purchase API to talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendApiVersion {
    /// Stable v1 API.
    #[default]
    V1,
    /// Newer v2 API.
    V2,
}

impl BackendApiVersion {
    /// Get the version segment as used in API base paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

/// Configuration handed to the facade's `configure` and forwarded to the
/// provider adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend API key. Required; must not be blank.
    pub api_key: String,

    /// App user id to log in with at configure time. When absent, the
    /// backend associates an anonymous identity.
    #[serde(default)]
    pub app_user_id: Option<String>,

    /// Emit request/outcome debug lines from the adapter.
    #[serde(default)]
    pub debug_logging: bool,

    /// Backend API generation preference.
    #[serde(default)]
    pub api_version: BackendApiVersion,

    /// Entitlement identifiers this app cares about. An empty list means
    /// every entitlement the backend reports counts toward the
    /// subscription status.
    #[serde(default)]
    pub entitlement_ids: Vec<String>,
}

impl StoreConfig {
    /// Create a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_user_id: None,
            debug_logging: false,
            api_version: BackendApiVersion::default(),
            entitlement_ids: Vec::new(),
        }
    }

    /// Set the app user id to identify as during configuration.
    pub fn with_app_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.app_user_id = Some(user_id.into());
        self
    }

    /// Enable adapter debug logging.
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Set the backend API version preference.
    pub fn with_api_version(mut self, version: BackendApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Set the entitlement identifiers to track.
    pub fn with_entitlement_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entitlement_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the configuration without touching any backend.
    ///
    /// A blank or whitespace-only API key is rejected here so the failure
    /// is reported before any network call is made.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(StoreError::InvalidApiKey(
                "API key must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = StoreConfig::new("appl_abc123")
            .with_app_user_id("user-42")
            .with_debug_logging(true)
            .with_api_version(BackendApiVersion::V2)
            .with_entitlement_ids(["premium", "plus"]);

        assert_eq!(config.api_key, "appl_abc123");
        assert_eq!(config.app_user_id.as_deref(), Some("user-42"));
        assert!(config.debug_logging);
        assert_eq!(config.api_version, BackendApiVersion::V2);
        assert_eq!(config.entitlement_ids, vec!["premium", "plus"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_rejected() {
        for key in ["", "   ", "\t\n"] {
            let err = StoreConfig::new(key).validate().unwrap_err();
            assert!(matches!(err, StoreError::InvalidApiKey(_)), "key {:?}", key);
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"api_key": "appl_k"}"#).unwrap();

        assert_eq!(config.api_key, "appl_k");
        assert_eq!(config.app_user_id, None);
        assert!(!config.debug_logging);
        assert_eq!(config.api_version, BackendApiVersion::V1);
        assert!(config.entitlement_ids.is_empty());
    }

    #[test]
    fn test_api_version_segment() {
        assert_eq!(BackendApiVersion::V1.as_str(), "v1");
        assert_eq!(BackendApiVersion::V2.as_str(), "v2");
    }
}
