//! Provider configuration and credential selection.

use serde::Deserialize;
use shopware_core::Credentials;

use crate::error::ProviderError;

pub const ENV_URL: &str = "SHOPWARE_URL";
pub const ENV_CLIENT_ID: &str = "SHOPWARE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SHOPWARE_CLIENT_SECRET";
pub const ENV_ADMIN_USERNAME: &str = "SHOPWARE_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "SHOPWARE_ADMIN_PASSWORD";

/// The provider block as declared by the user. Every field may be left
/// out and filled from the `SHOPWARE_*` environment instead.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("admin_username", &self.admin_username)
            .finish_non_exhaustive()
    }
}

impl ProviderConfig {
    /// Decode the engine's config object. `null` counts as an empty block.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| ProviderError::InvalidConfig(e.to_string()))
    }

    /// Fill unset fields through `lookup`, normally `std::env::var`.
    pub fn with_env_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |field: &mut Option<String>, key: &str| {
            if field.is_none() {
                *field = lookup(key).filter(|v| !v.is_empty());
            }
        };
        fill(&mut self.url, ENV_URL);
        fill(&mut self.client_id, ENV_CLIENT_ID);
        fill(&mut self.client_secret, ENV_CLIENT_SECRET);
        fill(&mut self.admin_username, ENV_ADMIN_USERNAME);
        fill(&mut self.admin_password, ENV_ADMIN_PASSWORD);
        self
    }

    pub fn url(&self) -> Result<&str, ProviderError> {
        match self.url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(ProviderError::InvalidConfig(format!(
                "`url` is required (or set {ENV_URL})"
            ))),
        }
    }

    /// A configured `client_id` selects integration credentials; otherwise
    /// the admin username/password grant is used.
    pub fn credentials(&self) -> Credentials {
        match &self.client_id {
            Some(client_id) => Credentials::Integration {
                client_id: client_id.clone(),
                client_secret: self.client_secret.clone().unwrap_or_default(),
            },
            None => Credentials::Password {
                username: self.admin_username.clone().unwrap_or_default(),
                password: self.admin_password.clone().unwrap_or_default(),
            },
        }
    }
}
