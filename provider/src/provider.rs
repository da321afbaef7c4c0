//! Provider root: metadata, configuration schema, and the one authenticated
//! client shared by every resource for the duration of a run.

use std::any::{type_name, Any};
use std::sync::Arc;

use serde_json::Value;
use shopware_core::{AdminClient, Transport, UreqTransport};
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::registry::ResourceKind;
use crate::schema::{Attribute, AttributeType, Schema};

pub const TYPE_NAME: &str = "shopware";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub type_name: &'static str,
    pub version: String,
}

/// Opaque value handed from the provider's configure step to each resource.
/// Remembers the concrete type name so a mismatch can be reported.
#[derive(Clone)]
pub struct ProviderData {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl ProviderData {
    pub fn new<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: type_name::<T>(),
        }
    }

    pub fn client(&self) -> Result<Arc<AdminClient>, ProviderError> {
        self.value
            .clone()
            .downcast::<AdminClient>()
            .map_err(|_| ProviderError::UnexpectedConfigureType { got: self.type_name })
    }
}

impl std::fmt::Debug for ProviderData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderData")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

pub struct ConfigureRequest {
    pub config: Value,
}

#[derive(Debug, Default)]
pub struct ConfigureResponse {
    pub provider_data: Option<ProviderData>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
pub struct ShopwareProvider {
    /// Set on release, "dev" for local builds, "test" in acceptance tests.
    version: String,
}

impl ShopwareProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: TYPE_NAME,
            version: self.version.clone(),
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::new("Shopware Admin API")
            .attribute("url", Attribute::required(AttributeType::String, "URL of Shopware instance"))
            .attribute(
                "client_id",
                Attribute::optional(AttributeType::String, "Client ID of Integration"),
            )
            .attribute(
                "client_secret",
                Attribute::optional(AttributeType::String, "Client Secret of Integration").sensitive(),
            )
            .attribute(
                "admin_username",
                Attribute::optional(AttributeType::String, "Username of an administration user"),
            )
            .attribute(
                "admin_password",
                Attribute::optional(AttributeType::String, "Password of an administration user").sensitive(),
            )
    }

    /// Decode the provider block (falling back to `SHOPWARE_*` variables),
    /// authenticate once, and return the client as provider data.
    pub fn configure(&self, request: ConfigureRequest) -> ConfigureResponse {
        let mut diagnostics = Diagnostics::new();
        let result = ProviderConfig::from_value(request.config)
            .map(|config| config.with_env_fallback(|key| std::env::var(key).ok()))
            .and_then(|config| self.connect(&config, UreqTransport::new()));
        match result {
            Ok(client) => ConfigureResponse {
                provider_data: Some(ProviderData::new(client)),
                diagnostics,
            },
            Err(err) => {
                diagnostics.add_error(err.summary(), err.to_string());
                ConfigureResponse {
                    provider_data: None,
                    diagnostics,
                }
            }
        }
    }

    /// Build the shared client over `transport`. The `_info/version` probe
    /// makes a token the shop will not honour fail here rather than on the
    /// first resource call.
    pub fn connect<T>(&self, config: &ProviderConfig, transport: T) -> Result<Arc<AdminClient>, ProviderError>
    where
        T: Transport + 'static,
    {
        let url = config.url()?;
        let credentials = config.credentials();
        debug!(url, ?credentials, "configuring provider");
        let client = AdminClient::connect(url, &credentials, transport).map_err(ProviderError::Authentication)?;
        let shop = client.info().map_err(ProviderError::Authentication)?;
        info!(url, version = %shop.version, "connected to shop");
        Ok(Arc::new(client))
    }

    pub fn resources(&self) -> &'static [ResourceKind] {
        &ResourceKind::ALL
    }
}
