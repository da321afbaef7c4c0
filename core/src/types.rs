//! Admin API DTOs.
//!
//! # Design
//! Entity structs mirror the Shopware Admin API JSON (camelCase) exactly,
//! including nested structures such as `Rule::module_types`, so no caller
//! ever has to poke into an untyped map. The mock server defines its own
//! storage independently; integration tests catch schema drift.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A remote entity kind addressable through `search` and `_action/sync`.
pub trait Entity: Serialize + DeserializeOwned + Send {
    /// Entity name as used by the sync API, e.g. `shipping_method`.
    const ENTITY: &'static str;

    /// Path segment for the search API, e.g. `shipping-method`.
    fn search_path() -> String {
        Self::ENTITY.replace('_', "-")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTime {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
}

impl Entity for DeliveryTime {
    const ENTITY: &'static str = "delivery_time";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub id: String,
    #[serde(default)]
    pub technical_name: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_rule_id: Option<String>,
}

impl Entity for ShippingMethod {
    const ENTITY: &'static str = "shipping_method";
}

/// The `moduleTypes` field of a rule: `{"types": ["shipping", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTypes {
    #[serde(default)]
    pub types: Vec<String>,
}

/// A single `rule_condition` entity, nested under `Rule::conditions`.
///
/// `value` is left as a JSON object: Shopware ships dozens of condition
/// types, each with its own value shape. A nested condition written without
/// an `id` is always inserted as a new row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Entity for RuleCondition {
    const ENTITY: &'static str = "rule_condition";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub priority: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_types: Option<ModuleTypes>,
    /// `None` unless the `conditions` association was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<RuleCondition>>,
}

impl Entity for Rule {
    const ENTITY: &'static str = "rule";
}

/// Search criteria. Only the subset the provider needs: ids and
/// associations to load alongside the main entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub associations: BTreeMap<String, Criteria>,
}

impl Criteria {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            associations: BTreeMap::new(),
        }
    }

    pub fn with_association(mut self, name: &str) -> Self {
        self.associations.insert(name.to_string(), Criteria::default());
        self
    }
}

/// Response envelope of `POST /api/search/{entity}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "E: DeserializeOwned"))]
pub struct SearchResult<E> {
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub data: Vec<E>,
}

/// OAuth credentials for the Admin API.
///
/// The provider selects `Integration` whenever a client id is configured.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Integration {
        client_id: String,
        client_secret: String,
    },
    Password {
        username: String,
        password: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Integration { client_id, .. } => f
                .debug_struct("Integration")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Body of `POST /api/oauth/token`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub scopes: &'static str,
}

/// Successful token response.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub token_type: String,
    pub expires_in: u64,
    pub access_token: String,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Response of `GET /api/_info/version`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShopInfo {
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SyncAction {
    Upsert,
    Delete,
}

/// One keyed operation of `POST /api/_action/sync`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SyncOperation {
    pub entity: &'static str,
    pub action: SyncAction,
    pub payload: Vec<serde_json::Value>,
}
