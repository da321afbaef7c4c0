//! Stateless HTTP request builder and response parser for the Admin API.
//!
//! # Design
//! `AdminApi` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `AdminClient` pairs the two with a `Transport`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AccessToken, Credentials, Criteria, Entity, SearchResult, ShopInfo, SyncAction, SyncOperation,
    TokenRequest,
};

/// OAuth client id Shopware reserves for the administration password grant.
const ADMINISTRATION_CLIENT_ID: &str = "administration";
const SCOPES: &str = "write";

/// Synchronous, stateless request builder for the Shopware Admin API.
#[derive(Debug, Clone)]
pub struct AdminApi {
    base_url: String,
}

impl AdminApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_token(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = match credentials {
            Credentials::Integration {
                client_id,
                client_secret,
            } => TokenRequest {
                grant_type: "client_credentials",
                client_id,
                client_secret: Some(client_secret.as_str()),
                username: None,
                password: None,
                scopes: SCOPES,
            },
            Credentials::Password { username, password } => TokenRequest {
                grant_type: "password",
                client_id: ADMINISTRATION_CLIENT_ID,
                client_secret: None,
                username: Some(username.as_str()),
                password: Some(password.as_str()),
                scopes: SCOPES,
            },
        };
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/oauth/token", self.base_url),
            headers: json_headers(),
            body: Some(to_json(&body)?),
        })
    }

    pub fn build_info(&self, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/_info/version", self.base_url),
            headers: vec![authorization(token), accept_json()],
            body: None,
        }
    }

    pub fn build_search<E: Entity>(&self, token: &str, criteria: &Criteria) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/search/{}", self.base_url, E::search_path()),
            headers: authorized_json_headers(token),
            body: Some(to_json(criteria)?),
        })
    }

    pub fn build_upsert<E: Entity>(&self, token: &str, entities: &[E]) -> Result<HttpRequest, ApiError> {
        let payload = entities
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.build_sync(token, E::ENTITY, SyncAction::Upsert, payload)
    }

    pub fn build_delete<E: Entity>(&self, token: &str, ids: &[String]) -> Result<HttpRequest, ApiError> {
        let payload = ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
        self.build_sync(token, E::ENTITY, SyncAction::Delete, payload)
    }

    fn build_sync(
        &self,
        token: &str,
        entity: &'static str,
        action: SyncAction,
        payload: Vec<serde_json::Value>,
    ) -> Result<HttpRequest, ApiError> {
        let key = match action {
            SyncAction::Upsert => format!("upsert-{entity}"),
            SyncAction::Delete => format!("delete-{entity}"),
        };
        let mut operations = BTreeMap::new();
        operations.insert(key, SyncOperation { entity, action, payload });
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/_action/sync", self.base_url),
            headers: authorized_json_headers(token),
            body: Some(to_json(&operations)?),
        })
    }

    pub fn parse_token(&self, response: HttpResponse) -> Result<AccessToken, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_info(&self, response: HttpResponse) -> Result<ShopInfo, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_search<E: Entity>(&self, response: HttpResponse) -> Result<SearchResult<E>, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    /// Shopware answers sync with 200 and a body, or 204 when told to skip
    /// the response body; both count as success.
    pub fn parse_sync(&self, response: HttpResponse) -> Result<(), ApiError> {
        if response.status == 204 {
            return Ok(());
        }
        check_status(&response, 200)
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn authorization(token: &str) -> (String, String) {
    ("authorization".to_string(), format!("Bearer {token}"))
}

fn accept_json() -> (String, String) {
    ("accept".to_string(), "application/json".to_string())
}

fn json_headers() -> Vec<(String, String)> {
    vec![
        ("content-type".to_string(), "application/json".to_string()),
        accept_json(),
    ]
}

fn authorized_json_headers(token: &str) -> Vec<(String, String)> {
    let mut headers = vec![authorization(token)];
    headers.extend(json_headers());
    headers
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        s if s == expected => Ok(()),
        401 => Err(ApiError::Unauthorized(response.body.clone())),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
