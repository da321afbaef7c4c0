//! Authenticated Admin API client.
//!
//! # Design
//! `AdminClient` pairs the stateless `AdminApi` with a `Transport` and a
//! bearer token obtained once in `connect`. After construction nothing in it
//! changes, so a single instance is shared (via `Arc`) by every resource
//! handler for the lifetime of a run.

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, info};

use crate::client::AdminApi;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{AccessToken, Credentials, Criteria, Entity, SearchResult, ShopInfo};

pub struct AdminClient {
    api: AdminApi,
    transport: Box<dyn Transport>,
    token: AccessToken,
}

impl AdminClient {
    /// Exchange `credentials` for a bearer token and return a ready client.
    pub fn connect<T>(base_url: &str, credentials: &Credentials, transport: T) -> Result<Self, ApiError>
    where
        T: Transport + 'static,
    {
        let api = AdminApi::new(base_url);
        let request = api.build_token(credentials)?;
        let token = api.parse_token(send(&transport, request)?)?;
        info!(url = api.base_url(), expires_in = token.expires_in, "authenticated against admin api");
        Ok(Self {
            api,
            transport: Box::new(transport),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    pub fn info(&self) -> Result<ShopInfo, ApiError> {
        let request = self.api.build_info(&self.token.access_token);
        self.api.parse_info(self.execute(request)?)
    }

    /// Typed access to one entity kind, e.g. `client.repository::<Rule>()`.
    pub fn repository<E: Entity>(&self) -> Repository<'_, E> {
        Repository {
            client: self,
            entity: PhantomData,
        }
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        send(self.transport.as_ref(), request)
    }
}

impl fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.api.base_url())
            .finish_non_exhaustive()
    }
}

fn send(transport: &dyn Transport, request: HttpRequest) -> Result<HttpResponse, ApiError> {
    debug!(method = ?request.method, path = %request.path, "admin api request");
    let response = transport.execute(request)?;
    debug!(status = response.status, "admin api response");
    Ok(response)
}

/// Search / upsert / delete for a single entity kind.
pub struct Repository<'a, E> {
    client: &'a AdminClient,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<'_, E> {
    pub fn search(&self, criteria: &Criteria) -> Result<SearchResult<E>, ApiError> {
        let client = self.client;
        let request = client.api.build_search::<E>(&client.token.access_token, criteria)?;
        client.api.parse_search(client.execute(request)?)
    }

    pub fn upsert(&self, entities: &[E]) -> Result<(), ApiError> {
        let client = self.client;
        let request = client.api.build_upsert(&client.token.access_token, entities)?;
        client.api.parse_sync(client.execute(request)?)
    }

    pub fn delete(&self, ids: &[String]) -> Result<(), ApiError> {
        let client = self.client;
        let request = client.api.build_delete::<E>(&client.token.access_token, ids)?;
        client.api.parse_sync(client.execute(request)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;
    use crate::types::DeliveryTime;

    /// Replays canned responses and records every request it sees.
    struct Scripted {
        responses: Mutex<Vec<HttpResponse>>,
        seen: std::sync::Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl Scripted {
        fn new(responses: &[(u16, &str)]) -> (Self, std::sync::Arc<Mutex<Vec<HttpRequest>>>) {
            let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
            let mut responses: Vec<HttpResponse> = responses
                .iter()
                .map(|(status, body)| HttpResponse {
                    status: *status,
                    headers: Vec::new(),
                    body: body.to_string(),
                })
                .collect();
            responses.reverse();
            (
                Self {
                    responses: Mutex::new(responses),
                    seen: seen.clone(),
                },
                seen,
            )
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ApiError::Transport("no scripted response left".to_string()))
        }
    }

    const TOKEN: &str = r#"{"token_type":"Bearer","expires_in":600,"access_token":"tok-1"}"#;

    fn password() -> Credentials {
        Credentials::Password {
            username: "admin".to_string(),
            password: "shopware".to_string(),
        }
    }

    #[test]
    fn connect_fetches_token_once() {
        let (transport, seen) = Scripted::new(&[(200, TOKEN)]);
        let client = AdminClient::connect("http://shop", &password(), transport).unwrap();
        assert_eq!(client.base_url(), "http://shop");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "http://shop/api/oauth/token");
    }

    #[test]
    fn connect_fails_on_rejected_credentials() {
        let (transport, _) = Scripted::new(&[(401, "invalid_grant")]);
        let err = AdminClient::connect("http://shop", &password(), transport).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn repository_calls_carry_bearer_token() {
        let (transport, seen) = Scripted::new(&[
            (200, TOKEN),
            (200, r#"{"total":0,"data":[]}"#),
            (204, ""),
        ]);
        let client = AdminClient::connect("http://shop", &password(), transport).unwrap();
        let repo = client.repository::<DeliveryTime>();
        let result = repo.search(&Criteria::ids(["d1"])).unwrap();
        assert_eq!(result.total, 0);
        repo.delete(&["d1".to_string()]).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for request in &seen[1..] {
            assert_eq!(request.method, HttpMethod::Post);
            assert!(request
                .headers
                .contains(&("authorization".to_string(), "Bearer tok-1".to_string())));
        }
        assert_eq!(seen[1].path, "http://shop/api/search/delivery-time");
        assert_eq!(seen[2].path, "http://shop/api/_action/sync");
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let (transport, _) = Scripted::new(&[(200, TOKEN)]);
        let client = AdminClient::connect("http://shop", &password(), transport).unwrap();
        let err = client.info().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
