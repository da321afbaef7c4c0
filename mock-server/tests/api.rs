use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_db, Db, ADMIN_PASSWORD, ADMIN_USERNAME, INTEGRATION_CLIENT_ID, INTEGRATION_CLIENT_SECRET};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, token: Option<&str>, body: &Value) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

async fn token(router: &axum::Router) -> String {
    let resp = router
        .clone()
        .oneshot(json_request(
            "/api/oauth/token",
            None,
            &json!({
                "grant_type": "client_credentials",
                "client_id": INTEGRATION_CLIENT_ID,
                "client_secret": INTEGRATION_CLIENT_SECRET,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["access_token"].as_str().unwrap().to_string()
}

// --- oauth ---

#[tokio::test]
async fn password_grant_issues_token() {
    let resp = app()
        .oneshot(json_request(
            "/api/oauth/token",
            None,
            &json!({
                "grant_type": "password",
                "client_id": "administration",
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD,
                "scopes": "write",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 600);
}

#[tokio::test]
async fn wrong_secret_returns_401() {
    let resp = app()
        .oneshot(json_request(
            "/api/oauth/token",
            None,
            &json!({
                "grant_type": "client_credentials",
                "client_id": INTEGRATION_CLIENT_ID,
                "client_secret": "nope",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_bytes(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("invalid_client"));
}

// --- auth guard ---

#[tokio::test]
async fn search_without_token_returns_401() {
    let resp = app()
        .oneshot(json_request("/api/search/rule", None, &json!({})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn info_version_with_token() {
    let router = app();
    let token = token(&router).await;
    let resp = router
        .oneshot(
            Request::builder()
                .uri("/api/_info/version")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["version"], mock_server::SHOP_VERSION);
}

// --- search ---

#[tokio::test]
async fn search_unknown_entity_returns_400() {
    let router = app();
    let token = token(&router).await;
    let resp = router
        .oneshot(json_request("/api/search/product", Some(&token), &json!({})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_missing_id_returns_zero_total() {
    let router = app();
    let token = token(&router).await;
    let resp = router
        .oneshot(json_request(
            "/api/search/delivery-time",
            Some(&token),
            &json!({"ids": ["00000000000000000000000000000000"]}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"total": 0, "data": []}));
}

// --- sync ---

#[tokio::test]
async fn sync_rejects_payload_without_id() {
    let db = Db::default();
    let router = app_with_db(db.clone());
    let token = token(&router).await;
    let resp = router
        .oneshot(json_request(
            "/api/_action/sync",
            Some(&token),
            &json!({"upsert-rule": {"entity": "rule", "action": "upsert", "payload": [{"name": "x"}]}}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(db.read().await.count("rule"), 0);
}

#[tokio::test]
async fn failing_operation_leaves_store_untouched() {
    let db = Db::default();
    let router = app_with_db(db.clone());
    let token = token(&router).await;
    let resp = router
        .oneshot(json_request(
            "/api/_action/sync",
            Some(&token),
            &json!({
                "a-upsert": {"entity": "rule", "action": "upsert", "payload": [{"id": "r1", "name": "ok"}]},
                "b-upsert": {"entity": "product", "action": "upsert", "payload": [{"id": "p1"}]},
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(db.read().await.count("rule"), 0);
}

// --- full sync/search lifecycle ---

#[tokio::test]
async fn upsert_search_delete_lifecycle() {
    let db = Db::default();
    let router = app_with_db(db.clone());
    let token = token(&router).await;

    // upsert a rule with one condition
    let resp = router
        .clone()
        .oneshot(json_request(
            "/api/_action/sync",
            Some(&token),
            &json!({"upsert-rule": {"entity": "rule", "action": "upsert", "payload": [{
                "id": "r1",
                "name": "Affiliate",
                "priority": 1.0,
                "moduleTypes": {"types": ["shipping"]},
                "conditions": [{"type": "customerAffiliateCode", "value": {"operator": "=", "affiliateCode": "X"}}],
            }]}}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(db.read().await.count("rule_condition"), 1);

    // search without the association: conditions are not hydrated
    let resp = router
        .clone()
        .oneshot(json_request("/api/search/rule", Some(&token), &json!({"ids": ["r1"]})))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["moduleTypes"]["types"][0], "shipping");
    assert!(body["data"][0]["conditions"].is_null());

    // search with the association
    let resp = router
        .clone()
        .oneshot(json_request(
            "/api/search/rule",
            Some(&token),
            &json!({"ids": ["r1"], "associations": {"conditions": {}}}),
        ))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["conditions"][0]["type"], "customerAffiliateCode");
    assert_eq!(body["data"][0]["conditions"][0]["ruleId"], "r1");

    // partial upsert merges into the stored row
    let resp = router
        .clone()
        .oneshot(json_request(
            "/api/_action/sync",
            Some(&token),
            &json!({"upsert-rule": {"entity": "rule", "action": "upsert", "payload": [{"id": "r1", "name": "Renamed"}]}}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    {
        let store = db.read().await;
        let row = store.get("rule", "r1").unwrap();
        assert_eq!(row["name"], "Renamed");
        assert_eq!(row["priority"], 1.0);
    }

    // delete
    let resp = router
        .clone()
        .oneshot(json_request(
            "/api/_action/sync",
            Some(&token),
            &json!({"delete-rule": {"entity": "rule", "action": "delete", "payload": [{"id": "r1"}]}}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(db.read().await.count("rule_condition"), 0);

    let resp = router
        .oneshot(json_request("/api/search/rule", Some(&token), &json!({"ids": ["r1"]})))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["total"], 0);
}

#[tokio::test]
async fn repeated_upsert_of_id_less_conditions_adds_rows() {
    let db = Db::default();
    let router = app_with_db(db.clone());
    let token = token(&router).await;
    let upsert = json!({"upsert-rule": {"entity": "rule", "action": "upsert", "payload": [{
        "id": "r1",
        "name": "Always",
        "priority": 1.0,
        "conditions": [{"type": "alwaysValid", "value": {}}],
    }]}});

    for _ in 0..2 {
        let resp = router
            .clone()
            .oneshot(json_request("/api/_action/sync", Some(&token), &upsert))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(db.read().await.count("rule"), 1);
    assert_eq!(db.read().await.count("rule_condition"), 2);
}
