//! Integration tests for `ApiClient` using wiremock HTTP mocks.
//!
//! Each test stands up its own mock server, so no real network traffic is
//! made. Tests cover the request contract of every endpoint (path, body,
//! bearer header) and the mapping of failures onto `ApiError` kinds.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::json;
use shopfront_api::{ApiClient, ApiError};
use shopfront_core::{NewProduct, OrderLine, OrderRequest, PLACEHOLDER_IMAGE_URL};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, 5, "shopfront-test/0.1").expect("client construction should not fail")
}

fn auth_body() -> serde_json::Value {
    json!({
        "jwt": "token-abc",
        "user": {"id": 1, "username": "ada", "email": "ada@example.com", "confirmed": true}
    })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_posts_credentials_and_parses_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local"))
        .and(body_json(json!({"identifier": "ada", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
        .expect(1)
        .mount(&server)
        .await;

    let auth = test_client(&server.uri())
        .login("ada", "pw")
        .await
        .expect("login should succeed");
    assert_eq!(auth.jwt, "token-abc");
    assert_eq!(auth.user.username, "ada");
    assert_eq!(auth.user.email, "ada@example.com");
}

#[tokio::test]
async fn login_rejection_maps_to_authentication_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"status": 400, "name": "ValidationError", "message": "Invalid identifier or password"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .login("ada", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AuthenticationFailed), "got {err:?}");
}

#[tokio::test]
async fn login_with_malformed_success_body_is_authentication_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).login("ada", "pw").await.unwrap_err();
    assert!(matches!(err, ApiError::AuthenticationFailed));
}

#[tokio::test]
async fn login_against_unreachable_server_is_authentication_failed() {
    let err = test_client("http://127.0.0.1:1")
        .login("ada", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AuthenticationFailed));
}

#[tokio::test]
async fn register_posts_all_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local/register"))
        .and(body_json(json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "pw"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
        .expect(1)
        .mount(&server)
        .await;

    let auth = test_client(&server.uri())
        .register("ada", "ada@example.com", "pw")
        .await
        .expect("register should succeed");
    assert_eq!(auth.user.id, 1);
}

#[tokio::test]
async fn register_conflict_maps_to_registration_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local/register"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .register("ada", "ada@example.com", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::RegistrationFailed));
}

#[tokio::test]
async fn fetch_me_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "ada", "email": "ada@example.com", "blocked": false
        })))
        .mount(&server)
        .await;

    let profile = test_client(&server.uri())
        .fetch_me("token-abc")
        .await
        .expect("profile fetch should succeed");
    assert_eq!(profile.username, "ada");
}

#[tokio::test]
async fn fetch_me_unauthorized_is_fetch_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .fetch_me("expired")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ApiError::FetchFailed { status: Some(401), .. }),
        "got {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_products_populates_media_and_normalizes_both_formats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("populate", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "name": "Mug", "price": 12.5, "image": {"url": "/uploads/mug.png"}},
                {"id": 2, "attributes": {
                    "name": "Tee", "price": "20", "category": "Apparel",
                    "image": {"data": {"attributes": {"url": "/uploads/tee.png"}}}
                }},
                {"id": 3}
            ],
            "meta": {}
        })))
        .mount(&server)
        .await;

    let base = server.uri();
    let products = test_client(&base).list_products().await.unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[0].image, format!("{base}/uploads/mug.png"));
    assert_eq!(products[0].price, Decimal::from_str("12.5").unwrap());
    assert_eq!(products[1].name, "Tee");
    assert_eq!(products[1].category, "Apparel");
    assert_eq!(products[1].image, format!("{base}/uploads/tee.png"));
    assert_eq!(products[2].name, "Unnamed Product");
    assert_eq!(products[2].image, PLACEHOLDER_IMAGE_URL);
}

#[tokio::test]
async fn list_products_without_envelope_is_invalid_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).list_products().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponseFormat { .. }));
}

#[tokio::test]
async fn list_products_server_error_is_fetch_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).list_products().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::FetchFailed {
            resource: "products",
            status: Some(500)
        }
    ));
}

#[tokio::test]
async fn list_products_retries_transient_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry_policy(2, 0);
    let products = client.list_products().await.expect("should succeed after retries");
    assert_eq!(products.len(), 1);
}

#[tokio::test]
async fn list_products_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry_policy(3, 0);
    let err = client.list_products().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

fn new_mug() -> NewProduct {
    NewProduct {
        name: "Mug".to_string(),
        price: Decimal::from_str("12.50").unwrap(),
        category: Some("Kitchen".to_string()),
    }
}

#[tokio::test]
async fn create_product_wraps_fields_in_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer token-abc"))
        .and(body_json(json!({
            "data": {"name": "Mug", "price": 12.5, "category": "Kitchen"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 41, "documentId": "d41", "name": "Mug", "price": 12.5, "category": "Kitchen"},
            "meta": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = test_client(&server.uri())
        .create_product("token-abc", &new_mug())
        .await
        .unwrap();
    assert_eq!(created.id, 41);
    assert_eq!(created.name, "Mug");
    assert!(created.has_placeholder_image());
}

#[tokio::test]
async fn create_product_forbidden_is_creation_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .create_product("token-abc", &new_mug())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::ProductCreationFailed { status: Some(403) }
    ));
}

#[tokio::test]
async fn upload_product_attaches_image_to_created_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 41, "name": "Mug"}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header("authorization", "Bearer token-abc"))
        .and(body_string_contains("api::product.product"))
        .and(body_string_contains("mug.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 9, "url": "/uploads/mug_abc.png"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("mug.png");
    std::fs::write(&image, b"fake png bytes").unwrap();

    let base = server.uri();
    let created = test_client(&base)
        .upload_product("token-abc", &new_mug(), Some(&image))
        .await
        .unwrap();
    assert_eq!(created.id, 41);
    assert_eq!(created.image, format!("{base}/uploads/mug_abc.png"));
}

#[tokio::test]
async fn upload_failure_after_creation_is_partial() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("big.jpg");
    std::fs::write(&image, b"jpeg").unwrap();

    let err = test_client(&server.uri())
        .upload_product("token-abc", &new_mug(), Some(&image))
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ApiError::PartialUploadFailure {
                product_id: 42,
                status: Some(413)
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn upload_with_missing_image_creates_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .upload_product(
            "token-abc",
            &new_mug(),
            Some(std::path::Path::new("/no/such/file.png")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Media { .. }));
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

fn one_line_order() -> OrderRequest {
    OrderRequest::pending(
        vec![OrderLine {
            product: 1,
            quantity: 2,
            price: Decimal::from_str("10").unwrap(),
        }],
        Decimal::from_str("20").unwrap(),
    )
}

#[tokio::test]
async fn create_order_posts_enveloped_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer token-abc"))
        .and(body_json(json!({
            "data": {
                "items": [{"product": 1, "quantity": 2, "price": 10.0}],
                "total": 20.0,
                "orderStatus": "pending"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 77, "documentId": "o77", "orderStatus": "pending",
                     "createdAt": "2025-05-01T12:00:00.000Z"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = test_client(&server.uri())
        .create_order("token-abc", &one_line_order())
        .await
        .unwrap();
    assert_eq!(receipt.id, 77);
    assert_eq!(receipt.document_id.as_deref(), Some("o77"));
    assert!(receipt.created_at.is_some());
}

#[tokio::test]
async fn create_order_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry_policy(3, 0);
    let err = client
        .create_order("token-abc", &one_line_order())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::OrderCreationFailed { status: Some(502) }
    ));
}
