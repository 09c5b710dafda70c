//! Generic request execution: timeouts, content-type handling, error
//! mapping, pagination, and the endpoint wrappers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use open_market_client::api::{ProductQuery, Request};
use open_market_client::models::{ImageUpload, NewProduct, Product, ShippingMethod, SignupRequest};
use open_market_client::{ApiClient, ApiError, Config, MemorySessionStore, SessionStore};

fn client_with_timeout(server: &MockServer, timeout: Duration) -> (ApiClient, Arc<MemorySessionStore>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let store = Arc::new(MemorySessionStore::new());
    let config = Config {
        base_url: server.uri(),
        timeout,
    };
    let client = ApiClient::with_config(config, store.clone()).expect("client should build");
    (client, store)
}

fn client_for(server: &MockServer) -> (ApiClient, Arc<MemorySessionStore>) {
    client_with_timeout(server, Duration::from_secs(5))
}

#[tokio::test]
async fn slow_responses_fail_as_timeouts_at_the_bound() {
    let server = MockServer::start().await;
    let (client, _) = client_with_timeout(&server, Duration::from_millis(300));

    Mock::given(method("GET"))
        .and(path("/products/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"count": 0, "next": null, "previous": null, "results": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let started = Instant::now();
    let err = client.fetch_products(&ProductQuery::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
    // failed at the configured bound, not at the server's pace
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn non_json_responses_come_back_as_text() {
    let server = MockServer::start().await;
    let (client, _) = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("pong", "text/plain"))
        .mount(&server)
        .await;

    let body = client.request(&Request::get("/ping")).await.unwrap();
    assert!(body.json().is_none());
    let err = body.decode::<serde_json::Value>().unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn error_message_comes_from_the_body_detail_field() {
    let server = MockServer::start().await;
    let (client, _) = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/accounts/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "아이디 또는 비밀번호가 일치하지 않습니다."
        })))
        .mount(&server)
        .await;

    let err = client.login("buyer1", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "아이디 또는 비밀번호가 일치하지 않습니다.");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}

#[tokio::test]
async fn unknown_error_bodies_get_a_synthesized_message() {
    let server = MockServer::start().await;
    let (client, _) = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/accounts/validate-username/"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "FAIL": "이미 사용 중인 아이디입니다."
        })))
        .mount(&server)
        .await;

    let err = client.validate_username("taken").await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 409 Conflict");
    match err {
        ApiError::Api { body: Some(body), .. } => {
            assert_eq!(body["FAIL"], "이미 사용 중인 아이디입니다.");
        }
        other => panic!("expected an API error with its body, got {other:?}"),
    }
}

#[tokio::test]
async fn search_and_pagination_round_trip() {
    let server = MockServer::start().await;
    let (client, _) = client_for(&server);

    let next = format!("{}/products/?page=2&search=tea", server.uri());
    Mock::given(method("GET"))
        .and(path("/products/"))
        .and(query_param("search", "tea"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null, "previous": null,
            "results": [{
                "id": 7, "name": "Green tea", "price": 12000,
                "shipping_method": "PARCEL", "shipping_fee": 3000, "stock": 20
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/"))
        .and(query_param("search", "tea"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": next, "previous": null, "results": []
        })))
        .mount(&server)
        .await;

    let first = client
        .fetch_products(&ProductQuery::search("tea"))
        .await
        .expect("first page should load");
    assert!(first.has_next());

    let second: open_market_client::models::Page<Product> = client
        .fetch_page(first.next.as_deref().unwrap())
        .await
        .expect("next URL should be followable");
    assert_eq!(second.results[0].name, "Green tea");
}

#[tokio::test]
async fn seller_product_listing_hits_the_seller_path() {
    let server = MockServer::start().await;
    let (client, _) = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/leeshop/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 0, "next": null, "previous": null, "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .fetch_seller_products("leeshop", &ProductQuery::default())
        .await
        .expect("seller listing should load");
}

#[tokio::test]
async fn product_creation_uploads_a_multipart_form() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.set_tokens("A1", Some("R1"));

    Mock::given(method("POST"))
        .and(path("/products/"))
        .and(header("Authorization", "Bearer A1"))
        .and(body_string_contains("Green tea"))
        .and(body_string_contains("PARCEL"))
        .and(body_string_contains("tea.jpg"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42, "name": "Green tea", "info": "Loose leaf, 100g",
            "image": "https://cdn.example.com/tea.jpg", "price": 12000,
            "shipping_method": "PARCEL", "shipping_fee": 3000, "stock": 20
        })))
        .expect(1)
        .mount(&server)
        .await;

    let product = client
        .create_product(&NewProduct {
            name: "Green tea".into(),
            info: "Loose leaf, 100g".into(),
            image: ImageUpload {
                data: b"not-actually-a-jpeg".to_vec(),
                filename: "tea.jpg".into(),
                mime: "image/jpeg".into(),
            },
            price: 12000,
            shipping_method: ShippingMethod::Parcel,
            shipping_fee: 3000,
            stock: 20,
        })
        .await
        .expect("creation should succeed");
    assert_eq!(product.id, 42);
}

#[tokio::test]
async fn product_delete_goes_through_the_authed_path() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.set_tokens("A1", Some("R1"));

    Mock::given(method("DELETE"))
        .and(path("/products/5/"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_product(5).await.expect("delete should succeed");
}

#[tokio::test]
async fn signup_posts_the_seller_payload() {
    let server = MockServer::start().await;
    let (client, _) = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/accounts/signup/"))
        .and(body_json(json!({
            "username": "leeshop",
            "password": "pw12345678",
            "name": "Lee",
            "phone_number": "01099998888",
            "user_type": "SELLER",
            "company_registration_number": "1234567890",
            "store_name": "Lee's Shop"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "username": "leeshop",
            "name": "Lee",
            "phone_number": "01099998888",
            "user_type": "SELLER",
            "store_name": "Lee's Shop",
            "company_registration_number": "1234567890"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let signup = SignupRequest::seller(
        "leeshop",
        "pw12345678",
        "Lee",
        "01099998888",
        "1234567890",
        "Lee's Shop",
    );
    let user = client.signup(&signup).await.expect("signup should succeed");
    assert_eq!(user.store_name.as_deref(), Some("Lee's Shop"));
}

#[tokio::test]
async fn cart_updates_send_json_bodies() {
    let server = MockServer::start().await;
    let (client, store) = client_for(&server);
    store.set_tokens("A1", Some("R1"));

    Mock::given(method("POST"))
        .and(path("/cart/"))
        .and(header("Authorization", "Bearer A1"))
        .and(body_json(json!({"product_id": 7, "quantity": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"detail": "added"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/cart/3/"))
        .and(body_json(json!({"quantity": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "product": {
                "id": 7, "name": "Green tea", "price": 12000,
                "shipping_method": "PARCEL", "shipping_fee": 3000, "stock": 20
            },
            "quantity": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.add_to_cart(7, 2).await.expect("add should succeed");
    let item = client
        .update_cart_quantity(3, 5)
        .await
        .expect("update should succeed");
    assert_eq!(item.quantity, 5);
    assert_eq!(item.product_total(), 60000);
}
