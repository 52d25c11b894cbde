//! HTTP surface: routing, authentication and role checks, driven through
//! `tower::ServiceExt::oneshot` against the fully layered router.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use booking_server::accounts::AccountService;
use booking_server::api::build_app;
use booking_server::payments::LocalPaymentGateway;
use booking_server::storage::BookingStorage;
use booking_server::utils::{BusinessClock, FixedClock};
use booking_server::{Config, JwtService, ServerState};
use chrono::NaiveDate;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::{RegisterRequest, UserRole};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    state: ServerState,
    gateway: Arc<LocalPaymentGateway>,
}

impl TestApp {
    /// Wednesday 2025-01-15 10:00 UTC
    fn new() -> Self {
        let now = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let clock = BusinessClock::new(Arc::new(FixedClock::at(now)), chrono_tz::UTC);
        let gateway = Arc::new(LocalPaymentGateway::new(b"whsec_http_test"));
        let state = ServerState::from_parts(
            Config::with_overrides("/tmp/booking-http-test", 0),
            BookingStorage::open_in_memory().unwrap(),
            clock,
            Arc::new(JwtService::new_with_secure_key()),
            gateway.clone(),
        );
        Self {
            app: build_app(&state),
            state,
            gateway,
        }
    }

    fn token_for(&self, email: &str, role: UserRole) -> String {
        let user = self
            .state
            .accounts
            .register(RegisterRequest {
                email: email.to_string(),
                password: "password-123".to_string(),
                name: email.split('@').next().unwrap().to_string(),
                role,
            })
            .unwrap();
        self.state
            .jwt_service
            .generate_token(&AccountService::current_user(&user))
            .unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Store-owned, admin-approved restaurant with one 10-seat table
    async fn open_restaurant(&self, store_token: &str) -> i64 {
        let (status, restaurant) = self
            .call(
                Method::POST,
                "/api/restaurants",
                Some(store_token),
                Some(json!({
                    "name": "Yakitori Torikizoku",
                    "genre": "yakitori",
                    "area": "Shibuya",
                    "address": "Tokyo",
                    "phone": "03-5555-5555",
                    "email": "tori@example.com",
                    "opening_hours": "17:00-23:00",
                    "closing_days": "Sunday"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{restaurant}");
        assert_eq!(restaurant["status"], "pending");
        let id = restaurant["id"].as_i64().unwrap();

        let admin_token = self.token_for_admin();
        let (status, approved) = self
            .call(
                Method::PUT,
                &format!("/api/admin/restaurants/{id}/approve"),
                Some(&admin_token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{approved}");
        assert_eq!(approved["status"], "active");

        let (status, _) = self
            .call(
                Method::POST,
                &format!("/api/restaurants/{id}/seats"),
                Some(store_token),
                Some(json!({"name": "Counter", "capacity": 10})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        id
    }

    fn token_for_admin(&self) -> String {
        let admin = match self
            .state
            .accounts
            .ensure_admin("admin@example.com", "admin-password")
            .unwrap()
        {
            Some(admin) => admin,
            None => self
                .state
                .accounts
                .authenticate("admin@example.com", "admin-password")
                .unwrap(),
        };
        self.state
            .jwt_service
            .generate_token(&AccountService::current_user(&admin))
            .unwrap()
    }
}

fn booking(restaurant_id: i64, party_size: i64) -> Value {
    json!({
        "restaurant_id": restaurant_id,
        "reservation_date": "2025-01-15",
        "reservation_time": "18:00",
        "party_size": party_size,
        "payment_method": "onsite"
    })
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/health/detailed", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
    assert_eq!(body["checks"]["locks"]["timeslot"], 0);
    assert_eq!(body["business_time"], "2025-01-15 10:00");
}

#[tokio::test]
async fn test_availability_is_public() {
    let app = TestApp::new();
    let store = app.token_for("store@example.com", UserRole::Store);
    let id = app.open_restaurant(&store).await;

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/restaurants/{id}/availability?date=2025-01-15&time=18:00&party_size=4"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["available"], true);
    assert_eq!(body["remaining"], 10);
    assert_eq!(body["time"], "18:00");

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/restaurants/{id}/availability?date=2025-01-19&time=18:00&party_size=4"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["reason"], "closed_day");

    let (status, list) = app.call(Method::GET, "/api/restaurants?area=shibuya", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_requires_token() {
    let app = TestApp::new();
    let (status, body) = app
        .call(Method::POST, "/api/reservations", None, Some(booking(1, 2)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, _) = app
        .call(Method::GET, "/api/reservations/my", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_cannot_reach_store_routes() {
    let app = TestApp::new();
    let store = app.token_for("store@example.com", UserRole::Store);
    let id = app.open_restaurant(&store).await;
    let customer = app.token_for("guest@example.com", UserRole::Customer);

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/restaurants/{id}/seats"),
            Some(&customer),
            Some(json!({"name": "Extra", "capacity": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::GET, "/api/reservations/store/list", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::GET, "/api/admin/restaurants", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_other_store_cannot_manage_restaurant() {
    let app = TestApp::new();
    let owner = app.token_for("owner@example.com", UserRole::Store);
    let id = app.open_restaurant(&owner).await;
    let rival = app.token_for("rival@example.com", UserRole::Store);

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/restaurants/{id}"),
            Some(&rival),
            Some(json!({"name": "Hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2004);
}

#[tokio::test]
async fn test_empty_opening_hours_rejected() {
    let app = TestApp::new();
    let store = app.token_for("store@example.com", UserRole::Store);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/restaurants",
            Some(&store),
            Some(json!({
                "name": "Soba Sarashina",
                "genre": "soba",
                "area": "Azabu",
                "address": "Tokyo",
                "phone": "03-1111-1111",
                "email": "soba@example.com",
                "opening_hours": "",
                "closing_days": ""
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], 3004);
    assert_eq!(body["details"]["field"], "opening_hours");

    let id = app.open_restaurant(&store).await;
    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/restaurants/{id}"),
            Some(&store),
            Some(json!({"opening_hours": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], 3004);
}

#[tokio::test]
async fn test_book_reject_and_cancel_over_http() {
    let app = TestApp::new();
    let store = app.token_for("store@example.com", UserRole::Store);
    let id = app.open_restaurant(&store).await;
    let customer = app.token_for("guest@example.com", UserRole::Customer);

    let (status, first) = app
        .call(Method::POST, "/api/reservations", Some(&customer), Some(booking(id, 8)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["status"], "confirmed");
    assert_eq!(first["payment_status"], "pending");

    let (status, rejected) = app
        .call(Method::POST, "/api/reservations", Some(&customer), Some(booking(id, 3)))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(rejected["details"]["reason"], "insufficient_capacity");

    let (status, list) = app
        .call(Method::GET, "/api/reservations/store/list", Some(&store), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["customer_email"], "guest@example.com");

    let first_id = first["id"].as_i64().unwrap();
    let (status, cancelled) = app
        .call(
            Method::PUT,
            &format!("/api/reservations/{first_id}/cancel"),
            Some(&customer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/reservations/{first_id}/cancel"),
            Some(&customer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, mine) = app
        .call(Method::GET, "/api/reservations/my", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["restaurant_name"], "Yakitori Torikizoku");
}

#[tokio::test]
async fn test_online_payment_settles_through_signed_webhook() {
    let app = TestApp::new();
    let store = app.token_for("store@example.com", UserRole::Store);
    let id = app.open_restaurant(&store).await;
    let customer = app.token_for("guest@example.com", UserRole::Customer);

    let mut online = booking(id, 2);
    online["payment_method"] = json!("online");
    online["amount"] = json!(9000);
    let (status, reservation) = app
        .call(Method::POST, "/api/reservations", Some(&customer), Some(online))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{reservation}");
    let reservation_id = reservation["id"].as_i64().unwrap();

    let (status, intent) = app
        .call(
            Method::POST,
            "/api/payments/create-intent",
            Some(&customer),
            Some(json!({"reservation_id": reservation_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{intent}");
    let intent_id = intent["payment_intent_id"].as_str().unwrap().to_string();

    // the customer cannot mark an unpaid intent as paid
    let (status, body) = app
        .call(
            Method::POST,
            "/api/payments/confirm",
            Some(&customer),
            Some(json!({"payment_intent_id": intent_id})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], 5007);

    app.gateway.settle(&intent_id).unwrap();
    let event = json!({
        "type": "payment_intent.succeeded",
        "data": {"object": {"id": intent_id}}
    })
    .to_string();

    let webhook = |signature: Option<String>| {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/payments/webhook")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header("payment-signature", signature);
        }
        builder.body(Body::from(event.clone())).unwrap()
    };

    let response = app.app.clone().oneshot(webhook(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = app
        .app
        .clone()
        .oneshot(webhook(Some("00".repeat(32))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let stored = app.state.ledger.get(reservation_id).unwrap();
    assert_eq!(stored.payment_status.as_str(), "pending");

    let signature = app.gateway.sign(event.as_bytes());
    let response = app.app.clone().oneshot(webhook(Some(signature))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let ack: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(ack["success"], true);
    assert_eq!(ack["reservation_id"], reservation_id);

    let stored = app.state.ledger.get(reservation_id).unwrap();
    assert_eq!(stored.payment_status.as_str(), "paid");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new();
    let (status, user) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "Hanako@Example.com",
                "password": "password-123",
                "name": "Hanako"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");
    assert_eq!(user["role"], "customer");

    let (status, login) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "hanako@example.com", "password": "password-123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap().to_string();

    let (status, me) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "hanako@example.com");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "hanako@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}
