//! HTTP-level tests driving the router with `oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use facility_desk::api::build_router;
use facility_desk::auth::hash_password;
use facility_desk::config::{AuthConfig, BootstrapAdmin};
use facility_desk::domain::{Account, Profile, Role};
use facility_desk::storage::DeskRepository;
use facility_desk::AppState;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestApp {
    router: Router,
    repository: DeskRepository,
}

async fn setup() -> TestApp {
    let repository = DeskRepository::in_memory().await.unwrap();
    let auth: AuthConfig = serde_json::from_value(json!({
        "jwt_secret": "test-secret",
        "default_role": "technician"
    }))
    .unwrap();

    let state = AppState::new(repository.clone(), &auth).await.unwrap();
    state
        .users
        .ensure_bootstrap_admin(&BootstrapAdmin {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            full_name: Some("Admin".to_string()),
        })
        .await
        .unwrap();

    TestApp {
        router: build_router(state, true),
        repository,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
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

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_user(&self, admin: &str, email: &str, role: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/admin/users",
                Some(admin),
                Some(json!({ "email": email, "password": "password123", "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create user failed: {body}");
        body["data"].clone()
    }

    async fn create_branch(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .send(Method::POST, "/v1/branches", Some(token), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;
    let (status, body) = app.send(Method::GET, "/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = setup().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "wrong-password" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = setup().await;
    let (status, _) = app.send(Method::GET, "/v1/tickets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_ticket_starts_open() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id = app.create_branch(&admin, "فرع المعادي").await;

    let (status, ticket) = app
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&admin),
            Some(json!({ "title": "تكييف لا يعمل", "branch_id": branch_id })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["ticket_number"], 1);
    assert_eq!(ticket["priority"], "medium");

    let (status, fetched) = app
        .send(Method::GET, &format!("/v1/tickets/{}", ticket["id"].as_str().unwrap()), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["branch_id"], branch_id.as_str());
}

#[tokio::test]
async fn test_create_ticket_unknown_branch_is_bad_request() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&admin),
            Some(json!({ "title": "Leak", "branch_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_admin_cannot_delete_user() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let manager = app.create_user(&admin, "manager@example.com", "manager").await;
    let victim = app.create_user(&admin, "tech@example.com", "technician").await;

    let manager_token = app.login("manager@example.com", "password123").await;
    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/v1/admin/users/{}", victim["id"].as_str().unwrap()),
            Some(&manager_token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
    assert_eq!(manager["role"], "manager");

    // The admin can.
    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/v1/admin/users/{}", victim["id"].as_str().unwrap()),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);
}

#[tokio::test]
async fn test_duplicate_email_is_bad_request() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app.create_user(&admin, "dup@example.com", "technician").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/v1/admin/users",
            Some(&admin),
            Some(json!({ "email": "dup@example.com", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_profile_is_created_as_technician() {
    let app = setup().await;
    let account = Account::new("orphan@example.com".to_string(), hash_password("password123"));
    app.repository
        .create_account(&account, &Profile::new(account.id, account.email.clone(), Role::Admin))
        .await
        .unwrap();
    sqlx::query("DELETE FROM profiles WHERE id = ?")
        .bind(account.id.to_string())
        .execute(app.repository.pool())
        .await
        .unwrap();

    let token = app.login("orphan@example.com", "password123").await;
    let (status, me) = app.send(Method::GET, "/v1/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["profile"]["role"], "technician");
    assert!(me["permissions"]["users"].is_null());
}

#[tokio::test]
async fn test_technician_only_sees_own_tickets() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id = app.create_branch(&admin, "Branch").await;
    app.create_user(&admin, "tech@example.com", "technician").await;
    let tech = app.login("tech@example.com", "password123").await;

    let (_, foreign) = app
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&admin),
            Some(json!({ "title": "Admin ticket", "branch_id": branch_id })),
        )
        .await;
    let (status, own) = app
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&tech),
            Some(json!({ "title": "My ticket", "branch_id": branch_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, list) = app.send(Method::GET, "/v1/tickets", Some(&tech), None).await;
    assert_eq!(status, StatusCode::OK);
    let tickets = list["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["id"], own["id"]);

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/v1/tickets/{}", foreign["id"].as_str().unwrap()),
            Some(&tech),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_illegal_transition_is_bad_request() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id = app.create_branch(&admin, "Branch").await;
    let (_, ticket) = app
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&admin),
            Some(json!({ "title": "Broken door", "branch_id": branch_id })),
        )
        .await;
    let uri = format!("/v1/tickets/{}/status", ticket["id"].as_str().unwrap());

    let (status, _) = app
        .send(Method::POST, &uri, Some(&admin), Some(json!({ "status": "closed" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, moved) = app
        .send(Method::POST, &uri, Some(&admin), Some(json!({ "status": "in_progress" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["status"], "in_progress");
}

#[tokio::test]
async fn test_consuming_more_than_stock_is_rejected() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let branch_id = app.create_branch(&admin, "Branch").await;
    let (_, ticket) = app
        .send(
            Method::POST,
            "/v1/tickets",
            Some(&admin),
            Some(json!({ "title": "Fridge", "branch_id": branch_id })),
        )
        .await;
    let (status, part) = app
        .send(
            Method::POST,
            "/v1/spare-parts",
            Some(&admin),
            Some(json!({ "name": "Compressor", "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/v1/tickets/{}/parts", ticket["id"].as_str().unwrap());
    let (status, _) = app
        .send(
            Method::POST,
            &uri,
            Some(&admin),
            Some(json!({ "spare_part_id": part["id"], "quantity": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, parts) = app.send(Method::GET, "/v1/spare-parts", Some(&admin), None).await;
    assert_eq!(parts["spare_parts"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_rejected_user_update_keeps_old_password() {
    let app = setup().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let tech = app.create_user(&admin, "tech@example.com", "technician").await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/v1/admin/users/{}", tech["id"].as_str().unwrap()),
            Some(&admin),
            Some(json!({ "password": "brand-new-pass", "branch_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.login("tech@example.com", "password123").await;
    let (status, _) = app
        .send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "tech@example.com", "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
