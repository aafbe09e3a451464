use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use ovpanel::models::AppState;
use ovpanel::routes::build_router;

const SESSION_ID: &str = "panel-test-session";

#[derive(Clone, Debug)]
struct RecordedRequest {
    method: String,
    path: String,
    body: String,
}

#[derive(Clone)]
struct MockState {
    accounts: Value,
    mutation_response: Value,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn mock_backend_handler(
    axum::extract::State(mock): axum::extract::State<MockState>,
    req: Request<Body>,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    mock.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: String::from_utf8_lossy(&bytes).to_string(),
    });

    match (method.as_str(), path.as_str()) {
        ("GET", "/api/users") => axum::Json(mock.accounts.clone()).into_response(),
        ("POST", p) if p.ends_with("/approve") => {
            axum::Json(mock.mutation_response.clone()).into_response()
        }
        ("POST", p) if p.ends_with("/generate_download") => axum::Json(json!({
            "success": true,
            "download_url": "/download/bob.ovpn",
            "actual_filename": "bob.ovpn",
        }))
        .into_response(),
        ("GET", "/download/bob.ovpn") => "client\ndev tun\nremote vpn.example.com 1194\n".into_response(),
        ("DELETE", p) if p.starts_with("/api/users/") => {
            axum::Json(mock.mutation_response.clone()).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start a recording stand-in for the VPN backend on an ephemeral port.
/// Mutating calls answer `{"success": true}`.
async fn spawn_backend(accounts: Value) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    spawn_backend_with_mutation_response(accounts, json!({"success": true})).await
}

/// Same stand-in, but approve and delete answer with the given payload.
async fn spawn_backend_with_mutation_response(
    accounts: Value,
    mutation_response: Value,
) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mock = MockState {
        accounts,
        mutation_response,
        requests: requests.clone(),
    };
    let router = Router::new()
        .fallback(any(mock_backend_handler))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), requests)
}

/// Build the panel router with an authenticated operator session.
fn panel_app(api_base_url: &str) -> Router {
    ovpanel::api::client::set_silent(true);
    let mut sessions = HashMap::new();
    sessions.insert(SESSION_ID.to_string(), "admin".to_string());
    let state = AppState {
        operators: Arc::new(Mutex::new(HashMap::new())),
        sessions: Arc::new(Mutex::new(sessions)),
        flash_store: Arc::new(Mutex::new(HashMap::new())),
        api_base_url: api_base_url.to_string(),
        api_token: String::new(),
        public_base_url: "http://127.0.0.1:8080".to_string(),
        client: reqwest::Client::new(),
        custom_css: None,
    };
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, format!("session_id={}", SESSION_ID))
        .body(Body::empty())
        .unwrap()
}

fn form_post(uri: &str, form_body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, format!("session_id={}", SESSION_ID))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body.to_string()))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

fn sample_accounts() -> Value {
    json!([
        {
            "id": 1,
            "username": "alice",
            "email": "alice@example.com",
            "status": "pending",
            "created_at": "2024-03-01T08:00:00"
        },
        {
            "id": 2,
            "username": "bob",
            "email": "bob@example.com",
            "status": "approved",
            "created_at": "2024-02-20T10:15:00",
            "approved_at": "2024-02-21T09:00:00",
            "ovpn_username": "bob-vpn",
            "max_devices": 2
        },
        {
            "id": 3,
            "username": "carol",
            "email": "carol@example.com",
            "status": "pending",
            "created_at": "2024-03-02T12:30:00"
        },
        {
            "id": 4,
            "username": "dave",
            "email": "dave@example.com",
            "status": "rejected",
            "created_at": "2024-01-05T16:45:00"
        }
    ])
}

#[tokio::test]
async fn requests_without_a_session_redirect_to_login() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/accounts/pending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn pending_tab_lists_only_pending_accounts_in_backend_order() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(get("/accounts/pending")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("alice"));
    assert!(body.contains("carol"));
    assert!(!body.contains("bob@example.com"));
    assert!(!body.contains("dave"));
    // Backend order survives the in-memory filter.
    let alice_pos = body.find("alice").unwrap();
    let carol_pos = body.find("carol").unwrap();
    assert!(alice_pos < carol_pos);
    // Pending accounts get Approve and Delete but never Download.
    assert!(body.contains("/account/1/approve"));
    assert!(body.contains("/account/1/delete"));
    assert!(!body.contains("/download"));
}

#[tokio::test]
async fn approved_tab_offers_download_but_not_approve() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(get("/accounts/approved")).await.unwrap();
    let body = body_string(response).await;

    assert!(body.contains("bob"));
    assert!(!body.contains("alice"));
    assert!(body.contains("/account/bob/download"));
    assert!(!body.contains("/approve\""));
}

#[tokio::test]
async fn all_tab_shows_every_account() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(get("/accounts/all")).await.unwrap();
    let body = body_string(response).await;

    for name in ["alice", "bob", "carol", "dave"] {
        assert!(body.contains(name), "missing account {}", name);
    }
}

#[tokio::test]
async fn empty_account_list_renders_placeholder() {
    let (backend_url, _) = spawn_backend(json!([])).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(get("/accounts/pending")).await.unwrap();
    let body = body_string(response).await;

    assert!(body.contains("No accounts to show."));
    assert!(!body.contains("/approve\""));
}

#[tokio::test]
async fn unknown_tab_redirects_to_pending() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(get("/accounts/bogus")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/accounts/pending");
}

#[tokio::test]
async fn unreachable_backend_renders_error_banner() {
    // Nothing listens on this port.
    let app = panel_app("http://127.0.0.1:9");

    let response = app.oneshot(get("/accounts/all")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("Failed to load accounts"));
}

#[tokio::test]
async fn mismatched_passwords_never_reach_the_backend() {
    let (backend_url, requests) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app
        .oneshot(form_post(
            "/account/1/approve",
            "username=alice&ovpn_username=alice&password=longenough&password_confirm=different1&max_devices=2",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Passwords do not match"));
    // The form re-renders with the prior values, minus the passwords.
    assert!(body.contains("value=\"alice\""));
    assert!(!body.contains("longenough"));
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn short_passwords_never_reach_the_backend() {
    let (backend_url, requests) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app
        .oneshot(form_post(
            "/account/1/approve",
            "username=alice&ovpn_username=alice&password=short&password_confirm=short&max_devices=2",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Password must be at least 8 characters"));
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn valid_approval_posts_exactly_three_fields() {
    let (backend_url, requests) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app
        .clone()
        .oneshot(form_post(
            "/account/1/approve",
            "username=alice&ovpn_username=alice-vpn&password=longenough&password_confirm=longenough&max_devices=3",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/accounts/pending");

    let recorded = requests.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].path, "/api/users/1/approve");

    let payload: Value = serde_json::from_str(&recorded[0].body).unwrap();
    let fields = payload.as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields["ovpn_username"], "alice-vpn");
    assert_eq!(fields["password"], "longenough");
    assert_eq!(fields["max_devices"], 3);
}

#[tokio::test]
async fn approval_success_banner_shows_once() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app
        .clone()
        .oneshot(form_post(
            "/account/1/approve",
            "username=alice&ovpn_username=alice&password=longenough&password_confirm=longenough&max_devices=2",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // The redirect target shows the banner exactly once.
    let first = app.clone().oneshot(get("/accounts/pending")).await.unwrap();
    let first_body = body_string(first).await;
    assert!(first_body.contains("message-success"));
    assert!(first_body.contains("provisioned"));

    let second = app.oneshot(get("/accounts/pending")).await.unwrap();
    let second_body = body_string(second).await;
    assert!(!second_body.contains("message-success"));
}

#[tokio::test]
async fn backend_rejected_approval_rerenders_form_with_server_message() {
    let (backend_url, requests) = spawn_backend_with_mutation_response(
        sample_accounts(),
        json!({"success": false, "error": "useradd failed"}),
    )
    .await;
    let app = panel_app(&backend_url);

    let response = app
        .oneshot(form_post(
            "/account/1/approve",
            "username=alice&ovpn_username=alice-vpn&password=longenough&password_confirm=longenough&max_devices=2",
        ))
        .await
        .unwrap();

    // The workflow stays open: no redirect, the form comes back with
    // the backend's reason and the entered values minus the passwords.
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Approval failed"));
    assert!(body.contains("useradd failed"));
    assert!(body.contains("value=\"alice-vpn\""));
    assert!(!body.contains("longenough"));

    let recorded = requests.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].path, "/api/users/1/approve");
}

#[tokio::test]
async fn failed_delete_flashes_error_on_all_tab() {
    let (backend_url, _) = spawn_backend_with_mutation_response(
        sample_accounts(),
        json!({"success": false, "error": "account is in use"}),
    )
    .await;
    let app = panel_app(&backend_url);

    let response = app
        .clone()
        .oneshot(form_post("/account/2/delete", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/accounts/all");

    let landing = app.oneshot(get("/accounts/all")).await.unwrap();
    let body = body_string(landing).await;
    assert!(body.contains("message-error"));
    assert!(body.contains("Delete failed"));
    assert!(body.contains("account is in use"));
}

#[tokio::test]
async fn delete_confirmation_page_issues_no_delete() {
    let (backend_url, requests) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(get("/account/2/delete")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert!(body.contains("cannot be undone"));
    assert!(body.contains("bob"));

    let recorded = requests.lock().unwrap().clone();
    assert!(recorded.iter().all(|r| r.method != "DELETE"));
}

#[tokio::test]
async fn delete_post_issues_exactly_one_delete() {
    let (backend_url, requests) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(form_post("/account/2/delete", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/accounts/all");

    let recorded = requests.lock().unwrap().clone();
    let deletes: Vec<_> = recorded.iter().filter(|r| r.method == "DELETE").collect();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].path, "/api/users/2");
}

#[tokio::test]
async fn download_streams_config_with_attachment_headers() {
    let (backend_url, requests) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(form_post("/account/bob/download", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/x-openvpn-profile"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("bob.ovpn"));

    let body = body_string(response).await;
    assert!(body.contains("dev tun"));

    let recorded = requests.lock().unwrap().clone();
    assert!(recorded
        .iter()
        .any(|r| r.method == "POST" && r.path == "/api/users/bob/generate_download"));
    assert!(recorded
        .iter()
        .any(|r| r.method == "GET" && r.path == "/download/bob.ovpn"));
}

#[tokio::test]
async fn concurrent_tab_requests_render_independently() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let (pending, approved) = tokio::join!(
        app.clone().oneshot(get("/accounts/pending")),
        app.clone().oneshot(get("/accounts/approved")),
    );

    let pending_body = body_string(pending.unwrap()).await;
    let approved_body = body_string(approved.unwrap()).await;

    assert!(pending_body.contains("alice"));
    assert!(!pending_body.contains("bob@example.com"));
    assert!(approved_body.contains("bob"));
    assert!(!approved_body.contains("alice"));
}

#[tokio::test]
async fn accounts_root_redirects_to_pending_tab() {
    let (backend_url, _) = spawn_backend(sample_accounts()).await;
    let app = panel_app(&backend_url);

    let response = app.oneshot(get("/accounts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/accounts/pending");
}
