//! In-process fake verification backend shared by the integration tests.
//!
//! Routes mirror the real service closely enough to exercise the client's
//! status handling. Every request is counted so tests can prove that a
//! call never reached the network.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use axum::extract::{Multipart, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use faceverify::config::HttpConfig;
use faceverify::{
    ApiClient, AuthClient, ClientConfig, DiagnosticsClient, HistoryAggregator, SessionStore,
    VerificationClient,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Token the fake backend accepts.
pub const VALID_TOKEN: &str = "valid-token";

/// Credentials the fake backend accepts.
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct horse";

/// One multipart part as received by the backend.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

/// Canned reply overriding an endpoint's default behavior.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
        }
    }

    pub fn status(status: StatusCode, body: Option<Value>) -> Self {
        Self { status, body }
    }

    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

#[derive(Default)]
struct BackendState {
    hits: Mutex<HashMap<String, usize>>,
    verify_reply: Mutex<Option<Reply>>,
    predict_reply: Mutex<Option<Reply>>,
    signup_reply: Mutex<Option<Reply>>,
    login_reply: Mutex<Option<Reply>>,
    me_reply: Mutex<Option<Reply>>,
    history_reply: Mutex<Option<Reply>>,
    history: Mutex<Vec<Value>>,
    history_query: Mutex<Option<String>>,
    verify_parts: Mutex<Vec<ReceivedPart>>,
    predict_authorization: Mutex<Option<String>>,
    last_login: Mutex<Option<HashMap<String, String>>>,
    delay: Mutex<Option<Duration>>,
}

/// Handle to the running fake backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<BackendState>,
}

impl FakeBackend {
    /// Number of requests received for `route`, e.g. `"POST /verify/"`.
    pub fn hits(&self, route: &str) -> usize {
        self.state.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    /// Total number of requests received.
    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }

    pub fn set_verify_reply(&self, reply: Reply) {
        *self.state.verify_reply.lock().unwrap() = Some(reply);
    }

    pub fn set_predict_reply(&self, reply: Reply) {
        *self.state.predict_reply.lock().unwrap() = Some(reply);
    }

    pub fn set_signup_reply(&self, reply: Reply) {
        *self.state.signup_reply.lock().unwrap() = Some(reply);
    }

    pub fn set_login_reply(&self, reply: Reply) {
        *self.state.login_reply.lock().unwrap() = Some(reply);
    }

    /// Overrides `/auth/me`, regardless of the presented token.
    pub fn set_me_reply(&self, reply: Reply) {
        *self.state.me_reply.lock().unwrap() = Some(reply);
    }

    /// Overrides `GET /verify/history`, regardless of the presented token.
    pub fn set_history_reply(&self, reply: Reply) {
        *self.state.history_reply.lock().unwrap() = Some(reply);
    }

    pub fn set_history(&self, records: Vec<Value>) {
        *self.state.history.lock().unwrap() = records;
    }

    /// Delays every verification and history response.
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn history_query(&self) -> Option<String> {
        self.state.history_query.lock().unwrap().clone()
    }

    pub fn verify_parts(&self) -> Vec<ReceivedPart> {
        self.state.verify_parts.lock().unwrap().clone()
    }

    pub fn predict_authorization(&self) -> Option<String> {
        self.state.predict_authorization.lock().unwrap().clone()
    }

    pub fn last_login(&self) -> Option<HashMap<String, String>> {
        self.state.last_login.lock().unwrap().clone()
    }

    fn record(&self, route: &str) {
        *self
            .state
            .hits
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default() += 1;
    }

    async fn maybe_delay(&self) {
        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Running backend plus clients pointed at it.
pub struct Harness {
    pub backend: FakeBackend,
    pub config: ClientConfig,
    pub session: SessionStore,
    pub api: ApiClient,
}

impl Harness {
    /// Starts a backend on an ephemeral port with default client settings.
    pub async fn start() -> Self {
        Self::start_with(|config| config).await
    }

    /// Starts a backend, letting the caller adjust the client config.
    pub async fn start_with(configure: impl FnOnce(ClientConfig) -> ClientConfig) -> Self {
        let backend = FakeBackend::default();
        let base_url = spawn(backend.clone()).await;
        let config = configure(
            ClientConfig::default()
                .with_api_url(base_url)
                .with_http_config(HttpConfig {
                    timeout_ms: 5_000,
                    connect_timeout_ms: 1_000,
                }),
        );
        let api = ApiClient::new(&config).expect("api client");
        Self {
            backend,
            config,
            session: SessionStore::in_memory(),
            api,
        }
    }

    /// Marks the session as logged in without a network call.
    pub fn log_in(&self) {
        self.session.set_token(VALID_TOKEN).expect("set token");
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone(), self.session.clone())
    }

    pub fn verification(&self) -> VerificationClient {
        VerificationClient::new(self.api.clone(), self.session.clone(), &self.config)
    }

    pub fn history(&self) -> HistoryAggregator {
        HistoryAggregator::new(self.api.clone(), self.session.clone(), &self.config)
    }

    pub fn diagnostics(&self) -> DiagnosticsClient {
        DiagnosticsClient::new(self.api.clone(), self.session.clone())
    }
}

/// A history record in the backend's wire format.
pub fn history_record(id: &str, result: &str, confidence: f64, created_at: &str) -> Value {
    json!({
        "id": id,
        "result": result,
        "confidence_score": confidence,
        "created_at": created_at,
        "image1_filename": "a.jpg",
        "image2_filename": "b.jpg",
    })
}

// ============================================================================
// Server
// ============================================================================

async fn spawn(backend: FakeBackend) -> String {
    let app = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/verify/", post(verify))
        .route("/predict", post(predict))
        .route("/verify/history", get(list_history).delete(clear_history))
        .route("/verify/config", get(verify_config))
        .route("/health", get(health))
        .route("/model-info", get(model_info))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {VALID_TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
        .into_response()
}

fn user_json(username: &str, email: &str) -> Value {
    json!({
        "_id": "64f0c0ffee",
        "email": email,
        "username": username,
        "created_at": "2024-05-01T09:30:00",
    })
}

async fn signup(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    backend.record("POST /auth/signup");
    let override_reply = backend.state.signup_reply.lock().unwrap().clone();
    if let Some(reply) = override_reply {
        return reply.into_response();
    }
    let username = body["username"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    if username == USERNAME {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Username already registered"})),
        )
            .into_response();
    }
    if !email.contains('@') {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}]})),
        )
            .into_response();
    }
    Json(user_json(username, email)).into_response()
}

async fn login(
    State(backend): State<FakeBackend>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    backend.record("POST /auth/login");
    let ok = form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD);
    *backend.state.last_login.lock().unwrap() = Some(form);
    let override_reply = backend.state.login_reply.lock().unwrap().clone();
    if let Some(reply) = override_reply {
        return reply.into_response();
    }
    if ok {
        Json(json!({"access_token": VALID_TOKEN, "token_type": "bearer"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        )
            .into_response()
    }
}

async fn me(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    backend.record("GET /auth/me");
    let override_reply = backend.state.me_reply.lock().unwrap().clone();
    if let Some(reply) = override_reply {
        return reply.into_response();
    }
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(user_json(USERNAME, "alice@example.com")).into_response()
}

async fn read_parts(mut multipart: Multipart) -> Vec<ReceivedPart> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let len = field.bytes().await.expect("part bytes").len();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            len,
        });
    }
    parts
}

async fn verify(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    backend.record("POST /verify/");
    let parts = read_parts(multipart).await;
    backend.maybe_delay().await;
    if !authorized(&headers) {
        return unauthorized();
    }
    *backend.state.verify_parts.lock().unwrap() = parts;

    let reply = backend.state.verify_reply.lock().unwrap().clone();
    reply
        .unwrap_or_else(|| Reply::ok(json!({"is_same_person": true, "confidence_percentage": 88.0})))
        .into_response()
}

async fn predict(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    backend.record("POST /predict");
    *backend.state.predict_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let parts = read_parts(multipart).await;
    if parts.len() != 2 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Both image1 and image2 are required"})),
        )
            .into_response();
    }

    let reply = backend.state.predict_reply.lock().unwrap().clone();
    reply
        .unwrap_or_else(|| {
            Reply::ok(json!({
                "result": "match",
                "confidence": 0.82,
                "cosine_similarity": 0.82,
                "euclidean_distance": 0.6,
            }))
        })
        .into_response()
}

async fn list_history(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    backend.record("GET /verify/history");
    backend.maybe_delay().await;
    let override_reply = backend.state.history_reply.lock().unwrap().clone();
    if let Some(reply) = override_reply {
        return reply.into_response();
    }
    if !authorized(&headers) {
        return unauthorized();
    }
    *backend.state.history_query.lock().unwrap() = query;
    let records = backend.state.history.lock().unwrap().clone();
    Json(Value::Array(records)).into_response()
}

async fn clear_history(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    backend.record("DELETE /verify/history");
    if !authorized(&headers) {
        return unauthorized();
    }
    backend.state.history.lock().unwrap().clear();
    StatusCode::NO_CONTENT.into_response()
}

async fn verify_config(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    backend.record("GET /verify/config");
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "threshold": 0.5,
        "allowed_extensions": ["jpg", "jpeg", "png"],
        "max_file_size_mb": 10.0,
    }))
    .into_response()
}

async fn health(State(backend): State<FakeBackend>) -> Response {
    backend.record("GET /health");
    Json(json!({"status": "healthy", "model_loaded": true, "model": "Facenet512", "threshold": 0.498}))
        .into_response()
}

async fn model_info(State(backend): State<FakeBackend>) -> Response {
    backend.record("GET /model-info");
    Json(json!({
        "model_name": "Facenet512",
        "model_type": "CNN",
        "threshold": 0.498,
        "backend": "DeepFace",
    }))
    .into_response()
}
