use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use funnel_link::config::{AdminConfig, Config, DiagnosticSinkKind, StoreBackend};
use funnel_link::diagnostics::DiagnosticSink;
use funnel_link::models::WebhookDelivery;
use funnel_link::store::MemorySubmissionStore;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password123";
pub const SURVEY_URL: &str = "https://survey.example.com/rg-sales-software-version/";

/// Keeps every webhook delivery so tests can inspect the diagnostic trail.
#[derive(Default)]
pub struct CapturingSink(pub Mutex<Vec<WebhookDelivery>>);

#[async_trait]
impl DiagnosticSink for CapturingSink {
    async fn record(&self, delivery: &WebhookDelivery) {
        self.0.lock().unwrap().push(delivery.clone());
    }
}

/// A running test server over the in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemorySubmissionStore>,
    pub sink: Arc<CapturingSink>,
}

pub struct AdminSession {
    pub access_token: String,
    pub csrf_token: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Post a landing form as JSON, return (body, status).
    pub async fn intake_json(&self, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/efc/v1/intake"))
            .json(body)
            .send()
            .await
            .expect("intake request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit the target form and return the generated submission_id.
    pub async fn create_lead(&self, first_name: &str, email: &str) -> String {
        let (body, status) = self
            .intake_json(&json!({
                "form_name": "LandingPageLead",
                "fields": { "first_name": first_name, "email": email }
            }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "intake failed: {body}");
        body["submission_id"].as_str().unwrap().to_string()
    }

    /// Deliver a survey webhook with a raw body and optional query string.
    pub async fn webhook(&self, query: &str, body: &str) -> (Value, StatusCode) {
        let path = if query.is_empty() {
            "/efc/v1/funnelform-webhook".to_string()
        } else {
            format!("/efc/v1/funnelform-webhook?{query}")
        };
        let resp = self
            .client
            .post(self.url(&path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("webhook request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn admin_session(&self) -> AdminSession {
        let (body, status) = self.login(ADMIN_USER, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        AdminSession {
            access_token: body["access_token"].as_str().unwrap().to_string(),
            csrf_token: body["csrf_token"].as_str().unwrap().to_string(),
        }
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request, optionally with an anti-forgery token.
    pub async fn delete_auth(
        &self,
        path: &str,
        token: &str,
        csrf: Option<&str>,
    ) -> (Value, StatusCode) {
        let mut req = self.client.delete(self.url(path)).bearer_auth(token);
        if let Some(csrf) = csrf {
            req = req.header("x-csrf-token", csrf);
        }
        let resp = req.send().await.expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub fn deliveries(&self) -> Vec<WebhookDelivery> {
        self.sink.0.lock().unwrap().clone()
    }
}

pub fn test_config() -> Config {
    Config {
        store: StoreBackend::Memory,
        database_url: None,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        target_form: "LandingPageLead".to_string(),
        survey_url: SURVEY_URL.to_string(),
        max_body_size: 1_048_576,
        store_timeout: Duration::from_secs(1),
        diagnostic_sink: DiagnosticSinkKind::Tracing,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        admin: AdminConfig {
            username: ADMIN_USER.to_string(),
            password_hash: Some(funnel_link::auth::hash_password(ADMIN_PASSWORD).unwrap()),
        },
        log_level: "warn".to_string(),
    }
}

/// Spawn a test app with a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemorySubmissionStore::new());
    let sink = Arc::new(CapturingSink::default());

    let app = funnel_link::build_app(config, store.clone(), sink.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        store,
        sink,
    }
}
