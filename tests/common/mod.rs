//! Shared harness: in-memory database, mock transport, HTTP helpers.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use campaign_hub::models::User;
use campaign_hub::services::user_service::{self, NewUser};
use campaign_hub::smtp::{MailTransport, TransportError};
use campaign_hub::{db, routes, AppState};

/// Transport double: records every send, fails addresses on the deny list.
#[derive(Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub failing: Mutex<HashSet<String>>,
}

impl MockTransport {
    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for MockTransport {
    async fn send(&self, subject: &str, body: &str, to: &str) -> Result<(), TransportError> {
        if self.failing.lock().unwrap().contains(to) {
            return Err(TransportError::Smtp(format!(
                "550 mailbox unavailable: {to}"
            )));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string(), to.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub transport: Arc<MockTransport>,
}

pub async fn spawn_app() -> TestApp {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    db::apply(&pool, include_str!("../../migrations/0001_users.sql"))
        .await
        .unwrap();
    db::apply(&pool, include_str!("../../migrations/0002_campaign.sql"))
        .await
        .unwrap();

    let transport = Arc::new(MockTransport::default());
    let state = AppState {
        pool: pool.clone(),
        transport: transport.clone(),
    };
    TestApp {
        app: routes::router(state),
        pool,
        transport,
    }
}

/// Register a user directly through the service layer and log them in.
pub async fn signup(pool: &SqlitePool, email: &str) -> (User, String) {
    let user = user_service::register(
        pool,
        NewUser {
            email: email.to_string(),
            full_name: format!("User {email}"),
            password: "correct horse".to_string(),
        },
    )
    .await
    .expect("register");
    let token = user_service::login(pool, email, "correct horse")
        .await
        .expect("login");
    (user, token)
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Create a message, a set of recipients, and a mailing bundling them.
/// Returns (message_id, mailing_id).
pub async fn make_mailing(
    app: &Router,
    token: &str,
    subject: &str,
    body: &str,
    recipient_emails: &[&str],
) -> (i64, i64) {
    let (status, message) = request(
        app,
        "POST",
        "/messages",
        Some(token),
        Some(serde_json::json!({ "subject": subject, "body": body })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = message["id"].as_i64().unwrap();

    let mut recipient_ids = Vec::new();
    for email in recipient_emails {
        let (status, recipient) = request(
            app,
            "POST",
            "/recipients",
            Some(token),
            Some(serde_json::json!({ "email": email, "full_name": "Campaign Target" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        recipient_ids.push(recipient["id"].as_i64().unwrap());
    }

    let (status, mailing) = request(
        app,
        "POST",
        "/mailings",
        Some(token),
        Some(serde_json::json!({ "message_id": message_id, "recipient_ids": recipient_ids })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (message_id, mailing["id"].as_i64().unwrap())
}

pub async fn attempt_count(pool: &SqlitePool, mailing_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM attempts WHERE mailing_id = ?")
        .bind(mailing_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
