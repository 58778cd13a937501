//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use boutique_api::{build_router, AppConfig, AppState, NotifyError, OrderConfirmation, OrderNotifier};
use boutique_core::Product;
use boutique_db::{Database, DbConfig, NewProduct};

pub const CUSTOMER_ID: &str = "google-customer";
pub const CUSTOMER_EMAIL: &str = "camille@example.com";
pub const ADMIN_ID: &str = "google-admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Forwards every confirmation to a channel the test can await.
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<OrderConfirmation>,
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn order_confirmed(&self, confirmation: &OrderConfirmation) -> Result<(), NotifyError> {
        let _ = self.tx.send(confirmation.clone());
        Ok(())
    }
}

/// Always fails, and reports that it was called.
pub struct FailingNotifier {
    tx: mpsc::UnboundedSender<OrderConfirmation>,
}

#[async_trait]
impl OrderNotifier for FailingNotifier {
    async fn order_confirmed(&self, confirmation: &OrderConfirmation) -> Result<(), NotifyError> {
        let _ = self.tx.send(confirmation.clone());
        Err(NotifyError::DeliveryFailed("smtp relay down".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: Database,
    pub notifications: mpsc::UnboundedReceiver<OrderConfirmation>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(false).await
    }

    pub async fn with_failing_notifier() -> Self {
        Self::build(true).await
    }

    async fn build(failing: bool) -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("integration-secret".to_string()),
            "NOTIFY_FROM_ADDRESS" => Some("commandes@example.com".to_string()),
            _ => None,
        })
        .unwrap();

        let (tx, notifications) = mpsc::unbounded_channel();
        let notifier: Arc<dyn OrderNotifier> = if failing {
            Arc::new(FailingNotifier { tx })
        } else {
            Arc::new(RecordingNotifier { tx })
        };

        let state = AppState::new(db.clone(), config, notifier);
        let router = build_router(state.clone());

        TestApp {
            router,
            state,
            db,
            notifications,
        }
    }

    pub fn customer_token(&self) -> String {
        self.state.jwt.generate_token(CUSTOMER_ID, CUSTOMER_EMAIL, false).unwrap()
    }

    pub fn admin_token(&self) -> String {
        self.state.jwt.generate_token(ADMIN_ID, ADMIN_EMAIL, true).unwrap()
    }

    pub async fn product(&self, name: &str, price_cents: i64, stock: i64) -> Product {
        self.db
            .products()
            .insert(&NewProduct::new(name, price_cents, stock))
            .await
            .unwrap()
    }

    pub async fn stock_of(&self, product_id: &str) -> i64 {
        self.db.products().get_by_id(product_id).await.unwrap().unwrap().stock
    }

    /// Sends one request through a clone of the router.
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Same as `send`, with a raw (possibly malformed) JSON body.
    pub async fn send_raw(&self, method: &str, uri: &str, token: &str, raw: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn next_notification(&mut self) -> OrderConfirmation {
        tokio::time::timeout(Duration::from_secs(2), self.notifications.recv())
            .await
            .expect("no notification within 2s")
            .expect("notifier dropped")
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn expect_status(response: Response<Body>, status: StatusCode) -> Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected body: {json}");
    json
}
