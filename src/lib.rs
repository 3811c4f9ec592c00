pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod rbac;
pub mod routes;
pub mod services;
pub mod smtp;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::smtp::MailTransport;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub transport: Arc<dyn MailTransport>,
}

impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<dyn MailTransport> {
    fn from_ref(state: &AppState) -> Self {
        state.transport.clone()
    }
}
