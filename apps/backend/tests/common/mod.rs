//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wiring the real router to PostgreSQL and an in-memory corpus
//! - Helper functions for creating test data
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use openwords_backend::corpus::SqliteCorpus;
use openwords_backend::db::Database;
use openwords_backend::models::Device;
use openwords_backend::{app, AppState};

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Create a new test context backed by [`fixtures::sample_corpus`].
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        Self::with_corpus(fixtures::sample_corpus()).await
    }

    pub async fn with_corpus(corpus: SqliteCorpus) -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(db, corpus);
        let app = app(state.clone());

        Self {
            db: state.db.clone(),
            state,
            app,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test device and return its ID and token.
    pub async fn create_test_device(&self, name: Option<&str>) -> (Uuid, String) {
        let device = self
            .db
            .create_device(name)
            .await
            .expect("Failed to create test device");
        (device.id, device.token)
    }

    /// Get device by token.
    pub async fn get_device_by_token(&self, token: &str) -> Option<Device> {
        self.db.get_device_by_token(token).await.ok().flatten()
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Move an item's next review into the past so it is due now.
    pub async fn make_due(&self, device_id: Uuid, item_id: i64, hours_overdue: i64) {
        sqlx::query(
            "UPDATE card_states SET next_review = NOW() - make_interval(hours => $3::INT) \
             WHERE device_id = $1 AND item_id = $2",
        )
        .bind(device_id)
        .bind(item_id)
        .bind(hours_overdue as i32)
        .execute(self.db.pool())
        .await
        .expect("Failed to backdate card state");
    }

    /// Clean up test data for a device.
    pub async fn cleanup_device(&self, device_id: Uuid) {
        // Custom words go with their module
        for table in ["card_states", "daily_stats", "custom_modules", "user_settings"] {
            let _ = sqlx::query(&format!("DELETE FROM {table} WHERE device_id = $1"))
                .bind(device_id)
                .execute(self.db.pool())
                .await;
        }

        let _ = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(device_id)
            .execute(self.db.pool())
            .await;
    }
}
