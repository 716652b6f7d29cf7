//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext with a private in-memory database and a manual clock
//! - Helper functions for creating test data
//!
//! No external services are needed.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::Value;

use srs_core::{ManualClock, DAY_MS};
use yomi_srs_backend::db::Database;
use yomi_srs_backend::AppState;

/// 2024-03-10T12:00:00Z
pub const NOW: i64 = 1_710_072_000_000;

pub const DUE_DEFAULT_LIMIT: i64 = 20;

/// Test context with an isolated database and a clock that only moves
/// when told to.
pub struct TestContext {
    pub db: Arc<Database>,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if the in-memory database cannot be set up.
    pub async fn new() -> Self {
        let db = Database::connect_in_memory()
            .await
            .expect("Failed to open in-memory database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        db.ensure_defaults(NOW)
            .await
            .expect("Failed to seed defaults");

        let db = Arc::new(db);
        let clock = Arc::new(ManualClock::new(NOW));
        let state = AppState::new(db.clone(), clock.clone(), DUE_DEFAULT_LIMIT);

        Self { db, clock, state }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        yomi_srs_backend::router(self.state.clone())
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance(days * DAY_MS);
    }

    /// Create a flashcard through the API and return its id.
    pub async fn create_card(&self, server: &TestServer, id: &str) -> String {
        let response = server
            .post("/api/flashcards")
            .json(&fixtures::flashcard_with_id(id, "質問", "answer"))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["flashcard"]["id"].as_str().unwrap().to_string()
    }

    /// Insert a bare flashcard row, bypassing eager review-state setup.
    pub async fn insert_raw_flashcard(&self, id: &str, created_at: i64) {
        sqlx::query(
            "INSERT INTO flashcards (id, front, back, tags, created_at) VALUES (?, 'front', 'back', '[]', ?)",
        )
        .bind(id)
        .bind(created_at)
        .execute(self.db.pool())
        .await
        .expect("Failed to insert flashcard");
    }

    /// Submit a review on the UI scale and return the review body.
    pub async fn review(&self, server: &TestServer, card_id: &str, ui_rating: i64) -> Value {
        let response = server
            .post("/api/srs/review")
            .json(&fixtures::review_request(card_id, ui_rating))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["review"].clone()
    }

    pub async fn stored_review(&self, server: &TestServer, card_id: &str) -> Value {
        let response = server.get(&format!("/api/srs/reviews/{}", card_id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["review"].clone()
    }

    pub async fn stats(&self, server: &TestServer) -> Value {
        let response = server.get("/api/srs/stats").await;
        response.assert_status_ok();
        response.json()
    }
}
