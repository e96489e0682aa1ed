//! Test utilities and helpers for integration and unit testing
//!
//! Common test infrastructure: in-memory database setup/teardown, seed
//! helpers, mock data factories, and a float tolerance assertion.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::generator;
use crate::models::{Block, MaxesMap};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing.
/// Runs all migrations and returns a ready-to-use pool.
///
/// Uses max_connections(1) to prevent multiple pool connections from
/// creating isolated in-memory databases, which would cause intermittent
/// test failures.
pub async fn setup_test_db() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Close a test database pool.
pub async fn teardown_test_db(pool: SqlitePool) {
    pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// The canonical streetlifting test user: added-weight 1RMs in kilograms.
pub fn test_maxes() -> MaxesMap {
    MaxesMap::from([
        ("pullups".to_string(), 10.0),
        ("dips".to_string(), 20.0),
        ("muscle_ups".to_string(), 5.0),
        ("squats".to_string(), 100.0),
    ])
}

pub fn test_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Generate and persist a beginner linear block for a user, returning it.
pub async fn seed_test_block(pool: &SqlitePool, user_id: i64) -> Block {
    generator::generate(
        pool,
        user_id,
        "beginner_linear",
        test_start_date(),
        &test_maxes(),
        None,
    )
    .await
    .expect("Failed to seed test block")
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let diff = ($left - $right).abs();
        assert!(
            diff < $tolerance,
            "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
            $left,
            $right,
            diff,
            $tolerance
        );
    };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------
