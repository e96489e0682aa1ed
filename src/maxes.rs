//! One-rep max store
//!
//! Read/write helpers for recorded single-rep maxima. The engine itself
//! only consumes the collapsed "current max per exercise" mapping; the
//! record history belongs to the surrounding application.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::error::EngineError;
use crate::loads;
use crate::models::MaxesMap;

// ---------------------------------------------------------------------------
/// Confidence: measured on the platform vs estimated from rep work
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RmConfidence {
    #[default]
    Measured,
    Estimated,
}

impl std::fmt::Display for RmConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measured => write!(f, "measured"),
            Self::Estimated => write!(f, "estimated"),
        }
    }
}

impl std::str::FromStr for RmConfidence {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "measured" => Ok(Self::Measured),
            "estimated" => Ok(Self::Estimated),
            _ => Err(format!("Unknown confidence tag: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneRepMax {
    pub id: i64,
    pub user_id: i64,
    pub exercise: String,
    pub one_rm: f64,
    pub confidence: RmConfidence,
    pub date_achieved: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
/// Estimation
// ---------------------------------------------------------------------------

/// Estimated 1RM from a rep-work set on a bodyweight-loaded movement:
/// Epley over the total system weight, with body weight backed out again.
pub fn estimate_one_rm(added_weight: f64, reps: u32, body_weight: f64) -> f64 {
    if reps <= 1 {
        return loads::round1(added_weight);
    }
    let total = body_weight + added_weight;
    loads::round1(total * (1.0 + 0.0333 * reps as f64) - body_weight)
}

// ---------------------------------------------------------------------------
/// Database Operations
// ---------------------------------------------------------------------------

/// Record a new max for an exercise. History is kept; nothing is replaced.
pub async fn record_max(
    pool: &SqlitePool,
    user_id: i64,
    exercise: &str,
    one_rm: f64,
    confidence: RmConfidence,
    date_achieved: NaiveDate,
) -> Result<i64, EngineError> {
    let result = sqlx::query(
        r#"
        INSERT INTO one_rep_maxes (user_id, exercise, one_rm, confidence, date_achieved, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(user_id)
    .bind(exercise)
    .bind(one_rm)
    .bind(confidence.to_string())
    .bind(date_achieved)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// All recorded maxes for a user, newest first.
pub async fn list_maxes(pool: &SqlitePool, user_id: i64) -> Result<Vec<OneRepMax>, EngineError> {
    let rows = sqlx::query(
        "SELECT * FROM one_rep_maxes WHERE user_id = ?1 ORDER BY date_achieved DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut maxes = Vec::with_capacity(rows.len());
    for row in rows {
        let confidence_str: String = row.get("confidence");
        maxes.push(OneRepMax {
            id: row.get("id"),
            user_id: row.get("user_id"),
            exercise: row.get("exercise"),
            one_rm: row.get("one_rm"),
            confidence: confidence_str.parse().unwrap_or_default(),
            date_achieved: row.get("date_achieved"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        });
    }
    Ok(maxes)
}

/// The most recent max per exercise, collapsed into the mapping the
/// orchestrator consumes.
pub async fn current_maxes(pool: &SqlitePool, user_id: i64) -> Result<MaxesMap, EngineError> {
    let rows = sqlx::query(
        r#"
        SELECT exercise, one_rm
        FROM one_rep_maxes
        WHERE user_id = ?1
        ORDER BY date_achieved ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    // Later rows win: last write per exercise is the current max
    let mut maxes = MaxesMap::new();
    for row in rows {
        let exercise: String = row.get("exercise");
        maxes.insert(exercise, row.get("one_rm"));
    }
    Ok(maxes)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
