//! Block progress tracking and derived views
//!
//! Operates on already-persisted blocks: week advancement with an
//! optimistic lost-update guard, completion transitions, workout completion
//! plumbing, and the recomputable read-only views (weekly projections and
//! RPE tables) clients render.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::catalog::Methodology;
use crate::error::EngineError;
use crate::loads;
use crate::models::{Block, BlockStatus, ExercisePrescription, MaxesMap, PlannedWorkout, Stage};
use crate::progression::{IncrementType, Strategy};

// ---------------------------------------------------------------------------
/// Row Mapping
// ---------------------------------------------------------------------------

fn block_from_row(row: &SqliteRow) -> Result<Block, EngineError> {
    let maxes_json: String = row.get("maxes_json");
    let training_maxes_json: String = row.get("training_maxes_json");
    let params_json: String = row.get("params_json");

    let methodology_str: String = row.get("methodology");
    let strategy_str: String = row.get("strategy");
    let status_str: String = row.get("status");

    Ok(Block {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        methodology: methodology_str
            .parse::<Methodology>()
            .unwrap_or(Methodology::LinearProgression),
        strategy: Strategy::parse_or_general(&strategy_str),
        total_weeks: row.get::<i64, _>("total_weeks") as u32,
        current_week: row.get::<i64, _>("current_week") as u32,
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: status_str.parse().unwrap_or_default(),
        is_active: row.get("is_active"),
        maxes: serde_json::from_str(&maxes_json)?,
        training_maxes: serde_json::from_str(&training_maxes_json)?,
        params: serde_json::from_str(&params_json)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn stage_from_row(row: &SqliteRow) -> Stage {
    Stage {
        id: row.get("id"),
        block_id: row.get("block_id"),
        name: row.get("name"),
        week_number: row.get::<i64, _>("week_number") as u32,
        load_percentage: row.get("load_percentage"),
        volume_multiplier: row.get("volume_multiplier"),
        intensity_focus: row.get("intensity_focus"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

fn workout_from_row(row: &SqliteRow) -> Result<PlannedWorkout, EngineError> {
    let exercises_json: String = row.get("exercises_json");
    let exercises: Vec<ExercisePrescription> = serde_json::from_str(&exercises_json)?;

    Ok(PlannedWorkout {
        id: row.get("id"),
        block_id: row.get("block_id"),
        week_number: row.get::<i64, _>("week_number") as u32,
        day_number: row.get::<i64, _>("day_number") as u32,
        workout_name: row.get("workout_name"),
        focus: row.get("focus"),
        estimated_duration: row.get::<i64, _>("estimated_duration") as u32,
        exercises,
        notes: row.get("notes"),
        is_completed: row.get("is_completed"),
        completed_at: row.get("completed_at"),
        created_at: row.get("created_at"),
    })
}

// ---------------------------------------------------------------------------
/// Block Queries
// ---------------------------------------------------------------------------

pub async fn get_block(pool: &SqlitePool, block_id: i64, user_id: i64) -> Result<Block, EngineError> {
    let row = sqlx::query("SELECT * FROM training_blocks WHERE id = ?1 AND user_id = ?2")
        .bind(block_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(EngineError::BlockNotFound(block_id))?;
    block_from_row(&row)
}

pub async fn list_blocks(pool: &SqlitePool, user_id: i64) -> Result<Vec<Block>, EngineError> {
    let rows = sqlx::query("SELECT * FROM training_blocks WHERE user_id = ?1 ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    rows.iter().map(block_from_row).collect()
}

pub async fn active_block(pool: &SqlitePool, user_id: i64) -> Result<Option<Block>, EngineError> {
    let row = sqlx::query("SELECT * FROM training_blocks WHERE user_id = ?1 AND is_active = 1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(block_from_row).transpose()
}

/// Make one block the user's active block, deactivating any other, and mark
/// it in progress.
pub async fn activate_block(
    pool: &SqlitePool,
    block_id: i64,
    user_id: i64,
) -> Result<Block, EngineError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE training_blocks SET is_active = 0 WHERE user_id = ?1 AND id != ?2")
        .bind(user_id)
        .bind(block_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query(
        r#"
        UPDATE training_blocks
        SET is_active = 1, status = 'in_progress', updated_at = ?1
        WHERE id = ?2 AND user_id = ?3
        "#,
    )
    .bind(Utc::now())
    .bind(block_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(EngineError::BlockNotFound(block_id));
    }

    tx.commit().await?;
    get_block(pool, block_id, user_id).await
}

// ---------------------------------------------------------------------------
/// Week Advancement
// ---------------------------------------------------------------------------

/// Advance a block by one week.
///
/// A no-op at the final week. Reaching the final week flips the block to
/// completed and deactivates it. Concurrency-safe: the underlying update
/// only applies if the counter still matches the snapshot this call read.
pub async fn advance_week(pool: &SqlitePool, block_id: i64, user_id: i64) -> Result<Block, EngineError> {
    let block = get_block(pool, block_id, user_id).await?;
    advance_week_from(pool, &block).await
}

/// Advance from a caller-held snapshot. A concurrent advance since the
/// snapshot was read surfaces as `Conflict` rather than a double increment.
pub async fn advance_week_from(pool: &SqlitePool, block: &Block) -> Result<Block, EngineError> {
    if block.current_week >= block.total_weeks {
        return Ok(block.clone());
    }

    let new_week = block.current_week + 1;
    let completing = new_week >= block.total_weeks;
    let new_status = if completing {
        BlockStatus::Completed
    } else {
        block.status
    };
    let still_active = block.is_active && !completing;

    let result = sqlx::query(
        r#"
        UPDATE training_blocks
        SET current_week = ?1, status = ?2, is_active = ?3, updated_at = ?4
        WHERE id = ?5 AND current_week = ?6
        "#,
    )
    .bind(new_week as i64)
    .bind(new_status.to_string())
    .bind(still_active)
    .bind(Utc::now())
    .bind(block.id)
    .bind(block.current_week as i64)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(EngineError::Conflict(format!(
            "block {} advanced concurrently",
            block.id
        )));
    }

    info!(block_id = block.id, week = new_week, completing, "advanced training block");
    get_block(pool, block.id, block.user_id).await
}

// ---------------------------------------------------------------------------
/// Workout Completion
// ---------------------------------------------------------------------------

/// Mark one planned workout done.
pub async fn complete_workout(pool: &SqlitePool, workout_id: i64) -> Result<(), EngineError> {
    let result = sqlx::query(
        "UPDATE planned_workouts SET is_completed = 1, completed_at = ?1 WHERE id = ?2",
    )
    .bind(Utc::now())
    .bind(workout_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(EngineError::WorkoutNotFound(workout_id));
    }
    Ok(())
}

/// Whether every planned workout of a week is completed. A week with no
/// workouts is not complete - there is nothing to have finished.
pub async fn week_complete(
    pool: &SqlitePool,
    block_id: i64,
    week_number: u32,
) -> Result<bool, EngineError> {
    let (total, done): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(is_completed), 0)
        FROM planned_workouts
        WHERE block_id = ?1 AND week_number = ?2
        "#,
    )
    .bind(block_id)
    .bind(week_number as i64)
    .fetch_one(pool)
    .await?;

    Ok(total > 0 && done == total)
}

// ---------------------------------------------------------------------------
/// Stage / Workout Readback
// ---------------------------------------------------------------------------

pub async fn block_stages(pool: &SqlitePool, block_id: i64) -> Result<Vec<Stage>, EngineError> {
    let rows = sqlx::query("SELECT * FROM block_stages WHERE block_id = ?1 ORDER BY week_number")
        .bind(block_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(stage_from_row).collect())
}

pub async fn week_workouts(
    pool: &SqlitePool,
    block_id: i64,
    week_number: u32,
) -> Result<Vec<PlannedWorkout>, EngineError> {
    let rows = sqlx::query(
        "SELECT * FROM planned_workouts WHERE block_id = ?1 AND week_number = ?2 ORDER BY day_number",
    )
    .bind(block_id)
    .bind(week_number as i64)
    .fetch_all(pool)
    .await?;
    rows.iter().map(workout_from_row).collect()
}

// ---------------------------------------------------------------------------
/// Progress View
// ---------------------------------------------------------------------------

/// Read-only derived view of a block's progress. Recomputable at any time
/// from the persisted block alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockProgress {
    pub current_week: u32,
    pub total_weeks: u32,
    pub progress_percentage: f64,
    /// week -> exercise -> projected working weight
    pub weekly_projections: BTreeMap<u32, BTreeMap<String, f64>>,
    /// exercise -> RPE level -> weights by rep column
    pub rpe_tables: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

pub async fn block_progress(
    pool: &SqlitePool,
    block_id: i64,
    user_id: i64,
) -> Result<BlockProgress, EngineError> {
    let block = get_block(pool, block_id, user_id).await?;

    Ok(BlockProgress {
        current_week: block.current_week,
        total_weeks: block.total_weeks,
        progress_percentage: block.progress_percentage(),
        weekly_projections: weekly_projections(&block),
        rpe_tables: rpe_tables(&block.maxes),
    })
}

/// Projected working weight per exercise for every week of the block, from
/// the block's own increment settings.
fn weekly_projections(block: &Block) -> BTreeMap<u32, BTreeMap<String, f64>> {
    let mut projections = BTreeMap::new();

    for week in 1..=block.total_weeks {
        let mut week_map = BTreeMap::new();
        for (exercise, &one_rm) in &block.maxes {
            let projected = if one_rm > 0.0 {
                let increment = match block.params.increment_type {
                    IncrementType::Percentage => one_rm * block.params.weekly_increment / 100.0,
                    IncrementType::Absolute => block.params.weekly_increment,
                };
                loads::round1(one_rm + increment * (week - 1) as f64)
            } else {
                0.0
            };
            week_map.insert(exercise.clone(), projected);
        }
        projections.insert(week, week_map);
    }

    projections
}

/// RPE-indexed load tables for every exercise with an established max.
fn rpe_tables(maxes: &MaxesMap) -> BTreeMap<String, BTreeMap<String, Vec<f64>>> {
    maxes
        .iter()
        .filter(|(_, &one_rm)| one_rm > 0.0)
        .map(|(exercise, &one_rm)| (exercise.clone(), loads::rpe_table(one_rm)))
        .collect()
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::test_utils::{seed_test_block, setup_test_db, teardown_test_db};

    #[tokio::test]
    async fn test_advance_week_increments_counter() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;
        assert_eq!(block.current_week, 1);

        let advanced = advance_week(&pool, block.id, 1).await.unwrap();
        assert_eq!(advanced.current_week, 2);
        assert_eq!(advanced.status, BlockStatus::Planned);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_advance_to_final_week_completes_block() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;

        let mut current = block;
        for _ in 1..current.total_weeks {
            current = advance_week(&pool, current.id, 1).await.unwrap();
        }

        assert_eq!(current.current_week, current.total_weeks);
        assert_eq!(current.status, BlockStatus::Completed);
        assert!(!current.is_active);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_advance_at_final_week_is_noop() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;

        let mut current = block;
        for _ in 1..current.total_weeks {
            current = advance_week(&pool, current.id, 1).await.unwrap();
        }
        let again = advance_week(&pool, current.id, 1).await.unwrap();

        assert_eq!(again.current_week, current.current_week);
        assert_eq!(again.status, BlockStatus::Completed);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_stale_snapshot_advance_conflicts() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;

        // Two callers read the same snapshot; only the first advance lands
        let snapshot = get_block(&pool, block.id, 1).await.unwrap();
        let first = advance_week_from(&pool, &snapshot).await.unwrap();
        assert_eq!(first.current_week, 2);

        let second = advance_week_from(&pool, &snapshot).await;
        assert!(matches!(second, Err(EngineError::Conflict(_))));

        // Exactly one increment happened
        let current = get_block(&pool, block.id, 1).await.unwrap();
        assert_eq!(current.current_week, 2);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_activate_block_is_exclusive() {
        let pool = setup_test_db().await;
        let first = seed_test_block(&pool, 1).await;
        let second = seed_test_block(&pool, 1).await;

        activate_block(&pool, first.id, 1).await.unwrap();
        let activated = activate_block(&pool, second.id, 1).await.unwrap();
        assert!(activated.is_active);
        assert_eq!(activated.status, BlockStatus::InProgress);

        let first_again = get_block(&pool, first.id, 1).await.unwrap();
        assert!(!first_again.is_active);

        let active = active_block(&pool, 1).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_get_block_scopes_by_user() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;

        let err = get_block(&pool, block.id, 99).await;
        assert!(matches!(err, Err(EngineError::BlockNotFound(_))));

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_complete_workout_and_week_completion() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;

        assert!(!week_complete(&pool, block.id, 1).await.unwrap());

        let workouts = week_workouts(&pool, block.id, 1).await.unwrap();
        assert_eq!(workouts.len(), 3);
        for workout in &workouts {
            assert!(!workout.is_completed);
            complete_workout(&pool, workout.id).await.unwrap();
        }

        assert!(week_complete(&pool, block.id, 1).await.unwrap());
        // Other weeks are untouched
        assert!(!week_complete(&pool, block.id, 2).await.unwrap());

        let reloaded = week_workouts(&pool, block.id, 1).await.unwrap();
        assert!(reloaded.iter().all(|w| w.is_completed && w.completed_at.is_some()));

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_complete_missing_workout_fails() {
        let pool = setup_test_db().await;
        let err = complete_workout(&pool, 12345).await;
        assert!(matches!(err, Err(EngineError::WorkoutNotFound(12345))));
        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_stages_read_back_ordered_and_contiguous() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;

        let stages = block_stages(&pool, block.id).await.unwrap();
        assert_eq!(stages.len() as u32, block.total_weeks);
        for (i, stage) in stages.iter().enumerate() {
            assert_eq!(stage.week_number, i as u32 + 1);
        }

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_block_progress_view() {
        let pool = setup_test_db().await;
        let block = seed_test_block(&pool, 1).await;

        let progress = block_progress(&pool, block.id, 1).await.unwrap();
        assert_eq!(progress.current_week, 1);
        assert_eq!(progress.total_weeks, 12);
        assert_approx_eq!(progress.progress_percentage, 8.3, 0.001);

        // Week 1 projects the raw max; later weeks add the increment
        let week1 = &progress.weekly_projections[&1];
        assert_approx_eq!(week1["squats"], 100.0, 0.001);
        let week3 = &progress.weekly_projections[&3];
        assert_approx_eq!(week3["squats"], 105.0, 0.001);

        // RPE tables exist for every lift with a max, topping out at 1RM
        let squat_table = &progress.rpe_tables["squats"];
        assert_approx_eq!(squat_table["RPE_10"][0], 100.0, 0.001);

        teardown_test_db(pool).await;
    }
}
