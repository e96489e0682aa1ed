//! Program generation orchestrator
//!
//! Single entry point for turning a methodology key, a start date, and a
//! user's maxes into a persisted block with all of its stages and planned
//! workouts. Planning is pure (value objects only); persistence happens in
//! one transaction that commits everything or nothing.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::catalog::{Catalog, MethodologyTemplate};
use crate::error::EngineError;
use crate::loads;
use crate::models::{Block, MaxesMap, NewBlock, NewPlannedWorkout, NewStage};
use crate::progression::{
    DailyVariation, IncrementType, Strategy, StrategyParams, WavePattern,
};
use crate::stages::generate_stages;
use crate::tracker;
use crate::workouts::generate_workouts;

/// Fraction of 1RM used as the working basis for every generated program.
const TRAINING_MAX_PCT: f64 = 90.0;

// ---------------------------------------------------------------------------
/// Customizations
// ---------------------------------------------------------------------------

/// Sparse field overrides applied on top of a template's defaults. Absent
/// fields keep the template-derived value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockCustomizations {
    pub name: Option<String>,
    pub total_weeks: Option<u32>,
    pub strategy: Option<Strategy>,
    pub weekly_increment: Option<f64>,
    pub increment_type: Option<IncrementType>,
    pub deload_week: Option<u32>,
    pub volume_multiplier: Option<f64>,
    pub daily_variation: Option<DailyVariation>,
    pub wave_pattern: Option<WavePattern>,
    pub wave_amplitude: Option<f64>,
    pub max_effort_days: Option<u32>,
    pub dynamic_effort_days: Option<u32>,
    pub repetition_effort_days: Option<u32>,
    pub max_load_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
/// Planning (pure)
// ---------------------------------------------------------------------------

/// A fully planned program, not yet persisted.
#[derive(Debug, Clone)]
pub struct ProgramPlan {
    pub block: NewBlock,
    pub stages: Vec<NewStage>,
    pub workouts: Vec<NewPlannedWorkout>,
}

/// Plan a complete program without touching storage.
///
/// Configuration problems (bad customization values) are rejected here,
/// before any persistence is attempted. Missing or zero maxes are not
/// errors; the affected lifts come out with qualitative placeholders.
pub fn plan_program(
    template: &MethodologyTemplate,
    user_id: i64,
    start_date: NaiveDate,
    user_maxes: &MaxesMap,
    customizations: Option<&BlockCustomizations>,
) -> Result<ProgramPlan, EngineError> {
    let total_weeks = customizations
        .and_then(|c| c.total_weeks)
        .unwrap_or(template.duration_weeks);
    let mut params = StrategyParams {
        duration_weeks: total_weeks,
        ..StrategyParams::default()
    };
    let mut strategy = Strategy::from(template.methodology);
    let mut name = format!("{} - {}", template.name, start_date.format("%B %Y"));

    if let Some(custom) = customizations {
        if let Some(n) = &custom.name {
            name = n.clone();
        }
        if let Some(s) = custom.strategy {
            strategy = s;
        }
        if let Some(v) = custom.weekly_increment {
            params.weekly_increment = v;
        }
        if let Some(v) = custom.increment_type {
            params.increment_type = v;
        }
        if custom.deload_week.is_some() {
            params.deload_week = custom.deload_week;
        }
        if let Some(v) = custom.volume_multiplier {
            params.volume_multiplier = v;
        }
        if let Some(v) = custom.daily_variation {
            params.daily_variation = v;
        }
        if let Some(v) = custom.wave_pattern {
            params.wave_pattern = v;
        }
        if let Some(v) = custom.wave_amplitude {
            params.wave_amplitude = v;
        }
        if let Some(v) = custom.max_effort_days {
            params.max_effort_days = v;
        }
        if let Some(v) = custom.dynamic_effort_days {
            params.dynamic_effort_days = v;
        }
        if let Some(v) = custom.repetition_effort_days {
            params.repetition_effort_days = v;
        }
        if let Some(v) = custom.max_load_pct {
            params.max_load_pct = v;
        }
    }

    validate(total_weeks, &params)?;

    let training_maxes: MaxesMap = user_maxes
        .iter()
        .map(|(exercise, &one_rm)| (exercise.clone(), loads::training_max(one_rm, TRAINING_MAX_PCT)))
        .collect();

    let end_date = start_date + chrono::Duration::weeks(total_weeks as i64);
    let stages = generate_stages(strategy, total_weeks, &params);
    let workouts = generate_workouts(template, strategy, total_weeks, &params, &training_maxes);

    Ok(ProgramPlan {
        block: NewBlock {
            user_id,
            name,
            methodology: template.methodology,
            strategy,
            total_weeks,
            start_date,
            end_date,
            maxes: user_maxes.clone(),
            training_maxes,
            params,
        },
        stages,
        workouts,
    })
}

fn validate(total_weeks: u32, params: &StrategyParams) -> Result<(), EngineError> {
    if !(1..=52).contains(&total_weeks) {
        return Err(EngineError::InvalidCustomization(format!(
            "total_weeks must be between 1 and 52, got {}",
            total_weeks
        )));
    }
    if let Some(deload) = params.deload_week {
        if deload < 1 || deload > total_weeks {
            return Err(EngineError::InvalidCustomization(format!(
                "deload_week {} is outside the {}-week block",
                deload, total_weeks
            )));
        }
    }
    if params.weekly_increment < 0.0 {
        return Err(EngineError::InvalidCustomization(
            "weekly_increment must not be negative".to_string(),
        ));
    }
    if params.volume_multiplier <= 0.0 {
        return Err(EngineError::InvalidCustomization(
            "volume_multiplier must be positive".to_string(),
        ));
    }
    if params.wave_amplitude < 0.0 {
        return Err(EngineError::InvalidCustomization(
            "wave_amplitude must not be negative".to_string(),
        ));
    }
    if !(50.0..=120.0).contains(&params.max_load_pct) {
        return Err(EngineError::InvalidCustomization(format!(
            "max_load_pct must be between 50 and 120, got {}",
            params.max_load_pct
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
/// Generation (plan + persist)
// ---------------------------------------------------------------------------

/// Look up a template, plan the whole program, and persist it atomically.
///
/// An unknown `methodology_key` fails before any row is created; everything
/// downstream of a valid key is total.
pub async fn generate(
    pool: &SqlitePool,
    user_id: i64,
    methodology_key: &str,
    start_date: NaiveDate,
    user_maxes: &MaxesMap,
    customizations: Option<&BlockCustomizations>,
) -> Result<Block, EngineError> {
    let template = Catalog::global()
        .by_key(methodology_key)
        .ok_or_else(|| EngineError::TemplateNotFound(methodology_key.to_string()))?;

    let plan = plan_program(template, user_id, start_date, user_maxes, customizations)?;
    persist_plan(pool, plan).await
}

/// Write a planned program in one transaction: the block row, every stage,
/// every workout. Any failure rolls the whole attempt back.
pub async fn persist_plan(pool: &SqlitePool, plan: ProgramPlan) -> Result<Block, EngineError> {
    let now = Utc::now();
    let maxes_json = serde_json::to_string(&plan.block.maxes)?;
    let training_maxes_json = serde_json::to_string(&plan.block.training_maxes)?;
    let params_json = serde_json::to_string(&plan.block.params)?;

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO training_blocks (
            user_id, name, methodology, strategy, total_weeks, current_week,
            start_date, end_date, status, is_active,
            maxes_json, training_maxes_json, params_json, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7, 'planned', 0, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(plan.block.user_id)
    .bind(&plan.block.name)
    .bind(plan.block.methodology.to_string())
    .bind(plan.block.strategy.to_string())
    .bind(plan.block.total_weeks as i64)
    .bind(plan.block.start_date)
    .bind(plan.block.end_date)
    .bind(&maxes_json)
    .bind(&training_maxes_json)
    .bind(&params_json)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let block_id = result.last_insert_rowid();

    for stage in &plan.stages {
        sqlx::query(
            r#"
            INSERT INTO block_stages (
                block_id, name, week_number, load_percentage,
                volume_multiplier, intensity_focus, description, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(block_id)
        .bind(&stage.name)
        .bind(stage.week_number as i64)
        .bind(stage.load_percentage)
        .bind(stage.volume_multiplier)
        .bind(&stage.intensity_focus)
        .bind(&stage.description)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for workout in &plan.workouts {
        let exercises_json = serde_json::to_string(&workout.exercises)?;
        sqlx::query(
            r#"
            INSERT INTO planned_workouts (
                block_id, week_number, day_number, workout_name, focus,
                estimated_duration, exercises_json, notes, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(block_id)
        .bind(workout.week_number as i64)
        .bind(workout.day_number as i64)
        .bind(&workout.workout_name)
        .bind(&workout.focus)
        .bind(workout.estimated_duration as i64)
        .bind(&exercises_json)
        .bind(&workout.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        block_id,
        weeks = plan.block.total_weeks,
        workouts = plan.workouts.len(),
        "training block generated"
    );

    tracker::get_block(pool, block_id, plan.block.user_id).await
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Intensity, Methodology};
    use crate::models::BlockStatus;
    use crate::test_utils::{setup_test_db, teardown_test_db, test_maxes};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_plan_is_pure_and_complete() {
        let template = Catalog::global().by_key("beginner_linear").unwrap();
        let plan = plan_program(template, 1, start(), &test_maxes(), None).unwrap();

        assert_eq!(plan.block.total_weeks, 12);
        assert_eq!(plan.block.methodology, Methodology::LinearProgression);
        assert_eq!(plan.stages.len(), 12);
        assert_eq!(plan.workouts.len(), 36);
        assert_eq!(
            plan.block.end_date,
            start() + chrono::Duration::weeks(12)
        );
        // Training maxes are 90% of the supplied 1RMs
        assert_eq!(plan.block.training_maxes["squats"], 90.0);
        assert_eq!(plan.block.training_maxes["pullups"], 9.0);
    }

    #[test]
    fn test_customizations_override_fields() {
        let template = Catalog::global().by_key("beginner_linear").unwrap();
        let custom = BlockCustomizations {
            name: Some("Spring block".to_string()),
            deload_week: Some(6),
            weekly_increment: Some(1.25),
            ..BlockCustomizations::default()
        };
        let plan = plan_program(template, 1, start(), &test_maxes(), Some(&custom)).unwrap();

        assert_eq!(plan.block.name, "Spring block");
        assert_eq!(plan.block.params.deload_week, Some(6));
        assert_eq!(plan.block.params.weekly_increment, 1.25);
        // The deload customization flows into generated stages
        let week6 = plan.stages.iter().find(|s| s.week_number == 6).unwrap();
        assert_eq!(week6.intensity_focus, "recovery");
    }

    #[test]
    fn test_invalid_customizations_rejected() {
        let template = Catalog::global().by_key("beginner_linear").unwrap();

        let out_of_range = BlockCustomizations {
            deload_week: Some(40),
            ..BlockCustomizations::default()
        };
        let err = plan_program(template, 1, start(), &test_maxes(), Some(&out_of_range));
        assert!(matches!(err, Err(EngineError::InvalidCustomization(_))));

        let negative = BlockCustomizations {
            weekly_increment: Some(-1.0),
            ..BlockCustomizations::default()
        };
        let err = plan_program(template, 1, start(), &test_maxes(), Some(&negative));
        assert!(matches!(err, Err(EngineError::InvalidCustomization(_))));
    }

    #[tokio::test]
    async fn test_generate_persists_full_program() {
        let pool = setup_test_db().await;

        let block = generate(&pool, 1, "beginner_linear", start(), &test_maxes(), None)
            .await
            .expect("generation should succeed");

        assert_eq!(block.total_weeks, 12);
        assert_eq!(block.current_week, 1);
        assert_eq!(block.status, BlockStatus::Planned);

        let stage_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM block_stages WHERE block_id = ?")
            .bind(block.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stage_count, 12);

        let workout_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM planned_workouts WHERE block_id = ?")
                .bind(block.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(workout_count, 36);

        // Week 1 pull-ups land at the template's 85%
        let workouts = tracker::week_workouts(&pool, block.id, 1).await.unwrap();
        let pullups = workouts[0]
            .exercises
            .iter()
            .find(|e| e.name == "pullups")
            .unwrap();
        assert_eq!(pullups.intensity, Intensity::Percentage(85.0));

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_any_write() {
        let pool = setup_test_db().await;

        let err = generate(&pool, 1, "nonexistent", start(), &test_maxes(), None).await;
        assert!(matches!(err, Err(EngineError::TemplateNotFound(_))));

        let blocks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM training_blocks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(blocks, 0);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_persist_is_atomic() {
        let pool = setup_test_db().await;

        let template = Catalog::global().by_key("beginner_linear").unwrap();
        let mut plan = plan_program(template, 1, start(), &test_maxes(), None).unwrap();
        // Force a mid-transaction constraint violation: duplicate stage week
        plan.stages[5].week_number = 1;

        let result = persist_plan(&pool, plan).await;
        assert!(result.is_err());

        // Nothing from the failed attempt is visible
        let blocks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM training_blocks")
            .fetch_one(&pool)
            .await
            .unwrap();
        let stages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM block_stages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(blocks, 0);
        assert_eq!(stages, 0);

        teardown_test_db(pool).await;
    }

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let pool = setup_test_db().await;

        let first = generate(&pool, 1, "intermediate_531", start(), &test_maxes(), None)
            .await
            .unwrap();
        let second = generate(&pool, 1, "intermediate_531", start(), &test_maxes(), None)
            .await
            .unwrap();

        let w1 = tracker::week_workouts(&pool, first.id, 1).await.unwrap();
        let w2 = tracker::week_workouts(&pool, second.id, 1).await.unwrap();
        assert_eq!(w1.len(), w2.len());
        for (a, b) in w1.iter().zip(w2.iter()) {
            assert_eq!(a.exercises, b.exercises);
        }

        teardown_test_db(pool).await;
    }
}
