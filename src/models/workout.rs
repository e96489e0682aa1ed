use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ExerciseCategory, Intensity};

// ---------------------------------------------------------------------------
/// Stage: one week's phase descriptor
// ---------------------------------------------------------------------------

/// Owned by exactly one block; week numbers are unique and contiguous from 1
/// to the block's total weeks. Immutable after generation - regeneration
/// replaces, never patches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub id: i64,
    pub block_id: i64,
    pub name: String,
    pub week_number: u32,
    pub load_percentage: f64,
    pub volume_multiplier: f64,
    pub intensity_focus: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStage {
    pub name: String,
    pub week_number: u32,
    pub load_percentage: f64,
    pub volume_multiplier: f64,
    pub intensity_focus: String,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
/// Rep Prescription
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reps {
    Count(u32),
    Range { min: u32, max: u32 },
}

impl std::fmt::Display for Reps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Range { min, max } => write!(f, "{}-{}", min, max),
        }
    }
}

// ---------------------------------------------------------------------------
/// Exercise Prescription
// ---------------------------------------------------------------------------

/// One fully resolved exercise slot inside a planned workout.
///
/// A main lift with a known, positive max always resolves a numeric
/// `weight`; otherwise the intensity stays qualitative and `weight` is
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePrescription {
    pub name: String,
    pub category: ExerciseCategory,
    pub sets: u32,
    pub reps: Reps,
    pub intensity: Intensity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub rest_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
/// Planned Workout
// ---------------------------------------------------------------------------

/// One scheduled training session. `(week_number, day_number)` is unique
/// within a block, and the week always has a corresponding stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedWorkout {
    pub id: i64,
    pub block_id: i64,
    pub week_number: u32,
    pub day_number: u32,
    pub workout_name: String,
    pub focus: String,
    /// Minutes.
    pub estimated_duration: u32,
    pub exercises: Vec<ExercisePrescription>,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlannedWorkout {
    pub week_number: u32,
    pub day_number: u32,
    pub workout_name: String,
    pub focus: String,
    pub estimated_duration: u32,
    pub exercises: Vec<ExercisePrescription>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
