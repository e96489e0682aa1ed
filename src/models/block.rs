use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Methodology;
use crate::progression::{Strategy, StrategyParams};

/// Exercise name to weight in kilograms. Ordered so serialized documents
/// are stable.
pub type MaxesMap = BTreeMap<String, f64>;

// ---------------------------------------------------------------------------
/// Block Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl std::fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for BlockStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown block status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Training Block
// ---------------------------------------------------------------------------

/// One user's instantiation of a methodology: a calendar-anchored cycle with
/// the maxes it was generated from and its progression knobs.
///
/// `current_week` is 1-indexed and monotonically non-decreasing; status
/// reaches `Completed` only at the final week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub methodology: Methodology,
    pub strategy: Strategy,
    pub total_weeks: u32,
    pub current_week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BlockStatus,
    pub is_active: bool,
    /// The 1RMs the block was generated from.
    pub maxes: MaxesMap,
    /// Conservative working basis, 90% of each supplied 1RM.
    pub training_maxes: MaxesMap,
    pub params: StrategyParams,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert shape for a block (no id, timestamps, or counters yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlock {
    pub user_id: i64,
    pub name: String,
    pub methodology: Methodology,
    pub strategy: Strategy,
    pub total_weeks: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub maxes: MaxesMap,
    pub training_maxes: MaxesMap,
    pub params: StrategyParams,
}

impl Block {
    /// Percentage of the block already reached, one decimal.
    pub fn progress_percentage(&self) -> f64 {
        if self.total_weeks == 0 {
            return 0.0;
        }
        crate::loads::round1(self.current_week as f64 / self.total_weeks as f64 * 100.0)
    }

    pub fn is_final_week(&self) -> bool {
        self.current_week >= self.total_weeks
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
