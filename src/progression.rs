//! Weekly progression calculator
//!
//! Given a base max, a progression strategy, a target week, and strategy
//! parameters, produces the week's prescribed load percentage, working
//! weight, rep range, set count, and target RPE. One algorithm variant per
//! strategy, dispatched by a single exhaustive match.
//!
//! Key principles:
//! - Generation never blocks: an unparsable strategy degrades to the
//!   general ramp, a zero max yields zero-weight output.
//! - All load percentages are clamped to `StrategyParams::max_load_pct`.
//! - Daily-undulating output is a range, not a point - DUP does not commit
//!   to a single daily value at the weekly grain.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loads;

// ---------------------------------------------------------------------------
/// Strategy: how load progresses week over week
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    LinearProgression,
    FiveThreeOne,
    BlockPeriodization,
    DailyUndulating,
    Conjugate,
    WaveLoading,
    /// Safe 70-95% ramp used when nothing more specific applies.
    #[default]
    General,
}

impl Strategy {
    /// Human-readable label for notes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LinearProgression => "linear progression",
            Self::FiveThreeOne => "5/3/1",
            Self::BlockPeriodization => "block periodization",
            Self::DailyUndulating => "daily undulating",
            Self::Conjugate => "conjugate method",
            Self::WaveLoading => "wave loading",
            Self::General => "general strength",
        }
    }

    /// Parse a stored strategy tag, degrading to the general ramp instead of
    /// failing so that generation is never blocked by a bad tag.
    pub fn parse_or_general(s: &str) -> Self {
        match s.parse() {
            Ok(strategy) => strategy,
            Err(_) => {
                warn!(strategy = s, "unknown progression strategy, using general ramp");
                Self::General
            }
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinearProgression => write!(f, "linear_progression"),
            Self::FiveThreeOne => write!(f, "five_three_one"),
            Self::BlockPeriodization => write!(f, "block_periodization"),
            Self::DailyUndulating => write!(f, "daily_undulating"),
            Self::Conjugate => write!(f, "conjugate"),
            Self::WaveLoading => write!(f, "wave_loading"),
            Self::General => write!(f, "general"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear_progression" => Ok(Self::LinearProgression),
            "five_three_one" | "531" => Ok(Self::FiveThreeOne),
            "block_periodization" => Ok(Self::BlockPeriodization),
            "daily_undulating" | "dub_progression" => Ok(Self::DailyUndulating),
            "conjugate" => Ok(Self::Conjugate),
            "wave_loading" => Ok(Self::WaveLoading),
            "general" => Ok(Self::General),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

impl From<crate::catalog::Methodology> for Strategy {
    fn from(m: crate::catalog::Methodology) -> Self {
        use crate::catalog::Methodology;
        match m {
            Methodology::LinearProgression => Self::LinearProgression,
            Methodology::FiveThreeOne => Self::FiveThreeOne,
            Methodology::Conjugate => Self::Conjugate,
            Methodology::BlockPeriodization => Self::BlockPeriodization,
            Methodology::DailyUndulating => Self::DailyUndulating,
        }
    }
}

// ---------------------------------------------------------------------------
/// Strategy Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncrementType {
    #[default]
    Percentage,
    Absolute,
}

impl std::fmt::Display for IncrementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage"),
            Self::Absolute => write!(f, "absolute"),
        }
    }
}

impl std::str::FromStr for IncrementType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "absolute" => Ok(Self::Absolute),
            _ => Err(format!("Unknown increment type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DailyVariation {
    #[default]
    Intensity,
    Volume,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WavePattern {
    #[default]
    Ascending,
    Descending,
    Pyramid,
    Undulating,
}

impl WavePattern {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::Pyramid => "pyramid",
            Self::Undulating => "undulating",
        }
    }
}

/// Tunable knobs for the progression variants. Stored on the block as one
/// JSON document; absent fields fall back to these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub weekly_increment: f64,
    pub increment_type: IncrementType,
    pub deload_week: Option<u32>,
    /// Block duration; phase boundaries derive from it.
    pub duration_weeks: u32,
    pub volume_multiplier: f64,
    pub daily_variation: DailyVariation,
    pub wave_pattern: WavePattern,
    pub wave_amplitude: f64,
    pub max_effort_days: u32,
    pub dynamic_effort_days: u32,
    pub repetition_effort_days: u32,
    /// Hard ceiling for every computed load percentage.
    pub max_load_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            weekly_increment: 2.5,
            increment_type: IncrementType::Percentage,
            deload_week: None,
            duration_weeks: 12,
            volume_multiplier: 1.0,
            daily_variation: DailyVariation::Intensity,
            wave_pattern: WavePattern::Ascending,
            wave_amplitude: 10.0,
            max_effort_days: 1,
            dynamic_effort_days: 1,
            repetition_effort_days: 1,
            max_load_pct: 105.0,
        }
    }
}

// ---------------------------------------------------------------------------
/// Load: a committed value or a daily-undulating range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Load {
    Single(f64),
    Range { min: f64, max: f64 },
}

impl Load {
    pub fn lower(&self) -> f64 {
        match self {
            Self::Single(v) => *v,
            Self::Range { min, .. } => *min,
        }
    }

    pub fn upper(&self) -> f64 {
        match self {
            Self::Single(v) => *v,
            Self::Range { max, .. } => *max,
        }
    }
}

impl std::fmt::Display for Load {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(v) => write!(f, "{}", v),
            Self::Range { min, max } => write!(f, "{}-{}", min, max),
        }
    }
}

// ---------------------------------------------------------------------------
/// Weekly Progression Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub load_pct: Load,
    pub working_weight: Load,
    pub reps_range: (u32, u32),
    pub sets: u32,
    pub rpe: f64,
    pub notes: String,
}

/// The week's prescription for one base max under a strategy.
///
/// `body_weight` is added to every working weight; callers pass 0 for lifts
/// that are not bodyweight-anchored.
pub fn weekly_progression(
    one_rm: f64,
    strategy: Strategy,
    week: u32,
    params: &StrategyParams,
    body_weight: f64,
) -> Progression {
    match strategy {
        Strategy::LinearProgression => linear_progression(one_rm, week, params, body_weight),
        Strategy::BlockPeriodization => block_periodization(one_rm, week, params, body_weight),
        Strategy::DailyUndulating => dup_progression(one_rm, week, params, body_weight),
        Strategy::Conjugate => conjugate_progression(one_rm, week, params, body_weight),
        Strategy::WaveLoading => wave_loading(one_rm, week, params, body_weight),
        // 5/3/1 prescribes its weekly numbers through the workout
        // generator's cycle table; at this grain it shares the safe ramp.
        Strategy::FiveThreeOne | Strategy::General => {
            general_progression(one_rm, strategy, week, params, body_weight)
        }
    }
}

/// Whether a week is a planned deload under a strategy.
pub fn is_deload(strategy: Strategy, week: u32, params: &StrategyParams) -> bool {
    match strategy {
        Strategy::LinearProgression => params.deload_week == Some(week),
        Strategy::FiveThreeOne => week % 4 == 0,
        _ => false,
    }
}

/// The week's volume multiplier: halved on deloads, phase-specific for
/// block periodization, neutral otherwise.
pub fn volume_multiplier_for_week(strategy: Strategy, week: u32, params: &StrategyParams) -> f64 {
    if is_deload(strategy, week, params) {
        return 0.5;
    }
    match strategy {
        Strategy::BlockPeriodization => match block_phase(week, params.duration_weeks) {
            BlockPhase::Accumulation => 1.3,
            BlockPhase::Intensification => 0.8,
            BlockPhase::Realization => 0.5,
        },
        _ => 1.0,
    }
}

// ---------------------------------------------------------------------------
/// Block Phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPhase {
    Accumulation,
    Intensification,
    Realization,
}

impl BlockPhase {
    pub fn focus(&self) -> &'static str {
        match self {
            Self::Accumulation => "hypertrophy",
            Self::Intensification => "strength",
            Self::Realization => "peaking",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Accumulation => "accumulation",
            Self::Intensification => "intensification",
            Self::Realization => "realization",
        }
    }
}

/// Which third of a block-periodization cycle a week falls in.
pub fn block_phase(week: u32, duration_weeks: u32) -> BlockPhase {
    let weeks_per_phase = (duration_weeks / 3).max(1);
    if week <= weeks_per_phase {
        BlockPhase::Accumulation
    } else if week <= weeks_per_phase * 2 {
        BlockPhase::Intensification
    } else {
        BlockPhase::Realization
    }
}

// ---------------------------------------------------------------------------
/// Strategy Variants
// ---------------------------------------------------------------------------

fn clamp_load(pct: f64, params: &StrategyParams) -> f64 {
    loads::round1(pct.clamp(0.0, params.max_load_pct))
}

fn working(one_rm: f64, pct: f64, body_weight: f64) -> f64 {
    loads::round1(loads::weight_at_percentage(one_rm, pct) + body_weight)
}

fn estimated_reps_range(one_rm: f64, pct: f64) -> (u32, u32) {
    let estimated = loads::reps_at_weight(one_rm, loads::weight_at_percentage(one_rm, pct));
    (estimated.saturating_sub(2).max(1), estimated.max(1))
}

fn linear_progression(
    one_rm: f64,
    week: u32,
    params: &StrategyParams,
    body_weight: f64,
) -> Progression {
    if params.deload_week == Some(week) {
        return Progression {
            load_pct: Load::Single(60.0),
            working_weight: Load::Single(working(one_rm, 60.0, body_weight)),
            reps_range: (8, 12),
            sets: 3,
            rpe: 6.0,
            notes: "Deload week - reduced intensity".to_string(),
        };
    }

    let raw_pct = match params.increment_type {
        IncrementType::Percentage => 70.0 + (week - 1) as f64 * params.weekly_increment,
        IncrementType::Absolute => {
            // Ramp in absolute kilograms from a 70% base, expressed back as
            // a percentage of max.
            if one_rm > 0.0 {
                let current = one_rm * 0.7 + (week - 1) as f64 * params.weekly_increment;
                current / one_rm * 100.0
            } else {
                70.0
            }
        }
    };
    // Weekly work stays submaximal
    let pct = clamp_load(raw_pct.min(95.0), params);

    Progression {
        load_pct: Load::Single(pct),
        working_weight: Load::Single(working(one_rm, pct, body_weight)),
        reps_range: estimated_reps_range(one_rm, pct),
        sets: 3,
        rpe: 8.0,
        notes: format!("Linear progression week {}", week),
    }
}

fn block_periodization(
    one_rm: f64,
    week: u32,
    params: &StrategyParams,
    body_weight: f64,
) -> Progression {
    let weeks_per_phase = (params.duration_weeks / 3).max(1);
    let phase = block_phase(week, params.duration_weeks);

    let (raw_pct, reps_range, sets, rpe) = match phase {
        BlockPhase::Accumulation => {
            let sets = (4.0 * params.volume_multiplier).round().max(1.0) as u32;
            (70.0 + (week - 1) as f64 * 2.0, (8, 12), sets, 7.0)
        }
        BlockPhase::Intensification => {
            let week_in_phase = week - weeks_per_phase;
            (80.0 + (week_in_phase - 1) as f64 * 3.0, (5, 8), 4, 8.0)
        }
        BlockPhase::Realization => {
            let week_in_phase = week - weeks_per_phase * 2;
            (90.0 + (week_in_phase - 1) as f64 * 2.0, (1, 5), 3, 9.0)
        }
    };
    let pct = clamp_load(raw_pct, params);

    Progression {
        load_pct: Load::Single(pct),
        working_weight: Load::Single(working(one_rm, pct, body_weight)),
        reps_range,
        sets,
        rpe,
        notes: format!("Block periodization - {}", phase.label()),
    }
}

fn dup_progression(
    one_rm: f64,
    week: u32,
    params: &StrategyParams,
    body_weight: f64,
) -> Progression {
    let base = 75.0 + (week - 1) as f64 * 2.0;

    let (low, high, reps_range) = match params.daily_variation {
        DailyVariation::Intensity => (base - 5.0, base + 5.0, (3, 8)),
        DailyVariation::Volume => (base - 10.0, base, (8, 15)),
        DailyVariation::Both => (base - 10.0, base + 5.0, (3, 15)),
    };
    let low = clamp_load(low, params);
    let high = clamp_load(high, params);

    Progression {
        load_pct: Load::Range { min: low, max: high },
        working_weight: Load::Range {
            min: working(one_rm, low, body_weight),
            max: working(one_rm, high, body_weight),
        },
        reps_range,
        sets: 4,
        rpe: 8.0,
        notes: format!("Daily undulating week {} - load varies by session", week),
    }
}

fn conjugate_progression(
    one_rm: f64,
    week: u32,
    params: &StrategyParams,
    body_weight: f64,
) -> Progression {
    // Near-maximal and rising, capped at 95%
    let pct = clamp_load((90.0 + (week - 1) as f64).min(95.0), params);

    Progression {
        load_pct: Load::Single(pct),
        working_weight: Load::Single(working(one_rm, pct, body_weight)),
        reps_range: (1, 3),
        sets: 3,
        rpe: 9.0,
        notes: format!("Conjugate method week {} - max effort", week),
    }
}

fn wave_loading(one_rm: f64, week: u32, params: &StrategyParams, body_weight: f64) -> Progression {
    let amplitude = params.wave_amplitude;
    let raw_pct = match params.wave_pattern {
        WavePattern::Ascending => 70.0 + (week - 1) as f64 * 3.0 + (week % 3) as f64 * amplitude,
        WavePattern::Descending => 95.0 - (week - 1) as f64 * 2.0 - (week % 3) as f64 * amplitude,
        WavePattern::Pyramid => {
            let mid_week = params.duration_weeks / 2;
            if week <= mid_week {
                70.0 + (week - 1) as f64 * 5.0
            } else {
                95.0 - (week - mid_week - 1) as f64 * 5.0
            }
        }
        WavePattern::Undulating => 80.0 + (week % 2) as f64 * amplitude,
    };
    // Waves oscillate inside a fixed 60-95% band
    let pct = clamp_load(raw_pct.clamp(60.0, 95.0), params);

    Progression {
        load_pct: Load::Single(pct),
        working_weight: Load::Single(working(one_rm, pct, body_weight)),
        reps_range: estimated_reps_range(one_rm, pct),
        sets: 4,
        rpe: 8.0,
        notes: format!(
            "Wave loading week {} - {} pattern",
            week,
            params.wave_pattern.label()
        ),
    }
}

fn general_progression(
    one_rm: f64,
    strategy: Strategy,
    week: u32,
    params: &StrategyParams,
    body_weight: f64,
) -> Progression {
    // 70% to 95% over twelve weeks
    let pct = clamp_load(70.0 + week as f64 / 12.0 * 25.0, params);

    Progression {
        load_pct: Load::Single(pct),
        working_weight: Load::Single(working(one_rm, pct, body_weight)),
        reps_range: estimated_reps_range(one_rm, pct),
        sets: 3,
        rpe: 8.0,
        notes: format!("{} week {}", capitalize(strategy.label()), week),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
