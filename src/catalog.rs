//! Methodology catalog
//!
//! Immutable registry of the periodization schemes the engine can
//! instantiate. Built once at first use and never mutated; concurrent
//! readers share the same process-wide instance. Extending the catalog
//! means adding another static entry here.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
/// Methodology: the five supported periodization kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Methodology {
    LinearProgression,
    FiveThreeOne,
    Conjugate,
    BlockPeriodization,
    DailyUndulating,
}

impl std::fmt::Display for Methodology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LinearProgression => write!(f, "linear_progression"),
            Self::FiveThreeOne => write!(f, "five_three_one"),
            Self::Conjugate => write!(f, "conjugate"),
            Self::BlockPeriodization => write!(f, "block_periodization"),
            Self::DailyUndulating => write!(f, "daily_undulating"),
        }
    }
}

impl std::str::FromStr for Methodology {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear_progression" => Ok(Self::LinearProgression),
            "five_three_one" | "531" => Ok(Self::FiveThreeOne),
            "conjugate" => Ok(Self::Conjugate),
            "block_periodization" => Ok(Self::BlockPeriodization),
            "daily_undulating" => Ok(Self::DailyUndulating),
            _ => Err(format!("Unknown methodology: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Difficulty Level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

// ---------------------------------------------------------------------------
/// Exercise Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    MainLift,
    Accessory,
    Power,
    Skill,
    Core,
    Conditioning,
}

impl ExerciseCategory {
    /// Fallback rest interval when a template entry carries none.
    pub fn default_rest_seconds(&self) -> u32 {
        match self {
            Self::MainLift => 180,
            Self::Accessory => 90,
            Self::Power => 120,
            Self::Skill => 240,
            Self::Core => 90,
            Self::Conditioning => 90,
        }
    }
}

// ---------------------------------------------------------------------------
/// Intensity: numeric percentage of max, or a qualitative marker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Intensity {
    Percentage(f64),
    Marker(String),
}

impl Intensity {
    pub fn bodyweight() -> Self {
        Self::Marker("bodyweight".to_string())
    }

    pub fn as_percentage(&self) -> Option<f64> {
        match self {
            Self::Percentage(p) => Some(*p),
            Self::Marker(_) => None,
        }
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage(p) => write!(f, "{}%", p),
            Self::Marker(m) => write!(f, "{}", m),
        }
    }
}

// ---------------------------------------------------------------------------
/// Template Types
// ---------------------------------------------------------------------------

/// One exercise slot in a weekly skeleton, before week-specific resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub name: String,
    pub category: ExerciseCategory,
    pub sets: u32,
    pub reps: u32,
    pub intensity: Intensity,
    pub rest_seconds: Option<u32>,
}

/// One training day in a weekly skeleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayTemplate {
    pub day: u32,
    pub name: String,
    pub focus: String,
    pub exercises: Vec<ExerciseTemplate>,
}

/// Named intensity band a methodology works in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntensityZone {
    pub name: String,
    pub min_pct: f64,
    pub max_pct: f64,
}

/// Catalog-resident description of one periodization scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodologyTemplate {
    pub key: String,
    pub name: String,
    pub description: String,
    pub methodology: Methodology,
    pub duration_weeks: u32,
    pub difficulty: DifficultyLevel,
    pub main_lifts: Vec<String>,
    pub sessions_per_week: u32,
    pub skeleton: Vec<DayTemplate>,
    pub intensity_zones: Vec<IntensityZone>,
}

// ---------------------------------------------------------------------------
/// Catalog
// ---------------------------------------------------------------------------

static CATALOG: LazyLock<Catalog> = LazyLock::new(Catalog::builtin);

/// Read-only lookup over the shipped methodology templates.
pub struct Catalog {
    templates: BTreeMap<String, MethodologyTemplate>,
}

impl Catalog {
    pub fn global() -> &'static Catalog {
        &CATALOG
    }

    pub fn by_key(&self, key: &str) -> Option<&MethodologyTemplate> {
        self.templates.get(key)
    }

    pub fn by_level(&self, level: DifficultyLevel) -> Vec<&MethodologyTemplate> {
        self.templates
            .values()
            .filter(|t| t.difficulty == level)
            .collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &MethodologyTemplate> {
        self.templates.values()
    }

    fn builtin() -> Self {
        let mut templates = BTreeMap::new();
        for template in [
            beginner_linear(),
            intermediate_531(),
            advanced_conjugate(),
            intermediate_block(),
            intermediate_dup(),
        ] {
            templates.insert(template.key.clone(), template);
        }
        Self { templates }
    }
}

// ---------------------------------------------------------------------------
/// Builtin Templates
// ---------------------------------------------------------------------------

fn ex(
    name: &str,
    category: ExerciseCategory,
    sets: u32,
    reps: u32,
    intensity: Intensity,
    rest_seconds: u32,
) -> ExerciseTemplate {
    ExerciseTemplate {
        name: name.to_string(),
        category,
        sets,
        reps,
        intensity,
        rest_seconds: Some(rest_seconds),
    }
}

fn day(day_number: u32, name: &str, focus: &str, exercises: Vec<ExerciseTemplate>) -> DayTemplate {
    DayTemplate {
        day: day_number,
        name: name.to_string(),
        focus: focus.to_string(),
        exercises,
    }
}

fn zone(name: &str, min_pct: f64, max_pct: f64) -> IntensityZone {
    IntensityZone {
        name: name.to_string(),
        min_pct,
        max_pct,
    }
}

fn streetlifting_main_lifts() -> Vec<String> {
    ["pullups", "dips", "muscle_ups", "squats"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn beginner_linear() -> MethodologyTemplate {
    use ExerciseCategory::*;
    MethodologyTemplate {
        key: "beginner_linear".to_string(),
        name: "Beginner Linear Progression".to_string(),
        description: "Simple linear progression perfect for beginners. Focus on the basic \
                      movements with consistent weekly increases."
            .to_string(),
        methodology: Methodology::LinearProgression,
        duration_weeks: 12,
        difficulty: DifficultyLevel::Beginner,
        main_lifts: streetlifting_main_lifts(),
        sessions_per_week: 3,
        skeleton: vec![
            day(
                1,
                "Upper Body Strength",
                "upper",
                vec![
                    ex("pullups", MainLift, 5, 5, Intensity::Percentage(85.0), 180),
                    ex("dips", MainLift, 5, 5, Intensity::Percentage(85.0), 180),
                    ex("muscle_ups", Skill, 3, 3, Intensity::Percentage(75.0), 240),
                    ex("push_ups", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                2,
                "Lower Body & Core",
                "lower",
                vec![
                    ex("squats", MainLift, 5, 5, Intensity::Percentage(85.0), 180),
                    ex("pistol_squats", MainLift, 4, 6, Intensity::bodyweight(), 120),
                    ex("hanging_leg_raises", Core, 4, 10, Intensity::bodyweight(), 90),
                    ex("lunges", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                3,
                "Full Body Power",
                "full",
                vec![
                    ex("explosive_pullups", Power, 5, 3, Intensity::Percentage(70.0), 180),
                    ex("explosive_dips", Power, 5, 3, Intensity::Percentage(70.0), 180),
                    ex("jump_squats", Power, 4, 8, Intensity::bodyweight(), 120),
                    ex("burpees", Conditioning, 3, 10, Intensity::bodyweight(), 90),
                ],
            ),
        ],
        intensity_zones: vec![
            zone("light", 65.0, 75.0),
            zone("moderate", 80.0, 85.0),
            zone("heavy", 90.0, 95.0),
            zone("max", 100.0, 105.0),
        ],
    }
}

fn intermediate_531() -> MethodologyTemplate {
    use ExerciseCategory::*;
    MethodologyTemplate {
        key: "intermediate_531".to_string(),
        name: "5/3/1 for Streetlifting".to_string(),
        description: "Jim Wendler's 5/3/1 adapted for streetlifting movements. Perfect for \
                      intermediate athletes."
            .to_string(),
        methodology: Methodology::FiveThreeOne,
        duration_weeks: 16,
        difficulty: DifficultyLevel::Intermediate,
        main_lifts: streetlifting_main_lifts(),
        sessions_per_week: 4,
        skeleton: vec![
            day(
                1,
                "Pullups + Accessories",
                "pull",
                vec![
                    ex("pullups", MainLift, 3, 5, Intensity::Percentage(85.0), 180),
                    ex("rows", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("lat_pulldowns", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("bicep_curls", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                2,
                "Squats + Lower Body",
                "lower",
                vec![
                    ex("squats", MainLift, 3, 5, Intensity::Percentage(85.0), 180),
                    ex("lunges", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("calf_raises", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("leg_curls", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                3,
                "Dips + Push",
                "push",
                vec![
                    ex("dips", MainLift, 3, 5, Intensity::Percentage(85.0), 180),
                    ex("push_ups", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("shoulder_press", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("tricep_extensions", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                4,
                "Muscle Ups + Power",
                "power",
                vec![
                    ex("muscle_ups", MainLift, 3, 5, Intensity::Percentage(85.0), 180),
                    ex("explosive_pullups", Power, 3, 3, Intensity::bodyweight(), 120),
                    ex("explosive_dips", Power, 3, 3, Intensity::bodyweight(), 120),
                    ex("plyometrics", Power, 3, 8, Intensity::bodyweight(), 120),
                ],
            ),
        ],
        intensity_zones: vec![
            zone("deload", 40.0, 60.0),
            zone("base", 65.0, 85.0),
            zone("top", 85.0, 95.0),
        ],
    }
}

fn advanced_conjugate() -> MethodologyTemplate {
    use ExerciseCategory::*;
    MethodologyTemplate {
        key: "advanced_conjugate".to_string(),
        name: "Conjugate Method for Streetlifting".to_string(),
        description: "Westside Barbell conjugate method adapted for streetlifting. For advanced \
                      athletes only."
            .to_string(),
        methodology: Methodology::Conjugate,
        duration_weeks: 20,
        difficulty: DifficultyLevel::Advanced,
        main_lifts: streetlifting_main_lifts(),
        sessions_per_week: 4,
        skeleton: vec![
            day(
                1,
                "Max Effort Upper",
                "max_strength_upper",
                vec![
                    ex("pullups", MainLift, 3, 2, Intensity::Percentage(95.0), 240),
                    ex("dips", MainLift, 3, 2, Intensity::Percentage(95.0), 240),
                    ex("muscle_ups", Skill, 3, 2, Intensity::Percentage(90.0), 240),
                    ex("rows", Accessory, 4, 8, Intensity::bodyweight(), 120),
                    ex("bicep_curls", Accessory, 3, 10, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                2,
                "Max Effort Lower",
                "max_strength_lower",
                vec![
                    ex("squats", MainLift, 3, 2, Intensity::Percentage(95.0), 240),
                    ex("lunges", Accessory, 4, 8, Intensity::bodyweight(), 120),
                    ex("calf_raises", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                3,
                "Dynamic Effort Upper",
                "speed_upper",
                vec![
                    ex("explosive_pullups", Power, 8, 3, Intensity::Percentage(55.0), 90),
                    ex("explosive_dips", Power, 8, 3, Intensity::Percentage(55.0), 90),
                    ex("push_ups", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                4,
                "Dynamic Effort Lower",
                "speed_lower",
                vec![
                    ex("jump_squats", Power, 8, 3, Intensity::bodyweight(), 90),
                    ex("speed_squats", Power, 8, 2, Intensity::Percentage(55.0), 90),
                    ex("hanging_leg_raises", Core, 4, 10, Intensity::bodyweight(), 90),
                ],
            ),
        ],
        intensity_zones: vec![
            zone("max_effort", 100.0, 110.0),
            zone("dynamic_effort", 50.0, 60.0),
            zone("repetition_method", 70.0, 85.0),
        ],
    }
}

fn intermediate_block() -> MethodologyTemplate {
    use ExerciseCategory::*;
    MethodologyTemplate {
        key: "intermediate_block".to_string(),
        name: "Block Periodization".to_string(),
        description: "Modern block periodization approach with distinct training phases."
            .to_string(),
        methodology: Methodology::BlockPeriodization,
        duration_weeks: 18,
        difficulty: DifficultyLevel::Intermediate,
        main_lifts: streetlifting_main_lifts(),
        sessions_per_week: 4,
        skeleton: vec![
            day(
                1,
                "Upper Volume",
                "upper",
                vec![
                    ex("pullups", MainLift, 4, 8, Intensity::Percentage(75.0), 180),
                    ex("dips", MainLift, 4, 8, Intensity::Percentage(75.0), 180),
                    ex("rows", Accessory, 3, 10, Intensity::bodyweight(), 90),
                    ex("push_ups", Accessory, 3, 12, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                2,
                "Lower Volume",
                "lower",
                vec![
                    ex("squats", MainLift, 4, 8, Intensity::Percentage(75.0), 180),
                    ex("lunges", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("hanging_leg_raises", Core, 4, 10, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                3,
                "Upper Intensity",
                "upper",
                vec![
                    ex("pullups", MainLift, 4, 5, Intensity::Percentage(85.0), 180),
                    ex("dips", MainLift, 4, 5, Intensity::Percentage(85.0), 180),
                    ex("muscle_ups", Skill, 3, 3, Intensity::Percentage(75.0), 240),
                ],
            ),
            day(
                4,
                "Full Body",
                "full",
                vec![
                    ex("muscle_ups", MainLift, 4, 3, Intensity::Percentage(80.0), 240),
                    ex("squats", MainLift, 3, 5, Intensity::Percentage(80.0), 180),
                    ex("burpees", Conditioning, 3, 10, Intensity::bodyweight(), 90),
                ],
            ),
        ],
        intensity_zones: vec![
            zone("accumulation", 70.0, 80.0),
            zone("intensification", 85.0, 95.0),
            zone("realization", 95.0, 105.0),
        ],
    }
}

fn intermediate_dup() -> MethodologyTemplate {
    use ExerciseCategory::*;
    MethodologyTemplate {
        key: "intermediate_dup".to_string(),
        name: "Daily Undulating Periodization".to_string(),
        description: "Daily undulating periodization: intensity and volume vary day to day \
                      within each week."
            .to_string(),
        methodology: Methodology::DailyUndulating,
        duration_weeks: 12,
        difficulty: DifficultyLevel::Intermediate,
        main_lifts: streetlifting_main_lifts(),
        sessions_per_week: 4,
        skeleton: vec![
            day(
                1,
                "Upper Heavy",
                "upper",
                vec![
                    ex("pullups", MainLift, 4, 4, Intensity::Percentage(85.0), 180),
                    ex("dips", MainLift, 4, 4, Intensity::Percentage(85.0), 180),
                    ex("rows", Accessory, 3, 10, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                2,
                "Lower Volume",
                "lower",
                vec![
                    ex("squats", MainLift, 4, 10, Intensity::Percentage(70.0), 150),
                    ex("lunges", Accessory, 3, 12, Intensity::bodyweight(), 90),
                    ex("hanging_leg_raises", Core, 4, 10, Intensity::bodyweight(), 90),
                ],
            ),
            day(
                3,
                "Upper Moderate",
                "upper",
                vec![
                    ex("pullups", MainLift, 4, 6, Intensity::Percentage(78.0), 180),
                    ex("dips", MainLift, 4, 6, Intensity::Percentage(78.0), 180),
                    ex("muscle_ups", Skill, 3, 3, Intensity::Percentage(75.0), 240),
                ],
            ),
            day(
                4,
                "Lower Heavy",
                "lower",
                vec![
                    ex("squats", MainLift, 4, 4, Intensity::Percentage(85.0), 180),
                    ex("jump_squats", Power, 4, 6, Intensity::bodyweight(), 120),
                    ex("burpees", Conditioning, 3, 10, Intensity::bodyweight(), 90),
                ],
            ),
        ],
        intensity_zones: vec![
            zone("volume", 65.0, 75.0),
            zone("moderate", 75.0, 85.0),
            zone("intensity", 85.0, 95.0),
        ],
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ships_five_templates() {
        let catalog = Catalog::global();
        assert_eq!(catalog.all().count(), 5);
        for key in [
            "beginner_linear",
            "intermediate_531",
            "advanced_conjugate",
            "intermediate_block",
            "intermediate_dup",
        ] {
            assert!(catalog.by_key(key).is_some(), "missing template: {}", key);
        }
    }

    #[test]
    fn test_unknown_key_is_none() {
        assert!(Catalog::global().by_key("nonexistent").is_none());
    }

    #[test]
    fn test_by_level_partitions_catalog() {
        let catalog = Catalog::global();
        let beginner = catalog.by_level(DifficultyLevel::Beginner);
        let intermediate = catalog.by_level(DifficultyLevel::Intermediate);
        let advanced = catalog.by_level(DifficultyLevel::Advanced);

        assert_eq!(beginner.len(), 1);
        assert_eq!(intermediate.len(), 3);
        assert_eq!(advanced.len(), 1);
        assert_eq!(
            beginner.len() + intermediate.len() + advanced.len(),
            catalog.all().count()
        );
    }

    #[test]
    fn test_skeletons_match_session_counts() {
        for template in Catalog::global().all() {
            assert_eq!(
                template.skeleton.len() as u32,
                template.sessions_per_week,
                "skeleton/sessions mismatch in {}",
                template.key
            );
            // Day numbers are 1..=n in order
            for (i, day) in template.skeleton.iter().enumerate() {
                assert_eq!(day.day, i as u32 + 1);
                assert!(!day.exercises.is_empty());
            }
        }
    }

    #[test]
    fn test_531_days_each_anchor_one_main_lift() {
        // The 5/3/1 generator expands exactly one main lift per day into the
        // cycle's top sets.
        let template = Catalog::global().by_key("intermediate_531").unwrap();
        for day in &template.skeleton {
            let mains = day
                .exercises
                .iter()
                .filter(|e| e.category == ExerciseCategory::MainLift)
                .count();
            assert_eq!(mains, 1, "day {} should anchor one main lift", day.day);
        }
    }

    #[test]
    fn test_main_lifts_appear_in_every_skeleton() {
        // Each template trains the lifts it declares: every listed main lift
        // shows up somewhere in the weekly skeleton.
        for template in Catalog::global().all() {
            for lift in &template.main_lifts {
                assert!(
                    template
                        .skeleton
                        .iter()
                        .flat_map(|d| d.exercises.iter())
                        .any(|e| &e.name == lift),
                    "{} missing from {} skeleton",
                    lift,
                    template.key
                );
            }
        }
    }

    #[test]
    fn test_zones_are_well_formed() {
        for template in Catalog::global().all() {
            assert!(!template.intensity_zones.is_empty());
            for zone in &template.intensity_zones {
                assert!(
                    zone.min_pct <= zone.max_pct,
                    "inverted zone {} in {}",
                    zone.name,
                    template.key
                );
            }
        }
    }

    #[test]
    fn test_methodology_round_trips_through_strings() {
        for m in [
            Methodology::LinearProgression,
            Methodology::FiveThreeOne,
            Methodology::Conjugate,
            Methodology::BlockPeriodization,
            Methodology::DailyUndulating,
        ] {
            let parsed: Methodology = m.to_string().parse().unwrap();
            assert_eq!(parsed, m);
        }
        assert!("not_a_methodology".parse::<Methodology>().is_err());
    }

    #[test]
    fn test_intensity_serde_shapes() {
        let pct: Intensity = serde_json::from_str("85.0").unwrap();
        assert_eq!(pct, Intensity::Percentage(85.0));

        let marker: Intensity = serde_json::from_str("\"bodyweight\"").unwrap();
        assert_eq!(marker, Intensity::bodyweight());

        assert_eq!(serde_json::to_string(&pct).unwrap(), "85.0");
        assert_eq!(serde_json::to_string(&marker).unwrap(), "\"bodyweight\"");
    }
}
