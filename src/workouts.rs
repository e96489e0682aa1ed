//! Workout generation
//!
//! Instantiates a methodology's weekly skeleton into concrete planned
//! workouts, one per scheduled training day, with every exercise slot
//! resolved against the user's training maxes. 5/3/1 is special-cased: its
//! main lifts follow the fixed four-week cycle of top-set percentages
//! instead of the generic weekly progression.

use tracing::warn;

use crate::catalog::{ExerciseCategory, ExerciseTemplate, Intensity, MethodologyTemplate};
use crate::loads;
use crate::models::{ExercisePrescription, MaxesMap, NewPlannedWorkout, Reps};
use crate::progression::{
    is_deload, volume_multiplier_for_week, weekly_progression, IncrementType, Strategy,
    StrategyParams,
};

/// Top sets per cycle week: `(percentage of training max, reps)` triples for
/// weeks 1-3 plus the deload. Week 3 is the 5/3/1+ week.
pub const FIVE_THREE_ONE_CYCLE: [[(f64, u32); 3]; 4] = [
    [(65.0, 5), (75.0, 5), (85.0, 5)],
    [(70.0, 3), (80.0, 3), (90.0, 3)],
    [(75.0, 5), (85.0, 3), (95.0, 1)],
    [(40.0, 5), (50.0, 5), (60.0, 5)],
];

/// Position of a week inside the repeating four-week 5/3/1 cycle, 1-indexed.
pub fn cycle_week(week: u32) -> usize {
    (((week - 1) % 4) + 1) as usize
}

const DEFAULT_SESSION_MINUTES: u32 = 60;
const FIVE_THREE_ONE_SESSION_MINUTES: u32 = 75;

/// Planned workouts for every week and skeleton day of a block.
pub fn generate_workouts(
    template: &MethodologyTemplate,
    strategy: Strategy,
    total_weeks: u32,
    params: &StrategyParams,
    training_maxes: &MaxesMap,
) -> Vec<NewPlannedWorkout> {
    if strategy == Strategy::FiveThreeOne {
        return generate_531_workouts(template, total_weeks, params, training_maxes);
    }

    let mut workouts = Vec::with_capacity((total_weeks as usize) * template.skeleton.len());
    for week in 1..=total_weeks {
        let volume = volume_multiplier_for_week(strategy, week, params);

        for day in &template.skeleton {
            let exercises = day
                .exercises
                .iter()
                .map(|entry| resolve_exercise(entry, strategy, week, params, volume, training_maxes))
                .collect();

            workouts.push(NewPlannedWorkout {
                week_number: week,
                day_number: day.day,
                workout_name: day.name.clone(),
                focus: day.focus.clone(),
                estimated_duration: DEFAULT_SESSION_MINUTES,
                exercises,
                notes: Some(format!("Week {} of {}", week, strategy.label())),
            });
        }
    }
    workouts
}

/// Resolve one skeleton slot for a given week.
///
/// Percentage-based slots with a usable max get a numeric weight at the
/// template intensity plus the week-local increment offset; everything else
/// keeps its qualitative intensity. Set counts scale with the week's volume
/// multiplier.
fn resolve_exercise(
    entry: &ExerciseTemplate,
    strategy: Strategy,
    week: u32,
    params: &StrategyParams,
    volume: f64,
    training_maxes: &MaxesMap,
) -> ExercisePrescription {
    let max = training_maxes.get(&entry.name).copied().unwrap_or(0.0);
    let rest_seconds = entry
        .rest_seconds
        .unwrap_or_else(|| entry.category.default_rest_seconds());
    let adjusted_sets = ((entry.sets as f64 * volume).round() as i64).max(1) as u32;

    match entry.intensity.as_percentage() {
        Some(base_pct) if max > 0.0 => {
            if entry.category == ExerciseCategory::MainLift && is_deload(strategy, week, params) {
                // Deload weeks take the calculator's reduced prescription
                // wholesale so they stay strictly lighter than neighbors.
                let prog = weekly_progression(max, strategy, week, params, 0.0);
                let (min, max_reps) = prog.reps_range;
                return ExercisePrescription {
                    name: entry.name.clone(),
                    category: entry.category,
                    sets: prog.sets,
                    reps: Reps::Range { min, max: max_reps },
                    intensity: Intensity::Percentage(prog.load_pct.upper()),
                    weight: Some(prog.working_weight.upper()),
                    rest_seconds,
                    notes: Some(prog.notes),
                };
            }

            let pct = loads::round1(
                (base_pct + week_offset_pct(params, week, max)).clamp(0.0, params.max_load_pct),
            );
            ExercisePrescription {
                name: entry.name.clone(),
                category: entry.category,
                sets: adjusted_sets,
                reps: Reps::Count(entry.reps),
                intensity: Intensity::Percentage(pct),
                weight: Some(loads::weight_at_percentage(max, pct)),
                rest_seconds,
                notes: None,
            }
        }
        Some(base_pct) => {
            // Percentage slot without a usable max: keep the target
            // percentage as a qualitative goal, no resolvable weight.
            if entry.category == ExerciseCategory::MainLift {
                warn!(exercise = entry.name.as_str(), "main lift has no 1RM, prescribing placeholder");
            }
            ExercisePrescription {
                name: entry.name.clone(),
                category: entry.category,
                sets: adjusted_sets,
                reps: Reps::Count(entry.reps),
                intensity: Intensity::Percentage(base_pct),
                weight: None,
                rest_seconds,
                notes: Some("no 1RM established".to_string()),
            }
        }
        None => ExercisePrescription {
            name: entry.name.clone(),
            category: entry.category,
            sets: adjusted_sets,
            reps: Reps::Count(entry.reps),
            intensity: entry.intensity.clone(),
            weight: None,
            rest_seconds,
            notes: None,
        },
    }
}

/// Week-over-week intensity offset in percentage points for one exercise.
fn week_offset_pct(params: &StrategyParams, week: u32, max: f64) -> f64 {
    let steps = (week - 1) as f64;
    match params.increment_type {
        IncrementType::Percentage => params.weekly_increment * steps,
        IncrementType::Absolute => params.weekly_increment * steps / max * 100.0,
    }
}

fn generate_531_workouts(
    template: &MethodologyTemplate,
    total_weeks: u32,
    params: &StrategyParams,
    training_maxes: &MaxesMap,
) -> Vec<NewPlannedWorkout> {
    let mut workouts = Vec::with_capacity((total_weeks as usize) * template.skeleton.len());

    for week in 1..=total_weeks {
        let cycle_position = cycle_week(week);
        let scheme = &FIVE_THREE_ONE_CYCLE[cycle_position - 1];
        let cycle_number = (week - 1) / 4 + 1;
        let volume = volume_multiplier_for_week(Strategy::FiveThreeOne, week, params);

        for day in &template.skeleton {
            let mut exercises = Vec::new();
            let mut main_lift_expanded = false;

            for entry in &day.exercises {
                if entry.category == ExerciseCategory::MainLift && !main_lift_expanded {
                    exercises.extend(main_lift_top_sets(entry, scheme, training_maxes));
                    main_lift_expanded = true;
                } else {
                    exercises.push(accessory_slot(entry, volume));
                }
            }

            workouts.push(NewPlannedWorkout {
                week_number: week,
                day_number: day.day,
                workout_name: day.name.clone(),
                focus: day.focus.clone(),
                estimated_duration: FIVE_THREE_ONE_SESSION_MINUTES,
                exercises,
                notes: Some(format!("5/3/1 week {} - cycle {}", cycle_position, cycle_number)),
            });
        }
    }
    workouts
}

/// The day's main lift expanded into the cycle's top sets, one prescription
/// per set so each carries its own percentage.
fn main_lift_top_sets(
    entry: &ExerciseTemplate,
    scheme: &[(f64, u32); 3],
    training_maxes: &MaxesMap,
) -> Vec<ExercisePrescription> {
    let max = training_maxes.get(&entry.name).copied().unwrap_or(0.0);
    if max <= 0.0 {
        warn!(exercise = entry.name.as_str(), "main lift has no 1RM, prescribing placeholder");
    }
    let rest_seconds = entry.rest_seconds.unwrap_or(180);

    scheme
        .iter()
        .enumerate()
        .map(|(i, &(pct, reps))| ExercisePrescription {
            name: entry.name.clone(),
            category: ExerciseCategory::MainLift,
            sets: 1,
            reps: Reps::Count(reps),
            intensity: Intensity::Percentage(pct),
            weight: (max > 0.0).then(|| loads::weight_at_percentage(max, pct)),
            rest_seconds,
            notes: Some(if max > 0.0 {
                format!("Set {} of main work", i + 1)
            } else {
                "no 1RM established".to_string()
            }),
        })
        .collect()
}

fn accessory_slot(entry: &ExerciseTemplate, volume: f64) -> ExercisePrescription {
    let adjusted_sets = ((entry.sets as f64 * volume).round() as i64).max(1) as u32;
    ExercisePrescription {
        name: entry.name.clone(),
        category: entry.category,
        sets: adjusted_sets,
        reps: Reps::Count(entry.reps),
        intensity: entry.intensity.clone(),
        weight: None,
        rest_seconds: entry
            .rest_seconds
            .unwrap_or_else(|| entry.category.default_rest_seconds()),
        notes: Some("Accessory work".to_string()),
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
