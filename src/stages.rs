//! Stage generation
//!
//! Expands a strategy and block duration into one stage record per week.
//! Load percentages come from the same weekly rules the progression
//! calculator applies, so a stage and the calculator never disagree about
//! the same week. Deload weeks halve volume and carry a recovery focus.

use crate::models::NewStage;
use crate::progression::{
    self, block_phase, is_deload, volume_multiplier_for_week, BlockPhase, Load, Strategy,
    StrategyParams,
};
use crate::workouts::{cycle_week, FIVE_THREE_ONE_CYCLE};

/// Nominal max used to evaluate weekly load rules at the block grain.
/// Percentages are max-independent except under absolute increments, where
/// a 100kg reference reads kilogram steps as percentage points.
const REFERENCE_MAX: f64 = 100.0;

/// One stage per week covering `1..=total_weeks`.
pub fn generate_stages(strategy: Strategy, total_weeks: u32, params: &StrategyParams) -> Vec<NewStage> {
    (1..=total_weeks)
        .map(|week| stage_for_week(strategy, week, total_weeks, params))
        .collect()
}

fn stage_for_week(
    strategy: Strategy,
    week: u32,
    total_weeks: u32,
    params: &StrategyParams,
) -> NewStage {
    let volume_multiplier = volume_multiplier_for_week(strategy, week, params);
    let deload = is_deload(strategy, week, params);

    let (load_percentage, intensity_focus, description) = if deload {
        (
            deload_load(strategy, week, params),
            "recovery".to_string(),
            "Deload week - reduced load and volume".to_string(),
        )
    } else {
        week_profile(strategy, week, total_weeks, params)
    };

    let name = if deload {
        format!("Week {} - Deload", week)
    } else {
        format!("Week {} - {}", week, description)
    };

    NewStage {
        name,
        week_number: week,
        load_percentage,
        volume_multiplier,
        intensity_focus,
        description: Some(description),
    }
}

fn deload_load(strategy: Strategy, week: u32, params: &StrategyParams) -> f64 {
    match strategy {
        // 5/3/1 deloads at the cycle's fixed top percentage
        Strategy::FiveThreeOne => FIVE_THREE_ONE_CYCLE[cycle_week(week) - 1][2].0,
        _ => progression::weekly_progression(REFERENCE_MAX, strategy, week, params, 0.0)
            .load_pct
            .upper(),
    }
}

/// Load percentage, focus label, and phase description for a non-deload
/// week.
fn week_profile(
    strategy: Strategy,
    week: u32,
    total_weeks: u32,
    params: &StrategyParams,
) -> (f64, String, String) {
    match strategy {
        Strategy::FiveThreeOne => {
            let top_set_pct = FIVE_THREE_ONE_CYCLE[cycle_week(week) - 1][2].0;
            let cycle_number = (week - 1) / 4 + 1;
            let description = match cycle_number {
                1 => "Base building cycle",
                2 => "Strength development",
                3 => "Intensity phase",
                _ => "Peak and test",
            };
            (top_set_pct, "strength".to_string(), description.to_string())
        }
        Strategy::BlockPeriodization => {
            let load = calculated_load(strategy, week, params);
            let phase = block_phase(week, params.duration_weeks);
            let description = match phase {
                BlockPhase::Accumulation => "High volume, moderate intensity",
                BlockPhase::Intensification => "Moderate volume, high intensity",
                BlockPhase::Realization => "Low volume, peak intensity",
            };
            (load, phase.focus().to_string(), description.to_string())
        }
        Strategy::LinearProgression => {
            let load = calculated_load(strategy, week, params);
            // First two thirds build volume, the rest pushes intensity
            let volume_weeks = total_weeks * 2 / 3;
            let peak_start = volume_weeks + (total_weeks - volume_weeks) / 2;
            let (focus, description) = if week <= volume_weeks {
                ("volume", "Linear progression phase")
            } else if week <= peak_start {
                ("strength", "Intensity phase")
            } else {
                ("strength", "Peak and test")
            };
            (load, focus.to_string(), description.to_string())
        }
        Strategy::Conjugate => (
            calculated_load(strategy, week, params),
            "max_strength".to_string(),
            "Max effort and dynamic effort training".to_string(),
        ),
        Strategy::DailyUndulating => (
            calculated_load(strategy, week, params),
            "undulating".to_string(),
            "Intensity and volume vary by session".to_string(),
        ),
        Strategy::WaveLoading => (
            calculated_load(strategy, week, params),
            "strength".to_string(),
            format!("Wave loading - {} pattern", params.wave_pattern.label()),
        ),
        Strategy::General => (
            calculated_load(strategy, week, params),
            "strength".to_string(),
            "General strength training".to_string(),
        ),
    }
}

fn calculated_load(strategy: Strategy, week: u32, params: &StrategyParams) -> f64 {
    match progression::weekly_progression(REFERENCE_MAX, strategy, week, params, 0.0).load_pct {
        Load::Single(pct) => pct,
        // A daily-undulating week is summarized by its heaviest session
        Load::Range { max, .. } => max,
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::assert_approx_eq;

    fn params_for(total_weeks: u32) -> StrategyParams {
        StrategyParams {
            duration_weeks: total_weeks,
            ..StrategyParams::default()
        }
    }

    #[test]
    fn test_every_template_gets_contiguous_weeks() {
        for template in Catalog::global().all() {
            let strategy = Strategy::from(template.methodology);
            let params = params_for(template.duration_weeks);
            let stages = generate_stages(strategy, template.duration_weeks, &params);

            assert_eq!(stages.len() as u32, template.duration_weeks, "{}", template.key);
            for (i, stage) in stages.iter().enumerate() {
                assert_eq!(stage.week_number, i as u32 + 1, "{}", template.key);
            }
        }
    }

    #[test]
    fn test_loads_stay_in_bounds() {
        for template in Catalog::global().all() {
            let strategy = Strategy::from(template.methodology);
            let params = params_for(template.duration_weeks);
            for stage in generate_stages(strategy, template.duration_weeks, &params) {
                assert!(
                    stage.load_percentage > 0.0 && stage.load_percentage <= params.max_load_pct,
                    "{} week {} load {}",
                    template.key,
                    stage.week_number,
                    stage.load_percentage
                );
            }
        }
    }

    #[test]
    fn test_linear_deload_stage() {
        let mut params = params_for(12);
        params.deload_week = Some(6);
        let stages = generate_stages(Strategy::LinearProgression, 12, &params);

        let deload = &stages[5];
        assert_approx_eq!(deload.load_percentage, 60.0, 0.001);
        assert_approx_eq!(deload.volume_multiplier, 0.5, 0.001);
        assert_eq!(deload.intensity_focus, "recovery");
        assert!(deload.name.contains("Deload"));

        // Strictly lighter than both neighbors
        assert!(stages[4].load_percentage > deload.load_percentage);
        assert!(stages[6].load_percentage > deload.load_percentage);
    }

    #[test]
    fn test_531_deloads_every_fourth_week() {
        let params = params_for(16);
        let stages = generate_stages(Strategy::FiveThreeOne, 16, &params);

        for stage in &stages {
            if stage.week_number % 4 == 0 {
                assert_approx_eq!(stage.load_percentage, 60.0, 0.001);
                assert_approx_eq!(stage.volume_multiplier, 0.5, 0.001);
                assert_eq!(stage.intensity_focus, "recovery");
            } else {
                assert!(stage.load_percentage >= 85.0);
                assert_approx_eq!(stage.volume_multiplier, 1.0, 0.001);
            }
        }

        // Top-set percentages climb across a cycle: 85, 90, 95
        assert_approx_eq!(stages[0].load_percentage, 85.0, 0.001);
        assert_approx_eq!(stages[1].load_percentage, 90.0, 0.001);
        assert_approx_eq!(stages[2].load_percentage, 95.0, 0.001);
    }

    #[test]
    fn test_block_stages_carry_phase_multipliers() {
        let params = params_for(18);
        let stages = generate_stages(Strategy::BlockPeriodization, 18, &params);

        assert_approx_eq!(stages[0].volume_multiplier, 1.3, 0.001);
        assert_eq!(stages[0].intensity_focus, "hypertrophy");

        assert_approx_eq!(stages[8].volume_multiplier, 0.8, 0.001);
        assert_eq!(stages[8].intensity_focus, "strength");

        assert_approx_eq!(stages[15].volume_multiplier, 0.5, 0.001);
        assert_eq!(stages[15].intensity_focus, "peaking");
    }

    #[test]
    fn test_stage_loads_agree_with_calculator() {
        // Same week, same rules: the stage must repeat what the calculator
        // prescribes.
        let params = params_for(12);
        for strategy in [
            Strategy::LinearProgression,
            Strategy::BlockPeriodization,
            Strategy::Conjugate,
            Strategy::General,
        ] {
            let stages = generate_stages(strategy, 12, &params);
            for stage in &stages {
                let prog = progression::weekly_progression(
                    REFERENCE_MAX,
                    strategy,
                    stage.week_number,
                    &params,
                    0.0,
                );
                assert_approx_eq!(stage.load_percentage, prog.load_pct.upper(), 0.001);
            }
        }
    }

    #[test]
    fn test_unknown_strategy_ramps_linearly() {
        let params = params_for(12);
        let stages = generate_stages(Strategy::General, 12, &params);
        // 70 -> 95 over twelve weeks, monotonically
        assert_approx_eq!(stages[0].load_percentage, 72.1, 0.001);
        assert_approx_eq!(stages[11].load_percentage, 95.0, 0.001);
        for pair in stages.windows(2) {
            assert!(pair[1].load_percentage >= pair[0].load_percentage);
        }
    }
}
