//! Load arithmetic for strength prescriptions
//!
//! Pure numeric layer underneath the progression calculator and the derived
//! views: training-max derivation, percentage-of-max loads, the
//! Brzycki-family weight/rep inversion, and RPE-indexed load tables.
//!
//! Every function is total over non-negative inputs. A zero or negative max
//! yields zero-valued output instead of an error, so a lift without an
//! established 1RM degrades quietly downstream.

use std::collections::BTreeMap;

/// Rep columns used by the RPE tables.
pub const RPE_REP_COLUMNS: [u32; 7] = [1, 3, 5, 8, 10, 12, 15];

/// Round to one decimal, the resolution every prescription uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Training max as a fraction of 1RM. The conventional basis for weekly
/// percentage prescriptions is 90%.
pub fn training_max(one_rm: f64, pct: f64) -> f64 {
    if one_rm <= 0.0 {
        return 0.0;
    }
    round1(one_rm * pct / 100.0)
}

/// Working weight at a percentage of max.
pub fn weight_at_percentage(one_rm: f64, pct: f64) -> f64 {
    if one_rm <= 0.0 {
        return 0.0;
    }
    round1(one_rm * pct / 100.0)
}

/// Estimated reps possible at a given weight.
///
/// Inverse of the Brzycki curve `weight = 1RM / (1 + reps/30)`, clamped to
/// a practical 1..=20 range.
pub fn reps_at_weight(one_rm: f64, weight: f64) -> u32 {
    if weight >= one_rm {
        return 1;
    }
    if weight <= 0.0 {
        return 0;
    }
    let reps = 30.0 * (one_rm / weight - 1.0);
    reps.round().clamp(1.0, 20.0) as u32
}

/// Weight liftable for a target rep count, per the same Brzycki curve.
pub fn weight_at_reps(one_rm: f64, reps: u32) -> f64 {
    if one_rm <= 0.0 {
        return 0.0;
    }
    if reps <= 1 {
        return one_rm;
    }
    round1(one_rm / (1.0 + reps as f64 / 30.0))
}

/// RPE-indexed load table: RPE 6 through 10 in half steps, weights for the
/// standard rep columns.
///
/// At 1 rep each RPE step below 10 drops the load 5%; at higher reps the
/// Brzycki weight is discounted 2% per RPE step.
pub fn rpe_table(one_rm: f64) -> BTreeMap<String, Vec<f64>> {
    let mut table = BTreeMap::new();
    if one_rm <= 0.0 {
        return table;
    }

    for step in 0..=8 {
        let rpe = 6.0 + 0.5 * step as f64;
        let mut weights = Vec::with_capacity(RPE_REP_COLUMNS.len());

        for &reps in &RPE_REP_COLUMNS {
            let pct = if reps == 1 {
                100.0 - (10.0 - rpe) * 5.0
            } else {
                let base = weight_at_reps(one_rm, reps);
                (base / one_rm) * (1.0 - (10.0 - rpe) * 0.02) * 100.0
            };
            weights.push(weight_at_percentage(one_rm, pct));
        }

        table.insert(rpe_label(rpe), weights);
    }

    table
}

/// Label for an RPE level: "RPE_8" for whole values, "RPE_8.5" for halves.
pub fn rpe_label(rpe: f64) -> String {
    if rpe.fract() == 0.0 {
        format!("RPE_{}", rpe as u32)
    } else {
        format!("RPE_{rpe}")
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_training_max_default_basis() {
        assert_approx_eq!(training_max(100.0, 90.0), 90.0, 0.001);
        assert_approx_eq!(training_max(102.5, 90.0), 92.3, 0.001);
    }

    #[test]
    fn test_training_max_zero_and_negative() {
        assert_eq!(training_max(0.0, 90.0), 0.0);
        assert_eq!(training_max(-50.0, 90.0), 0.0);
    }

    #[test]
    fn test_weight_at_full_percentage_is_max() {
        for one_rm in [42.5, 80.0, 117.5, 140.0] {
            assert_approx_eq!(weight_at_percentage(one_rm, 100.0), one_rm, 0.001);
        }
    }

    #[test]
    fn test_reps_at_weight_boundaries() {
        // At or above max only a single is possible
        assert_eq!(reps_at_weight(100.0, 100.0), 1);
        assert_eq!(reps_at_weight(100.0, 120.0), 1);
        // Nothing on the bar, nothing to count
        assert_eq!(reps_at_weight(100.0, 0.0), 0);
        assert_eq!(reps_at_weight(100.0, -5.0), 0);
    }

    #[test]
    fn test_reps_at_weight_clamps_to_twenty() {
        // Very light weight would solve to far more than 20 reps
        assert_eq!(reps_at_weight(100.0, 10.0), 20);
    }

    #[test]
    fn test_weight_reps_round_trip() {
        // reps_at_weight(weight_at_reps(r)) recovers r within rounding
        for reps in 2..=15 {
            let weight = weight_at_reps(100.0, reps);
            let recovered = reps_at_weight(100.0, weight);
            assert!(
                (recovered as i64 - reps as i64).abs() <= 1,
                "round trip drifted: {} reps -> {} kg -> {} reps",
                reps,
                weight,
                recovered
            );
        }
    }

    #[test]
    fn test_weight_at_reps_single_is_max() {
        assert_approx_eq!(weight_at_reps(100.0, 1), 100.0, 0.001);
        assert_approx_eq!(weight_at_reps(100.0, 0), 100.0, 0.001);
    }

    #[test]
    fn test_rpe_table_top_single_equals_max() {
        for one_rm in [60.0, 85.5, 130.0] {
            let table = rpe_table(one_rm);
            let top = &table["RPE_10"];
            assert_approx_eq!(top[0], one_rm, 0.001);
        }
    }

    #[test]
    fn test_rpe_table_has_half_steps() {
        let table = rpe_table(100.0);
        assert_eq!(table.len(), 9);
        assert!(table.contains_key("RPE_6.5"));
        assert!(table.contains_key("RPE_9.5"));
        // RPE 6 single: 100 - 4*5 = 80%
        assert_approx_eq!(table["RPE_6"][0], 80.0, 0.001);
    }

    #[test]
    fn test_rpe_table_weights_decrease_with_reps() {
        // The single-rep column uses its own 5%-per-step scale, so monotone
        // decrease is only guaranteed from the 3-rep column onward.
        let table = rpe_table(100.0);
        for weights in table.values() {
            for pair in weights[1..].windows(2) {
                assert!(
                    pair[0] >= pair[1],
                    "weights should not increase with reps: {:?}",
                    weights
                );
            }
        }
    }

    #[test]
    fn test_rpe_table_empty_without_max() {
        assert!(rpe_table(0.0).is_empty());
        assert!(rpe_table(-10.0).is_empty());
    }
}
