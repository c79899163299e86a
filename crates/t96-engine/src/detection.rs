//! Detection thresholds and per-run variance.

use t96_core::GameState;
use t96_core::rng::roll;

/// Status turns suspicious.
pub const SUSPICIOUS: u32 = 50;
/// Status turns to alert.
pub const ALERT: u32 = 70;
/// Status turns critical.
pub const CRITICAL: u32 = 85;
/// Detection imminent; `hide` becomes available.
pub const IMMINENT: u32 = 90;
/// Above this, `wait` sheds more detection.
pub const HIGH_WAIT_REDUCTION: u32 = 70;
/// Detection shed by `wait`.
pub const WAIT_NORMAL: u32 = 5;
/// Detection shed by `wait` at high detection.
pub const WAIT_HIGH: u32 = 8;
/// Below this, `wait` is refused.
pub const WAIT_FLOOR: u32 = 5;
/// Detection level `hide` resets to.
pub const HIDE_RESET: u32 = 70;

/// Output delay growing with detection, scaled by a per-run variance
/// of 0.7-1.3.
pub fn calculate_delay(state: &GameState) -> u64 {
    let base: f64 = match state.detection_level {
        0..20 => return 0,
        20..40 => 300.0,
        40..60 => 800.0,
        60..80 => 1500.0,
        _ => 2500.0,
    };
    let variance = 0.7 + roll(state.seed.wrapping_add(777)) * 0.6;
    (base * variance).floor() as u64
}

/// Scale `base` by a per-run multiplier keyed by the command name:
/// 1.5 rarely, 0.7 rarely, 1.0 otherwise.
pub fn apply_variance(state: &GameState, command: &str, base: u32) -> u32 {
    let first = command.chars().next().map_or(0, u32::from);
    let r = roll(state.seed.wrapping_add(first.wrapping_mul(100)));
    let multiplier = if r < 0.15 {
        1.5
    } else if r > 0.85 {
        0.7
    } else {
        1.0
    };
    (f64::from(base) * multiplier).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_delay_when_quiet() {
        let mut state = GameState::new(3);
        state.detection_level = 10;
        assert_eq!(calculate_delay(&state), 0);
    }

    proptest! {
        #[test]
        fn delay_within_band(seed in 1u32.., detection in 20u32..=100) {
            let mut state = GameState::new(seed);
            state.detection_level = detection;
            let base = match detection {
                20..40 => 300.0,
                40..60 => 800.0,
                60..80 => 1500.0,
                _ => 2500.0,
            };
            let delay = calculate_delay(&state) as f64;
            prop_assert!(delay >= (base * 0.7_f64).floor() && delay <= base * 1.3);
            prop_assert_eq!(calculate_delay(&state), calculate_delay(&state));
        }

        #[test]
        fn variance_is_one_of_three(seed in 1u32.., base in 1u32..20) {
            let state = GameState::new(seed);
            let v = apply_variance(&state, "trace", base);
            let options = [(base as f64 * 1.5) as u32, base, (base as f64 * 0.7) as u32];
            prop_assert!(options.contains(&v));
        }
    }
}
