//! Property tests for the hysteresis window.

use acoustic_sentinel_core::{AlarmState, DetectionLabel};
use acoustic_sentinel_detect::HysteresisFilter;
use proptest::prelude::*;

fn labels(bits: &[bool]) -> Vec<DetectionLabel> {
    bits.iter().map(|&b| DetectionLabel::from(b)).collect()
}

proptest! {
    #[test]
    fn prop_fault_count_is_sum_of_recent_labels(
        window in 1usize..12,
        bits in proptest::collection::vec(any::<bool>(), 0..64),
    ) {
        let mut filter = HysteresisFilter::new(window, 1);
        for (seen, label) in labels(&bits).into_iter().enumerate() {
            filter.update(label);
            let start = (seen + 1).saturating_sub(window);
            let expected = bits[start..=seen].iter().filter(|&&b| b).count();
            prop_assert_eq!(filter.fault_count(), expected);
        }
    }

    #[test]
    fn prop_state_matches_threshold(
        window in 1usize..12,
        threshold_seed in 0usize..12,
        bits in proptest::collection::vec(any::<bool>(), 1..64),
    ) {
        let threshold = threshold_seed % window + 1;
        let mut filter = HysteresisFilter::new(window, threshold);
        for label in labels(&bits) {
            let state = filter.update(label);
            let count = filter.fault_count();
            let expected = if count >= threshold {
                AlarmState::Alarm
            } else if count > 0 {
                AlarmState::Observing
            } else {
                AlarmState::Normal
            };
            prop_assert_eq!(state, expected);
        }
    }

    #[test]
    fn prop_full_normal_window_is_normal(
        window in 1usize..12,
        prefix in proptest::collection::vec(any::<bool>(), 0..32),
    ) {
        let mut filter = HysteresisFilter::new(window, 1);
        for label in labels(&prefix) {
            filter.update(label);
        }
        let mut state = filter.state();
        for _ in 0..window {
            state = filter.update(DetectionLabel::Normal);
        }
        prop_assert_eq!(state, AlarmState::Normal);
        prop_assert_eq!(filter.fault_count(), 0);
    }

    #[test]
    fn prop_threshold_anomalies_in_window_alarm(
        window in 2usize..12,
        first_seed in any::<usize>(),
        offset_seed in any::<usize>(),
        extra in proptest::collection::vec(any::<bool>(), 12),
    ) {
        let first = first_seed % window;
        let second = (first + 1 + offset_seed % (window - 1)) % window;
        let mut filter = HysteresisFilter::new(window, 2);
        let mut state = AlarmState::Normal;
        for i in 0..window {
            let anomaly = i == first || i == second || extra[i];
            state = filter.update(DetectionLabel::from(anomaly));
        }
        prop_assert_eq!(state, AlarmState::Alarm);
    }
}

#[test]
fn threshold_boundaries_at_defaults() {
    let mut filter = HysteresisFilter::default();
    assert_eq!(filter.update(DetectionLabel::Anomaly), AlarmState::Observing);
    assert_eq!(filter.fault_count(), 1);
    assert_eq!(filter.update(DetectionLabel::Anomaly), AlarmState::Alarm);
    assert_eq!(filter.fault_count(), 2);
}
