#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use attune_contracts::affect::{EmotionLabel, Trend};
use attune_contracts::fusion::{EmotionState, StabilityReading};
use attune_contracts::{ContractViolation, UnitScore, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Below this many prior states the analyzer returns the insufficient-data
    /// default rather than a computed reading.
    pub min_history: usize,
    pub window: usize,
    /// Linear variance penalty. A heuristic, not a calibrated statistical
    /// measure.
    pub variance_penalty: f32,
    pub trend_delta: f32,
    /// More than this many distinct primary labels in the window counts as
    /// rapid change.
    pub rapid_change_labels: usize,
}

impl StabilityConfig {
    pub fn mvp_v1() -> Self {
        Self {
            min_history: 3,
            window: 5,
            variance_penalty: 2.0,
            trend_delta: 0.2,
            rapid_change_labels: 3,
        }
    }
}

impl Validate for StabilityConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.min_history == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "stability_config.min_history",
                reason: "must be > 0",
            });
        }
        if self.window < self.min_history {
            return Err(ContractViolation::InvalidValue {
                field: "stability_config.window",
                reason: "must be >= min_history",
            });
        }
        if !self.variance_penalty.is_finite() || self.variance_penalty <= 0.0 {
            return Err(ContractViolation::InvalidValue {
                field: "stability_config.variance_penalty",
                reason: "must be finite and > 0",
            });
        }
        if !self.trend_delta.is_finite() || !(0.0..=1.0).contains(&self.trend_delta) {
            return Err(ContractViolation::InvalidRange {
                field: "stability_config.trend_delta",
                min: 0.0,
                max: 1.0,
                got: self.trend_delta as f64,
            });
        }
        if self.rapid_change_labels == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "stability_config.rapid_change_labels",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// Rolling stability/trend analyzer over the session history buffer. Reads
/// only the prior states; the just-fused state is not part of the window.
#[derive(Debug, Clone)]
pub struct StabilityRuntime {
    config: StabilityConfig,
}

impl StabilityRuntime {
    pub fn new(config: StabilityConfig) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn assess(&self, history: &[EmotionState]) -> StabilityReading {
        if history.len() < self.config.min_history {
            // Insufficient data: mid-range default, not zero.
            return StabilityReading::v1(UnitScore(0.5), Trend::Stable, false);
        }

        let window_start = history.len().saturating_sub(self.config.window);
        let window = &history[window_start..];

        let intensities: Vec<f32> = window.iter().map(|s| s.intensity.value()).collect();
        let mean = intensities.iter().sum::<f32>() / intensities.len() as f32;
        let variance = intensities
            .iter()
            .map(|i| (i - mean) * (i - mean))
            .sum::<f32>()
            / intensities.len() as f32;
        let stability = UnitScore::clamped(1.0 - variance * self.config.variance_penalty);

        let delta = intensities[intensities.len() - 1] - intensities[0];
        let trend = if delta > self.config.trend_delta {
            Trend::Rising
        } else if -delta > self.config.trend_delta {
            Trend::Falling
        } else {
            Trend::Stable
        };

        let distinct: BTreeSet<EmotionLabel> = window.iter().map(|s| s.primary).collect();
        let rapid_changes = distinct.len() > self.config.rapid_change_labels;

        StabilityReading::v1(stability, trend, rapid_changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_contracts::affect::SessionPhase;
    use attune_contracts::fusion::FusedReading;
    use attune_contracts::modality::{BehavioralSignal, VisualSignal, VoiceSignal};
    use attune_contracts::MonotonicTimeNs;

    fn state(primary: EmotionLabel, intensity: f32, tick: u64) -> EmotionState {
        EmotionState::v1(
            FusedReading::v1(primary, Vec::new(), UnitScore(intensity), UnitScore(1.0)).unwrap(),
            StabilityReading::v1(UnitScore(0.5), Trend::Stable, false),
            VoiceSignal::neutral(),
            VisualSignal::neutral(),
            BehavioralSignal::neutral(),
            SessionPhase::Initial,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            MonotonicTimeNs(tick),
        )
        .unwrap()
    }

    fn runtime() -> StabilityRuntime {
        StabilityRuntime::new(StabilityConfig::mvp_v1()).unwrap()
    }

    #[test]
    fn at_stability_01_short_history_returns_insufficient_data_default() {
        let history = vec![
            state(EmotionLabel::Joy, 0.2, 1),
            state(EmotionLabel::Joy, 0.9, 2),
        ];
        let out = runtime().assess(&history);
        assert_eq!(out.stability.value(), 0.5);
        assert_eq!(out.trend, Trend::Stable);
        assert!(!out.rapid_changes);
    }

    #[test]
    fn at_stability_02_flat_intensities_are_fully_stable() {
        let history: Vec<EmotionState> = (1..=5)
            .map(|tick| state(EmotionLabel::Contentment, 0.4, tick))
            .collect();
        let out = runtime().assess(&history);
        assert_eq!(out.stability.value(), 1.0);
        assert_eq!(out.trend, Trend::Stable);
    }

    #[test]
    fn at_stability_03_variance_penalty_lowers_stability() {
        let history = vec![
            state(EmotionLabel::Joy, 0.1, 1),
            state(EmotionLabel::Joy, 0.9, 2),
            state(EmotionLabel::Joy, 0.1, 3),
            state(EmotionLabel::Joy, 0.9, 4),
        ];
        let out = runtime().assess(&history);
        // variance = 0.16, stability = 1 - 0.32
        assert!((out.stability.value() - 0.68).abs() < 1e-5);
    }

    #[test]
    fn at_stability_04_trend_follows_window_edge_delta() {
        let rising = vec![
            state(EmotionLabel::Joy, 0.2, 1),
            state(EmotionLabel::Joy, 0.3, 2),
            state(EmotionLabel::Joy, 0.5, 3),
        ];
        assert_eq!(runtime().assess(&rising).trend, Trend::Rising);

        let falling = vec![
            state(EmotionLabel::Joy, 0.8, 1),
            state(EmotionLabel::Joy, 0.6, 2),
            state(EmotionLabel::Joy, 0.4, 3),
        ];
        assert_eq!(runtime().assess(&falling).trend, Trend::Falling);

        let flat = vec![
            state(EmotionLabel::Joy, 0.5, 1),
            state(EmotionLabel::Joy, 0.4, 2),
            state(EmotionLabel::Joy, 0.6, 3),
        ];
        assert_eq!(runtime().assess(&flat).trend, Trend::Stable);
    }

    #[test]
    fn at_stability_05_window_is_last_five_entries_only() {
        let mut history: Vec<EmotionState> = (1..=10)
            .map(|tick| state(EmotionLabel::Joy, 0.9, tick))
            .collect();
        for (idx, item) in history.iter_mut().enumerate().take(5) {
            *item = state(EmotionLabel::Joy, 0.1, idx as u64 + 1);
        }
        // Entries outside the trailing window must not drag the variance.
        let out = runtime().assess(&history);
        assert_eq!(out.stability.value(), 1.0);
    }

    #[test]
    fn at_stability_06_rapid_changes_needs_more_than_three_labels() {
        let three = vec![
            state(EmotionLabel::Joy, 0.5, 1),
            state(EmotionLabel::Sadness, 0.5, 2),
            state(EmotionLabel::Anger, 0.5, 3),
            state(EmotionLabel::Joy, 0.5, 4),
        ];
        assert!(!runtime().assess(&three).rapid_changes);

        let four = vec![
            state(EmotionLabel::Joy, 0.5, 1),
            state(EmotionLabel::Sadness, 0.5, 2),
            state(EmotionLabel::Anger, 0.5, 3),
            state(EmotionLabel::Fear, 0.5, 4),
        ];
        assert!(runtime().assess(&four).rapid_changes);
    }
}
