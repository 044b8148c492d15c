#![forbid(unsafe_code)]

use attune_contracts::affect::EmotionLabel;
use attune_contracts::directive::{
    EmotionalIntervention, InterventionKind, InterventionPriority, ToneAdjustment, ToneAspect,
    ToneDirection,
};
use attune_contracts::fusion::FusedReading;
use attune_contracts::trauma::{TraumaIndicator, TraumaKind};
use attune_contracts::{ContractViolation, UnitScore, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectiveConfig {
    /// Intensity above which a negative primary emotion triggers regulation
    /// interventions.
    pub high_intensity_threshold: f32,
}

impl DirectiveConfig {
    pub fn mvp_v1() -> Self {
        Self {
            high_intensity_threshold: 0.7,
        }
    }
}

impl Validate for DirectiveConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        if !self.high_intensity_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.high_intensity_threshold)
        {
            return Err(ContractViolation::InvalidRange {
                field: "directive_config.high_intensity_threshold",
                min: 0.0,
                max: 1.0,
                got: self.high_intensity_threshold as f64,
            });
        }
        Ok(())
    }
}

/// Maps a fused reading plus trauma indicators onto delivery directives.
/// Both derivations are pure functions; rules that fail to construct a valid
/// directive are skipped individually.
#[derive(Debug, Clone)]
pub struct DirectiveRuntime {
    config: DirectiveConfig,
}

impl DirectiveRuntime {
    pub fn new(config: DirectiveConfig) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn tone_adjustments(
        &self,
        reading: &FusedReading,
        indicators: &[TraumaIndicator],
    ) -> Vec<ToneAdjustment> {
        let mut adjustments = Vec::new();

        match reading.primary {
            EmotionLabel::Anxiety => {
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Speed,
                    ToneDirection::Decrease,
                    0.6,
                    "Slow speech to reduce anxiety",
                );
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Volume,
                    ToneDirection::Decrease,
                    0.3,
                    "Lower volume for calming effect",
                );
            }
            EmotionLabel::Sadness => {
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Warmth,
                    ToneDirection::Increase,
                    0.7,
                    "Increase warmth for comfort",
                );
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Pitch,
                    ToneDirection::Decrease,
                    0.4,
                    "Lower pitch for soothing tone",
                );
            }
            EmotionLabel::Anger => {
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Volume,
                    ToneDirection::Decrease,
                    0.5,
                    "Avoid escalating anger",
                );
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Speed,
                    ToneDirection::Decrease,
                    0.4,
                    "Measured pace to de-escalate",
                );
            }
            EmotionLabel::Fear => {
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Warmth,
                    ToneDirection::Increase,
                    0.8,
                    "Maximize safety and comfort",
                );
                push_adjustment(
                    &mut adjustments,
                    ToneAspect::Energy,
                    ToneDirection::Decrease,
                    0.6,
                    "Calm energy to reduce fear",
                );
            }
            _ => {}
        }

        // Indicator overlays append after the primary-emotion table; the
        // list is not deduplicated per aspect.
        for indicator in indicators {
            match indicator.kind {
                TraumaKind::Hyperarousal => {
                    push_adjustment(
                        &mut adjustments,
                        ToneAspect::Speed,
                        ToneDirection::Decrease,
                        0.7,
                        "Counter hyperarousal with slow pace",
                    );
                }
                TraumaKind::Dissociation => {
                    push_adjustment(
                        &mut adjustments,
                        ToneAspect::Volume,
                        ToneDirection::Increase,
                        0.3,
                        "Gentle volume increase for grounding",
                    );
                }
                _ => {}
            }
        }

        adjustments
    }

    pub fn interventions(
        &self,
        reading: &FusedReading,
        indicators: &[TraumaIndicator],
    ) -> Vec<EmotionalIntervention> {
        let mut interventions = Vec::new();

        let high_negative = reading.intensity.value() > self.config.high_intensity_threshold
            && matches!(
                reading.primary,
                EmotionLabel::Anxiety | EmotionLabel::Fear | EmotionLabel::Anger
            );
        if high_negative {
            push_intervention(
                &mut interventions,
                InterventionKind::Breathing,
                InterventionPriority::High,
                "Guided breathing exercise to regulate intense emotions",
                3,
                None,
            );
            push_intervention(
                &mut interventions,
                InterventionKind::MusicTherapy,
                InterventionPriority::Medium,
                "Calming music therapy protocol for emotional regulation",
                10,
                Some("emotional_regulation"),
            );
        }

        if indicators
            .iter()
            .any(|i| i.kind == TraumaKind::Dissociation)
        {
            push_intervention(
                &mut interventions,
                InterventionKind::Grounding,
                InterventionPriority::High,
                "5-4-3-2-1 grounding technique to reconnect with present",
                5,
                None,
            );
        }

        if reading.primary == EmotionLabel::Depression {
            push_intervention(
                &mut interventions,
                InterventionKind::Validation,
                InterventionPriority::Medium,
                "Emotional validation and gentle encouragement",
                5,
                None,
            );
            push_intervention(
                &mut interventions,
                InterventionKind::MusicTherapy,
                InterventionPriority::Medium,
                "Uplifting music therapy to improve mood",
                15,
                Some("mood_elevation"),
            );
        }

        interventions
    }
}

fn push_adjustment(
    adjustments: &mut Vec<ToneAdjustment>,
    aspect: ToneAspect,
    direction: ToneDirection,
    magnitude: f32,
    reason: &str,
) {
    if let Ok(magnitude) = UnitScore::new(magnitude) {
        if let Ok(adjustment) =
            ToneAdjustment::v1(aspect, direction, magnitude, reason.to_string())
        {
            adjustments.push(adjustment);
        }
    }
}

fn push_intervention(
    interventions: &mut Vec<EmotionalIntervention>,
    kind: InterventionKind,
    priority: InterventionPriority,
    description: &str,
    estimated_duration_min: u16,
    protocol_ref: Option<&str>,
) {
    if let Ok(intervention) = EmotionalIntervention::v1(
        kind,
        priority,
        description.to_string(),
        estimated_duration_min,
        protocol_ref.map(|p| p.to_string()),
    ) {
        interventions.push(intervention);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_contracts::trauma::TraumaSeverity;

    fn runtime() -> DirectiveRuntime {
        DirectiveRuntime::new(DirectiveConfig::mvp_v1()).unwrap()
    }

    fn reading(primary: EmotionLabel, intensity: f32) -> FusedReading {
        FusedReading::v1(primary, Vec::new(), UnitScore(intensity), UnitScore(0.9)).unwrap()
    }

    fn indicator(kind: TraumaKind) -> TraumaIndicator {
        TraumaIndicator::v1(
            kind,
            TraumaSeverity::Moderate,
            UnitScore(0.8),
            vec!["observed".to_string()],
            "respond gently".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn at_directive_01_anxiety_slows_and_quiets_delivery() {
        let out = runtime().tone_adjustments(&reading(EmotionLabel::Anxiety, 0.5), &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].aspect, ToneAspect::Speed);
        assert_eq!(out[0].direction, ToneDirection::Decrease);
        assert_eq!(out[0].magnitude.value(), 0.6);
        assert_eq!(out[1].aspect, ToneAspect::Volume);
        assert_eq!(out[1].direction, ToneDirection::Decrease);
    }

    #[test]
    fn at_directive_02_fear_raises_warmth_and_drops_energy() {
        let out = runtime().tone_adjustments(&reading(EmotionLabel::Fear, 0.5), &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].aspect, ToneAspect::Warmth);
        assert_eq!(out[0].direction, ToneDirection::Increase);
        assert_eq!(out[1].aspect, ToneAspect::Energy);
    }

    #[test]
    fn at_directive_03_indicator_overlays_append_without_dedup() {
        let out = runtime().tone_adjustments(
            &reading(EmotionLabel::Anxiety, 0.5),
            &[indicator(TraumaKind::Hyperarousal)],
        );
        // Two anxiety adjustments plus the hyperarousal speed overlay; the
        // speed aspect appears twice and the last-appended entry wins for
        // consumers applying one value per aspect.
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].aspect, ToneAspect::Speed);
        assert_eq!(out[2].magnitude.value(), 0.7);
    }

    #[test]
    fn at_directive_04_neutral_primary_produces_no_adjustments() {
        let out = runtime().tone_adjustments(&reading(EmotionLabel::Neutral, 0.9), &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn at_directive_05_high_intensity_negative_emotion_triggers_regulation() {
        let out = runtime().interventions(&reading(EmotionLabel::Fear, 0.8), &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, InterventionKind::Breathing);
        assert_eq!(out[0].priority, InterventionPriority::High);
        assert_eq!(out[1].kind, InterventionKind::MusicTherapy);
        assert_eq!(out[1].protocol_ref.as_deref(), Some("emotional_regulation"));
    }

    #[test]
    fn at_directive_06_threshold_intensity_does_not_trigger_regulation() {
        let out = runtime().interventions(&reading(EmotionLabel::Fear, 0.7), &[]);
        assert!(out.is_empty());
    }

    #[test]
    fn at_directive_07_dissociation_indicator_adds_grounding() {
        let out = runtime().interventions(
            &reading(EmotionLabel::Neutral, 0.1),
            &[indicator(TraumaKind::Dissociation)],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, InterventionKind::Grounding);
        assert_eq!(out[0].priority, InterventionPriority::High);
        assert_eq!(out[0].estimated_duration_min, 5);
    }

    #[test]
    fn at_directive_08_depression_gets_validation_and_mood_elevation() {
        let out = runtime().interventions(&reading(EmotionLabel::Depression, 0.4), &[]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, InterventionKind::Validation);
        assert_eq!(out[1].protocol_ref.as_deref(), Some("mood_elevation"));
    }
}
