#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use attune_contracts::affect::EmotionLabel;
use attune_contracts::fusion::FusedReading;
use attune_contracts::modality::{BehavioralSignal, BodyPosture, VisualSignal, VoiceSignal};
use attune_contracts::{ContractViolation, UnitScore, Validate};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuseConfig {
    pub voice_weight: f32,
    pub visual_weight: f32,
    pub behavioral_weight: f32,
    /// Compensates for modality weights summing to <= 1.0 so intensity can
    /// reach its ceiling.
    pub intensity_boost: f32,
    pub stress_overlay: f32,
    pub micro_expression_overlay: f32,
    pub guarded_posture_overlay: f32,
    pub withdrawal_overlay: f32,
    pub avoidance_overlay: f32,
    pub low_engagement_threshold: f32,
}

impl FuseConfig {
    pub fn mvp_v1() -> Self {
        Self {
            voice_weight: 0.40,
            visual_weight: 0.35,
            behavioral_weight: 0.25,
            intensity_boost: 1.5,
            stress_overlay: 0.5,
            micro_expression_overlay: 0.3,
            guarded_posture_overlay: 0.4,
            withdrawal_overlay: 0.6,
            avoidance_overlay: 0.5,
            low_engagement_threshold: 0.3,
        }
    }
}

impl Validate for FuseConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        for (field, value) in [
            ("fuse_config.voice_weight", self.voice_weight),
            ("fuse_config.visual_weight", self.visual_weight),
            ("fuse_config.behavioral_weight", self.behavioral_weight),
        ] {
            if !value.is_finite() {
                return Err(ContractViolation::NotFinite { field });
            }
            if !(0.0..=1.0).contains(&value) || value == 0.0 {
                return Err(ContractViolation::InvalidRange {
                    field,
                    min: 0.0,
                    max: 1.0,
                    got: value as f64,
                });
            }
        }
        let sum = self.voice_weight + self.visual_weight + self.behavioral_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ContractViolation::InvalidValue {
                field: "fuse_config",
                reason: "modality weights must sum to 1.0",
            });
        }
        if !self.intensity_boost.is_finite() || self.intensity_boost < 1.0 {
            return Err(ContractViolation::InvalidValue {
                field: "fuse_config.intensity_boost",
                reason: "must be finite and >= 1.0",
            });
        }
        for (field, value) in [
            ("fuse_config.stress_overlay", self.stress_overlay),
            (
                "fuse_config.micro_expression_overlay",
                self.micro_expression_overlay,
            ),
            (
                "fuse_config.guarded_posture_overlay",
                self.guarded_posture_overlay,
            ),
            ("fuse_config.withdrawal_overlay", self.withdrawal_overlay),
            ("fuse_config.avoidance_overlay", self.avoidance_overlay),
            (
                "fuse_config.low_engagement_threshold",
                self.low_engagement_threshold,
            ),
        ] {
            if !value.is_finite() {
                return Err(ContractViolation::NotFinite { field });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(ContractViolation::InvalidRange {
                    field,
                    min: 0.0,
                    max: 1.0,
                    got: value as f64,
                });
            }
        }
        Ok(())
    }
}

/// Weighted multi-modality fusion scorer. Pure: no history access, no
/// wall-clock reads.
#[derive(Debug, Clone)]
pub struct FuseRuntime {
    config: FuseConfig,
}

impl FuseRuntime {
    pub fn new(config: FuseConfig) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fuses whatever subset of modality snapshots the caller has. Zero
    /// supplied modalities is not an error: it degrades to a Neutral,
    /// zero-confidence reading.
    pub fn fuse(
        &self,
        voice: Option<&VoiceSignal>,
        visual: Option<&VisualSignal>,
        behavioral: Option<&BehavioralSignal>,
    ) -> Result<FusedReading, ContractViolation> {
        let mut scores: BTreeMap<EmotionLabel, f32> = BTreeMap::new();

        if let Some(voice) = voice {
            add_score(
                &mut scores,
                voice.emotion_from_speech,
                self.config.voice_weight,
            );
            if !voice.stress_indicators.is_empty() {
                add_score(
                    &mut scores,
                    EmotionLabel::Anxiety,
                    self.config.voice_weight * self.config.stress_overlay,
                );
            }
        }

        if let Some(visual) = visual {
            add_score(
                &mut scores,
                visual.facial_expression,
                self.config.visual_weight,
            );
            for micro in &visual.micro_expressions {
                add_score(
                    &mut scores,
                    *micro,
                    self.config.visual_weight * self.config.micro_expression_overlay,
                );
            }
            if matches!(
                visual.body_posture,
                BodyPosture::Defensive | BodyPosture::Closed
            ) {
                add_score(
                    &mut scores,
                    EmotionLabel::Anxiety,
                    self.config.visual_weight * self.config.guarded_posture_overlay,
                );
            }
        }

        if let Some(behavioral) = behavioral {
            if behavioral.engagement_level.value() < self.config.low_engagement_threshold {
                add_score(
                    &mut scores,
                    EmotionLabel::Depression,
                    self.config.behavioral_weight * self.config.withdrawal_overlay,
                );
            }
            if !behavioral.avoidance_behaviors.is_empty() {
                add_score(
                    &mut scores,
                    EmotionLabel::Anxiety,
                    self.config.behavioral_weight * self.config.avoidance_overlay,
                );
            }
        }

        // BTreeMap iteration is canonical-rank ascending; the stable sort
        // keeps that order as the explicit tie-break between equal scores.
        let mut ranked: Vec<(EmotionLabel, f32)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let Some((primary, top_score)) = ranked.first().copied() else {
            // No modality supplied at all: degraded reading, not an error.
            return FusedReading::v1(
                EmotionLabel::Neutral,
                Vec::new(),
                UnitScore(0.0),
                UnitScore(0.0),
            );
        };

        let secondary: Vec<EmotionLabel> =
            ranked.iter().skip(1).take(2).map(|(label, _)| *label).collect();

        let intensity = UnitScore::clamped(top_score * self.config.intensity_boost);
        let confidence = if ranked.len() > 1 {
            UnitScore::clamped((top_score - ranked[1].1) / top_score)
        } else {
            // A single unambiguous reading.
            UnitScore(1.0)
        };

        FusedReading::v1(primary, secondary, intensity, confidence)
    }
}

fn add_score(scores: &mut BTreeMap<EmotionLabel, f32>, label: EmotionLabel, weight: f32) {
    *scores.entry(label).or_insert(0.0) += weight;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> FuseRuntime {
        FuseRuntime::new(FuseConfig::mvp_v1()).unwrap()
    }

    fn anxious_voice() -> VoiceSignal {
        let mut voice = VoiceSignal::neutral();
        voice.emotion_from_speech = EmotionLabel::Anxiety;
        voice.stress_indicators = vec!["tremor".to_string()];
        voice
    }

    #[test]
    fn at_fuse_01_single_voice_source_is_fully_confident() {
        let out = runtime().fuse(Some(&anxious_voice()), None, None).unwrap();
        assert_eq!(out.primary, EmotionLabel::Anxiety);
        assert!(out.secondary.is_empty());
        assert_eq!(out.confidence.value(), 1.0);
        // 0.40 speech + 0.40 * 0.5 stress overlay, boosted by 1.5.
        assert!((out.intensity.value() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn at_fuse_02_no_modalities_degrades_to_neutral() {
        let out = runtime().fuse(None, None, None).unwrap();
        assert_eq!(out.primary, EmotionLabel::Neutral);
        assert!(out.secondary.is_empty());
        assert_eq!(out.intensity.value(), 0.0);
        assert_eq!(out.confidence.value(), 0.0);
    }

    #[test]
    fn at_fuse_03_voice_outweighs_visual_on_disagreement() {
        let mut voice = VoiceSignal::neutral();
        voice.emotion_from_speech = EmotionLabel::Sadness;
        let mut visual = VisualSignal::neutral();
        visual.facial_expression = EmotionLabel::Joy;

        let out = runtime().fuse(Some(&voice), Some(&visual), None).unwrap();
        assert_eq!(out.primary, EmotionLabel::Sadness);
        assert_eq!(out.secondary, vec![EmotionLabel::Joy]);
        // (0.40 - 0.35) / 0.40
        assert!((out.confidence.value() - 0.125).abs() < 1e-6);
    }

    #[test]
    fn at_fuse_04_equal_scores_break_ties_by_canonical_rank() {
        // Equal-weight voice and visual channels disagreeing produce an
        // exact score tie.
        let mut config = FuseConfig::mvp_v1();
        config.voice_weight = 0.4;
        config.visual_weight = 0.4;
        config.behavioral_weight = 0.2;
        let runtime = FuseRuntime::new(config).unwrap();

        let mut voice = VoiceSignal::neutral();
        voice.emotion_from_speech = EmotionLabel::Sadness;
        let mut visual = VisualSignal::neutral();
        visual.facial_expression = EmotionLabel::Joy;

        let out = runtime.fuse(Some(&voice), Some(&visual), None).unwrap();
        // Joy precedes Sadness in canonical rank, and a perfect tie carries
        // zero confidence.
        assert_eq!(out.primary, EmotionLabel::Joy);
        assert_eq!(out.secondary, vec![EmotionLabel::Sadness]);
        assert_eq!(out.confidence.value(), 0.0);
    }

    #[test]
    fn at_fuse_05_behavioral_withdrawal_scores_depression() {
        let mut behavioral = BehavioralSignal::neutral();
        behavioral.engagement_level = UnitScore(0.2);
        behavioral.avoidance_behaviors = vec!["topic change".to_string()];

        let out = runtime().fuse(None, None, Some(&behavioral)).unwrap();
        // Depression 0.25*0.6 = 0.15 beats Anxiety 0.25*0.5 = 0.125.
        assert_eq!(out.primary, EmotionLabel::Depression);
        assert_eq!(out.secondary, vec![EmotionLabel::Anxiety]);
    }

    #[test]
    fn at_fuse_06_micro_expressions_and_guarded_posture_accumulate() {
        let mut visual = VisualSignal::neutral();
        visual.facial_expression = EmotionLabel::Neutral;
        visual.micro_expressions = vec![EmotionLabel::Fear, EmotionLabel::Fear];
        visual.body_posture = BodyPosture::Defensive;

        let out = runtime().fuse(None, Some(&visual), None).unwrap();
        assert_eq!(out.primary, EmotionLabel::Neutral);
        // Fear 2 * 0.35*0.3 = 0.21, Anxiety 0.35*0.4 = 0.14.
        assert_eq!(
            out.secondary,
            vec![EmotionLabel::Fear, EmotionLabel::Anxiety]
        );
    }

    #[test]
    fn at_fuse_07_weight_closure_is_enforced() {
        assert!(FuseConfig::mvp_v1().validate().is_ok());
        let mut config = FuseConfig::mvp_v1();
        config.voice_weight = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ContractViolation::InvalidValue {
                field: "fuse_config",
                ..
            })
        ));
        assert!(FuseRuntime::new(config).is_err());
    }

    #[test]
    fn at_fuse_08_intensity_is_capped_at_one() {
        let mut visual = VisualSignal::neutral();
        visual.facial_expression = EmotionLabel::Anxiety;
        visual.body_posture = BodyPosture::Closed;
        let mut behavioral = BehavioralSignal::neutral();
        behavioral.avoidance_behaviors = vec!["withdrawal".to_string()];

        let out = runtime()
            .fuse(Some(&anxious_voice()), Some(&visual), Some(&behavioral))
            .unwrap();
        assert_eq!(out.primary, EmotionLabel::Anxiety);
        assert_eq!(out.intensity.value(), 1.0);
    }
}
