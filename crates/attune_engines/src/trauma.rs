#![forbid(unsafe_code)]

use attune_contracts::modality::{BehavioralSignal, BodyPosture, VisualSignal, VoiceSignal};
use attune_contracts::trauma::{TraumaIndicator, TraumaKind, TraumaSeverity};
use attune_contracts::{ContractViolation, UnitScore, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraumaConfig {
    pub tremor_threshold: f32,
    pub long_pause_s: f32,
    pub low_eye_contact: f32,
    pub avoidance_tag_limit: usize,
    pub long_pause_confidence: f32,
    pub low_eye_contact_confidence: f32,
    pub collapsed_posture_confidence: f32,
    pub avoidance_pattern_confidence: f32,
}

impl TraumaConfig {
    pub fn mvp_v1() -> Self {
        Self {
            tremor_threshold: 0.7,
            long_pause_s: 5.0,
            low_eye_contact: 0.2,
            avoidance_tag_limit: 2,
            long_pause_confidence: 0.6,
            low_eye_contact_confidence: 0.7,
            collapsed_posture_confidence: 0.8,
            avoidance_pattern_confidence: 0.75,
        }
    }
}

impl Validate for TraumaConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        for (field, value) in [
            ("trauma_config.tremor_threshold", self.tremor_threshold),
            ("trauma_config.low_eye_contact", self.low_eye_contact),
            (
                "trauma_config.long_pause_confidence",
                self.long_pause_confidence,
            ),
            (
                "trauma_config.low_eye_contact_confidence",
                self.low_eye_contact_confidence,
            ),
            (
                "trauma_config.collapsed_posture_confidence",
                self.collapsed_posture_confidence,
            ),
            (
                "trauma_config.avoidance_pattern_confidence",
                self.avoidance_pattern_confidence,
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
        if !self.long_pause_s.is_finite() || self.long_pause_s <= 0.0 {
            return Err(ContractViolation::InvalidValue {
                field: "trauma_config.long_pause_s",
                reason: "must be finite and > 0",
            });
        }
        Ok(())
    }
}

/// Rule-based trauma indicator detector. Every rule is evaluated per
/// modality in isolation; rules of the same kind may co-fire and no
/// deduplication is performed. There is no cross-modality correlation in
/// this version.
#[derive(Debug, Clone)]
pub struct TraumaRuntime {
    config: TraumaConfig,
}

impl TraumaRuntime {
    pub fn new(config: TraumaConfig) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn detect(
        &self,
        voice: Option<&VoiceSignal>,
        visual: Option<&VisualSignal>,
        behavioral: Option<&BehavioralSignal>,
    ) -> Vec<TraumaIndicator> {
        let mut indicators = Vec::new();

        // A rule whose indicator fails contract validation is skipped so one
        // bad rule cannot abort the rest of the cycle.
        if let Some(voice) = voice {
            push_ok(&mut indicators, self.voice_tremor(voice));
            push_ok(&mut indicators, self.voice_long_pause(voice));
        }
        if let Some(visual) = visual {
            push_ok(&mut indicators, self.visual_eye_contact(visual));
            push_ok(&mut indicators, self.visual_collapsed_posture(visual));
        }
        if let Some(behavioral) = behavioral {
            push_ok(&mut indicators, self.behavioral_avoidance(behavioral));
        }

        indicators
    }

    fn voice_tremor(
        &self,
        voice: &VoiceSignal,
    ) -> Result<Option<TraumaIndicator>, ContractViolation> {
        if voice.tremor.value() <= self.config.tremor_threshold {
            return Ok(None);
        }
        TraumaIndicator::v1(
            TraumaKind::Hyperarousal,
            TraumaSeverity::Moderate,
            UnitScore::new(voice.tremor.value())?,
            vec!["voice tremor".to_string(), "increased pitch".to_string()],
            "Use calming, slower speech pace".to_string(),
        )
        .map(Some)
    }

    fn voice_long_pause(
        &self,
        voice: &VoiceSignal,
    ) -> Result<Option<TraumaIndicator>, ContractViolation> {
        if !voice
            .pause_patterns_s
            .iter()
            .any(|pause| *pause > self.config.long_pause_s)
        {
            return Ok(None);
        }
        TraumaIndicator::v1(
            TraumaKind::Dissociation,
            TraumaSeverity::Mild,
            UnitScore::new(self.config.long_pause_confidence)?,
            vec!["long pauses in speech".to_string()],
            "Gentle grounding techniques".to_string(),
        )
        .map(Some)
    }

    fn visual_eye_contact(
        &self,
        visual: &VisualSignal,
    ) -> Result<Option<TraumaIndicator>, ContractViolation> {
        if visual.eye_contact_level.value() >= self.config.low_eye_contact {
            return Ok(None);
        }
        TraumaIndicator::v1(
            TraumaKind::Avoidance,
            TraumaSeverity::Mild,
            UnitScore::new(self.config.low_eye_contact_confidence)?,
            vec!["avoiding eye contact".to_string()],
            "Respect boundaries, don't force eye contact".to_string(),
        )
        .map(Some)
    }

    fn visual_collapsed_posture(
        &self,
        visual: &VisualSignal,
    ) -> Result<Option<TraumaIndicator>, ContractViolation> {
        if visual.body_posture != BodyPosture::Collapsed {
            return Ok(None);
        }
        TraumaIndicator::v1(
            TraumaKind::Dissociation,
            TraumaSeverity::Moderate,
            UnitScore::new(self.config.collapsed_posture_confidence)?,
            vec!["collapsed posture".to_string(), "low energy".to_string()],
            "Check for dissociation, use grounding".to_string(),
        )
        .map(Some)
    }

    fn behavioral_avoidance(
        &self,
        behavioral: &BehavioralSignal,
    ) -> Result<Option<TraumaIndicator>, ContractViolation> {
        if behavioral.avoidance_behaviors.len() <= self.config.avoidance_tag_limit {
            return Ok(None);
        }
        TraumaIndicator::v1(
            TraumaKind::Avoidance,
            TraumaSeverity::Moderate,
            UnitScore::new(self.config.avoidance_pattern_confidence)?,
            behavioral.avoidance_behaviors.clone(),
            "Gentle exposure, respect boundaries".to_string(),
        )
        .map(Some)
    }
}

fn push_ok(
    indicators: &mut Vec<TraumaIndicator>,
    rule_output: Result<Option<TraumaIndicator>, ContractViolation>,
) {
    if let Ok(Some(indicator)) = rule_output {
        indicators.push(indicator);
    }
}
