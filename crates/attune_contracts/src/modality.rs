#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::affect::EmotionLabel;
use crate::{ContractViolation, SchemaVersion, UnitScore, Validate};

pub const MODALITY_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const MAX_PAUSE_PATTERNS: usize = 32;
pub const MAX_MICRO_EXPRESSIONS: usize = 8;
pub const MAX_BEHAVIOR_TAGS: usize = 16;

fn validate_tag_list(
    field: &'static str,
    tags: &[String],
    max: usize,
) -> Result<(), ContractViolation> {
    if tags.len() > max {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "exceeds max tag count",
        });
    }
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field,
                reason: "tags must not be empty",
            });
        }
        if tag.len() > 64 {
            return Err(ContractViolation::InvalidValue {
                field,
                reason: "tags must be <= 64 chars",
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPosture {
    Open,
    Closed,
    Defensive,
    Collapsed,
}

/// Per-sample voice prosody snapshot supplied by the upstream voice analyzer.
/// Adapters that cannot measure a field supply the neutral default rather
/// than omitting the whole modality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSignal {
    pub schema_version: SchemaVersion,
    pub pitch: UnitScore,
    pub volume: UnitScore,
    pub speed: UnitScore,
    pub tremor: UnitScore,
    pub breathing_rate: UnitScore,
    pub pause_patterns_s: Vec<f32>,
    pub emotion_from_speech: EmotionLabel,
    pub stress_indicators: Vec<String>,
}

impl VoiceSignal {
    pub fn neutral() -> Self {
        Self {
            schema_version: MODALITY_CONTRACT_VERSION,
            pitch: UnitScore(0.5),
            volume: UnitScore(0.5),
            speed: UnitScore(0.5),
            tremor: UnitScore(0.0),
            breathing_rate: UnitScore(0.5),
            pause_patterns_s: Vec::new(),
            emotion_from_speech: EmotionLabel::Neutral,
            stress_indicators: Vec::new(),
        }
    }
}

impl Validate for VoiceSignal {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != MODALITY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "voice_signal.schema_version",
                reason: "must match MODALITY_CONTRACT_VERSION",
            });
        }
        self.pitch.validate()?;
        self.volume.validate()?;
        self.speed.validate()?;
        self.tremor.validate()?;
        self.breathing_rate.validate()?;
        if self.pause_patterns_s.len() > MAX_PAUSE_PATTERNS {
            return Err(ContractViolation::InvalidValue {
                field: "voice_signal.pause_patterns_s",
                reason: "exceeds max pause count",
            });
        }
        for pause in &self.pause_patterns_s {
            if !pause.is_finite() {
                return Err(ContractViolation::NotFinite {
                    field: "voice_signal.pause_patterns_s",
                });
            }
            if *pause < 0.0 {
                return Err(ContractViolation::InvalidValue {
                    field: "voice_signal.pause_patterns_s",
                    reason: "pause lengths must be >= 0",
                });
            }
        }
        validate_tag_list(
            "voice_signal.stress_indicators",
            &self.stress_indicators,
            MAX_BEHAVIOR_TAGS,
        )?;
        Ok(())
    }
}

/// Per-sample visual/behavioral-cue snapshot from the vision analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSignal {
    pub schema_version: SchemaVersion,
    pub facial_expression: EmotionLabel,
    pub micro_expressions: Vec<EmotionLabel>,
    pub eye_contact_level: UnitScore,
    pub body_posture: BodyPosture,
    pub movement_energy: UnitScore,
    pub fidgeting_level: UnitScore,
    pub muscular_tension: UnitScore,
}

impl VisualSignal {
    pub fn neutral() -> Self {
        Self {
            schema_version: MODALITY_CONTRACT_VERSION,
            facial_expression: EmotionLabel::Neutral,
            micro_expressions: Vec::new(),
            eye_contact_level: UnitScore(0.5),
            body_posture: BodyPosture::Open,
            movement_energy: UnitScore(0.5),
            fidgeting_level: UnitScore(0.0),
            muscular_tension: UnitScore(0.5),
        }
    }
}

impl Validate for VisualSignal {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != MODALITY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "visual_signal.schema_version",
                reason: "must match MODALITY_CONTRACT_VERSION",
            });
        }
        if self.micro_expressions.len() > MAX_MICRO_EXPRESSIONS {
            return Err(ContractViolation::InvalidValue {
                field: "visual_signal.micro_expressions",
                reason: "exceeds max micro-expression count",
            });
        }
        self.eye_contact_level.validate()?;
        self.movement_energy.validate()?;
        self.fidgeting_level.validate()?;
        self.muscular_tension.validate()?;
        Ok(())
    }
}

/// Per-sample interaction-behavior snapshot. The behavioral channel carries
/// no classified emotion label; it contributes to fusion only through its
/// engagement and avoidance readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSignal {
    pub schema_version: SchemaVersion,
    pub engagement_level: UnitScore,
    pub responsiveness: UnitScore,
    pub social_connection: UnitScore,
    pub coping_strategies: Vec<String>,
    pub avoidance_behaviors: Vec<String>,
    pub help_seeking_behaviors: Vec<String>,
}

impl BehavioralSignal {
    pub fn neutral() -> Self {
        Self {
            schema_version: MODALITY_CONTRACT_VERSION,
            engagement_level: UnitScore(0.5),
            responsiveness: UnitScore(0.5),
            social_connection: UnitScore(0.5),
            coping_strategies: Vec::new(),
            avoidance_behaviors: Vec::new(),
            help_seeking_behaviors: Vec::new(),
        }
    }
}

impl Validate for BehavioralSignal {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != MODALITY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "behavioral_signal.schema_version",
                reason: "must match MODALITY_CONTRACT_VERSION",
            });
        }
        self.engagement_level.validate()?;
        self.responsiveness.validate()?;
        self.social_connection.validate()?;
        validate_tag_list(
            "behavioral_signal.coping_strategies",
            &self.coping_strategies,
            MAX_BEHAVIOR_TAGS,
        )?;
        validate_tag_list(
            "behavioral_signal.avoidance_behaviors",
            &self.avoidance_behaviors,
            MAX_BEHAVIOR_TAGS,
        )?;
        validate_tag_list(
            "behavioral_signal.help_seeking_behaviors",
            &self.help_seeking_behaviors,
            MAX_BEHAVIOR_TAGS,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_modality_01_neutral_snapshots_validate() {
        assert!(VoiceSignal::neutral().validate().is_ok());
        assert!(VisualSignal::neutral().validate().is_ok());
        assert!(BehavioralSignal::neutral().validate().is_ok());
    }

    #[test]
    fn at_modality_02_negative_pause_is_rejected() {
        let mut voice = VoiceSignal::neutral();
        voice.pause_patterns_s = vec![2.0, -1.0];
        assert!(matches!(
            voice.validate(),
            Err(ContractViolation::InvalidValue {
                field: "voice_signal.pause_patterns_s",
                ..
            })
        ));
    }

    #[test]
    fn at_modality_03_empty_behavior_tag_is_rejected() {
        let mut behavioral = BehavioralSignal::neutral();
        behavioral.avoidance_behaviors = vec!["topic change".to_string(), "  ".to_string()];
        assert!(matches!(
            behavioral.validate(),
            Err(ContractViolation::InvalidValue {
                field: "behavioral_signal.avoidance_behaviors",
                ..
            })
        ));
    }
}
