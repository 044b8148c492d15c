#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::affect::{EmotionLabel, SessionPhase, Trend};
use crate::directive::{EmotionalIntervention, ToneAdjustment};
use crate::modality::{BehavioralSignal, VisualSignal, VoiceSignal};
use crate::trauma::TraumaIndicator;
use crate::{ContractViolation, MonotonicTimeNs, SchemaVersion, UnitScore, Validate};

pub const FUSION_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const MAX_SECONDARY_EMOTIONS: usize = 2;
pub const MAX_TRAUMA_INDICATORS: usize = 8;
pub const MAX_TONE_ADJUSTMENTS: usize = 16;
pub const MAX_INTERVENTIONS: usize = 8;

/// The fusion scorer's raw verdict for one sample tick, before stability,
/// phase, and directive enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedReading {
    pub schema_version: SchemaVersion,
    pub primary: EmotionLabel,
    pub secondary: Vec<EmotionLabel>,
    pub intensity: UnitScore,
    pub confidence: UnitScore,
}

impl FusedReading {
    pub fn v1(
        primary: EmotionLabel,
        secondary: Vec<EmotionLabel>,
        intensity: UnitScore,
        confidence: UnitScore,
    ) -> Result<Self, ContractViolation> {
        let v = Self {
            schema_version: FUSION_CONTRACT_VERSION,
            primary,
            secondary,
            intensity,
            confidence,
        };
        v.validate()?;
        Ok(v)
    }
}

impl Validate for FusedReading {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != FUSION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "fused_reading.schema_version",
                reason: "must match FUSION_CONTRACT_VERSION",
            });
        }
        if self.secondary.len() > MAX_SECONDARY_EMOTIONS {
            return Err(ContractViolation::InvalidValue {
                field: "fused_reading.secondary",
                reason: "must include <= 2 secondary emotions",
            });
        }
        if self.secondary.contains(&self.primary) {
            return Err(ContractViolation::InvalidValue {
                field: "fused_reading.secondary",
                reason: "must not include the primary emotion",
            });
        }
        for (idx, label) in self.secondary.iter().enumerate() {
            if self.secondary[..idx].contains(label) {
                return Err(ContractViolation::InvalidValue {
                    field: "fused_reading.secondary",
                    reason: "must not contain duplicates",
                });
            }
        }
        self.intensity.validate()?;
        self.confidence.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReading {
    pub schema_version: SchemaVersion,
    pub stability: UnitScore,
    pub trend: Trend,
    pub rapid_changes: bool,
}

impl StabilityReading {
    pub fn v1(stability: UnitScore, trend: Trend, rapid_changes: bool) -> Self {
        Self {
            schema_version: FUSION_CONTRACT_VERSION,
            stability,
            trend,
            rapid_changes,
        }
    }
}

impl Validate for StabilityReading {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != FUSION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "stability_reading.schema_version",
                reason: "must match FUSION_CONTRACT_VERSION",
            });
        }
        self.stability.validate()?;
        Ok(())
    }
}

/// The fused emotional state for one sample tick. Embeds copies of the
/// modality snapshots (neutral defaults substituted for absent channels)
/// so downstream consumers never need the raw inputs again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionState {
    pub schema_version: SchemaVersion,
    pub primary: EmotionLabel,
    pub secondary: Vec<EmotionLabel>,
    pub intensity: UnitScore,
    pub confidence: UnitScore,
    pub stability: UnitScore,
    pub trend: Trend,
    pub rapid_changes: bool,
    pub voice: VoiceSignal,
    pub visual: VisualSignal,
    pub behavioral: BehavioralSignal,
    pub session_phase: SessionPhase,
    pub trauma_indicators: Vec<TraumaIndicator>,
    pub tone_adjustments: Vec<ToneAdjustment>,
    pub interventions: Vec<EmotionalIntervention>,
    pub timestamp: MonotonicTimeNs,
}

impl EmotionState {
    #[allow(clippy::too_many_arguments)]
    pub fn v1(
        fused: FusedReading,
        stability: StabilityReading,
        voice: VoiceSignal,
        visual: VisualSignal,
        behavioral: BehavioralSignal,
        session_phase: SessionPhase,
        trauma_indicators: Vec<TraumaIndicator>,
        tone_adjustments: Vec<ToneAdjustment>,
        interventions: Vec<EmotionalIntervention>,
        timestamp: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        let v = Self {
            schema_version: FUSION_CONTRACT_VERSION,
            primary: fused.primary,
            secondary: fused.secondary,
            intensity: fused.intensity,
            confidence: fused.confidence,
            stability: stability.stability,
            trend: stability.trend,
            rapid_changes: stability.rapid_changes,
            voice,
            visual,
            behavioral,
            session_phase,
            trauma_indicators,
            tone_adjustments,
            interventions,
            timestamp,
        };
        v.validate()?;
        Ok(v)
    }
}

impl Validate for EmotionState {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != FUSION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "emotion_state.schema_version",
                reason: "must match FUSION_CONTRACT_VERSION",
            });
        }
        if self.secondary.len() > MAX_SECONDARY_EMOTIONS {
            return Err(ContractViolation::InvalidValue {
                field: "emotion_state.secondary",
                reason: "must include <= 2 secondary emotions",
            });
        }
        if self.secondary.contains(&self.primary) {
            return Err(ContractViolation::InvalidValue {
                field: "emotion_state.secondary",
                reason: "must not include the primary emotion",
            });
        }
        self.intensity.validate()?;
        self.confidence.validate()?;
        self.stability.validate()?;
        self.voice.validate()?;
        self.visual.validate()?;
        self.behavioral.validate()?;
        if self.trauma_indicators.len() > MAX_TRAUMA_INDICATORS {
            return Err(ContractViolation::InvalidValue {
                field: "emotion_state.trauma_indicators",
                reason: "exceeds max indicator count",
            });
        }
        for indicator in &self.trauma_indicators {
            indicator.validate()?;
        }
        if self.tone_adjustments.len() > MAX_TONE_ADJUSTMENTS {
            return Err(ContractViolation::InvalidValue {
                field: "emotion_state.tone_adjustments",
                reason: "exceeds max adjustment count",
            });
        }
        for adjustment in &self.tone_adjustments {
            adjustment.validate()?;
        }
        if self.interventions.len() > MAX_INTERVENTIONS {
            return Err(ContractViolation::InvalidValue {
                field: "emotion_state.interventions",
                reason: "exceeds max intervention count",
            });
        }
        for intervention in &self.interventions {
            intervention.validate()?;
        }
        if self.timestamp.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "emotion_state.timestamp",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}
