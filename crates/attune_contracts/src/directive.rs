#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{ContractViolation, SchemaVersion, UnitScore, Validate};

pub const DIRECTIVE_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneAspect {
    Volume,
    Pitch,
    Speed,
    Warmth,
    Formality,
    Energy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneDirection {
    Increase,
    Decrease,
    Maintain,
}

/// A delivery-change directive. The adjustment list is append-only and is
/// not deduplicated per aspect; a consumer that applies one value per aspect
/// takes the last-appended entry for that aspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneAdjustment {
    pub schema_version: SchemaVersion,
    pub aspect: ToneAspect,
    pub direction: ToneDirection,
    pub magnitude: UnitScore,
    pub reason: String,
}

impl ToneAdjustment {
    pub fn v1(
        aspect: ToneAspect,
        direction: ToneDirection,
        magnitude: UnitScore,
        reason: String,
    ) -> Result<Self, ContractViolation> {
        let v = Self {
            schema_version: DIRECTIVE_CONTRACT_VERSION,
            aspect,
            direction,
            magnitude,
            reason,
        };
        v.validate()?;
        Ok(v)
    }
}

impl Validate for ToneAdjustment {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != DIRECTIVE_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "tone_adjustment.schema_version",
                reason: "must match DIRECTIVE_CONTRACT_VERSION",
            });
        }
        self.magnitude.validate()?;
        if self.reason.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "tone_adjustment.reason",
                reason: "must not be empty",
            });
        }
        if self.reason.len() > 128 {
            return Err(ContractViolation::InvalidValue {
                field: "tone_adjustment.reason",
                reason: "must be <= 128 chars",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterventionKind {
    Grounding,
    Validation,
    Distraction,
    Breathing,
    MusicTherapy,
    CrisisProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InterventionPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalIntervention {
    pub schema_version: SchemaVersion,
    pub kind: InterventionKind,
    pub priority: InterventionPriority,
    pub description: String,
    pub estimated_duration_min: u16,
    pub protocol_ref: Option<String>,
}

impl EmotionalIntervention {
    pub fn v1(
        kind: InterventionKind,
        priority: InterventionPriority,
        description: String,
        estimated_duration_min: u16,
        protocol_ref: Option<String>,
    ) -> Result<Self, ContractViolation> {
        let v = Self {
            schema_version: DIRECTIVE_CONTRACT_VERSION,
            kind,
            priority,
            description,
            estimated_duration_min,
            protocol_ref,
        };
        v.validate()?;
        Ok(v)
    }
}

impl Validate for EmotionalIntervention {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != DIRECTIVE_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "emotional_intervention.schema_version",
                reason: "must match DIRECTIVE_CONTRACT_VERSION",
            });
        }
        if self.description.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "emotional_intervention.description",
                reason: "must not be empty",
            });
        }
        if self.description.len() > 256 {
            return Err(ContractViolation::InvalidValue {
                field: "emotional_intervention.description",
                reason: "must be <= 256 chars",
            });
        }
        if self.estimated_duration_min == 0 || self.estimated_duration_min > 120 {
            return Err(ContractViolation::InvalidValue {
                field: "emotional_intervention.estimated_duration_min",
                reason: "must be 1..=120 minutes",
            });
        }
        if let Some(protocol) = &self.protocol_ref {
            if protocol.trim().is_empty() {
                return Err(ContractViolation::InvalidValue {
                    field: "emotional_intervention.protocol_ref",
                    reason: "must not be empty when provided",
                });
            }
            if protocol.len() > 64 {
                return Err(ContractViolation::InvalidValue {
                    field: "emotional_intervention.protocol_ref",
                    reason: "must be <= 64 chars",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_directive_contract_01_adjustment_requires_reason() {
        let out = ToneAdjustment::v1(
            ToneAspect::Speed,
            ToneDirection::Decrease,
            UnitScore(0.6),
            "  ".to_string(),
        );
        assert!(matches!(
            out,
            Err(ContractViolation::InvalidValue {
                field: "tone_adjustment.reason",
                ..
            })
        ));
    }

    #[test]
    fn at_directive_contract_02_intervention_duration_is_bounded() {
        let out = EmotionalIntervention::v1(
            InterventionKind::Breathing,
            InterventionPriority::High,
            "Guided breathing".to_string(),
            0,
            None,
        );
        assert!(matches!(
            out,
            Err(ContractViolation::InvalidValue {
                field: "emotional_intervention.estimated_duration_min",
                ..
            })
        ));
    }
}
