#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{ContractViolation, SchemaVersion, UnitScore, Validate};

pub const TRAUMA_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

pub const MAX_OBSERVED_BEHAVIORS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraumaKind {
    Flashback,
    Trigger,
    Dissociation,
    Hyperarousal,
    Avoidance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraumaSeverity {
    Mild,
    Moderate,
    Severe,
}

/// One heuristically detected risk pattern. Indicators are immutable after
/// construction. The detector may emit several indicators of the same kind
/// at different severities in one cycle; consumers must tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraumaIndicator {
    pub schema_version: SchemaVersion,
    pub kind: TraumaKind,
    pub severity: TraumaSeverity,
    pub confidence: UnitScore,
    pub observed_behaviors: Vec<String>,
    pub recommended_response: String,
}

impl TraumaIndicator {
    pub fn v1(
        kind: TraumaKind,
        severity: TraumaSeverity,
        confidence: UnitScore,
        observed_behaviors: Vec<String>,
        recommended_response: String,
    ) -> Result<Self, ContractViolation> {
        let v = Self {
            schema_version: TRAUMA_CONTRACT_VERSION,
            kind,
            severity,
            confidence,
            observed_behaviors,
            recommended_response,
        };
        v.validate()?;
        Ok(v)
    }
}

impl Validate for TraumaIndicator {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != TRAUMA_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "trauma_indicator.schema_version",
                reason: "must match TRAUMA_CONTRACT_VERSION",
            });
        }
        self.confidence.validate()?;
        if self.observed_behaviors.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "trauma_indicator.observed_behaviors",
                reason: "must name at least one observed behavior",
            });
        }
        if self.observed_behaviors.len() > MAX_OBSERVED_BEHAVIORS {
            return Err(ContractViolation::InvalidValue {
                field: "trauma_indicator.observed_behaviors",
                reason: "exceeds max observed behavior count",
            });
        }
        if self.recommended_response.trim().is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "trauma_indicator.recommended_response",
                reason: "must not be empty",
            });
        }
        if self.recommended_response.len() > 256 {
            return Err(ContractViolation::InvalidValue {
                field: "trauma_indicator.recommended_response",
                reason: "must be <= 256 chars",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_trauma_contract_01_indicator_requires_observed_behaviors() {
        let out = TraumaIndicator::v1(
            TraumaKind::Avoidance,
            TraumaSeverity::Mild,
            UnitScore(0.7),
            Vec::new(),
            "Respect boundaries".to_string(),
        );
        assert!(matches!(
            out,
            Err(ContractViolation::InvalidValue {
                field: "trauma_indicator.observed_behaviors",
                ..
            })
        ));
    }

    #[test]
    fn at_trauma_contract_02_severity_ordering_is_total() {
        assert!(TraumaSeverity::Mild < TraumaSeverity::Moderate);
        assert!(TraumaSeverity::Moderate < TraumaSeverity::Severe);
    }
}
