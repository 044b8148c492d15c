#![forbid(unsafe_code)]

use attune_contracts::affect::SessionPhase;
use attune_contracts::{ContractViolation, MonotonicTimeNs, Validate};
use serde::{Deserialize, Serialize};

const NS_PER_MINUTE: u64 = 60_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub initial_end_min: u64,
    pub rapport_end_min: u64,
    pub work_end_min: u64,
    pub integration_end_min: u64,
}

impl PhaseConfig {
    pub fn mvp_v1() -> Self {
        Self {
            initial_end_min: 5,
            rapport_end_min: 15,
            work_end_min: 40,
            integration_end_min: 50,
        }
    }
}

impl Validate for PhaseConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.initial_end_min == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "phase_config.initial_end_min",
                reason: "must be > 0",
            });
        }
        if self.initial_end_min >= self.rapport_end_min
            || self.rapport_end_min >= self.work_end_min
            || self.work_end_min >= self.integration_end_min
        {
            return Err(ContractViolation::InvalidValue {
                field: "phase_config",
                reason: "phase boundaries must be strictly increasing",
            });
        }
        Ok(())
    }
}

/// Time-elapsed session phase classifier. Pure and monotonic in elapsed
/// time; a session hovering at a boundary may flicker between adjacent
/// phases across consecutive ticks, which is accepted behavior.
#[derive(Debug, Clone)]
pub struct PhaseRuntime {
    config: PhaseConfig,
}

impl PhaseRuntime {
    pub fn new(config: PhaseConfig) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn classify(&self, started_at: MonotonicTimeNs, now: MonotonicTimeNs) -> SessionPhase {
        let elapsed_min = now.0.saturating_sub(started_at.0) / NS_PER_MINUTE;
        if elapsed_min < self.config.initial_end_min {
            SessionPhase::Initial
        } else if elapsed_min < self.config.rapport_end_min {
            SessionPhase::BuildingRapport
        } else if elapsed_min < self.config.work_end_min {
            SessionPhase::TherapeuticWork
        } else if elapsed_min < self.config.integration_end_min {
            SessionPhase::Integration
        } else {
            SessionPhase::Closure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> PhaseRuntime {
        PhaseRuntime::new(PhaseConfig::mvp_v1()).unwrap()
    }

    fn at_minute(m: u64) -> MonotonicTimeNs {
        MonotonicTimeNs(1 + m * NS_PER_MINUTE)
    }

    #[test]
    fn at_phase_01_boundaries_partition_the_session() {
        let start = MonotonicTimeNs(1);
        let runtime = runtime();
        assert_eq!(runtime.classify(start, at_minute(0)), SessionPhase::Initial);
        assert_eq!(runtime.classify(start, at_minute(4)), SessionPhase::Initial);
        assert_eq!(
            runtime.classify(start, at_minute(5)),
            SessionPhase::BuildingRapport
        );
        assert_eq!(
            runtime.classify(start, at_minute(14)),
            SessionPhase::BuildingRapport
        );
        assert_eq!(
            runtime.classify(start, at_minute(15)),
            SessionPhase::TherapeuticWork
        );
        assert_eq!(
            runtime.classify(start, at_minute(39)),
            SessionPhase::TherapeuticWork
        );
        assert_eq!(
            runtime.classify(start, at_minute(40)),
            SessionPhase::Integration
        );
        assert_eq!(
            runtime.classify(start, at_minute(50)),
            SessionPhase::Closure
        );
        assert_eq!(
            runtime.classify(start, at_minute(300)),
            SessionPhase::Closure
        );
    }

    #[test]
    fn at_phase_02_clock_behind_start_saturates_to_initial() {
        let out = runtime().classify(MonotonicTimeNs(500), MonotonicTimeNs(10));
        assert_eq!(out, SessionPhase::Initial);
    }

    #[test]
    fn at_phase_03_boundaries_must_be_strictly_increasing() {
        let mut config = PhaseConfig::mvp_v1();
        config.rapport_end_min = config.initial_end_min;
        assert!(PhaseRuntime::new(config).is_err());
    }
}
