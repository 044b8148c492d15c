#![forbid(unsafe_code)]

pub mod affect;
pub mod common;
pub mod directive;
pub mod fusion;
pub mod modality;
pub mod trauma;

pub use common::{
    ContractViolation, MonotonicTimeNs, ReasonCodeId, SchemaVersion, UnitScore, Validate,
};
