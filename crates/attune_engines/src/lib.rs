#![forbid(unsafe_code)]

pub mod directive;
pub mod fuse;
pub mod phase;
pub mod stability;
pub mod trauma;
