#![forbid(unsafe_code)]

pub mod engine;

pub use engine::{EmotionEngine, EmotionEventSink, EngineConfig, EngineRefusal, TraumaDetect};
