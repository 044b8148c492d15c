#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use attune_contracts::directive::ToneAdjustment;
use attune_contracts::fusion::EmotionState;
use attune_contracts::modality::{BehavioralSignal, VisualSignal, VoiceSignal};
use attune_contracts::trauma::{TraumaIndicator, TraumaSeverity};
use attune_contracts::{ContractViolation, MonotonicTimeNs, ReasonCodeId, Validate};
use attune_engines::directive::{DirectiveConfig, DirectiveRuntime};
use attune_engines::fuse::{FuseConfig, FuseRuntime};
use attune_engines::phase::{PhaseConfig, PhaseRuntime};
use attune_engines::stability::{StabilityConfig, StabilityRuntime};
use attune_engines::trauma::{TraumaConfig, TraumaRuntime};
use serde::{Deserialize, Serialize};

pub mod reason_codes {
    use attune_contracts::ReasonCodeId;

    // ATTUNE.OS reason-code namespace.
    pub const ATTUNE_OS_FAIL_NOT_MONITORING: ReasonCodeId = ReasonCodeId(0x414F_00F1);
    pub const ATTUNE_OS_FAIL_SCHEMA_INVALID: ReasonCodeId = ReasonCodeId(0x414F_00F2);
    pub const ATTUNE_OS_FAIL_INTERNAL: ReasonCodeId = ReasonCodeId(0x414F_00F3);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineRefusal {
    pub reason_code: ReasonCodeId,
    pub message: String,
}

impl EngineRefusal {
    fn v1(reason_code: ReasonCodeId, message: &'static str) -> Self {
        Self {
            reason_code,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub fuse: FuseConfig,
    pub trauma: TraumaConfig,
    pub stability: StabilityConfig,
    pub phase: PhaseConfig,
    pub directive: DirectiveConfig,
    pub history_capacity: usize,
    pub history_trim_to: usize,
}

impl EngineConfig {
    pub fn mvp_v1() -> Self {
        Self {
            fuse: FuseConfig::mvp_v1(),
            trauma: TraumaConfig::mvp_v1(),
            stability: StabilityConfig::mvp_v1(),
            phase: PhaseConfig::mvp_v1(),
            directive: DirectiveConfig::mvp_v1(),
            history_capacity: 100,
            history_trim_to: 50,
        }
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.fuse.validate()?;
        self.trauma.validate()?;
        self.stability.validate()?;
        self.phase.validate()?;
        self.directive.validate()?;
        if self.history_trim_to == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "engine_config.history_trim_to",
                reason: "must be > 0",
            });
        }
        if self.history_trim_to >= self.history_capacity {
            return Err(ContractViolation::InvalidValue {
                field: "engine_config.history_trim_to",
                reason: "must be < history_capacity",
            });
        }
        Ok(())
    }
}

/// Seam for the trauma detector so callers can substitute rule sets; the
/// default is the production rule engine.
pub trait TraumaDetect {
    fn detect(
        &self,
        voice: Option<&VoiceSignal>,
        visual: Option<&VisualSignal>,
        behavioral: Option<&BehavioralSignal>,
    ) -> Vec<TraumaIndicator>;
}

impl TraumaDetect for TraumaRuntime {
    fn detect(
        &self,
        voice: Option<&VoiceSignal>,
        visual: Option<&VisualSignal>,
        behavioral: Option<&BehavioralSignal>,
    ) -> Vec<TraumaIndicator> {
        TraumaRuntime::detect(self, voice, visual, behavioral)
    }
}

/// Subscription surface for collaborators such as a UI layer. Every method
/// has a no-op default so sinks implement only the channels they care about.
pub trait EmotionEventSink {
    fn on_state_change(&mut self, _state: &EmotionState) {}
    fn on_tone_adjustments(&mut self, _adjustments: &[ToneAdjustment]) {}
    /// Fired at most once per cycle, carrying every severe indicator of
    /// that cycle.
    fn on_crisis(&mut self, _severe: &[TraumaIndicator]) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionContext {
    started_at: MonotonicTimeNs,
    preferences: BTreeMap<String, String>,
}

impl SessionContext {
    fn new(started_at: MonotonicTimeNs) -> Self {
        Self {
            started_at,
            preferences: BTreeMap::new(),
        }
    }
}

/// Per-session engine facade. One instance per session, driven by one
/// logical caller at a time; the facade holds no internal locking and
/// processes samples strictly in arrival order.
pub struct EmotionEngine<D: TraumaDetect = TraumaRuntime> {
    fuse: FuseRuntime,
    detector: D,
    stability: StabilityRuntime,
    phase: PhaseRuntime,
    directive: DirectiveRuntime,
    history_capacity: usize,
    history_trim_to: usize,
    session: Option<SessionContext>,
    history: Vec<EmotionState>,
    current: Option<EmotionState>,
    sinks: Vec<Box<dyn EmotionEventSink>>,
}

impl EmotionEngine<TraumaRuntime> {
    pub fn new(config: EngineConfig) -> Result<Self, ContractViolation> {
        let detector = TraumaRuntime::new(config.trauma)?;
        Self::with_detector(config, detector)
    }

    pub fn mvp_v1() -> Result<Self, ContractViolation> {
        Self::new(EngineConfig::mvp_v1())
    }
}

impl<D: TraumaDetect> EmotionEngine<D> {
    pub fn with_detector(config: EngineConfig, detector: D) -> Result<Self, ContractViolation> {
        config.validate()?;
        Ok(Self {
            fuse: FuseRuntime::new(config.fuse)?,
            detector,
            stability: StabilityRuntime::new(config.stability)?,
            phase: PhaseRuntime::new(config.phase)?,
            directive: DirectiveRuntime::new(config.directive)?,
            history_capacity: config.history_capacity,
            history_trim_to: config.history_trim_to,
            session: None,
            history: Vec::new(),
            current: None,
            sinks: Vec::new(),
        })
    }

    /// Begin monitoring. Idempotent: starting an active engine re-initializes
    /// the session context.
    pub fn start(&mut self, now: MonotonicTimeNs) -> Result<(), EngineRefusal> {
        if now.0 == 0 {
            return Err(EngineRefusal::v1(
                reason_codes::ATTUNE_OS_FAIL_SCHEMA_INVALID,
                "session start time must be > 0",
            ));
        }
        self.session = Some(SessionContext::new(now));
        Ok(())
    }

    /// End monitoring. Always succeeds; history and current state are
    /// cleared with the session context.
    pub fn stop(&mut self) {
        self.session = None;
        self.history.clear();
        self.current = None;
    }

    pub fn is_monitoring(&self) -> bool {
        self.session.is_some()
    }

    pub fn subscribe(&mut self, sink: Box<dyn EmotionEventSink>) {
        self.sinks.push(sink);
    }

    pub fn set_preference(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EngineRefusal> {
        let Some(session) = self.session.as_mut() else {
            return Err(EngineRefusal::v1(
                reason_codes::ATTUNE_OS_FAIL_NOT_MONITORING,
                "emotion monitoring is not active",
            ));
        };
        session.preferences.insert(key.into(), value.into());
        Ok(())
    }

    pub fn preference(&self, key: &str) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.preferences.get(key))
            .map(String::as_str)
    }

    pub fn current_state(&self) -> Option<&EmotionState> {
        self.current.as_ref()
    }

    /// Defensive copy; the live buffer is never exposed for mutation.
    pub fn history(&self) -> Vec<EmotionState> {
        self.history.clone()
    }

    /// The core entry point: fuses one tick of modality snapshots into an
    /// EmotionState, appends it to history, and publishes it to subscribers.
    /// All three snapshots are optional; supplying none degrades to a
    /// neutral reading. Refuses while idle.
    pub fn process_sample(
        &mut self,
        now: MonotonicTimeNs,
        voice: Option<VoiceSignal>,
        visual: Option<VisualSignal>,
        behavioral: Option<BehavioralSignal>,
    ) -> Result<EmotionState, EngineRefusal> {
        let Some(session) = self.session.as_ref() else {
            return Err(EngineRefusal::v1(
                reason_codes::ATTUNE_OS_FAIL_NOT_MONITORING,
                "emotion monitoring is not active",
            ));
        };
        if now.0 == 0
            || voice.as_ref().is_some_and(|v| v.validate().is_err())
            || visual.as_ref().is_some_and(|v| v.validate().is_err())
            || behavioral.as_ref().is_some_and(|v| v.validate().is_err())
        {
            return Err(EngineRefusal::v1(
                reason_codes::ATTUNE_OS_FAIL_SCHEMA_INVALID,
                "sample input failed contract validation",
            ));
        }

        let fused = self
            .fuse
            .fuse(voice.as_ref(), visual.as_ref(), behavioral.as_ref())
            .map_err(|_| {
                EngineRefusal::v1(
                    reason_codes::ATTUNE_OS_FAIL_INTERNAL,
                    "fusion scorer failed to produce a reading",
                )
            })?;
        let indicators =
            self.detector
                .detect(voice.as_ref(), visual.as_ref(), behavioral.as_ref());
        let session_phase = self.phase.classify(session.started_at, now);
        // Stability is computed over prior states only; the state being
        // built this cycle is appended afterwards.
        let stability = self.stability.assess(&self.history);
        let tone_adjustments = self.directive.tone_adjustments(&fused, &indicators);
        let interventions = self.directive.interventions(&fused, &indicators);

        let state = EmotionState::v1(
            fused,
            stability,
            voice.unwrap_or_else(VoiceSignal::neutral),
            visual.unwrap_or_else(VisualSignal::neutral),
            behavioral.unwrap_or_else(BehavioralSignal::neutral),
            session_phase,
            indicators,
            tone_adjustments,
            interventions,
            now,
        )
        .map_err(|_| {
            EngineRefusal::v1(
                reason_codes::ATTUNE_OS_FAIL_INTERNAL,
                "fused state failed contract validation",
            )
        })?;

        self.history.push(state.clone());
        if self.history.len() > self.history_capacity {
            let excess = self.history.len() - self.history_trim_to;
            self.history.drain(..excess);
        }
        self.current = Some(state.clone());

        self.publish(&state);
        Ok(state)
    }

    fn publish(&mut self, state: &EmotionState) {
        let severe: Vec<TraumaIndicator> = state
            .trauma_indicators
            .iter()
            .filter(|i| i.severity == TraumaSeverity::Severe)
            .cloned()
            .collect();

        for sink in &mut self.sinks {
            sink.on_state_change(state);
            if !state.tone_adjustments.is_empty() {
                sink.on_tone_adjustments(&state.tone_adjustments);
            }
            if !severe.is_empty() {
                sink.on_crisis(&severe);
            }
        }
    }
}
