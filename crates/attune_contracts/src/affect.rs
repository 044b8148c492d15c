#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::SchemaVersion;

pub const AFFECT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Closed emotion vocabulary. Declaration order is the canonical rank used
/// as the fusion tie-break; it is an arbitrary but fixed ordering, not a
/// semantic one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EmotionLabel {
    // Basic
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    // Complex
    Anxiety,
    Depression,
    Excitement,
    Contentment,
    Frustration,
    Hope,
    Shame,
    Guilt,
    Relief,
    // Trauma-specific
    Hypervigilance,
    Dissociation,
    EmotionalNumbness,
    TriggerResponse,
    // Neutral / unclear
    Neutral,
    Confused,
    Mixed,
}

impl EmotionLabel {
    pub fn canonical_rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Joy => "joy",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Anxiety => "anxiety",
            EmotionLabel::Depression => "depression",
            EmotionLabel::Excitement => "excitement",
            EmotionLabel::Contentment => "contentment",
            EmotionLabel::Frustration => "frustration",
            EmotionLabel::Hope => "hope",
            EmotionLabel::Shame => "shame",
            EmotionLabel::Guilt => "guilt",
            EmotionLabel::Relief => "relief",
            EmotionLabel::Hypervigilance => "hypervigilance",
            EmotionLabel::Dissociation => "dissociation",
            EmotionLabel::EmotionalNumbness => "emotional_numbness",
            EmotionLabel::TriggerResponse => "trigger_response",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Confused => "confused",
            EmotionLabel::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    Initial,
    BuildingRapport,
    TherapeuticWork,
    Integration,
    Closure,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Initial => "initial",
            SessionPhase::BuildingRapport => "building_rapport",
            SessionPhase::TherapeuticWork => "therapeutic_work",
            SessionPhase::Integration => "integration",
            SessionPhase::Closure => "closure",
        }
    }
}
