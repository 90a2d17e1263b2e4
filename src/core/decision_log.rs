//! # Decision Log
//!
//! The backend's audit trail of reasoning steps. It has shipped in two shapes
//! over time:
//!
//! ```text
//! legacy:  { step: 3, chosen_action, reason_code?, confidence?, facts?, policy_id? }
//! current: { step: "GATE_EVAL", actor?, inputs_summary?, outputs_summary?,
//!            evidence_refs?, timestamp?, request_id?, metadata? }
//! ```
//!
//! Rendering only ever sees the current shape. [`normalize`] maps each legacy
//! field onto exactly one current field and never invents values for fields
//! the legacy shape does not carry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Orchestration step names, indexed by the legacy numeric step (1-based).
const STEP_NAMES: [&str; 9] = [
    "INTAKE",
    "RESEARCH",
    "GATE_EVAL",
    "PLAN_GEN",
    "VERIFY",
    "REPAIR",
    "NARRATE",
    "DONE",
    "FAILED",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DecisionLogEntry {
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_refs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LegacyDecisionLogItem {
    pub step: u32,
    pub chosen_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

/// A decision-log entry as it arrives on the wire, in either shape.
///
/// The shapes are told apart by the type of `step`: a string is the current
/// shape, a number is the legacy one.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawDecisionLogEntry {
    Current(DecisionLogEntry),
    Legacy(LegacyDecisionLogItem),
}

/// Maps a legacy numeric step to its name. Out-of-range steps keep their number.
pub fn step_name(step: u32) -> String {
    step.checked_sub(1)
        .and_then(|i| STEP_NAMES.get(i as usize))
        .map(|name| name.to_string())
        .unwrap_or_else(|| step.to_string())
}

/// Converts either wire shape into the current one.
pub fn normalize(entry: RawDecisionLogEntry) -> DecisionLogEntry {
    match entry {
        RawDecisionLogEntry::Current(current) => current,
        RawDecisionLogEntry::Legacy(legacy) => from_legacy(legacy),
    }
}

pub fn normalize_all(entries: Vec<RawDecisionLogEntry>) -> Vec<DecisionLogEntry> {
    entries.into_iter().map(normalize).collect()
}

fn from_legacy(legacy: LegacyDecisionLogItem) -> DecisionLogEntry {
    let mut metadata = Map::new();
    if let Some(confidence) = legacy.confidence {
        metadata.insert("confidence".to_string(), Value::from(confidence));
    }
    if let Some(facts) = legacy.facts {
        metadata.insert("facts".to_string(), Value::Object(facts));
    }
    if let Some(policy_id) = legacy.policy_id {
        metadata.insert("policy_id".to_string(), Value::String(policy_id));
    }

    DecisionLogEntry {
        step: step_name(legacy.step),
        actor: None,
        inputs_summary: legacy.reason_code,
        outputs_summary: Some(legacy.chosen_action),
        evidence_refs: None,
        timestamp: None,
        request_id: None,
        metadata: (!metadata.is_empty()).then_some(metadata),
    }
}
