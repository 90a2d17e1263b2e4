//! Wire types for the agent backend.
//!
//! Every field is optional on the way in: backends of different vintages
//! omit different parts, and a missing part must never fail the whole
//! response. `decode` turns the wire shape into `BackendResult` once, here;
//! nothing downstream sees raw JSON.

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::core::decision_log::{self, DecisionLogEntry, RawDecisionLogEntry};
use crate::core::result::{
    ApprovalMarker, BackendResult, Clarification, ConsentDescriptor, LegacyClarification,
    Observability, RedirectDescriptor, ResultPayload, ResultStatus, RouteSummary,
};
use crate::core::turn::{Mode, OrchestrationProgress, RouteType, TurnStatus};

// ============================================================================
// Envelope
// ============================================================================

/// `{success: true, data}` or `{success: false, error: {code, message}}`.
#[derive(Deserialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<EnvelopeError>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EnvelopeError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// route_and_run response
// ============================================================================

#[derive(Deserialize, Debug, Default)]
pub struct RouteAndRunResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub route: Option<RouteDecision>,
    #[serde(default)]
    pub result: Option<ResultBody>,
    #[serde(default)]
    pub explain: Option<Explain>,
    #[serde(default)]
    pub observability: Option<ObservabilityMetrics>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RouteDecision {
    /// Kept as a string so an unrecognized route does not fail decoding.
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub ui_hint: Option<UiHint>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UiHint {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ResultBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Deserialize, Debug, Default)]
pub struct Explain {
    /// Entries are decoded one at a time so a single bad entry is dropped
    /// instead of losing the whole log.
    #[serde(default)]
    pub decision_log: Vec<Value>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ObservabilityMetrics {
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub tokens_est: Option<u64>,
    #[serde(default)]
    pub cost_est_usd: Option<f64>,
}

// ============================================================================
// Payload fragments
// ============================================================================

#[derive(Deserialize, Debug, Default)]
struct LegacyClarificationWire {
    #[serde(default)]
    missing_services: Vec<String>,
    #[serde(default)]
    impact: Option<String>,
    #[serde(default)]
    solutions: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct SuspensionInfo {
    #[serde(default, rename = "approvalId", alias = "approval_id")]
    approval_id: Option<String>,
    #[serde(default, rename = "skillName", alias = "skill_name")]
    skill_name: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ConsentWire {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct RedirectWire {
    #[serde(default, alias = "url", alias = "path")]
    target: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct UiStateWire {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default, alias = "percent")]
    progress_percent: Option<f64>,
    #[serde(default, alias = "current_step_detail")]
    message: Option<String>,
}

// ============================================================================
// Decoding
// ============================================================================

/// Unwraps the envelope. `Err((code, message))` for a `success: false` body.
pub fn decode_envelope<T>(envelope: Envelope<T>) -> Result<T, (String, String)> {
    if envelope.success
        && let Some(data) = envelope.data
    {
        return Ok(data);
    }
    let error = envelope.error.unwrap_or_default();
    Err((
        error.code.unwrap_or_else(|| "UNKNOWN".to_string()),
        error
            .message
            .unwrap_or_else(|| "request failed".to_string()),
    ))
}

/// Converts one wire response into the internal result.
pub fn decode(response: RouteAndRunResponse) -> BackendResult {
    let body = response.result.unwrap_or_default();
    let status = match body.status.as_deref() {
        Some(tag) => ResultStatus::parse(tag),
        None => {
            warn!("Response without a result status");
            ResultStatus::Unknown(String::new())
        }
    };

    let mut payload = decode_payload(&body.payload);
    payload.answer_text = body
        .answer_text
        .or_else(|| string_field(&body.payload, &["answer_text", "answer"]));

    let decision_log = response
        .explain
        .map(|explain| decode_decision_log(explain.decision_log))
        .unwrap_or_default();

    BackendResult {
        request_id: response.request_id,
        status,
        payload,
        route: response.route.map(decode_route),
        observability: response.observability.map(|o| Observability {
            latency_ms: o.latency_ms,
            tokens_est: o.tokens_est,
            cost_est_usd: o.cost_est_usd,
        }),
        decision_log,
    }
}

fn decode_route(route: RouteDecision) -> RouteSummary {
    let hint = route.ui_hint.unwrap_or_default();
    RouteSummary {
        route_type: route
            .route
            .and_then(|r| serde_json::from_value::<RouteType>(Value::String(r)).ok()),
        confidence: route.confidence,
        mode: hint.mode.as_deref().and_then(|m| match m {
            "fast" => Some(Mode::Fast),
            "slow" => Some(Mode::Slow),
            _ => None,
        }),
        hint_status: hint.status.as_deref().and_then(TurnStatus::parse),
        hint_message: hint.message.filter(|m| !m.trim().is_empty()),
    }
}

fn decode_decision_log(raw: Vec<Value>) -> Vec<DecisionLogEntry> {
    let entries = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawDecisionLogEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Dropping malformed decision log entry: {}", e);
                None
            }
        })
        .collect();
    decision_log::normalize_all(entries)
}

fn decode_payload(payload: &Value) -> ResultPayload {
    if !payload.is_object() {
        return ResultPayload::default();
    }

    let approval = fragment::<SuspensionInfo>(payload, &["suspensionInfo", "approval"]).map(|s| {
        ApprovalMarker {
            approval_id: s.approval_id,
            skill_name: s.skill_name,
            summary: s.summary,
        }
    });

    let ui_state = fragment::<UiStateWire>(payload, &["ui_state", "uiState"]);
    let progress = ui_state
        .as_ref()
        .and_then(progress_from)
        .or_else(|| {
            fragment::<UiStateWire>(payload, &["progress", "orchestration"])
                .as_ref()
                .and_then(progress_from)
        });

    let decoded = ResultPayload {
        answer_text: None,
        clarification: decode_clarification(payload),
        approval,
        consent: fragment::<ConsentWire>(payload, &["consent"])
            .map(|c| ConsentDescriptor { reason: c.reason }),
        redirect: fragment::<RedirectWire>(payload, &["redirect"]).and_then(|r| {
            let target = r.target.filter(|t| !t.trim().is_empty())?;
            Some(RedirectDescriptor {
                target,
                reason: r.reason,
            })
        }),
        ui_state_status: ui_state
            .and_then(|s| s.status)
            .as_deref()
            .and_then(TurnStatus::parse),
        progress,
    };
    debug!("Decoded payload: {:?}", decoded);
    decoded
}

fn decode_clarification(payload: &Value) -> Option<Clarification> {
    let message = string_field(payload, &["clarificationMessage", "clarification_message"]);
    let legacy = fragment::<LegacyClarificationWire>(payload, &["clarification"])
        .map(|c| LegacyClarification {
            missing_services: c.missing_services,
            impact: c.impact.filter(|i| !i.trim().is_empty()),
            solutions: c.solutions,
        })
        .filter(|c| !c.is_empty());

    if message.is_none() && legacy.is_none() {
        return None;
    }
    Some(Clarification { message, legacy })
}

fn progress_from(state: &UiStateWire) -> Option<OrchestrationProgress> {
    let phase = state.phase.clone()?;
    let percent = match state.progress_percent {
        Some(p) => p.clamp(0.0, 100.0).round() as u8,
        None if phase.eq_ignore_ascii_case("done") => 100,
        None => 0,
    };
    Some(OrchestrationProgress {
        phase,
        percent,
        message: state.message.clone(),
    })
}

/// First object under any of `keys` that decodes as `T`.
fn fragment<T: for<'de> Deserialize<'de>>(payload: &Value, keys: &[&str]) -> Option<T> {
    keys.iter().find_map(|key| {
        let value = payload.get(*key).filter(|v| v.is_object())?;
        match serde_json::from_value::<T>(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Ignoring malformed payload.{}: {}", key, e);
                None
            }
        }
    })
}

/// First non-blank string under any of `keys`.
fn string_field(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        payload
            .get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}
