//! # Response Projector
//!
//! Maps one backend result onto the conversation: which turn replaces the
//! in-flight placeholder, whether a blocking prompt appears, and whether input
//! stays locked.
//!
//! ```text
//! (transcript, result, request)  →  project()  →  Projection {
//!                                                   transcript',
//!                                                   pending',
//!                                                   input_locked',
//!                                                 }
//! ```
//!
//! Results are matched in a fixed priority order, first match wins:
//!
//! 1. `REDIRECT_REQUIRED`
//! 2. `NEED_CONSENT`
//! 3. approval required (payload approval id under any status, or `NEED_CONFIRMATION`)
//! 4. `NEED_MORE_INFO`
//! 5. `TIMEOUT`
//! 6. `FAILED`
//! 7. `OK`
//!
//! Unknown tags and results needing a prompt the surface can't show end up as
//! a generic failure turn. `project` never panics on a well-typed result.

use std::time::Duration;

use log::{debug, error, info, warn};

use crate::core::prompt::PendingPrompt;
use crate::core::request::AgentRequest;
use crate::core::result::{BackendResult, Clarification, ResultStatus};
use crate::core::turn::{ConversationTurn, FailureKind, RouteInfo, TurnStatus};

/// How long a redirect notice stays on screen before navigating.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1000);

pub const THINKING_TEXT: &str = "Let me think about that...";
pub const GENERIC_APOLOGY: &str = "Something went a little wrong. Want to try again?";
pub const TIMEOUT_TEXT: &str = "That took too long and timed out. Want to try again?";
pub const FALLBACK_ANSWER: &str = "I may not know everything, but I'll do my best to find out!";
pub const CONSENT_DEFAULT_TEXT: &str =
    "This step needs to read web pages. May I go ahead?";
pub const APPROVAL_TEXT: &str =
    "I need your sign-off before I continue. Please review the approval request below.";
pub const CLARIFICATION_FALLBACK: &str = "Could you tell me a bit more?";

/// Which optional result shapes a conversation surface knows how to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub consent: bool,
    pub approval: bool,
    pub redirect: bool,
    pub route_info: bool,
    pub decision_log: bool,
    pub progress: bool,
}

impl SurfaceCapabilities {
    /// The general agent chat: everything.
    pub fn agent_chat() -> Self {
        Self {
            consent: true,
            approval: true,
            redirect: true,
            route_info: true,
            decision_log: true,
            progress: true,
        }
    }

    pub fn planning_assistant() -> Self {
        Self {
            consent: false,
            approval: false,
            redirect: true,
            route_info: false,
            decision_log: true,
            progress: true,
        }
    }

    pub fn journey_assistant() -> Self {
        Self {
            consent: false,
            approval: true,
            redirect: true,
            route_info: false,
            decision_log: false,
            progress: false,
        }
    }
}

impl Default for SurfaceCapabilities {
    fn default() -> Self {
        Self::agent_chat()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub transcript: Vec<ConversationTurn>,
    pub pending: Option<PendingPrompt>,
    pub input_locked: bool,
}

/// Projects `result` onto `transcript`.
///
/// `transcript` is expected to end in exactly one `thinking` placeholder for
/// the request that produced `result`; `request` is that request (its message
/// is the user's original text).
pub fn project(
    transcript: Vec<ConversationTurn>,
    result: &BackendResult,
    request: &AgentRequest,
    caps: SurfaceCapabilities,
) -> Projection {
    let mut transcript = transcript;
    let slot = take_placeholder(&mut transcript);

    let (turn, pending, input_locked) = match classify(result, caps) {
        Outcome::Redirect { target, reason } => {
            info!("Redirect required -> {} (in {:?})", target, REDIRECT_DELAY);
            let text = reason.unwrap_or_else(|| format!("Taking you to {target}..."));
            let turn = ConversationTurn::replacing(&slot, text, TurnStatus::Done);
            let prompt = PendingPrompt::Redirect {
                target,
                delay: REDIRECT_DELAY,
            };
            // Unlocked when the navigation fires.
            (turn, Some(prompt), true)
        }
        Outcome::Consent => {
            let justification = result
                .payload
                .consent
                .as_ref()
                .and_then(|c| c.reason.clone())
                .or_else(|| result.route.as_ref().and_then(|r| r.hint_message.clone()))
                .unwrap_or_else(|| CONSENT_DEFAULT_TEXT.to_string());
            info!("Consent requested for request {}", request.request_id);
            let mut turn =
                ConversationTurn::replacing(&slot, justification.clone(), TurnStatus::AwaitingConsent);
            attach_route(&mut turn, result);
            let prompt = PendingPrompt::Consent {
                request: request.clone(),
                justification,
            };
            (turn, Some(prompt), true)
        }
        Outcome::Approval => match result.approval_id() {
            Some(id) => {
                info!("Approval requested: {}", id);
                let marker = result.payload.approval.clone().unwrap_or_default();
                let mut turn =
                    ConversationTurn::replacing(&slot, APPROVAL_TEXT, TurnStatus::AwaitingConfirmation);
                attach_route(&mut turn, result);
                let prompt = PendingPrompt::Approval {
                    approval_id: id.to_string(),
                    skill_name: marker.skill_name,
                    summary: marker.summary,
                };
                (turn, Some(prompt), true)
            }
            None => {
                error!(
                    "Approval required (status {:?}) but no approval id in payload",
                    result.status
                );
                (failure_turn(&slot, None, FailureKind::Generic), None, false)
            }
        },
        Outcome::Clarify => {
            let text = clarification_text(result);
            let mut turn = ConversationTurn::replacing(&slot, text, TurnStatus::AwaitingUserInput);
            attach_route(&mut turn, result);
            (turn, None, false)
        }
        Outcome::Timeout => (failure_turn(&slot, None, FailureKind::Timeout), None, false),
        Outcome::Failed => (
            failure_turn(&slot, result.answer_text(), FailureKind::Generic),
            None,
            false,
        ),
        Outcome::Unsupported(reason) => {
            warn!("Falling back to failure turn: {}", reason);
            (failure_turn(&slot, None, FailureKind::Generic), None, false)
        }
        Outcome::Answer => (answer_turn(&slot, result, caps), None, false),
    };

    transcript.push(turn);
    Projection {
        transcript,
        pending,
        input_locked,
    }
}

enum Outcome {
    Redirect { target: String, reason: Option<String> },
    Consent,
    Approval,
    Clarify,
    Timeout,
    Failed,
    Unsupported(String),
    Answer,
}

fn classify(result: &BackendResult, caps: SurfaceCapabilities) -> Outcome {
    if result.status == ResultStatus::RedirectRequired {
        return match (&result.payload.redirect, caps.redirect) {
            (Some(redirect), true) => Outcome::Redirect {
                target: redirect.target.clone(),
                reason: redirect.reason.clone(),
            },
            (None, _) => Outcome::Unsupported("REDIRECT_REQUIRED without a target".to_string()),
            (_, false) => Outcome::Unsupported("surface cannot redirect".to_string()),
        };
    }
    if result.status == ResultStatus::NeedConsent {
        return if caps.consent {
            Outcome::Consent
        } else {
            Outcome::Unsupported("surface cannot ask for consent".to_string())
        };
    }
    if result.requires_approval() {
        return if caps.approval {
            Outcome::Approval
        } else {
            Outcome::Unsupported("surface cannot ask for approval".to_string())
        };
    }
    match &result.status {
        ResultStatus::NeedMoreInfo => Outcome::Clarify,
        ResultStatus::Timeout => Outcome::Timeout,
        ResultStatus::Failed => Outcome::Failed,
        ResultStatus::Ok => Outcome::Answer,
        ResultStatus::Unknown(tag) => Outcome::Unsupported(format!("unknown status tag {tag:?}")),
        // Handled above; kept for exhaustiveness.
        ResultStatus::RedirectRequired | ResultStatus::NeedConsent | ResultStatus::NeedConfirmation => {
            Outcome::Unsupported(format!("unexpected status {:?}", result.status))
        }
    }
}

/// Removes the trailing placeholder and returns it. If the transcript does not
/// end in one, a fresh slot is made up so the result still lands somewhere.
fn take_placeholder(transcript: &mut Vec<ConversationTurn>) -> ConversationTurn {
    if transcript.last().is_some_and(ConversationTurn::is_placeholder)
        && let Some(slot) = transcript.pop()
    {
        return slot;
    }
    warn!("Projected result without a trailing thinking placeholder; appending");
    ConversationTurn::placeholder(THINKING_TEXT)
}

fn failure_turn(slot: &ConversationTurn, text: Option<&str>, kind: FailureKind) -> ConversationTurn {
    let text = match kind {
        FailureKind::Timeout => TIMEOUT_TEXT,
        FailureKind::Generic => text.unwrap_or(GENERIC_APOLOGY),
    };
    let mut turn = ConversationTurn::replacing(slot, text, TurnStatus::Failed);
    turn.failure = Some(kind);
    turn
}

fn answer_turn(slot: &ConversationTurn, result: &BackendResult, caps: SurfaceCapabilities) -> ConversationTurn {
    let status = result
        .payload
        .ui_state_status
        .or_else(|| result.route.as_ref().and_then(|r| r.hint_status))
        .filter(|status| {
            let accepted = status.is_done_family();
            if !accepted {
                debug!("Ignoring non-final status override {:?} on OK result", status);
            }
            accepted
        })
        .unwrap_or(TurnStatus::Done);

    let text = result.answer_text().unwrap_or(FALLBACK_ANSWER);
    let mut turn = ConversationTurn::replacing(slot, text, status);
    attach_route(&mut turn, result);

    if caps.route_info {
        let info = route_info(result);
        if !info.is_empty() {
            turn.route_info = Some(info);
        }
    }
    if caps.decision_log {
        turn.decision_log = result.decision_log.clone();
    }
    if caps.progress {
        turn.progress = result.payload.progress.clone();
    }
    turn
}

fn attach_route(turn: &mut ConversationTurn, result: &BackendResult) {
    if let Some(route) = &result.route {
        turn.route_type = route.route_type;
        turn.mode = route.mode;
    }
}

fn route_info(result: &BackendResult) -> RouteInfo {
    let obs = result.observability.clone().unwrap_or_default();
    RouteInfo {
        confidence: result.route.as_ref().and_then(|r| r.confidence),
        latency_ms: obs.latency_ms,
        tokens_est: obs.tokens_est,
        cost_est_usd: obs.cost_est_usd,
    }
}

/// Clarification text: structured message first, then the legacy object
/// rendered section by section, then the answer text.
fn clarification_text(result: &BackendResult) -> String {
    let Clarification { message, legacy } = result.payload.clarification.clone().unwrap_or_default();
    if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
        return message;
    }

    if let Some(legacy) = legacy.filter(|l| !l.is_empty()) {
        let mut sections = Vec::new();
        if !legacy.missing_services.is_empty() {
            sections.push(format!(
                "Missing services:\n{}",
                bullet_list(&legacy.missing_services)
            ));
        }
        if let Some(impact) = legacy.impact {
            sections.push(format!("Impact:\n{impact}"));
        }
        if !legacy.solutions.is_empty() {
            sections.push(format!("Suggested solutions:\n{}", bullet_list(&legacy.solutions)));
        }
        return sections.join("\n\n");
    }

    result
        .answer_text()
        .unwrap_or(CLARIFICATION_FALLBACK)
        .to_string()
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
