//! # Conversation Turns
//!
//! A turn is one rendered message in the transcript. Turns are appended when
//! created and are only ever replaced by the projector, which swaps the
//! trailing `thinking` placeholder for the final turn of that request.
//!
//! ```text
//! Transcript
//! ├── Turn { role: User,      status: None }
//! ├── Turn { role: Assistant, status: Done,     route_info, decision_log }
//! ├── Turn { role: User,      status: None }
//! └── Turn { role: Assistant, status: Thinking }   // in-flight placeholder
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::decision_log::DecisionLogEntry;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Status tag shown next to an assistant turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Thinking,
    Browsing,
    Verifying,
    Repairing,
    AwaitingConsent,
    AwaitingConfirmation,
    AwaitingUserInput,
    Done,
    Failed,
}

impl TurnStatus {
    /// Parses the wire spelling (`"awaiting_consent"`, ...). Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<TurnStatus> {
        match tag {
            "thinking" => Some(TurnStatus::Thinking),
            "browsing" => Some(TurnStatus::Browsing),
            "verifying" => Some(TurnStatus::Verifying),
            "repairing" => Some(TurnStatus::Repairing),
            "awaiting_consent" => Some(TurnStatus::AwaitingConsent),
            "awaiting_confirmation" => Some(TurnStatus::AwaitingConfirmation),
            "awaiting_user_input" => Some(TurnStatus::AwaitingUserInput),
            "done" => Some(TurnStatus::Done),
            "failed" => Some(TurnStatus::Failed),
            _ => None,
        }
    }

    /// Statuses a successful turn may end in.
    pub fn is_done_family(self) -> bool {
        matches!(
            self,
            TurnStatus::Done | TurnStatus::Browsing | TurnStatus::Verifying | TurnStatus::Repairing
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            TurnStatus::Thinking => "thinking",
            TurnStatus::Browsing => "browsing",
            TurnStatus::Verifying => "verifying",
            TurnStatus::Repairing => "repairing",
            TurnStatus::AwaitingConsent => "waiting for permission",
            TurnStatus::AwaitingConfirmation => "waiting for approval",
            TurnStatus::AwaitingUserInput => "needs your answer",
            TurnStatus::Done => "done",
            TurnStatus::Failed => "failed",
        }
    }
}

/// Distinguishes a backend-declared timeout from every other failure so the
/// surface can render them differently.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Generic,
}

/// How the backend routed the request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    #[serde(rename = "SYSTEM1_API")]
    System1Api,
    #[serde(rename = "SYSTEM1_RAG")]
    System1Rag,
    #[serde(rename = "SYSTEM2_REASONING")]
    System2Reasoning,
    #[serde(rename = "SYSTEM2_WEBBROWSE")]
    System2WebBrowse,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Fast,
    Slow,
}

/// Route and telemetry figures attached to a finished turn.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RouteInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_est: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_est_usd: Option<f64>,
}

impl RouteInfo {
    pub fn is_empty(&self) -> bool {
        self.confidence.is_none()
            && self.latency_ms.is_none()
            && self.tokens_est.is_none()
            && self.cost_est_usd.is_none()
    }
}

/// Snapshot of a multi-step backend plan-generation run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrchestrationProgress {
    pub phase: String,
    #[serde(default)]
    pub percent: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TurnStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_type: Option<RouteType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_info: Option<RouteInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decision_log: Vec<DecisionLogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<OrchestrationProgress>,
}

impl ConversationTurn {
    fn new(role: Role, text: String, status: Option<TurnStatus>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text,
            created_at: Utc::now(),
            status,
            failure: None,
            route_type: None,
            route_info: None,
            mode: None,
            decision_log: Vec::new(),
            progress: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), None)
    }

    pub fn assistant(text: impl Into<String>, status: TurnStatus) -> Self {
        Self::new(Role::Assistant, text.into(), Some(status))
    }

    /// The in-flight placeholder appended when a request is sent.
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::assistant(text, TurnStatus::Thinking)
    }

    /// Builds a turn that takes over `slot`'s position: same id and creation
    /// time, everything else fresh.
    pub fn replacing(slot: &ConversationTurn, text: impl Into<String>, status: TurnStatus) -> Self {
        Self {
            id: slot.id.clone(),
            created_at: slot.created_at,
            ..Self::assistant(text, status)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.role == Role::Assistant && self.status == Some(TurnStatus::Thinking)
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(TurnStatus::Failed)
    }
}

/// Returns the index of the turn a retry would remove: the most recent
/// assistant turn, provided it failed.
pub fn retry_target(transcript: &[ConversationTurn]) -> Option<usize> {
    let idx = transcript.iter().rposition(|t| t.role == Role::Assistant)?;
    transcript[idx].is_failed().then_some(idx)
}
