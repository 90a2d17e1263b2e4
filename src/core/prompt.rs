//! # Pending Prompts
//!
//! A pending prompt is a blocking side-request raised by a backend result.
//! At most one exists at a time and input stays locked while it does.
//!
//! ```text
//! consent:   proposed ──accept──▶ accepted  (replay with browsing allowed)
//!                     └─decline─▶ declined  (awaiting turn becomes "kept as-is")
//! approval:  proposed ──approve─▶ approved  (append "continuing" turn)
//!                     └─reject──▶ rejected  (append "adjusting" turn)
//! redirect:  scheduled ─fires───▶ navigated
//! ```
//!
//! The transitions here only touch the transcript. Sending requests and
//! scheduling timers is left to the caller via `Effect`s.

use std::time::Duration;

use log::warn;

use crate::core::request::AgentRequest;
use crate::core::turn::{ConversationTurn, TurnStatus};

pub const CONSENT_KEPT_AS_IS: &str = "Understood, we'll keep things as they are.";
pub const CONSENT_GRANTED: &str = "Permission granted, running it again...";
pub const APPROVAL_CONTINUING: &str = "Got it! Continuing with the operation...";
pub const APPROVAL_ADJUSTING: &str =
    "Understood, nothing will change. I'll look for an alternative approach...";

#[derive(Debug, Clone, PartialEq)]
pub enum PendingPrompt {
    Approval {
        approval_id: String,
        skill_name: Option<String>,
        summary: Option<String>,
    },
    Consent {
        /// The request that asked for consent, replayed on acceptance.
        request: AgentRequest,
        justification: String,
    },
    Redirect {
        target: String,
        delay: Duration,
    },
}

impl PendingPrompt {
    pub fn kind(&self) -> &'static str {
        match self {
            PendingPrompt::Approval { .. } => "approval",
            PendingPrompt::Consent { .. } => "consent",
            PendingPrompt::Redirect { .. } => "redirect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentDecision {
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

fn awaiting_turn(transcript: &mut [ConversationTurn], status: TurnStatus) -> Option<&mut ConversationTurn> {
    transcript.iter_mut().rev().find(|t| t.status == Some(status))
}

/// Applies a consent decision to the transcript.
///
/// Accepting turns the awaiting turn back into an in-flight placeholder so the
/// replayed request's result can take its slot. Declining settles it as done.
pub fn resolve_consent(transcript: &mut [ConversationTurn], decision: ConsentDecision) {
    let Some(turn) = awaiting_turn(transcript, TurnStatus::AwaitingConsent) else {
        warn!("Consent resolved but no awaiting_consent turn in transcript");
        return;
    };
    let (text, status) = match decision {
        ConsentDecision::Accepted => (CONSENT_GRANTED, TurnStatus::Thinking),
        ConsentDecision::Declined => (CONSENT_KEPT_AS_IS, TurnStatus::Done),
    };
    *turn = ConversationTurn::replacing(turn, text, status);
}

/// Applies an approval decision: appends an informational `thinking` turn.
/// The backend pushes the continuation on its own.
pub fn resolve_approval(transcript: &mut Vec<ConversationTurn>, decision: ApprovalDecision) {
    let text = match decision {
        ApprovalDecision::Approved => APPROVAL_CONTINUING,
        ApprovalDecision::Rejected => APPROVAL_ADJUSTING,
    };
    transcript.push(ConversationTurn::assistant(text, TurnStatus::Thinking));
}
