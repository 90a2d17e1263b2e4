//! # Backend Results
//!
//! The internal, already-normalized form of one backend response. The wire
//! format is decoded into this exactly once, at the network boundary
//! (`api::types::decode`); nothing downstream inspects raw payloads.

use crate::core::decision_log::DecisionLogEntry;
use crate::core::turn::{Mode, OrchestrationProgress, RouteType, TurnStatus};

/// Outer status tag of a backend result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    NeedMoreInfo,
    NeedConfirmation,
    NeedConsent,
    Timeout,
    Failed,
    RedirectRequired,
    /// A tag this client does not know. Kept verbatim for diagnostics.
    Unknown(String),
}

impl ResultStatus {
    pub fn parse(tag: &str) -> ResultStatus {
        match tag {
            "OK" => ResultStatus::Ok,
            "NEED_MORE_INFO" => ResultStatus::NeedMoreInfo,
            "NEED_CONFIRMATION" => ResultStatus::NeedConfirmation,
            "NEED_CONSENT" => ResultStatus::NeedConsent,
            "TIMEOUT" => ResultStatus::Timeout,
            "FAILED" => ResultStatus::Failed,
            "REDIRECT_REQUIRED" => ResultStatus::RedirectRequired,
            other => ResultStatus::Unknown(other.to_string()),
        }
    }
}

/// Structured clarification data from older backends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyClarification {
    pub missing_services: Vec<String>,
    pub impact: Option<String>,
    pub solutions: Vec<String>,
}

impl LegacyClarification {
    pub fn is_empty(&self) -> bool {
        self.missing_services.is_empty() && self.impact.is_none() && self.solutions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clarification {
    /// Preferred: a ready-to-show question.
    pub message: Option<String>,
    pub legacy: Option<LegacyClarification>,
}

/// Marker that the backend suspended work pending a human sign-off.
/// The id may be missing or empty on a malformed response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovalMarker {
    pub approval_id: Option<String>,
    pub skill_name: Option<String>,
    pub summary: Option<String>,
}

impl ApprovalMarker {
    /// The approval id, if present and non-blank.
    pub fn id(&self) -> Option<&str> {
        self.approval_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsentDescriptor {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectDescriptor {
    pub target: String,
    pub reason: Option<String>,
}

/// Routing decision echoed back by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSummary {
    pub route_type: Option<RouteType>,
    pub confidence: Option<f64>,
    pub mode: Option<Mode>,
    /// Generic status hint; an embedded ui-state status overrides it.
    pub hint_status: Option<TurnStatus>,
    pub hint_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observability {
    pub latency_ms: Option<u64>,
    pub tokens_est: Option<u64>,
    pub cost_est_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPayload {
    pub answer_text: Option<String>,
    pub clarification: Option<Clarification>,
    pub approval: Option<ApprovalMarker>,
    pub consent: Option<ConsentDescriptor>,
    pub redirect: Option<RedirectDescriptor>,
    /// Finer-grained status embedded by the backend's ui-state block.
    pub ui_state_status: Option<TurnStatus>,
    pub progress: Option<OrchestrationProgress>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendResult {
    pub request_id: Option<String>,
    pub status: ResultStatus,
    pub payload: ResultPayload,
    pub route: Option<RouteSummary>,
    pub observability: Option<Observability>,
    pub decision_log: Vec<DecisionLogEntry>,
}

impl BackendResult {
    pub fn new(status: ResultStatus) -> Self {
        Self {
            request_id: None,
            status,
            payload: ResultPayload::default(),
            route: None,
            observability: None,
            decision_log: Vec::new(),
        }
    }

    /// Stand-in result for a request that never produced a usable response.
    /// `message` is shown instead of the generic apology when present.
    pub fn transport_failure(message: Option<String>) -> Self {
        let mut result = Self::new(ResultStatus::Failed);
        result.payload.answer_text = message;
        result
    }

    /// Approval is signalled by a non-blank approval id in the payload,
    /// whatever the outer status says, or by a `NEED_CONFIRMATION` status even
    /// when the id is missing. A marker without an id on any other status is
    /// not an approval.
    pub fn requires_approval(&self) -> bool {
        self.approval_id().is_some() || self.status == ResultStatus::NeedConfirmation
    }

    pub fn approval_id(&self) -> Option<&str> {
        self.payload.approval.as_ref().and_then(ApprovalMarker::id)
    }

    pub fn answer_text(&self) -> Option<&str> {
        self.payload
            .answer_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_keeps_unknown_tag() {
        assert_eq!(ResultStatus::parse("OK"), ResultStatus::Ok);
        assert_eq!(
            ResultStatus::parse("REDIRECT_REQUIRED"),
            ResultStatus::RedirectRequired
        );
        assert_eq!(
            ResultStatus::parse("PARTIAL"),
            ResultStatus::Unknown("PARTIAL".to_string())
        );
    }

    #[test]
    fn test_requires_approval_from_payload_regardless_of_status() {
        let mut result = BackendResult::new(ResultStatus::Ok);
        assert!(!result.requires_approval());

        result.payload.approval = Some(ApprovalMarker {
            approval_id: Some("ap-1".to_string()),
            ..Default::default()
        });
        assert!(result.requires_approval());
        assert_eq!(result.approval_id(), Some("ap-1"));
    }

    #[test]
    fn test_need_confirmation_without_marker_still_requires_approval() {
        let result = BackendResult::new(ResultStatus::NeedConfirmation);
        assert!(result.requires_approval());
        assert_eq!(result.approval_id(), None);
    }

    #[test]
    fn test_marker_without_id_on_ok_is_not_an_approval() {
        let mut result = BackendResult::new(ResultStatus::Ok);
        result.payload.approval = Some(ApprovalMarker {
            skill_name: Some("book_hotel".to_string()),
            ..Default::default()
        });
        assert!(!result.requires_approval());

        result.payload.approval = Some(ApprovalMarker {
            approval_id: Some("".to_string()),
            ..Default::default()
        });
        assert!(!result.requires_approval());
    }

    #[test]
    fn test_blank_approval_id_is_not_extractable() {
        let marker = ApprovalMarker {
            approval_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(marker.id(), None);
    }

    #[test]
    fn test_blank_answer_text_is_absent() {
        let mut result = BackendResult::new(ResultStatus::Failed);
        result.payload.answer_text = Some("   ".to_string());
        assert_eq!(result.answer_text(), None);
    }
}
