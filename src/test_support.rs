//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::projector::{SurfaceCapabilities, THINKING_TEXT};
use crate::core::request::{AgentRequest, LlmProvider, RequestProfile};
use crate::core::result::{BackendResult, ResultStatus};
use crate::core::state::App;
use crate::core::turn::ConversationTurn;

/// A request profile with fixed, recognizable values.
pub fn test_profile() -> RequestProfile {
    RequestProfile {
        user_id: "user-test".to_string(),
        trip_id: Some("trip-test".to_string()),
        locale: "zh-CN".to_string(),
        timezone: "Asia/Shanghai".to_string(),
        llm_provider: Some(LlmProvider::DeepSeek),
        entry_point: Some("test".to_string()),
        read_only: false,
    }
}

/// Creates a test App for the full-featured agent chat surface.
pub fn test_app() -> App {
    App::new(test_profile(), SurfaceCapabilities::agent_chat())
}

/// A transcript with one user turn and its trailing placeholder, plus the
/// request that was sent for it.
pub fn in_flight(text: &str) -> (Vec<ConversationTurn>, AgentRequest) {
    let request = test_profile().build(1, text, &[], None);
    let transcript = vec![
        ConversationTurn::user(text),
        ConversationTurn::placeholder(THINKING_TEXT),
    ];
    (transcript, request)
}

/// An otherwise empty result with the given status.
pub fn backend_result(status: ResultStatus) -> BackendResult {
    BackendResult::new(status)
}
