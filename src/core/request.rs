//! # Agent Requests
//!
//! One request per conversational turn. The request is built here, in core,
//! because a consent prompt keeps the original request around so it can be
//! replayed with browsing allowed.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::turn::{ConversationTurn, Role};

/// How many earlier turns are sent along as conversation context.
pub const RECENT_MESSAGE_WINDOW: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LlmProvider {
    #[serde(rename = "OPENAI", alias = "openai")]
    OpenAi,
    #[serde(rename = "ANTHROPIC", alias = "anthropic")]
    Anthropic,
    #[serde(rename = "GOOGLE", alias = "google")]
    Google,
    #[serde(rename = "DEEPSEEK", alias = "deepseek")]
    DeepSeek,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ConversationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_messages: Option<Vec<String>>,
    pub locale: String,
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct AgentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<LlmProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub allow_webbrowse: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AgentRequest {
    pub request_id: String,
    pub user_id: String,
    pub trip_id: Option<String>,
    pub message: String,
    pub conversation_context: ConversationContext,
    pub options: AgentOptions,
}

impl AgentRequest {
    /// The same request under a fresh request id.
    pub fn resent(&self, seq: u64) -> AgentRequest {
        let mut again = self.clone();
        again.request_id = wire_request_id(seq);
        again
    }

    /// The same request with browsing permitted and a fresh request id.
    pub fn with_browsing_allowed(&self, seq: u64) -> AgentRequest {
        let mut replay = self.resent(seq);
        replay.options.allow_webbrowse = true;
        replay
    }
}

/// A request paired with the local sequence number it was sent under.
/// Responses are matched back to requests by `seq`, never by the wire id.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub seq: u64,
    pub request: AgentRequest,
}

/// Per-user fields shared by every request from one conversation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestProfile {
    pub user_id: String,
    pub trip_id: Option<String>,
    pub locale: String,
    pub timezone: String,
    pub llm_provider: Option<LlmProvider>,
    pub entry_point: Option<String>,
    pub read_only: bool,
}

impl RequestProfile {
    /// Builds the request for `message`. `history` is the transcript as it was
    /// before the user's turn was appended.
    pub fn build(
        &self,
        seq: u64,
        message: &str,
        history: &[ConversationTurn],
        session_id: Option<&str>,
    ) -> AgentRequest {
        let recent = recent_messages(history);
        AgentRequest {
            request_id: wire_request_id(seq),
            user_id: self.user_id.clone(),
            trip_id: self.trip_id.clone(),
            message: message.to_string(),
            conversation_context: ConversationContext {
                recent_messages: (!recent.is_empty()).then_some(recent),
                locale: self.locale.clone(),
                timezone: self.timezone.clone(),
                session_id: session_id.map(str::to_string),
            },
            options: AgentOptions {
                llm_provider: self.llm_provider,
                entry_point: self.entry_point.clone(),
                read_only: self.read_only,
                allow_webbrowse: false,
            },
        }
    }
}

/// Unique id sent to the backend, e.g. `req-7-3f2a...`.
pub fn wire_request_id(seq: u64) -> String {
    format!("req-{}-{}", seq, uuid::Uuid::new_v4().simple())
}

/// The last few settled turns, rendered as `"User: ..."` / `"Assistant: ..."`.
fn recent_messages(history: &[ConversationTurn]) -> Vec<String> {
    let settled: Vec<&ConversationTurn> = history.iter().filter(|t| !t.is_placeholder()).collect();
    let start = settled.len().saturating_sub(RECENT_MESSAGE_WINDOW);
    settled[start..]
        .iter()
        .map(|t| match t.role {
            Role::User => format!("User: {}", t.text),
            Role::Assistant => format!("Assistant: {}", t.text),
        })
        .collect()
}
