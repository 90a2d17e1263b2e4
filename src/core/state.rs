//! # Application State
//!
//! Core conversation state for one surface. No I/O and no terminal types;
//! presentation lives in the `term` module.
//!
//! ```text
//! App
//! ├── transcript: Vec<ConversationTurn>   // rendered turns, oldest first
//! ├── pending: Option<PendingPrompt>      // at most one blocking prompt
//! ├── input_locked: bool                  // true while a request or prompt is open
//! ├── in_flight: Option<Outbound>         // the one outstanding request
//! ├── last_sent: Option<AgentRequest>     // what a retry resends
//! ├── next_seq: u64                       // monotonic request sequence
//! ├── capabilities: SurfaceCapabilities   // which result shapes this surface shows
//! ├── profile: RequestProfile             // user/trip/locale fields for requests
//! ├── session_id: Option<String>          // resumable conversation id
//! ├── mode: Option<Mode>                  // fast/slow, from the last answer
//! └── status_message: String              // status line text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::config::{ResolvedConfig, Surface};
use crate::core::projector::SurfaceCapabilities;
use crate::core::prompt::PendingPrompt;
use crate::core::request::{AgentRequest, Outbound, RequestProfile};
use crate::core::turn::{ConversationTurn, Mode};

pub struct App {
    pub transcript: Vec<ConversationTurn>,
    pub pending: Option<PendingPrompt>,
    pub input_locked: bool,
    /// The outstanding request. Responses for any other sequence are stale.
    pub in_flight: Option<Outbound>,
    /// The most recently sent request, kept after it resolves.
    pub last_sent: Option<AgentRequest>,
    pub next_seq: u64,
    pub capabilities: SurfaceCapabilities,
    pub profile: RequestProfile,
    pub session_id: Option<String>,
    pub mode: Option<Mode>,
    pub status_message: String,
}

impl App {
    pub fn new(profile: RequestProfile, capabilities: SurfaceCapabilities) -> Self {
        Self {
            transcript: Vec::new(),
            pending: None,
            input_locked: false,
            in_flight: None,
            last_sent: None,
            next_seq: 1,
            capabilities,
            profile,
            session_id: None,
            mode: None,
            status_message: String::from("Where are we going next?"),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let profile = RequestProfile {
            user_id: config.user_id.clone(),
            trip_id: config.trip_id.clone(),
            locale: config.locale.clone(),
            timezone: config.timezone.clone(),
            llm_provider: config.llm_provider,
            entry_point: Some(config.entry_point.clone()),
            read_only: config.read_only,
        };
        let capabilities = match config.surface {
            Surface::Agent => SurfaceCapabilities::agent_chat(),
            Surface::Planning => SurfaceCapabilities::planning_assistant(),
            Surface::Journey => SurfaceCapabilities::journey_assistant(),
        };
        Self::new(profile, capabilities)
    }

    /// Hands out the next request sequence number.
    pub fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the latest turn offers a retry.
    pub fn can_retry(&self) -> bool {
        !self.input_locked && crate::core::turn::retry_target(&self.transcript).is_some()
    }
}
