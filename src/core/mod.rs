//! # Core Conversation Logic
//!
//! Everything that decides what a conversation looks like after a backend
//! response. It knows nothing about terminals or HTTP.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │            CORE             │
//!                    │                             │
//!                    │  • App (transcript, prompt) │
//!                    │  • Action / Effect          │
//!                    │  • update() (reducer)       │
//!                    │  • project() (responses)    │
//!                    │                             │
//!                    │  No I/O. Pure.              │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                 ┌─────────────────┼─────────────────┐
//!                 ▼                 ▼                 ▼
//!          ┌────────────┐    ┌────────────┐    ┌────────────┐
//!          │  Terminal  │    │   Agent    │    │  Session   │
//!          │  Adapter   │    │  Backend   │    │   Store    │
//!          │  (term)    │    │  (api)     │    │  (file)    │
//!          └────────────┘    └────────────┘    └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`turn`]: `ConversationTurn` and its status vocabulary
//! - [`result`]: `BackendResult`, the normalized backend response
//! - [`projector`]: `project()`, response to transcript + prompt
//! - [`prompt`]: consent / approval / redirect prompts
//! - [`action`]: `update()`, the only place `App` changes
//!
//! `session`, `scheduler` and `config` sit at the edge: they are traits and
//! helpers the adapters use, not conversation logic. The tokio scheduler
//! itself lives in `term`.

pub mod action;
pub mod config;
pub mod decision_log;
pub mod insight;
pub mod projector;
pub mod prompt;
pub mod request;
pub mod result;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod turn;
