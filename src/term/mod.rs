//! # Terminal Adapter
//!
//! Line-oriented conversation surface. Reads lines from stdin, turns them into
//! `core::Action`s, runs `update()`, and carries out the returned `Effect`:
//! backend calls and timers run as tokio tasks that report back through the
//! same action channel.
//!
//! ```text
//!   stdin ──▶ parse_line ──┐
//!                          ▼
//!   tasks ──▶ action_rx ──▶ update(app, action) ──▶ Effect ──▶ execute()
//!     ▲                                                          │
//!     └────────────── spawn request / schedule timer ────────────┘
//! ```
//!
//! This is the only module that does I/O on behalf of a conversation.

pub mod render;
pub mod scheduler;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::AbortHandle;

use crate::api::{AgentBackend, HttpBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::prompt::{ApprovalDecision, ConsentDecision, PendingPrompt};
use crate::core::scheduler::{Scheduler, TaskId};
use crate::core::session::{self, FileSessionStore, MemorySessionStore, SessionStore};
use crate::core::state::App;
use crate::core::turn::ConversationTurn;
use crate::term::scheduler::TokioScheduler;

/// How long an unanswered consent or approval prompt stays open.
pub const PROMPT_EXPIRY: Duration = Duration::from_secs(300);

/// What a line of user input means.
#[derive(Debug, Clone)]
pub enum Input {
    Act(Action),
    Help,
    Unknown(String),
    Empty,
}

pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    if !trimmed.starts_with('/') {
        return Input::Act(Action::Submit(line.trim_end_matches(['\r', '\n']).to_string()));
    }
    match trimmed {
        "/retry" => Input::Act(Action::Retry),
        "/allow" => Input::Act(Action::ConsentResolved(ConsentDecision::Accepted)),
        "/deny" => Input::Act(Action::ConsentResolved(ConsentDecision::Declined)),
        "/approve" => Input::Act(Action::ApprovalResolved(ApprovalDecision::Approved)),
        "/reject" => Input::Act(Action::ApprovalResolved(ApprovalDecision::Rejected)),
        "/new" => Input::Act(Action::NewSession),
        "/quit" | "/exit" => Input::Act(Action::Quit),
        "/help" => Input::Help,
        other => Input::Unknown(other.to_string()),
    }
}

/// Owns one conversation surface: the core `App` plus everything needed to
/// execute its effects.
pub struct Runner<W: Write> {
    app: App,
    backend: Arc<dyn AgentBackend>,
    store: Arc<dyn SessionStore>,
    scheduler: TokioScheduler,
    tx: UnboundedSender<Action>,
    request_task: Option<AbortHandle>,
    /// The prompt an expiry timer is running for.
    expiry: Option<(PendingPrompt, TaskId)>,
    shown: Vec<ConversationTurn>,
    shown_pending: Option<PendingPrompt>,
    shown_status: String,
    out: W,
}

impl<W: Write> Runner<W> {
    pub fn new(
        app: App,
        backend: Arc<dyn AgentBackend>,
        store: Arc<dyn SessionStore>,
        tx: UnboundedSender<Action>,
        out: W,
    ) -> Self {
        Self {
            app,
            backend,
            store,
            scheduler: TokioScheduler::new(tx.clone()),
            tx,
            request_task: None,
            expiry: None,
            shown: Vec::new(),
            shown_pending: None,
            shown_status: String::new(),
            out,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Resumes or creates the session and kicks off the trip insight fetch.
    pub fn start(&mut self) -> io::Result<()> {
        let session_id = session::resume_or_create(self.store.as_ref());
        info!("Using session {}", session_id);
        self.app.session_id = Some(session_id);

        if let Some(trip_id) = self.app.profile.trip_id.clone() {
            let backend = self.backend.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                match backend.trip_insight(&trip_id).await {
                    Ok(insight) => {
                        if tx.send(Action::InsightLoaded(insight)).is_err() {
                            warn!("Trip insight arrived after the surface closed");
                        }
                    }
                    Err(e) => warn!("Trip insight for {} unavailable: {}", trip_id, e),
                }
            });
        }

        writeln!(self.out, "Tripmate. Type /help for commands.")?;
        self.render()
    }

    /// Runs one action through the core and executes its effect.
    /// Returns `true` when the surface should exit.
    pub fn dispatch(&mut self, action: Action) -> io::Result<bool> {
        debug!("Dispatching {:?}", action);
        let effect = update(&mut self.app, action);
        let quit = self.execute(effect)?;
        self.sync_prompt_expiry();
        self.render()?;
        Ok(quit)
    }

    fn execute(&mut self, effect: Effect) -> io::Result<bool> {
        match effect {
            Effect::None => {}
            Effect::Quit => {
                self.shutdown();
                return Ok(true);
            }
            Effect::Send(outbound) => {
                if let Some(previous) = self.request_task.take() {
                    previous.abort();
                }
                let backend = self.backend.clone();
                let tx = self.tx.clone();
                let handle = tokio::spawn(async move {
                    let seq = outbound.seq;
                    let action = match backend.route_and_run(&outbound.request).await {
                        Ok(result) => Action::ResponseReceived { seq, result },
                        Err(e) => Action::RequestFailed {
                            seq,
                            message: e.backend_message().map(str::to_string),
                            error: e.to_string(),
                        },
                    };
                    if tx.send(action).is_err() {
                        warn!("Response for seq={} arrived after the surface closed", seq);
                    }
                });
                self.request_task = Some(handle.abort_handle());
            }
            Effect::ScheduleRedirect { delay } => {
                self.scheduler.schedule(delay, Action::RedirectDue);
            }
            Effect::Navigate(target) => {
                info!("Navigating to {}", target);
                writeln!(self.out, "-> {target}")?;
            }
            Effect::ResetSession(session_id) => {
                if let Some(task) = self.request_task.take() {
                    task.abort();
                }
                self.scheduler.cancel_all();
                self.expiry = None;
                session::replace(self.store.as_ref(), &session_id);
                self.shown.clear();
                self.shown_pending = None;
                writeln!(self.out, "--- new conversation ---")?;
            }
        }
        Ok(false)
    }

    /// Keeps exactly one expiry timer running for an open consent or approval prompt.
    fn sync_prompt_expiry(&mut self) {
        let expirable = match &self.app.pending {
            Some(p @ (PendingPrompt::Consent { .. } | PendingPrompt::Approval { .. })) => Some(p),
            _ => None,
        };
        if self.expiry.as_ref().map(|(p, _)| p) == expirable {
            return;
        }
        if let Some((_, id)) = self.expiry.take() {
            self.scheduler.cancel(id);
        }
        if let Some(prompt) = expirable {
            let id = self.scheduler.schedule(PROMPT_EXPIRY, Action::PromptExpired);
            self.expiry = Some((prompt.clone(), id));
        }
    }

    /// Prints whatever changed since the last render.
    fn render(&mut self) -> io::Result<()> {
        let start = render::first_change(&self.shown, &self.app.transcript);
        for turn in &self.app.transcript[start..] {
            write!(self.out, "{}", render::turn(turn, render::WRAP_WIDTH))?;
        }
        self.shown = self.app.transcript.clone();

        if self.app.pending != self.shown_pending {
            if let Some(pending) = &self.app.pending {
                writeln!(self.out, "{}", render::prompt(pending))?;
            }
            self.shown_pending = self.app.pending.clone();
        }
        if self.app.status_message != self.shown_status {
            if !self.app.status_message.is_empty() {
                writeln!(self.out, "  ({})", self.app.status_message)?;
            }
            self.shown_status = self.app.status_message.clone();
        }
        self.out.flush()
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.request_task.take() {
            task.abort();
        }
        self.scheduler.cancel_all();
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}

/// Runs the terminal surface until `/quit` or end of input.
pub async fn run(config: ResolvedConfig) -> io::Result<()> {
    let backend = HttpBackend::new(config.base_url.clone(), config.timeout_secs)
        .map_err(io::Error::other)?;
    let store: Arc<dyn SessionStore> = match FileSessionStore::default_location() {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Session file unavailable ({}), session will not persist", e);
            Arc::new(MemorySessionStore::default())
        }
    };
    info!(
        "Starting {:?} surface against {}",
        config.surface, config.base_url
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runner = Runner::new(
        App::from_config(&config),
        Arc::new(backend),
        store,
        tx,
        io::stdout(),
    );
    runner.start()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let action = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_line(&line) {
                    Input::Act(action) => action,
                    Input::Help => {
                        runner.print(render::HELP)?;
                        continue;
                    }
                    Input::Unknown(command) => {
                        runner.print(&format!("Unknown command {command}. Type /help."))?;
                        continue;
                    }
                    Input::Empty => continue,
                },
                Ok(None) => Action::Quit,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    Action::Quit
                }
            },
            Some(action) = rx.recv() => action,
        };

        if runner.dispatch(action)? {
            break;
        }
    }

    info!("Tripmate shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::core::insight::{TripInsight, TripSummary};
    use crate::core::request::AgentRequest;
    use crate::core::result::{BackendResult, ConsentDescriptor, RedirectDescriptor, ResultStatus};
    use crate::test_support::test_app;
    use async_trait::async_trait;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Answers every request with the same result.
    struct CannedBackend {
        result: BackendResult,
    }

    #[async_trait]
    impl AgentBackend for CannedBackend {
        async fn route_and_run(&self, _request: &AgentRequest) -> Result<BackendResult, ApiError> {
            Ok(self.result.clone())
        }

        async fn trip_insight(&self, _trip_id: &str) -> Result<TripInsight, ApiError> {
            Ok(TripInsight {
                trip_summary: Some(TripSummary {
                    destination: Some("Kyoto".to_string()),
                    days: Some(4),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }
    }

    struct DownBackend;

    #[async_trait]
    impl AgentBackend for DownBackend {
        async fn route_and_run(&self, _request: &AgentRequest) -> Result<BackendResult, ApiError> {
            Err(ApiError::Network("connection refused".to_string()))
        }

        async fn trip_insight(&self, _trip_id: &str) -> Result<TripInsight, ApiError> {
            Err(ApiError::Network("connection refused".to_string()))
        }
    }

    fn runner(
        backend: impl AgentBackend + 'static,
    ) -> (Runner<Vec<u8>>, UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Runner::new(
            test_app(),
            Arc::new(backend),
            Arc::new(MemorySessionStore::default()),
            tx,
            Vec::new(),
        );
        (runner, rx)
    }

    fn printed(runner: &Runner<Vec<u8>>) -> String {
        String::from_utf8_lossy(runner.output()).into_owned()
    }

    fn ok(text: &str) -> BackendResult {
        let mut result = BackendResult::new(ResultStatus::Ok);
        result.payload.answer_text = Some(text.to_string());
        result
    }

    #[test]
    fn test_parse_line_commands() {
        assert!(matches!(parse_line("/retry"), Input::Act(Action::Retry)));
        assert!(matches!(
            parse_line(" /allow "),
            Input::Act(Action::ConsentResolved(ConsentDecision::Accepted))
        ));
        assert!(matches!(
            parse_line("/reject"),
            Input::Act(Action::ApprovalResolved(ApprovalDecision::Rejected))
        ));
        assert!(matches!(parse_line("/quit"), Input::Act(Action::Quit)));
        assert!(matches!(parse_line("/help"), Input::Help));
        assert!(matches!(parse_line("/fly"), Input::Unknown(_)));
        assert!(matches!(parse_line("   "), Input::Empty));
    }

    #[test]
    fn test_parse_line_keeps_message_text() {
        match parse_line("  Kyoto, 3 days  ") {
            Input::Act(Action::Submit(text)) => assert_eq!(text, "  Kyoto, 3 days  "),
            other => panic!("expected Submit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_round_trip_prints_answer() {
        let (mut runner, mut rx) = runner(CannedBackend {
            result: ok("Kyoto in autumn is lovely."),
        });
        runner.start().unwrap();
        assert!(runner.app().session_id.is_some());

        runner.dispatch(Action::Submit("Plan Kyoto".into())).unwrap();
        assert!(runner.app().input_locked);

        // Trip insight and the response both come back through the channel.
        while runner.app().is_awaiting_response() {
            let action = rx.recv().await.unwrap();
            runner.dispatch(action).unwrap();
        }

        let out = printed(&runner);
        assert!(out.contains("you>\n  Plan Kyoto"));
        assert!(out.contains("Kyoto in autumn is lovely."));
        assert!(!runner.app().input_locked);
    }

    #[tokio::test]
    async fn test_transport_failure_offers_retry() {
        let (mut runner, mut rx) = runner(DownBackend);
        runner.dispatch(Action::Submit("hello".into())).unwrap();
        let action = rx.recv().await.unwrap();
        assert!(matches!(action, Action::RequestFailed { .. }));
        runner.dispatch(action).unwrap();

        assert!(runner.app().can_retry());
        let out = printed(&runner);
        assert!(out.contains("tripmate [failed]>"));
        assert!(out.contains("/retry"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_fires_after_delay() {
        let mut result = BackendResult::new(ResultStatus::RedirectRequired);
        result.payload.redirect = Some(RedirectDescriptor {
            target: "/trips/42/edit".to_string(),
            reason: None,
        });
        let (mut runner, mut rx) = runner(CannedBackend { result });

        runner.dispatch(Action::Submit("edit my trip".into())).unwrap();
        let response = rx.recv().await.unwrap();
        runner.dispatch(response).unwrap();
        assert!(runner.app().input_locked);

        let due = rx.recv().await.unwrap();
        assert!(matches!(due, Action::RedirectDue));
        runner.dispatch(due).unwrap();

        assert!(!runner.app().input_locked);
        assert!(printed(&runner).contains("-> /trips/42/edit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_consent_expires() {
        let mut result = BackendResult::new(ResultStatus::NeedConsent);
        result.payload.consent = Some(ConsentDescriptor { reason: None });
        let (mut runner, mut rx) = runner(CannedBackend { result });

        runner.dispatch(Action::Submit("is it open?".into())).unwrap();
        let response = rx.recv().await.unwrap();
        runner.dispatch(response).unwrap();
        assert!(matches!(runner.app().pending, Some(PendingPrompt::Consent { .. })));

        let expired = rx.recv().await.unwrap();
        assert!(matches!(expired, Action::PromptExpired));
        runner.dispatch(expired).unwrap();
        assert!(runner.app().pending.is_none());
        assert!(!runner.app().input_locked);
    }

    #[tokio::test]
    async fn test_new_session_replaces_stored_id() {
        let store = Arc::new(MemorySessionStore::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut runner = Runner::new(
            test_app(),
            Arc::new(DownBackend),
            store.clone(),
            tx,
            Vec::new(),
        );
        runner.start().unwrap();
        let first = store.load().unwrap();

        runner.dispatch(Action::NewSession).unwrap();
        let second = store.load().unwrap();
        assert_ne!(first, second);
        assert_eq!(runner.app().session_id.as_deref(), Some(second.as_str()));
        assert!(printed(&runner).contains("--- new conversation ---"));
    }
}
