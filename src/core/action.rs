//! # Actions
//!
//! Everything that can happen in a conversation becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend responds? That's `Action::ResponseReceived { seq, result }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns the single `Effect` the adapter must carry out. No I/O
//! happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Every request is tagged with a sequence number. A response whose sequence
//! is not the outstanding one is dropped without touching the transcript.

use std::time::Duration;

use log::{debug, error, info, warn};

use crate::core::insight::{self, TripInsight};
use crate::core::projector::{self, THINKING_TEXT};
use crate::core::prompt::{self, ApprovalDecision, ConsentDecision, PendingPrompt};
use crate::core::request::Outbound;
use crate::core::result::BackendResult;
use crate::core::session;
use crate::core::state::App;
use crate::core::turn::{self, ConversationTurn, Role, TurnStatus};

#[derive(Debug, Clone)]
pub enum Action {
    Submit(String),
    ResponseReceived { seq: u64, result: BackendResult },
    /// No usable response was obtained for `seq`. `message` is text the
    /// backend itself supplied for the user, if any.
    RequestFailed {
        seq: u64,
        error: String,
        message: Option<String>,
    },
    Retry,
    ConsentResolved(ConsentDecision),
    ApprovalResolved(ApprovalDecision),
    PromptExpired,
    RedirectDue,
    /// A result pushed by the backend after an approval, not tied to a send.
    ContinuationReceived(BackendResult),
    InsightLoaded(TripInsight),
    NewSession,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    Send(Outbound),
    /// Fire `Action::RedirectDue` after `delay`.
    ScheduleRedirect { delay: Duration },
    Navigate(String),
    /// Forget the stored session and remember this one instead.
    ResetSession(String),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => submit(app, text),
        Action::ResponseReceived { seq, result } => receive(app, seq, &result),
        Action::RequestFailed {
            seq,
            error,
            message,
        } => {
            if is_outstanding(app, seq) {
                error!("Request {} failed without a response: {}", seq, error);
            }
            receive(app, seq, &BackendResult::transport_failure(message))
        }
        Action::Retry => retry(app),
        Action::ConsentResolved(decision) => resolve_consent(app, decision),
        Action::ApprovalResolved(decision) => resolve_approval(app, decision),
        Action::PromptExpired => match app.pending {
            Some(PendingPrompt::Consent { .. }) => {
                info!("Consent prompt expired; treating as declined");
                resolve_consent(app, ConsentDecision::Declined)
            }
            Some(PendingPrompt::Approval { .. }) => {
                info!("Approval prompt expired; treating as rejected");
                resolve_approval(app, ApprovalDecision::Rejected)
            }
            _ => Effect::None,
        },
        Action::RedirectDue => match app.pending.take() {
            Some(PendingPrompt::Redirect { target, .. }) => {
                app.input_locked = false;
                app.status_message = format!("Opening {target}");
                Effect::Navigate(target)
            }
            other => {
                debug!("Redirect fired with no redirect pending ({:?})", other);
                app.pending = other;
                Effect::None
            }
        },
        Action::ContinuationReceived(result) => continuation(app, &result),
        Action::InsightLoaded(insight) => {
            if app.transcript.is_empty() {
                app.transcript.push(ConversationTurn::assistant(
                    insight::greeting(&insight),
                    TurnStatus::Done,
                ));
            }
            Effect::None
        }
        Action::NewSession => {
            let id = session::new_session_id();
            info!("Starting new session {}", id);
            app.transcript.clear();
            app.pending = None;
            app.input_locked = false;
            app.in_flight = None;
            app.last_sent = None;
            app.mode = None;
            app.session_id = Some(id.clone());
            app.status_message = String::from("New conversation");
            Effect::ResetSession(id)
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App, text: String) -> Effect {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Effect::None;
    }
    if app.input_locked || app.is_awaiting_response() {
        warn!("Ignoring submit while input is locked");
        app.status_message = String::from("Hang on, still working on the last one");
        return Effect::None;
    }

    // A new turn discards any leftover prompt, and settles an informational
    // turn whose continuation never arrived.
    app.pending = None;
    if let Some(last) = app
        .transcript
        .last_mut()
        .filter(|t| t.is_placeholder())
    {
        debug!("Settling idle placeholder {} before a new turn", last.id);
        let settled = ConversationTurn::replacing(last, last.text.clone(), TurnStatus::Done);
        *last = settled;
    }

    let seq = app.take_seq();
    let request = app
        .profile
        .build(seq, &text, &app.transcript, app.session_id.as_deref());
    app.transcript.push(ConversationTurn::user(text));
    send(app, Outbound { seq, request })
}

/// Appends the in-flight placeholder, locks input and hands the request out.
fn send(app: &mut App, outbound: Outbound) -> Effect {
    if !app.transcript.last().is_some_and(ConversationTurn::is_placeholder) {
        app.transcript.push(ConversationTurn::placeholder(THINKING_TEXT));
    }
    info!(
        "Sending request seq={} id={}",
        outbound.seq, outbound.request.request_id
    );
    app.in_flight = Some(outbound.clone());
    app.last_sent = Some(outbound.request.clone());
    app.input_locked = true;
    app.status_message = String::from("Thinking...");
    Effect::Send(outbound)
}

fn is_outstanding(app: &App, seq: u64) -> bool {
    app.in_flight.as_ref().is_some_and(|o| o.seq == seq)
}

fn receive(app: &mut App, seq: u64, result: &BackendResult) -> Effect {
    if !is_outstanding(app, seq) {
        warn!(
            "Discarding stale response seq={} (outstanding: {:?})",
            seq,
            app.in_flight.as_ref().map(|o| o.seq)
        );
        return Effect::None;
    }
    let Some(outbound) = app.in_flight.take() else {
        return Effect::None;
    };
    debug!("Projecting response seq={} status={:?}", seq, result.status);
    apply(app, result, &outbound)
}

fn apply(app: &mut App, result: &BackendResult, outbound: &Outbound) -> Effect {
    let transcript = std::mem::take(&mut app.transcript);
    let projection = projector::project(transcript, result, &outbound.request, app.capabilities);

    app.transcript = projection.transcript;
    app.pending = projection.pending;
    app.input_locked = projection.input_locked;
    if let Some(mode) = app.transcript.last().and_then(|t| t.mode) {
        app.mode = Some(mode);
    }

    app.status_message = match &app.pending {
        Some(PendingPrompt::Consent { .. }) => String::from("/allow or /deny browsing"),
        Some(PendingPrompt::Approval { .. }) => String::from("/approve or /reject"),
        Some(PendingPrompt::Redirect { target, .. }) => format!("Redirecting to {target}..."),
        None if app.can_retry() => String::from("/retry to send again"),
        None => String::new(),
    };

    if let Some(pending) = &app.pending {
        info!("Result for seq={} opened a {} prompt", outbound.seq, pending.kind());
    }
    match &app.pending {
        Some(PendingPrompt::Redirect { delay, .. }) => Effect::ScheduleRedirect { delay: *delay },
        _ => Effect::None,
    }
}

fn retry(app: &mut App) -> Effect {
    if app.input_locked || app.is_awaiting_response() {
        return Effect::None;
    }
    let Some(failed_idx) = turn::retry_target(&app.transcript) else {
        debug!("Retry requested but latest assistant turn has not failed");
        return Effect::None;
    };
    let Some(user_idx) = app.transcript[..failed_idx]
        .iter()
        .rposition(|t| t.role == Role::User)
    else {
        warn!("Retry requested but no user message to resend");
        return Effect::None;
    };

    app.transcript.remove(failed_idx);
    let text = app.transcript[user_idx].text.clone();
    let seq = app.take_seq();
    // Resend what actually went out (browse permission included) when it
    // belongs to this message; otherwise rebuild from the transcript.
    let request = match app.last_sent.as_ref().filter(|r| r.message == text) {
        Some(previous) => previous.resent(seq),
        None => app.profile.build(
            seq,
            &text,
            &app.transcript[..user_idx],
            app.session_id.as_deref(),
        ),
    };
    info!(
        "Retrying last message as seq={} webbrowse={}",
        seq, request.options.allow_webbrowse
    );
    send(app, Outbound { seq, request })
}

fn resolve_consent(app: &mut App, decision: ConsentDecision) -> Effect {
    let Some(PendingPrompt::Consent { request, .. }) = app.pending.take() else {
        warn!("Consent decision with no consent prompt pending");
        return Effect::None;
    };
    prompt::resolve_consent(&mut app.transcript, decision);

    match decision {
        ConsentDecision::Declined => {
            info!("Consent declined for {}", request.request_id);
            app.input_locked = false;
            app.status_message = String::new();
            Effect::None
        }
        ConsentDecision::Accepted => {
            let seq = app.take_seq();
            info!("Consent granted; replaying {} as seq={}", request.request_id, seq);
            let replay = request.with_browsing_allowed(seq);
            send(app, Outbound { seq, request: replay })
        }
    }
}

fn resolve_approval(app: &mut App, decision: ApprovalDecision) -> Effect {
    let Some(PendingPrompt::Approval { approval_id, .. }) = app.pending.take() else {
        warn!("Approval decision with no approval prompt pending");
        return Effect::None;
    };
    info!("Approval {} resolved: {:?}", approval_id, decision);
    prompt::resolve_approval(&mut app.transcript, decision);
    app.input_locked = false;
    app.status_message = String::new();
    Effect::None
}

/// Fills the idle informational turn left by an approval. If that turn was
/// already settled by a newer submit, the continuation is added as its own
/// turn, ahead of any in-flight placeholder, and cannot open a prompt.
fn continuation(app: &mut App, result: &BackendResult) -> Effect {
    let Some(user_idx) = app.transcript.iter().rposition(|t| t.role == Role::User) else {
        warn!("Ignoring pushed continuation: no user message in transcript");
        return Effect::None;
    };
    let text = app.transcript[user_idx].text.clone();
    let request = app.profile.build(
        0,
        &text,
        &app.transcript[..user_idx],
        app.session_id.as_deref(),
    );

    let idle_placeholder = !app.is_awaiting_response()
        && app.transcript.last().is_some_and(ConversationTurn::is_placeholder);
    if idle_placeholder {
        return apply(app, result, &Outbound { seq: 0, request });
    }

    let projection = projector::project(
        vec![ConversationTurn::placeholder(THINKING_TEXT)],
        result,
        &request,
        app.capabilities,
    );
    if let Some(pending) = &projection.pending {
        warn!("Dropping {} prompt from a late continuation", pending.kind());
    }
    let Some(turn) = projection.transcript.into_iter().last() else {
        return Effect::None;
    };
    let at = if app.is_awaiting_response() {
        app.transcript.len().saturating_sub(1)
    } else {
        app.transcript.len()
    };
    info!("Late continuation added as a separate turn at {}", at);
    app.transcript.insert(at, turn);
    Effect::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::insight::TripSummary;
    use crate::core::projector::REDIRECT_DELAY;
    use crate::core::result::{
        ApprovalMarker, Clarification, ConsentDescriptor, RedirectDescriptor, ResultStatus,
    };
    use crate::core::turn::FailureKind;
    use crate::test_support::{backend_result, test_app};

    fn sent(effect: Effect) -> Outbound {
        match effect {
            Effect::Send(outbound) => outbound,
            other => panic!("expected Send, got {:?}", other),
        }
    }

    fn ok(text: &str) -> BackendResult {
        let mut r = backend_result(ResultStatus::Ok);
        r.payload.answer_text = Some(text.to_string());
        r
    }

    #[test]
    fn test_submit_appends_user_and_placeholder_and_locks() {
        let mut app = test_app();
        let outbound = sent(update(&mut app, Action::Submit("  Plan Kyoto  ".into())));

        assert_eq!(outbound.request.message, "Plan Kyoto");
        assert_eq!(app.transcript.len(), 2);
        assert_eq!(app.transcript[0].role, Role::User);
        assert!(app.transcript[1].is_placeholder());
        assert!(app.input_locked);
    }

    #[test]
    fn test_submit_blank_is_noop() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Submit("   ".into())), Effect::None);
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn test_submit_while_locked_is_ignored() {
        let mut app = test_app();
        sent(update(&mut app, Action::Submit("first".into())));
        assert_eq!(update(&mut app, Action::Submit("second".into())), Effect::None);
        assert_eq!(app.transcript.len(), 2);
    }

    #[test]
    fn test_ok_response_unlocks() {
        let mut app = test_app();
        let outbound = sent(update(&mut app, Action::Submit("hi".into())));
        let effect = update(
            &mut app,
            Action::ResponseReceived {
                seq: outbound.seq,
                result: ok("hello!"),
            },
        );

        assert_eq!(effect, Effect::None);
        assert!(!app.input_locked);
        assert!(app.in_flight.is_none());
        assert_eq!(app.transcript.last().unwrap().text, "hello!");
        assert_eq!(app.transcript.last().unwrap().status, Some(TurnStatus::Done));
    }

    #[test]
    fn test_transport_failure_then_retry_resends_exact_text() {
        let mut app = test_app();
        let original = "Budget ≈ ¥8000, 5 days\n(flexible)";
        let first = sent(update(&mut app, Action::Submit(original.into())));
        update(
            &mut app,
            Action::RequestFailed {
                seq: first.seq,
                error: "connection refused".into(),
                message: None,
            },
        );
        assert!(app.can_retry());
        assert_eq!(app.transcript.last().unwrap().failure, Some(FailureKind::Generic));

        let second = sent(update(&mut app, Action::Retry));
        assert_eq!(second.request.message, original);
        assert!(second.seq > first.seq);
        assert_ne!(second.request.request_id, first.request.request_id);
        // user turn + fresh placeholder; the failed turn is gone
        assert_eq!(app.transcript.len(), 2);
        assert!(app.transcript[1].is_placeholder());
    }

    #[test]
    fn test_backend_error_message_becomes_failure_text() {
        let mut app = test_app();
        let first = sent(update(&mut app, Action::Submit("plan Lisbon".into())));
        update(
            &mut app,
            Action::RequestFailed {
                seq: first.seq,
                error: "backend error TRIP_NOT_FOUND: no such trip".into(),
                message: Some("That trip no longer exists.".into()),
            },
        );

        let last = app.transcript.last().unwrap();
        assert_eq!(last.text, "That trip no longer exists.");
        assert_eq!(last.failure, Some(FailureKind::Generic));
        assert!(app.can_retry());
    }

    #[test]
    fn test_retry_after_consent_keeps_browse_permission() {
        let mut app = test_app();
        consent_pending(&mut app);
        let replay = sent(update(&mut app, Action::ConsentResolved(ConsentDecision::Accepted)));
        update(
            &mut app,
            Action::ResponseReceived {
                seq: replay.seq,
                result: backend_result(ResultStatus::Failed),
            },
        );
        assert!(app.can_retry());

        let retried = sent(update(&mut app, Action::Retry));
        assert!(retried.request.options.allow_webbrowse);
        assert_eq!(retried.request.message, replay.request.message);
        assert_eq!(
            retried.request.conversation_context,
            replay.request.conversation_context
        );
        assert_ne!(retried.request.request_id, replay.request.request_id);
    }

    #[test]
    fn test_stale_response_does_not_touch_transcript() {
        let mut app = test_app();
        let a = sent(update(&mut app, Action::Submit("weather in Reykjavik?".into())));
        update(
            &mut app,
            Action::ResponseReceived {
                seq: a.seq,
                result: backend_result(ResultStatus::Timeout),
            },
        );
        let b = sent(update(&mut app, Action::Retry));
        let before = app.transcript.clone();

        let effect = update(
            &mut app,
            Action::ResponseReceived {
                seq: a.seq,
                result: ok("late answer for A"),
            },
        );

        assert_eq!(effect, Effect::None);
        assert_eq!(app.transcript, before);
        assert_eq!(app.in_flight.as_ref().map(|o| o.seq), Some(b.seq));
    }

    #[test]
    fn test_clarification_keeps_input_open() {
        let mut app = test_app();
        let outbound = sent(update(&mut app, Action::Submit("plan a trip".into())));
        let mut r = backend_result(ResultStatus::NeedMoreInfo);
        r.payload.clarification = Some(Clarification {
            message: Some("请问预算是多少？".to_string()),
            legacy: None,
        });
        update(&mut app, Action::ResponseReceived { seq: outbound.seq, result: r });

        let last = app.transcript.last().unwrap();
        assert_eq!(last.status, Some(TurnStatus::AwaitingUserInput));
        assert_eq!(last.text, "请问预算是多少？");
        assert!(!app.input_locked);
    }

    fn consent_pending(app: &mut App) -> Outbound {
        let outbound = sent(update(app, Action::Submit("is the Blue Lagoon open?".into())));
        let mut r = backend_result(ResultStatus::NeedConsent);
        r.payload.consent = Some(ConsentDescriptor { reason: None });
        update(app, Action::ResponseReceived { seq: outbound.seq, result: r });
        outbound
    }

    #[test]
    fn test_consent_blocks_input_until_resolved() {
        let mut app = test_app();
        consent_pending(&mut app);
        assert!(app.input_locked);
        assert!(matches!(app.pending, Some(PendingPrompt::Consent { .. })));
        assert_eq!(update(&mut app, Action::Submit("hello?".into())), Effect::None);
    }

    #[test]
    fn test_consent_declined_settles_turn() {
        let mut app = test_app();
        consent_pending(&mut app);
        update(&mut app, Action::ConsentResolved(ConsentDecision::Declined));

        let last = app.transcript.last().unwrap();
        assert_eq!(last.text, prompt::CONSENT_KEPT_AS_IS);
        assert_eq!(last.status, Some(TurnStatus::Done));
        assert!(!app.input_locked);
        assert!(app.pending.is_none());
    }

    #[test]
    fn test_consent_accepted_replays_with_browsing() {
        let mut app = test_app();
        let original = consent_pending(&mut app);
        let replay = sent(update(&mut app, Action::ConsentResolved(ConsentDecision::Accepted)));

        assert!(replay.request.options.allow_webbrowse);
        assert_eq!(replay.request.message, original.request.message);
        assert!(app.transcript.last().unwrap().is_placeholder());

        update(
            &mut app,
            Action::ResponseReceived {
                seq: replay.seq,
                result: ok("Open until 22:00."),
            },
        );
        assert_eq!(app.transcript.len(), 2);
        assert_eq!(app.transcript[1].text, "Open until 22:00.");
    }

    #[test]
    fn test_consent_expiry_behaves_as_decline() {
        let mut app = test_app();
        consent_pending(&mut app);
        update(&mut app, Action::PromptExpired);
        assert_eq!(
            app.transcript.last().unwrap().text,
            prompt::CONSENT_KEPT_AS_IS
        );
        assert!(!app.input_locked);
    }

    fn approval_pending(app: &mut App) {
        let outbound = sent(update(app, Action::Submit("book the hotel".into())));
        let mut r = backend_result(ResultStatus::NeedConfirmation);
        r.payload.approval = Some(ApprovalMarker {
            approval_id: Some("ap-9".to_string()),
            ..Default::default()
        });
        update(app, Action::ResponseReceived { seq: outbound.seq, result: r });
    }

    #[test]
    fn test_approval_resolution_appends_thinking_turn_without_resend() {
        let mut app = test_app();
        approval_pending(&mut app);
        assert!(app.input_locked);

        let effect = update(&mut app, Action::ApprovalResolved(ApprovalDecision::Approved));
        assert_eq!(effect, Effect::None);
        assert!(app.pending.is_none());
        assert!(!app.input_locked);
        assert_eq!(app.transcript.last().unwrap().text, prompt::APPROVAL_CONTINUING);
        assert!(app.transcript.last().unwrap().is_placeholder());
    }

    #[test]
    fn test_pushed_continuation_fills_informational_turn() {
        let mut app = test_app();
        approval_pending(&mut app);
        update(&mut app, Action::ApprovalResolved(ApprovalDecision::Approved));
        let len = app.transcript.len();

        update(&mut app, Action::ContinuationReceived(ok("Booked! Confirmation #A1.")));
        assert_eq!(app.transcript.len(), len);
        assert_eq!(app.transcript.last().unwrap().text, "Booked! Confirmation #A1.");
    }

    #[test]
    fn test_submit_before_continuation_settles_turn_and_keeps_result() {
        let mut app = test_app();
        approval_pending(&mut app);
        update(&mut app, Action::ApprovalResolved(ApprovalDecision::Approved));
        let informational = app.transcript.len() - 1;

        let next = sent(update(&mut app, Action::Submit("and dinner nearby?".into())));
        assert_eq!(
            app.transcript[informational].status,
            Some(TurnStatus::Done)
        );
        assert_eq!(app.transcript[informational].text, prompt::APPROVAL_CONTINUING);

        // The pushed result lands before the new in-flight placeholder.
        update(&mut app, Action::ContinuationReceived(ok("Booked! Confirmation #A1.")));
        let len = app.transcript.len();
        assert_eq!(app.transcript[len - 2].text, "Booked! Confirmation #A1.");
        assert_eq!(app.transcript[len - 2].status, Some(TurnStatus::Done));
        assert!(app.transcript[len - 1].is_placeholder());
        assert!(app.input_locked);

        update(
            &mut app,
            Action::ResponseReceived {
                seq: next.seq,
                result: ok("Try the izakaya on the corner."),
            },
        );
        assert_eq!(app.transcript.last().unwrap().text, "Try the izakaya on the corner.");
        assert!(app.transcript.iter().all(|t| !t.is_placeholder()));
    }

    #[test]
    fn test_continuation_without_placeholder_is_appended() {
        let mut app = test_app();
        let outbound = sent(update(&mut app, Action::Submit("hi".into())));
        update(&mut app, Action::ResponseReceived { seq: outbound.seq, result: ok("hey") });
        let before = app.transcript.len();

        update(&mut app, Action::ContinuationReceived(ok("surprise")));
        assert_eq!(app.transcript.len(), before + 1);
        assert_eq!(app.transcript.last().unwrap().text, "surprise");
        assert!(!app.input_locked);
    }

    #[test]
    fn test_redirect_schedules_then_navigates_and_unlocks() {
        let mut app = test_app();
        let outbound = sent(update(&mut app, Action::Submit("edit my trip".into())));
        let mut r = backend_result(ResultStatus::RedirectRequired);
        r.payload.redirect = Some(RedirectDescriptor {
            target: "/trips/42/edit".to_string(),
            reason: None,
        });

        let effect = update(&mut app, Action::ResponseReceived { seq: outbound.seq, result: r });
        assert_eq!(effect, Effect::ScheduleRedirect { delay: REDIRECT_DELAY });
        assert!(app.input_locked);

        let effect = update(&mut app, Action::RedirectDue);
        assert_eq!(effect, Effect::Navigate("/trips/42/edit".to_string()));
        assert!(!app.input_locked);
        assert!(app.pending.is_none());
    }

    #[test]
    fn test_redirect_due_without_redirect_is_noop() {
        let mut app = test_app();
        approval_pending(&mut app);
        assert_eq!(update(&mut app, Action::RedirectDue), Effect::None);
        assert!(matches!(app.pending, Some(PendingPrompt::Approval { .. })));
    }

    #[test]
    fn test_new_session_resets_and_drops_in_flight() {
        let mut app = test_app();
        let outbound = sent(update(&mut app, Action::Submit("hi".into())));

        let effect = update(&mut app, Action::NewSession);
        let Effect::ResetSession(id) = effect else {
            panic!("expected ResetSession");
        };
        assert_eq!(app.session_id.as_deref(), Some(id.as_str()));
        assert!(app.transcript.is_empty());

        update(&mut app, Action::ResponseReceived { seq: outbound.seq, result: ok("late") });
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn test_insight_greets_only_empty_transcript() {
        let mut app = test_app();
        let insight = TripInsight {
            trip_summary: Some(TripSummary {
                destination: Some("Lisbon".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        update(&mut app, Action::InsightLoaded(insight.clone()));
        assert_eq!(app.transcript.len(), 1);

        update(&mut app, Action::InsightLoaded(insight));
        assert_eq!(app.transcript.len(), 1);
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
