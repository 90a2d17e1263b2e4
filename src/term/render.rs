//! Plain-text rendering of turns and prompts.
//!
//! Everything here returns `String`s; the caller decides where they go.
//! Body text is wrapped with `textwrap` and indented under a one-line header.

use crate::core::decision_log::DecisionLogEntry;
use crate::core::prompt::PendingPrompt;
use crate::core::turn::{
    ConversationTurn, FailureKind, Mode, OrchestrationProgress, Role, RouteInfo, RouteType,
};

/// Column width used for wrapping turn bodies.
pub const WRAP_WIDTH: usize = 78;

const INDENT: &str = "  ";

fn wrap_options(width: usize) -> textwrap::Options<'static> {
    textwrap::Options::new(width.max(20))
        .initial_indent(INDENT)
        .subsequent_indent(INDENT)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Wraps each paragraph separately so blank lines and list items survive.
fn wrap_body(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                textwrap::fill(line, wrap_options(width))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn header(turn: &ConversationTurn) -> String {
    match turn.role {
        Role::User => "you>".to_string(),
        Role::Assistant => {
            let tag = match (turn.failure, turn.status) {
                (Some(FailureKind::Timeout), _) => Some("timed out"),
                (Some(FailureKind::Generic), _) => Some("failed"),
                (None, Some(status)) => Some(status.label()),
                (None, None) => None,
            };
            match (tag, turn.mode) {
                (Some(tag), Some(mode)) => format!("tripmate [{tag}, {}]>", mode_label(mode)),
                (Some(tag), None) => format!("tripmate [{tag}]>"),
                (None, _) => "tripmate>".to_string(),
            }
        }
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Fast => "fast",
        Mode::Slow => "slow",
    }
}

fn route_label(route: RouteType) -> &'static str {
    match route {
        RouteType::System1Api => "api",
        RouteType::System1Rag => "knowledge",
        RouteType::System2Reasoning => "reasoning",
        RouteType::System2WebBrowse => "web",
    }
}

fn route_line(route: Option<RouteType>, info: Option<&RouteInfo>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(route) = route {
        parts.push(format!("route: {}", route_label(route)));
    }
    if let Some(info) = info {
        if let Some(confidence) = info.confidence {
            parts.push(format!("confidence {:.0}%", confidence * 100.0));
        }
        if let Some(ms) = info.latency_ms {
            parts.push(format!("{ms} ms"));
        }
        if let Some(tokens) = info.tokens_est {
            parts.push(format!("~{tokens} tokens"));
        }
        if let Some(cost) = info.cost_est_usd {
            parts.push(format!("${cost:.4}"));
        }
    }
    (!parts.is_empty()).then(|| format!("{INDENT}({})", parts.join(" | ")))
}

fn progress_line(progress: &OrchestrationProgress) -> String {
    match &progress.message {
        Some(message) => format!("{INDENT}[{} {}%] {}", progress.phase, progress.percent, message),
        None => format!("{INDENT}[{} {}%]", progress.phase, progress.percent),
    }
}

fn decision_lines(log: &[DecisionLogEntry]) -> String {
    log.iter()
        .map(|entry| {
            let detail = entry
                .outputs_summary
                .as_deref()
                .or(entry.inputs_summary.as_deref())
                .unwrap_or("");
            if detail.is_empty() {
                format!("{INDENT}  - {}", entry.step)
            } else {
                format!("{INDENT}  - {}: {}", entry.step, detail)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One turn: header line, wrapped body, then any attachments.
pub fn turn(turn: &ConversationTurn, width: usize) -> String {
    let mut out = header(turn);
    out.push('\n');
    out.push_str(&wrap_body(&turn.text, width));

    if let Some(progress) = &turn.progress {
        out.push('\n');
        out.push_str(&progress_line(progress));
    }
    if let Some(line) = route_line(turn.route_type, turn.route_info.as_ref()) {
        out.push('\n');
        out.push_str(&line);
    }
    if !turn.decision_log.is_empty() {
        out.push_str(&format!("\n{INDENT}decisions:\n"));
        out.push_str(&decision_lines(&turn.decision_log));
    }
    out.push('\n');
    out
}

/// Instructions for answering a pending prompt.
pub fn prompt(pending: &PendingPrompt) -> String {
    match pending {
        PendingPrompt::Consent { .. } => format!("{INDENT}/allow to let me browse, /deny to skip"),
        PendingPrompt::Approval {
            skill_name,
            summary,
            ..
        } => {
            let mut out = String::new();
            if let Some(skill) = skill_name {
                out.push_str(&format!("{INDENT}action: {skill}\n"));
            }
            if let Some(summary) = summary {
                out.push_str(&wrap_body(summary, WRAP_WIDTH));
                out.push('\n');
            }
            out.push_str(&format!("{INDENT}/approve or /reject"));
            out
        }
        PendingPrompt::Redirect { target, delay } => {
            format!("{INDENT}opening {target} in {} ms...", delay.as_millis())
        }
    }
}

/// Index of the first turn that is new or changed since `shown`.
pub fn first_change(shown: &[ConversationTurn], current: &[ConversationTurn]) -> usize {
    shown
        .iter()
        .zip(current)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| shown.len().min(current.len()))
}

pub const HELP: &str = "\
Type a message and press Enter.
  /retry     send the last message again after a failure
  /allow     let the assistant browse the web
  /deny      keep things as they are
  /approve   approve the proposed action
  /reject    reject the proposed action
  /new       start a new conversation
  /quit      exit";
