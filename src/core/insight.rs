//! Trip insight: read-only context used to greet the user on a trip-scoped
//! conversation. Carries no state machine of its own.
//!
//! Every part is optional so a partial insight still produces a greeting.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripInsight {
    #[serde(default)]
    pub trip_summary: Option<TripSummary>,
    #[serde(default)]
    pub findings: Vec<InsightFinding>,
    #[serde(default)]
    pub readiness: Option<Readiness>,
    /// `good`, `needs_attention` or `has_issues`.
    #[serde(default)]
    pub overall_status: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub places_count: Option<u32>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsightFinding {
    /// `warning`, `suggestion` or `positive`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub action_label: Option<String>,
    #[serde(default)]
    pub action_prompt: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Readiness {
    /// `pass`, `warn` or `block`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub blockers: u32,
    #[serde(default)]
    pub warnings: u32,
    #[serde(default)]
    pub suggestions: u32,
}

impl InsightFinding {
    /// One line: `[warning] Long drive: Day 3 has 5 hours in the car`.
    fn line(&self) -> Option<String> {
        let title = self.title.as_deref().filter(|t| !t.trim().is_empty());
        let message = self.message.as_deref().filter(|m| !m.trim().is_empty());
        let body = match (title, message) {
            (Some(title), Some(message)) => format!("{title}: {message}"),
            (Some(text), None) | (None, Some(text)) => text.to_string(),
            (None, None) => return None,
        };
        Some(match self.kind.as_deref() {
            Some(kind) => format!("[{kind}] {body}"),
            None => body,
        })
    }
}

/// Greeting text summarizing what is known about the trip.
pub fn greeting(insight: &TripInsight) -> String {
    let summary = insight.trip_summary.clone().unwrap_or_default();
    let mut text = match (&summary.destination, summary.days) {
        (Some(dest), Some(days)) => format!("Hi! I'm looking at your {days}-day trip to {dest}"),
        (Some(dest), None) => format!("Hi! I'm looking at your trip to {dest}"),
        _ => "Hi! I'm looking at your trip".to_string(),
    };
    if let (Some(start), Some(end)) = (&summary.start_date, &summary.end_date) {
        text.push_str(&format!(" ({start} to {end})"));
    }
    text.push('.');
    if let Some(places) = summary.places_count.filter(|n| *n > 0) {
        text.push_str(&format!(" It has {places} places planned so far."));
    }

    let lines: Vec<String> = insight.findings.iter().filter_map(InsightFinding::line).collect();
    if !lines.is_empty() {
        text.push_str("\n\nA few things I noticed:");
        for line in &lines {
            text.push_str(&format!("\n- {line}"));
        }
    }

    if let Some(readiness) = &insight.readiness
        && readiness.blockers + readiness.warnings > 0
    {
        text.push_str(&format!(
            "\n\nReadiness: {} blocker(s), {} warning(s).",
            readiness.blockers, readiness.warnings
        ));
    }
    text.push_str("\n\nWhat would you like to change?");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_full_insight() {
        let insight = TripInsight {
            trip_summary: Some(TripSummary {
                destination: Some("Iceland".to_string()),
                days: Some(7),
                places_count: Some(12),
                start_date: Some("2026-06-01".to_string()),
                end_date: Some("2026-06-07".to_string()),
            }),
            findings: vec![InsightFinding {
                kind: Some("warning".to_string()),
                title: Some("No lunch stop".to_string()),
                message: Some("Day 3 has nowhere to eat".to_string()),
                ..Default::default()
            }],
            readiness: Some(Readiness {
                status: Some("warn".to_string()),
                blockers: 0,
                warnings: 2,
                suggestions: 1,
            }),
            overall_status: Some("needs_attention".to_string()),
        };
        let text = greeting(&insight);
        assert!(text.starts_with(
            "Hi! I'm looking at your 7-day trip to Iceland (2026-06-01 to 2026-06-07)."
        ));
        assert!(text.contains("12 places"));
        assert!(text.contains("- [warning] No lunch stop: Day 3 has nowhere to eat"));
        assert!(text.contains("0 blocker(s), 2 warning(s)"));
    }

    #[test]
    fn test_greeting_empty_insight() {
        let text = greeting(&TripInsight::default());
        assert!(text.starts_with("Hi! I'm looking at your trip."));
        assert!(!text.contains("places planned"));
        assert!(!text.contains("Readiness"));
    }

    #[test]
    fn test_findings_without_text_are_skipped() {
        let insight = TripInsight {
            findings: vec![InsightFinding {
                kind: Some("positive".to_string()),
                icon: Some("check".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(!greeting(&insight).contains("A few things I noticed"));
    }

    #[test]
    fn test_insight_decodes_wire_shape() {
        let insight: TripInsight = serde_json::from_str(
            r#"{
                "tripSummary": {"destination": "Kyoto", "days": 4, "placesCount": 9,
                                "startDate": "2026-11-02", "endDate": "2026-11-05"},
                "findings": [{"type": "suggestion", "icon": "route", "title": "Reorder day 2",
                              "message": "Fushimi Inari is quieter at dawn", "actionLabel": null}],
                "readiness": {"status": "pass", "blockers": 0, "warnings": 0, "suggestions": 1},
                "overallStatus": "good"
            }"#,
        )
        .unwrap();
        let summary = insight.trip_summary.unwrap();
        assert_eq!(summary.days, Some(4));
        assert_eq!(summary.places_count, Some(9));
        assert_eq!(insight.findings[0].kind.as_deref(), Some("suggestion"));
        assert_eq!(insight.findings[0].action_label, None);
        assert_eq!(insight.readiness.unwrap().suggestions, 1);
        assert_eq!(insight.overall_status.as_deref(), Some("good"));
    }
}
