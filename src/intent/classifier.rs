//! Stateless mode classifier.
//!
//! Two signals combine: a view-based prior and keyword bucket scoring. A
//! keyword bucket that strictly beats both others overrides the prior. Ties
//! never produce a keyword suggestion.

use serde::{Deserialize, Serialize};

use crate::persona::AgentMode;
use crate::utilities::string_utils::count_keyword_hits;

pub const PHANTOM_KEYWORDS: &[&str] = &[
    "api", "latency", "log", "error", "bug", "debug", "server", "crash", "deploy",
    "database", "timeout", "cpu", "memory leak",
    "系統", "錯誤", "日誌", "除錯", "伺服器", "當機", "延遲",
];

pub const CAPTAIN_KEYWORDS: &[&str] = &[
    "revenue", "profit", "budget", "forecast", "kpi", "strategy", "roi", "quarter",
    "target", "finance", "margin", "investor",
    "營收", "利潤", "預算", "策略", "目標", "財務", "季度",
];

pub const COMPANION_KEYWORDS: &[&str] = &[
    "thank", "hello", "feel", "tired", "stress", "friend", "happy", "lonely", "chat",
    "good morning", "how are you",
    "謝謝", "你好", "心情", "好累", "壓力", "聊聊",
];

/// Per-bucket keyword hit counts for one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntentScores {
    pub phantom: usize,
    pub captain: usize,
    pub companion: usize,
}

impl IntentScores {
    /// The bucket whose score strictly exceeds both others, if any.
    pub fn winner(&self) -> Option<AgentMode> {
        let Self { phantom, captain, companion } = *self;
        if phantom > captain && phantom > companion {
            Some(AgentMode::Phantom)
        } else if captain > phantom && captain > companion {
            Some(AgentMode::Captain)
        } else if companion > phantom && companion > captain {
            Some(AgentMode::Companion)
        } else {
            None
        }
    }
}

/// Score `text` against the three keyword buckets.
pub fn score(text: &str) -> IntentScores {
    IntentScores {
        phantom: count_keyword_hits(text, PHANTOM_KEYWORDS),
        captain: count_keyword_hits(text, CAPTAIN_KEYWORDS),
        companion: count_keyword_hits(text, COMPANION_KEYWORDS),
    }
}

/// Preferred mode for an application view.
///
/// Views are matched on their first path segment, so `"analytics/overview"`
/// behaves like `"analytics"`.
pub fn view_prior(view: &str) -> Option<AgentMode> {
    let head = view
        .trim()
        .split(['/', ':', '#'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match head.as_str() {
        "analytics" | "finance" | "reports" | "dashboard" | "carbon" | "budget" => Some(AgentMode::Captain),
        "system" | "diagnostics" | "logs" | "settings" | "health" => Some(AgentMode::Phantom),
        "home" | "chat" | "onboarding" => Some(AgentMode::Companion),
        _ => None,
    }
}

/// Suggest a mode for `text` seen on `view` while in `current`.
///
/// Returns `None` when nothing points away from the current mode.
pub fn classify(text: &str, view: Option<&str>, current: AgentMode) -> Option<AgentMode> {
    let mut candidate = view.and_then(view_prior).filter(|m| *m != current);
    if let Some(winner) = score(text).winner() {
        if winner != current {
            candidate = Some(winner);
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_latency_log_suggests_phantom() {
        let scores = score("check the api latency log");
        assert_eq!(scores, IntentScores { phantom: 3, captain: 0, companion: 0 });
        assert_eq!(classify("check the api latency log", None, AgentMode::Companion), Some(AgentMode::Phantom));
    }

    #[test]
    fn test_no_suggestion_when_winner_is_current() {
        assert_eq!(classify("server error in the log", None, AgentMode::Phantom), None);
    }

    #[test]
    fn test_tie_produces_no_keyword_suggestion() {
        // one phantom hit ("server"), one captain hit ("budget")
        let scores = score("server budget");
        assert_eq!(scores.winner(), None);
        assert_eq!(classify("server budget", None, AgentMode::Companion), None);
    }

    #[test]
    fn test_tie_keeps_view_prior() {
        assert_eq!(
            classify("server budget", Some("analytics"), AgentMode::Companion),
            Some(AgentMode::Captain)
        );
    }

    #[test]
    fn test_keywords_override_view_prior() {
        assert_eq!(
            classify("the api keeps hitting a timeout", Some("finance"), AgentMode::Companion),
            Some(AgentMode::Phantom)
        );
    }

    #[test]
    fn test_view_prior_only_when_different() {
        assert_eq!(classify("", Some("diagnostics/cpu"), AgentMode::Phantom), None);
        assert_eq!(classify("", Some("Diagnostics/cpu"), AgentMode::Captain), Some(AgentMode::Phantom));
        assert_eq!(classify("", Some("unknown-view"), AgentMode::Captain), None);
    }

    #[test]
    fn test_case_insensitive_and_cjk() {
        assert_eq!(score("REVENUE and Profit").captain, 2);
        assert_eq!(classify("今天心情不好，好累", None, AgentMode::Captain), Some(AgentMode::Companion));
    }
}
