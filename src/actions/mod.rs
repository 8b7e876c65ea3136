//! Heuristic action-item extraction.
//!
//! Short directive text containing an action keyword becomes an
//! [`ActionItem`]. Longer text is treated as narrative and ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utilities::string_utils::{char_len, contains_any};

const ACTION_KEYWORDS: &[&str] = &[
    "recommend", "suggest", "check", "schedule", "review", "audit", "follow up", "remind",
    "建議", "檢查", "排程", "稽核", "審查", "提醒", "追蹤",
];

const URGENT_KEYWORDS: &[&str] = &[
    "urgent", "immediately", "asap", "critical", "right now",
    "立即", "緊急", "馬上", "盡快",
];

const SOFT_KEYWORDS: &[&str] = &["maybe", "consider", "perhaps", "when possible", "可以考慮", "或許"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPriority {
    Low,
    Medium,
    High,
}

impl Default for ActionPriority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Synced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: String,
    pub text: String,
    pub status: ActionStatus,
    pub timestamp: DateTime<Utc>,
    pub priority: ActionPriority,
}

/// Classify `text` as an action, or `None` when it is not one.
pub fn extract_action(text: &str, max_chars: usize) -> Option<ActionItem> {
    let text = text.trim();
    if text.is_empty() || char_len(text) >= max_chars || !contains_any(text, ACTION_KEYWORDS) {
        return None;
    }
    let priority = if contains_any(text, URGENT_KEYWORDS) {
        ActionPriority::High
    } else if contains_any(text, SOFT_KEYWORDS) {
        ActionPriority::Low
    } else {
        ActionPriority::Medium
    };
    Some(ActionItem {
        id: Uuid::new_v4().to_string(),
        text: text.to_string(),
        status: ActionStatus::Pending,
        timestamp: Utc::now(),
        priority,
    })
}

/// Extracted actions, newest first.
#[derive(Debug, Clone)]
pub struct ActionBoard {
    items: Vec<ActionItem>,
    max_chars: usize,
}

impl Default for ActionBoard {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ActionBoard {
    pub fn new(max_chars: usize) -> Self {
        Self {
            items: Vec::new(),
            max_chars,
        }
    }

    pub fn items(&self) -> &[ActionItem] {
        &self.items
    }

    pub fn pending(&self) -> impl Iterator<Item = &ActionItem> {
        self.items.iter().filter(|i| i.status == ActionStatus::Pending)
    }

    /// Extract from `text` and prepend the item when one is found.
    pub fn extract(&mut self, text: &str) -> Option<ActionItem> {
        let item = extract_action(text, self.max_chars)?;
        self.items.insert(0, item.clone());
        Some(item)
    }

    /// `pending → synced`. False for unknown ids or items already synced.
    pub fn mark_synced(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) if item.status == ActionStatus::Pending => {
                item.status = ActionStatus::Synced;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_urgent_is_high() {
        let item = extract_action("請立即排程供應商稽核", 100).unwrap();
        assert_eq!(item.priority, ActionPriority::High);
        assert_eq!(item.status, ActionStatus::Pending);
    }

    #[test]
    fn test_plain_directive_is_medium() {
        let item = extract_action("Review the Q3 supplier list", 100).unwrap();
        assert_eq!(item.priority, ActionPriority::Medium);
    }

    #[test]
    fn test_soft_directive_is_low() {
        assert_eq!(extract_action("Maybe schedule a follow-up call", 100).unwrap().priority, ActionPriority::Low);
        assert_eq!(extract_action("可以考慮檢查一下報表", 100).unwrap().priority, ActionPriority::Low);
        // urgency wins over softness
        assert_eq!(extract_action("maybe check this asap", 100).unwrap().priority, ActionPriority::High);
    }

    #[test]
    fn test_non_actions_and_long_text() {
        assert!(extract_action("Nice weather today", 100).is_none());
        let long = format!("Please review {}", "x".repeat(90));
        assert_eq!(char_len(&long), 104);
        assert!(extract_action(&long, 100).is_none());
        let boundary = format!("check {}", "y".repeat(94));
        assert_eq!(char_len(&boundary), 100);
        assert!(extract_action(&boundary, 100).is_none());
    }

    #[test]
    fn test_board_prepends_and_syncs() {
        let mut board = ActionBoard::default();
        let first = board.extract("check the invoices").unwrap();
        let second = board.extract("schedule the audit").unwrap();
        assert!(board.extract("hello there").is_none());
        assert_eq!(board.items()[0].id, second.id);
        assert_eq!(board.items()[1].id, first.id);

        assert!(board.mark_synced(&first.id));
        assert!(!board.mark_synced(&first.id));
        assert!(!board.mark_synced("missing"));
        assert_eq!(board.pending().count(), 1);
    }
}
