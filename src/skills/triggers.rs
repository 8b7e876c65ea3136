//! Keyword-triggered skill XP.
//!
//! Free text is scanned for domain buckets; each bucket routes a fixed XP
//! amount to one skill id.

use serde::{Deserialize, Serialize};

use crate::utilities::string_utils::{char_len, contains_any};

const ANALYSIS_KEYWORDS: &[&str] = &[
    "analy", "data", "trend", "compare", "statistic", "metric", "chart",
    "分析", "數據", "趨勢", "比較", "統計",
];

const CREATIVE_KEYWORDS: &[&str] = &[
    "idea", "design", "create", "story", "brainstorm", "draft", "imagine",
    "創意", "設計", "故事", "靈感", "構想",
];

/// Text at least this long counts as contextual.
pub const CONTEXTUAL_MIN_CHARS: usize = 80;

pub const ANALYSIS_SKILL: &str = "sk-1";
pub const CREATIVE_SKILL: &str = "sk-2";
pub const CONTEXT_SKILL: &str = "sk-3";

pub const ANALYSIS_XP: u64 = 30;
pub const CREATIVE_XP: u64 = 30;
pub const CONTEXT_XP: u64 = 20;

/// How buckets combine when several match one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTriggerPolicy {
    /// Every matching bucket awards its skill.
    #[default]
    Independent,
    /// Only the first matching bucket (analysis, creative, contextual) awards.
    FirstMatch,
}

/// A pending auto-award produced by a trigger bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggeredAward {
    pub skill_id: &'static str,
    pub amount: u64,
}

/// Evaluate the trigger buckets against `text`.
pub fn skill_triggers(text: &str, policy: SkillTriggerPolicy) -> Vec<TriggeredAward> {
    let buckets = [
        (contains_any(text, ANALYSIS_KEYWORDS), ANALYSIS_SKILL, ANALYSIS_XP),
        (contains_any(text, CREATIVE_KEYWORDS), CREATIVE_SKILL, CREATIVE_XP),
        (char_len(text) >= CONTEXTUAL_MIN_CHARS, CONTEXT_SKILL, CONTEXT_XP),
    ];

    let matched = buckets
        .into_iter()
        .filter(|(hit, _, _)| *hit)
        .map(|(_, skill_id, amount)| TriggeredAward { skill_id, amount });

    match policy {
        SkillTriggerPolicy::Independent => matched.collect(),
        SkillTriggerPolicy::FirstMatch => matched.take(1).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_triggers_for_small_talk() {
        assert!(skill_triggers("good morning", SkillTriggerPolicy::Independent).is_empty());
    }

    #[test]
    fn test_independent_awards_every_bucket() {
        let awards = skill_triggers("analyze this data and brainstorm a design", SkillTriggerPolicy::Independent);
        let ids: Vec<&str> = awards.iter().map(|a| a.skill_id).collect();
        assert_eq!(ids, vec![ANALYSIS_SKILL, CREATIVE_SKILL]);
    }

    #[test]
    fn test_first_match_keeps_dominant_bucket() {
        let awards = skill_triggers("analyze this data and brainstorm a design", SkillTriggerPolicy::FirstMatch);
        assert_eq!(awards, vec![TriggeredAward { skill_id: ANALYSIS_SKILL, amount: ANALYSIS_XP }]);
    }

    #[test]
    fn test_long_text_is_contextual() {
        let text = "a".repeat(CONTEXTUAL_MIN_CHARS);
        let awards = skill_triggers(&text, SkillTriggerPolicy::Independent);
        assert_eq!(awards, vec![TriggeredAward { skill_id: CONTEXT_SKILL, amount: CONTEXT_XP }]);
    }

    #[test]
    fn test_cjk_analysis_keyword() {
        let awards = skill_triggers("請分析本季排放數據", SkillTriggerPolicy::Independent);
        assert_eq!(awards[0].skill_id, ANALYSIS_SKILL);
    }
}
