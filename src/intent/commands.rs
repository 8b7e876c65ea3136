//! Explicit commands recognized in universal input.
//!
//! Commands bypass the classifier and act directly. Slash commands are
//! matched on their head word; natural-language switch phrases go through
//! two anchored regexes so ordinary sentences that merely mention a mode do
//! not switch.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::persona::AgentMode;

static SWITCH_EN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:please\s+)?(?:switch|change)\s+to\s+(companion|captain|phantom|custom)(?:\s+mode)?\s*[.!]?\s*$")
        .unwrap()
});

static SWITCH_ZH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:請)?切換(?:到|至)\s*(夥伴|伙伴|艦長|舰长|幻影|自訂|companion|captain|phantom)\s*(?:模式)?\s*[。！!]?\s*$")
        .unwrap()
});

/// A parsed explicit command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum Command {
    SwitchMode(AgentMode),
    Train(String),
    Feed(u64),
    Crash,
    Heal,
    Diagnose,
    StartJourney(String),
    AdvanceJourney,
    EndJourney,
    ConfirmSuggestion,
    DismissSuggestion,
    ClearLogs,
    ArchiveLogs,
}

/// Parse `text` as a command. `None` means ordinary text.
pub fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix('/') {
        return parse_slash(rest);
    }
    if let Some(caps) = SWITCH_EN.captures(trimmed).or_else(|| SWITCH_ZH.captures(trimmed)) {
        return AgentMode::parse(&caps[1]).map(Command::SwitchMode);
    }
    None
}

fn parse_slash(rest: &str) -> Option<Command> {
    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let arg = parts.next();

    let command = match head.as_str() {
        "mode" => Command::SwitchMode(AgentMode::parse(arg?)?),
        "companion" | "captain" | "phantom" => Command::SwitchMode(AgentMode::parse(&head)?),
        "train" => Command::Train(arg?.to_string()),
        "feed" => Command::Feed(arg?.parse().ok()?),
        "crash" => Command::Crash,
        "heal" => Command::Heal,
        "diagnose" => Command::Diagnose,
        "journey" => match arg?.to_lowercase().as_str() {
            "end" | "stop" | "complete" => Command::EndJourney,
            "next" => Command::AdvanceJourney,
            _ => Command::StartJourney(arg?.to_string()),
        },
        "next" => Command::AdvanceJourney,
        "confirm" | "yes" => Command::ConfirmSuggestion,
        "dismiss" | "no" => Command::DismissSuggestion,
        "clear" => Command::ClearLogs,
        "archive" => Command::ArchiveLogs,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_mode_commands() {
        assert_eq!(parse_command("/mode captain"), Some(Command::SwitchMode(AgentMode::Captain)));
        assert_eq!(parse_command("  /Phantom "), Some(Command::SwitchMode(AgentMode::Phantom)));
        assert_eq!(parse_command("/mode 艦長"), Some(Command::SwitchMode(AgentMode::Captain)));
        assert_eq!(parse_command("/mode pirate"), None);
        assert_eq!(parse_command("/mode"), None);
    }

    #[test]
    fn test_natural_switch_phrases() {
        assert_eq!(parse_command("switch to captain mode"), Some(Command::SwitchMode(AgentMode::Captain)));
        assert_eq!(parse_command("Please change to phantom."), Some(Command::SwitchMode(AgentMode::Phantom)));
        assert_eq!(parse_command("切換到幻影模式"), Some(Command::SwitchMode(AgentMode::Phantom)));
        assert_eq!(parse_command("切換至夥伴"), Some(Command::SwitchMode(AgentMode::Companion)));
    }

    #[test]
    fn test_mentions_are_not_commands() {
        assert_eq!(parse_command("should I switch to captain mode later?"), None);
        assert_eq!(parse_command("the captain reviewed the budget"), None);
    }

    #[test]
    fn test_progress_and_health_commands() {
        assert_eq!(parse_command("/train sk-2"), Some(Command::Train("sk-2".into())));
        assert_eq!(parse_command("/feed 1500"), Some(Command::Feed(1500)));
        assert_eq!(parse_command("/feed lots"), None);
        assert_eq!(parse_command("/crash"), Some(Command::Crash));
        assert_eq!(parse_command("/heal"), Some(Command::Heal));
        assert_eq!(parse_command("/diagnose"), Some(Command::Diagnose));
    }

    #[test]
    fn test_journey_commands() {
        assert_eq!(parse_command("/journey onboarding"), Some(Command::StartJourney("onboarding".into())));
        assert_eq!(parse_command("/journey end"), Some(Command::EndJourney));
        assert_eq!(parse_command("/next"), Some(Command::AdvanceJourney));
        assert_eq!(parse_command("/journey"), None);
    }

    #[test]
    fn test_unknown_slash_is_text() {
        assert_eq!(parse_command("/shrug"), None);
        assert_eq!(parse_command("/clear"), Some(Command::ClearLogs));
        assert_eq!(parse_command("/archive"), Some(Command::ArchiveLogs));
    }
}
