//! The single text entry point.

use serde::Serialize;

use super::agent::AgentCore;
use crate::actions::ActionItem;
use crate::intent::{classify, parse_command, Command};
use crate::logs::{LogSource, LogType};
use crate::persona::AgentMode;
use crate::skills::{skill_triggers, SkillAward};

/// What one call to [`AgentCore::process_universal_input`] did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOutcome {
    /// False for blank input, which is ignored entirely.
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    /// Whether the command changed anything.
    pub command_applied: bool,
    pub skill_awards: Vec<SkillAward>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<AgentMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionItem>,
}

impl AgentCore {
    /// Log `text`, then either run it as an explicit command or feed it to
    /// the skill triggers, the classifier and the action extractor.
    ///
    /// `view`, when given, also becomes the current view.
    pub fn process_universal_input(&mut self, text: &str, view: Option<&str>) -> InputOutcome {
        let text = text.trim();
        if text.is_empty() {
            return InputOutcome::default();
        }
        if let Some(view) = view {
            self.view = Some(view.to_string());
        }
        self.log(text, LogType::Info, LogSource::User);

        let mut outcome = InputOutcome {
            accepted: true,
            ..Default::default()
        };

        if let Some(command) = parse_command(text) {
            outcome.command_applied = self.execute_command(&command);
            if !outcome.command_applied {
                self.log(format!("Command had no effect: {}", text), LogType::Warning, LogSource::System);
            }
            outcome.command = Some(command);
            return outcome;
        }

        for trigger in skill_triggers(text, self.config.progression.skill_trigger_policy) {
            if let Some(award) = self.award_skill_xp(trigger.skill_id, trigger.amount) {
                outcome.skill_awards.push(award);
            }
        }

        if let Some(mode) = classify(text, self.view.as_deref(), self.mode()) {
            // an unchanged pending suggestion is still reported
            if self.propose_suggestion(mode) || self.pending_suggestion() == Some(mode) {
                outcome.suggestion = Some(mode);
            }
        }

        outcome.action = self.extract_action_from_text(text);
        outcome
    }

    fn execute_command(&mut self, command: &Command) -> bool {
        match command {
            Command::SwitchMode(mode) => self.switch_mode(*mode, "explicit command"),
            Command::Train(skill_id) => self.train_skill(skill_id).is_some(),
            Command::Feed(amount) => {
                self.feed_agent(*amount);
                *amount > 0
            }
            Command::Crash => self.trigger_system_crash(),
            Command::Heal => self.initiate_self_healing(),
            Command::Diagnose => {
                self.run_self_diagnostics();
                true
            }
            Command::StartJourney(template_id) => match self.start_journey(template_id) {
                Ok(_) => true,
                Err(e) => {
                    log::debug!("start_journey via command failed: {}", e);
                    false
                }
            },
            Command::AdvanceJourney => self.advance_journey(),
            Command::EndJourney => self.complete_journey(),
            Command::ConfirmSuggestion => self.confirm_suggestion(),
            Command::DismissSuggestion => self.dismiss_suggestion(),
            Command::ClearLogs => {
                self.clear_logs();
                true
            }
            Command::ArchiveLogs => {
                self.archive_logs();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::health::HealthState;

    #[test]
    fn test_blank_input_is_ignored() {
        let mut core = AgentCore::default();
        let outcome = core.process_universal_input("   ", None);
        assert!(!outcome.accepted);
        assert!(core.logs().is_empty());
    }

    #[test]
    fn test_text_is_logged_as_user() {
        let mut core = AgentCore::default();
        core.process_universal_input("good morning", None);
        let first = &core.logs().entries()[0];
        assert_eq!(first.source, LogSource::User);
        assert_eq!(first.message, "good morning");
    }

    #[test]
    fn test_keywords_fill_suggestion_without_switching() {
        let mut core = AgentCore::default();
        let outcome = core.process_universal_input("check the api latency log", None);
        assert_eq!(outcome.suggestion, Some(AgentMode::Phantom));
        assert_eq!(core.mode(), AgentMode::Companion);
        assert_eq!(core.pending_suggestion(), Some(AgentMode::Phantom));
    }

    #[test]
    fn test_repeated_input_reports_pending_suggestion() {
        let mut core = AgentCore::default();
        core.process_universal_input("check the api latency log", None);
        let again = core.process_universal_input("the server log shows a timeout", None);
        assert_eq!(again.suggestion, Some(AgentMode::Phantom));
        assert_eq!(core.pending_suggestion(), Some(AgentMode::Phantom));
    }

    #[test]
    fn test_commands_switch_directly_and_skip_classifier() {
        let mut core = AgentCore::default();
        let outcome = core.process_universal_input("/mode captain", None);
        assert_eq!(outcome.command, Some(Command::SwitchMode(AgentMode::Captain)));
        assert!(outcome.command_applied);
        assert_eq!(core.mode(), AgentMode::Captain);
        assert_eq!(core.pending_suggestion(), None);

        let again = core.process_universal_input("switch to captain mode", None);
        assert!(!again.command_applied);
    }

    #[test]
    fn test_skill_triggers_apply() {
        let mut core = AgentCore::default();
        let outcome = core.process_universal_input("analyze the sales data trend", None);
        assert_eq!(outcome.skill_awards.len(), 1);
        assert_eq!(core.skill("sk-1").unwrap().current_xp, 30);
    }

    #[test]
    fn test_view_prior_used_when_text_is_neutral() {
        let mut core = AgentCore::default();
        let outcome = core.process_universal_input("what is on this page", Some("reports"));
        assert_eq!(outcome.suggestion, Some(AgentMode::Captain));
        assert_eq!(core.view(), Some("reports"));
    }

    #[test]
    fn test_action_extraction_from_input() {
        let mut core = AgentCore::default();
        let outcome = core.process_universal_input("請立即排程供應商稽核", None);
        let action = outcome.action.unwrap();
        assert_eq!(action.priority, crate::actions::ActionPriority::High);
        assert_eq!(core.actions().len(), 1);
    }

    #[test]
    fn test_health_and_journey_commands() {
        let mut core = AgentCore::default();
        assert!(core.process_universal_input("/crash", None).command_applied);
        assert!(!core.process_universal_input("/crash", None).command_applied);
        assert!(core.process_universal_input("/heal", None).command_applied);
        core.advance(Duration::from_secs(8));
        assert_eq!(core.health(), HealthState::Stable);

        assert!(core.process_universal_input("/journey carbon-audit", None).command_applied);
        assert!(core.process_universal_input("/next", None).command_applied);
        assert!(core.process_universal_input("/journey end", None).command_applied);
        assert_eq!(core.agent_level().xp, 200);
        assert!(!core.process_universal_input("/journey tax-return", None).command_applied);
    }
}
