//! Two-phase mode transitions with a single pending-suggestion slot.
//!
//! Phase one ([`ModeSwitcher::begin_switch`]) commits the mode synchronously
//! and hands back a [`SwitchTicket`]. The caller arms a timer with the
//! ticket; when it fires, phase two logs the optimized switch and raises the
//! destination-specific notice from [`SwitchTicket::notice`].

use super::profile::{AgentMode, Persona};
use super::registry::ModeRegistry;

/// Record of a committed phase-one switch, carried to phase two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTicket {
    pub from: AgentMode,
    pub to: AgentMode,
    /// The persona `to` resolved to at switch time.
    pub persona: Persona,
    pub reason: String,
}

/// Title and message for the phase-two notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchNotice {
    pub title: String,
    pub message: String,
}

impl SwitchTicket {
    /// Destination-dependent notification content.
    pub fn notice(&self) -> SwitchNotice {
        let (title, message) = match self.to {
            AgentMode::Companion => (
                "Companion mode".to_string(),
                format!("{} is here to chat. Ask anything.", self.persona.name),
            ),
            AgentMode::Captain => (
                "Captain mode".to_string(),
                format!("{} has the bridge. Strategic analysis online.", self.persona.name),
            ),
            AgentMode::Phantom => (
                "Phantom mode".to_string(),
                format!("{} engaged. Diagnostics channel open.", self.persona.name),
            ),
            AgentMode::Custom => (
                format!("{} activated", self.persona.name),
                format!("Now speaking as {} ({}).", self.persona.name, self.persona.role),
            ),
        };
        SwitchNotice { title, message }
    }
}

/// Owns the mode registry and the pending suggestion.
#[derive(Debug, Clone, Default)]
pub struct ModeSwitcher {
    registry: ModeRegistry,
    pending: Option<AgentMode>,
}

impl ModeSwitcher {
    pub fn new(registry: ModeRegistry) -> Self {
        Self { registry, pending: None }
    }

    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ModeRegistry {
        &mut self.registry
    }

    pub fn mode(&self) -> AgentMode {
        self.registry.mode()
    }

    pub fn pending(&self) -> Option<AgentMode> {
        self.pending
    }

    /// Phase one. `None` when the switch is a no-op.
    ///
    /// Switching to the current mode is a no-op, except for `Custom`, whose
    /// persona may differ under the same tag. Entering `Custom` without a
    /// resolvable selection is also a no-op.
    pub fn begin_switch(&mut self, target: AgentMode, reason: impl Into<String>) -> Option<SwitchTicket> {
        let from = self.registry.mode();
        if target == from && target != AgentMode::Custom {
            return None;
        }
        let persona = self.registry.persona_for(target)?;

        self.registry.set_mode(target);
        if self.pending == Some(target) {
            self.pending = None;
        }
        Some(SwitchTicket {
            from,
            to: target,
            persona,
            reason: reason.into(),
        })
    }

    /// Store `mode` as the pending suggestion. Rejected when it equals the
    /// current mode or cannot be entered. Replaces any earlier suggestion.
    pub fn propose(&mut self, mode: AgentMode) -> bool {
        if mode == self.registry.mode() || !self.registry.can_enter(mode) {
            return false;
        }
        self.pending = Some(mode);
        true
    }

    /// Remove and return the pending suggestion.
    pub fn take_pending(&mut self) -> Option<AgentMode> {
        self.pending.take()
    }

    /// Clear the pending suggestion. Returns true if one was cleared.
    pub fn dismiss(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Drop a pending suggestion that no longer differs from the current mode.
    pub(crate) fn reconcile_pending(&mut self) -> bool {
        let mode = self.registry.mode();
        match self.pending {
            Some(p) if p == mode || !self.registry.can_enter(p) => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::profile::PersonaDraft;

    #[test]
    fn test_switch_to_current_is_noop() {
        let mut switcher = ModeSwitcher::default();
        assert!(switcher.begin_switch(AgentMode::Companion, "again").is_none());
    }

    #[test]
    fn test_switch_commits_immediately() {
        let mut switcher = ModeSwitcher::default();
        let ticket = switcher.begin_switch(AgentMode::Captain, "user asked").unwrap();
        assert_eq!(switcher.mode(), AgentMode::Captain);
        assert_eq!(ticket.from, AgentMode::Companion);
        assert_eq!(ticket.persona.id, "captain");
        assert_eq!(ticket.notice().title, "Captain mode");
    }

    #[test]
    fn test_custom_switch_reevaluates_same_tag() {
        let mut registry = ModeRegistry::new();
        let a = PersonaDraft::new("Eco", "Track emissions").into_persona().unwrap();
        let b = PersonaDraft::new("Lex", "Review contracts").into_persona().unwrap();
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        registry.add_custom(a);
        registry.add_custom(b);
        let mut switcher = ModeSwitcher::new(registry);

        assert!(switcher.begin_switch(AgentMode::Custom, "no selection").is_none());

        switcher.registry_mut().select_custom(&a_id);
        assert_eq!(switcher.begin_switch(AgentMode::Custom, "pick a").unwrap().persona.name, "Eco");

        switcher.registry_mut().select_custom(&b_id);
        let ticket = switcher.begin_switch(AgentMode::Custom, "pick b").unwrap();
        assert_eq!(ticket.from, AgentMode::Custom);
        assert_eq!(ticket.persona.name, "Lex");
        assert_eq!(ticket.notice().title, "Lex activated");
    }

    #[test]
    fn test_pending_never_equals_current() {
        let mut switcher = ModeSwitcher::default();
        assert!(!switcher.propose(AgentMode::Companion));
        assert!(!switcher.propose(AgentMode::Custom));
        assert!(switcher.propose(AgentMode::Phantom));
        assert_eq!(switcher.pending(), Some(AgentMode::Phantom));

        switcher.begin_switch(AgentMode::Phantom, "direct");
        assert_eq!(switcher.pending(), None);
    }

    #[test]
    fn test_dismiss_and_take() {
        let mut switcher = ModeSwitcher::default();
        assert!(!switcher.dismiss());
        switcher.propose(AgentMode::Captain);
        assert!(switcher.dismiss());
        assert!(switcher.take_pending().is_none());
    }
}
