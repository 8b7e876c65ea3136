//! Catalog of personas and the currently active mode.

use serde::{Deserialize, Serialize};

use super::profile::{built_in_persona, companion_persona, AgentMode, Persona};

/// What a delete did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOutcome {
    /// A persona with the id existed and was removed.
    pub removed: bool,
    /// Mode fell back to companion because the active custom persona went away.
    pub fell_back: bool,
}

/// Built-in and user-defined personas plus the current mode.
///
/// Invariant: when `mode == Custom`, `active_custom_id` names an existing
/// custom persona. Every mutation that could break this falls back to
/// `Companion`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRegistry {
    mode: AgentMode,
    custom_agents: Vec<Persona>,
    active_custom_agent_id: Option<String>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts, repairing the custom-mode invariant.
    pub fn restore(custom_agents: Vec<Persona>, active_custom_agent_id: Option<String>, mode: AgentMode) -> Self {
        let mut registry = Self {
            mode,
            custom_agents,
            active_custom_agent_id,
        };
        if registry
            .active_custom_agent_id
            .as_deref()
            .is_some_and(|id| registry.find_custom(id).is_none())
        {
            registry.active_custom_agent_id = None;
        }
        registry.enforce_invariant();
        registry
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    pub fn custom_agents(&self) -> &[Persona] {
        &self.custom_agents
    }

    pub fn active_custom_agent_id(&self) -> Option<&str> {
        self.active_custom_agent_id.as_deref()
    }

    pub fn find_custom(&self, id: &str) -> Option<&Persona> {
        self.custom_agents.iter().find(|p| p.id == id)
    }

    /// The selected custom persona, if the id still resolves.
    pub fn active_custom(&self) -> Option<&Persona> {
        self.active_custom_agent_id.as_deref().and_then(|id| self.find_custom(id))
    }

    /// Whether `mode` can currently be made active.
    pub fn can_enter(&self, mode: AgentMode) -> bool {
        mode != AgentMode::Custom || self.active_custom().is_some()
    }

    /// The persona the given mode resolves to right now.
    pub fn persona_for(&self, mode: AgentMode) -> Option<Persona> {
        match mode {
            AgentMode::Custom => self.active_custom().cloned(),
            other => built_in_persona(other),
        }
    }

    /// The persona currently speaking for the agent.
    pub fn active_persona(&self) -> Persona {
        self.persona_for(self.mode).unwrap_or_else(companion_persona)
    }

    /// Built-ins first, then customs in creation order.
    pub fn personas(&self) -> Vec<Persona> {
        AgentMode::BUILT_IN
            .iter()
            .filter_map(|m| built_in_persona(*m))
            .chain(self.custom_agents.iter().cloned())
            .collect()
    }

    pub(crate) fn set_mode(&mut self, mode: AgentMode) {
        self.mode = mode;
        self.enforce_invariant();
    }

    pub(crate) fn add_custom(&mut self, persona: Persona) {
        self.custom_agents.push(persona);
    }

    /// Point the custom slot at `id`. Returns false when the id is unknown.
    pub(crate) fn select_custom(&mut self, id: &str) -> bool {
        if self.find_custom(id).is_none() {
            return false;
        }
        self.active_custom_agent_id = Some(id.to_string());
        true
    }

    pub(crate) fn remove_custom(&mut self, id: &str) -> RemoveOutcome {
        let before = self.custom_agents.len();
        self.custom_agents.retain(|p| p.id != id);
        let removed = self.custom_agents.len() != before;

        let mut fell_back = false;
        if self.active_custom_agent_id.as_deref() == Some(id) {
            self.active_custom_agent_id = None;
            if self.mode == AgentMode::Custom {
                self.mode = AgentMode::Companion;
                fell_back = true;
            }
        }
        fell_back |= self.enforce_invariant();
        RemoveOutcome { removed, fell_back }
    }

    /// Fall back to companion if custom mode lost its persona. Returns true on fallback.
    fn enforce_invariant(&mut self) -> bool {
        if self.mode == AgentMode::Custom && self.active_custom().is_none() {
            self.mode = AgentMode::Companion;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::profile::PersonaDraft;

    fn registry_with_custom() -> (ModeRegistry, String) {
        let mut registry = ModeRegistry::new();
        let persona = PersonaDraft::new("Eco", "Track emissions").into_persona().unwrap();
        let id = persona.id.clone();
        registry.add_custom(persona);
        (registry, id)
    }

    #[test]
    fn test_defaults_to_companion() {
        let registry = ModeRegistry::new();
        assert_eq!(registry.mode(), AgentMode::Companion);
        assert_eq!(registry.active_persona().id, "companion");
        assert_eq!(registry.personas().len(), 3);
    }

    #[test]
    fn test_custom_requires_selection() {
        let (mut registry, id) = registry_with_custom();
        assert!(!registry.can_enter(AgentMode::Custom));
        registry.set_mode(AgentMode::Custom);
        assert_eq!(registry.mode(), AgentMode::Companion);

        assert!(registry.select_custom(&id));
        registry.set_mode(AgentMode::Custom);
        assert_eq!(registry.mode(), AgentMode::Custom);
        assert_eq!(registry.active_persona().name, "Eco");
    }

    #[test]
    fn test_select_unknown_is_rejected() {
        let (mut registry, _) = registry_with_custom();
        assert!(!registry.select_custom("custom-missing"));
        assert!(registry.active_custom_agent_id().is_none());
    }

    #[test]
    fn test_removing_active_custom_falls_back() {
        let (mut registry, id) = registry_with_custom();
        registry.select_custom(&id);
        registry.set_mode(AgentMode::Custom);

        let outcome = registry.remove_custom(&id);
        assert_eq!(outcome, RemoveOutcome { removed: true, fell_back: true });
        assert_eq!(registry.mode(), AgentMode::Companion);
        assert!(registry.active_custom_agent_id().is_none());
    }

    #[test]
    fn test_removing_unknown_keeps_state() {
        let (mut registry, id) = registry_with_custom();
        registry.select_custom(&id);
        registry.set_mode(AgentMode::Custom);

        let outcome = registry.remove_custom("custom-missing");
        assert_eq!(outcome, RemoveOutcome::default());
        assert_eq!(registry.mode(), AgentMode::Custom);
    }

    #[test]
    fn test_restore_repairs_dangling_selection() {
        let registry = ModeRegistry::restore(Vec::new(), Some("custom-gone".into()), AgentMode::Custom);
        assert_eq!(registry.mode(), AgentMode::Companion);
        assert!(registry.active_custom_agent_id().is_none());
    }
}
