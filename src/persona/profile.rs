//! Persona identities and the closed set of behavioral modes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utilities::errors::{CoreError, Result};

/// Behavioral mode of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Warm, conversational helper. The fallback mode.
    #[default]
    Companion,
    /// Strategic, numbers-first operator.
    Captain,
    /// Terse systems and diagnostics specialist.
    Phantom,
    /// A user-defined persona; see `activeCustomAgentId`.
    Custom,
}

impl AgentMode {
    /// The three modes backed by a built-in persona.
    pub const BUILT_IN: [AgentMode; 3] = [AgentMode::Companion, AgentMode::Captain, AgentMode::Phantom];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMode::Companion => "companion",
            AgentMode::Captain => "captain",
            AgentMode::Phantom => "phantom",
            AgentMode::Custom => "custom",
        }
    }

    /// Parse a mode name, accepting the localized labels used in commands.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "companion" | "夥伴" | "伙伴" => Some(AgentMode::Companion),
            "captain" | "艦長" | "舰长" => Some(AgentMode::Captain),
            "phantom" | "幻影" => Some(AgentMode::Phantom),
            "custom" | "自訂" => Some(AgentMode::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete agent identity bound to a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub role: String,
    /// System instruction handed to the language model by the host.
    pub instruction: String,
    pub color_tag: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<String>,
}

/// Fields a user supplies when creating a custom persona.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaDraft {
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub instruction: String,
    #[serde(default)]
    pub color_tag: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub knowledge_base: Option<String>,
}

impl PersonaDraft {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_knowledge_base(mut self, kb: impl Into<String>) -> Self {
        self.knowledge_base = Some(kb.into());
        self
    }

    /// Validate and turn the draft into a persona with a fresh id.
    pub fn into_persona(self) -> Result<Persona> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidPersona { reason: "name is blank".into() });
        }
        let instruction = self.instruction.trim();
        if instruction.is_empty() {
            return Err(CoreError::InvalidPersona { reason: "instruction is blank".into() });
        }
        let role = match self.role.trim() {
            "" => "Custom Agent".to_string(),
            r => r.to_string(),
        };

        Ok(Persona {
            id: format!("custom-{}", Uuid::new_v4()),
            name: name.to_string(),
            role,
            instruction: instruction.to_string(),
            color_tag: self.color_tag.unwrap_or_else(|| "sky".to_string()),
            icon: self.icon.unwrap_or_else(|| "user".to_string()),
            knowledge_base: self.knowledge_base.filter(|kb| !kb.trim().is_empty()),
        })
    }
}

/// The statically defined persona for a built-in mode.
///
/// `Custom` has no built-in persona and returns `None`.
pub fn built_in_persona(mode: AgentMode) -> Option<Persona> {
    match mode {
        AgentMode::Companion => Some(companion_persona()),
        AgentMode::Captain => Some(static_persona(
            "captain",
            "Captain Vale",
            "Strategy Officer",
            "You are Captain Vale. Lead with numbers, state the decision first, then the \
             two or three figures that justify it. Flag risks to targets explicitly.",
            "amber",
            "compass",
        )),
        AgentMode::Phantom => Some(static_persona(
            "phantom",
            "Phantom",
            "Systems Specialist",
            "You are Phantom, a terse systems specialist. Answer with diagnostics, exact \
             component names and next commands. No pleasantries.",
            "violet",
            "terminal",
        )),
        AgentMode::Custom => None,
    }
}

/// The fallback persona.
pub fn companion_persona() -> Persona {
    static_persona(
        "companion",
        "Aura",
        "Companion",
        "You are Aura, a warm and patient companion. Keep answers friendly and short, \
         check in on how the user is doing, and explain jargon in plain words.",
        "emerald",
        "heart",
    )
}

fn static_persona(id: &str, name: &str, role: &str, instruction: &str, color_tag: &str, icon: &str) -> Persona {
    Persona {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        instruction: instruction.to_string(),
        color_tag: color_tag.to_string(),
        icon: icon.to_string(),
        knowledge_base: None,
    }
}
