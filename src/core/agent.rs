//! The session orchestrator.
//!
//! `AgentCore` owns every component, is the only thing that mutates them,
//! and echoes each committed change to the log ledger, the event hub, the
//! store and (for user-visible outcomes) the notifier.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::actions::{ActionBoard, ActionItem};
use crate::events::{CoreEvent, EventEnvelope, EventHub};
use crate::health::{HealthDelays, HealthSimulator, HealthState, HealthTimer, HealthTransition};
use crate::intent::classifier;
use crate::interfaces::{KeyValueStore, LogNotifier, MemoryStore, NotificationKind, Notifier};
use crate::journey::{Journey, JourneyStarted, JourneyStepper, StepAdvance};
use crate::logs::{LogEntry, LogLedger, LogSource, LogType};
use crate::persona::{AgentMode, ModeRegistry, ModeSwitcher, Persona, PersonaDraft, SwitchTicket};
use crate::scheduler::TimerQueue;
use crate::skills::{default_skills, AgentLevel, LevelGain, Skill, SkillAward, SkillLedger};
use crate::utilities::config::CoreConfig;
use crate::utilities::errors::Result;
use crate::utilities::string_utils::truncate_chars;

/// Keys under which state is persisted.
pub mod keys {
    pub const CUSTOM_AGENTS: &str = "agent_core.custom_agents";
    pub const ACTIVE_CUSTOM_AGENT_ID: &str = "agent_core.active_custom_agent_id";
    pub const MODE: &str = "agent_core.mode";
    pub const THEME: &str = "agent_core.theme";
    pub const SKILLS: &str = "agent_core.skills";
    pub const AGENT_LEVEL: &str = "agent_core.agent_level";
}

/// Display preferences owned by the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemePreferences {
    pub dark_mode: bool,
    pub accent: String,
}

impl Default for ThemePreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            accent: "emerald".to_string(),
        }
    }
}

/// Events the core schedules against its own timer queue.
#[derive(Debug, Clone)]
pub(crate) enum TimerEvent {
    SwitchOptimized(SwitchTicket),
    Health(HealthTimer),
}

pub struct AgentCore {
    pub(super) config: CoreConfig,
    pub(super) store: Arc<dyn KeyValueStore>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) switcher: ModeSwitcher,
    pub(super) skills: SkillLedger,
    pub(super) level: AgentLevel,
    pub(super) journeys: JourneyStepper,
    pub(super) health: HealthSimulator,
    pub(super) actions: ActionBoard,
    pub(super) logs: LogLedger,
    pub(super) theme: ThemePreferences,
    pub(super) view: Option<String>,
    pub(super) timers: TimerQueue<TimerEvent>,
    pub(super) events: EventHub,
}

impl std::fmt::Debug for AgentCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCore")
            .field("mode", &self.switcher.mode())
            .field("health", &self.health.state())
            .field("level", &self.level)
            .field("logs", &self.logs.len())
            .field("timers", &self.timers)
            .finish()
    }
}

impl Default for AgentCore {
    fn default() -> Self {
        Self::open(CoreConfig::default(), Arc::new(MemoryStore::new()), Arc::new(LogNotifier))
    }
}

impl AgentCore {
    /// Build a core and restore persisted state from `store`.
    ///
    /// Missing or malformed blobs fall back to defaults with a warning.
    pub fn open(config: CoreConfig, store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        let custom_agents: Vec<Persona> = load_json(store.as_ref(), keys::CUSTOM_AGENTS).unwrap_or_default();
        let active_id = load_json::<Option<String>>(store.as_ref(), keys::ACTIVE_CUSTOM_AGENT_ID).flatten();
        let mode: AgentMode = load_json(store.as_ref(), keys::MODE).unwrap_or_default();
        let theme: ThemePreferences = load_json(store.as_ref(), keys::THEME).unwrap_or_default();
        let skills = load_json::<Vec<Skill>>(store.as_ref(), keys::SKILLS)
            .map(merge_with_catalog)
            .unwrap_or_else(default_skills);
        let level = load_json::<AgentLevel>(store.as_ref(), keys::AGENT_LEVEL)
            .map(AgentLevel::normalized)
            .unwrap_or_default();

        let registry = ModeRegistry::restore(custom_agents, active_id, mode);
        log::info!(
            "AgentCore opened: mode={}, custom_agents={}, level={}",
            registry.mode(),
            registry.custom_agents().len(),
            level.level
        );

        Self {
            health: HealthSimulator::new(HealthDelays::from(&config.timing)),
            actions: ActionBoard::new(config.actions.max_chars),
            config,
            store,
            notifier,
            switcher: ModeSwitcher::new(registry),
            skills: SkillLedger::new(skills),
            level,
            journeys: JourneyStepper::new(),
            logs: LogLedger::new(),
            theme,
            view: None,
            timers: TimerQueue::new(),
            events: EventHub::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn mode(&self) -> AgentMode {
        self.switcher.mode()
    }

    pub fn pending_suggestion(&self) -> Option<AgentMode> {
        self.switcher.pending()
    }

    pub fn active_persona(&self) -> Persona {
        self.switcher.registry().active_persona()
    }

    pub fn personas(&self) -> Vec<Persona> {
        self.switcher.registry().personas()
    }

    pub fn custom_agents(&self) -> &[Persona] {
        self.switcher.registry().custom_agents()
    }

    pub fn active_custom_agent_id(&self) -> Option<&str> {
        self.switcher.registry().active_custom_agent_id()
    }

    pub fn skills(&self) -> &[Skill] {
        self.skills.all()
    }

    pub fn skill(&self, skill_id: &str) -> Option<&Skill> {
        self.skills.get(skill_id)
    }

    pub fn agent_level(&self) -> AgentLevel {
        self.level
    }

    pub fn active_journey(&self) -> Option<&Journey> {
        self.journeys.active()
    }

    pub fn last_completed_journey(&self) -> Option<&Journey> {
        self.journeys.last_completed()
    }

    pub fn current_instruction(&self) -> Option<&str> {
        self.journeys.current_instruction()
    }

    pub fn health(&self) -> HealthState {
        self.health.state()
    }

    pub fn actions(&self) -> &[ActionItem] {
        self.actions.items()
    }

    pub fn logs(&self) -> &LogLedger {
        &self.logs
    }

    pub fn theme(&self) -> &ThemePreferences {
        &self.theme
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    /// Virtual time elapsed since the core was opened.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }

    // -----------------------------------------------------------------------
    // Modes and personas
    // -----------------------------------------------------------------------

    /// Two-phase switch. Phase one happens now; phase two fires after the
    /// configured switch delay. Returns false for a no-op.
    pub fn switch_mode(&mut self, target: AgentMode, reason: &str) -> bool {
        let had_pending = self.switcher.pending().is_some();
        let Some(ticket) = self.switcher.begin_switch(target, reason) else {
            log::debug!("switch_mode({}) ignored in {} mode", target, self.mode());
            return false;
        };

        self.log(
            format!(
                "Switch initiated: {} -> {} ({}). Reason: {}",
                ticket.from, ticket.to, ticket.persona.name, ticket.reason
            ),
            LogType::Info,
            LogSource::ModeSwitcher,
        );
        self.events.emit(CoreEvent::ModeChanged {
            from: ticket.from,
            to: ticket.to,
            persona_id: ticket.persona.id.clone(),
        });
        if had_pending && self.switcher.pending().is_none() {
            self.events.emit(CoreEvent::SuggestionCleared);
        }
        self.persist(keys::MODE, &ticket.to);
        self.timers
            .schedule(self.config.timing.mode_switch_delay(), TimerEvent::SwitchOptimized(ticket));
        true
    }

    /// Fill the pending-suggestion slot. Rejects the current mode, modes
    /// that cannot be entered, and re-proposing the pending value.
    pub fn propose_suggestion(&mut self, mode: AgentMode) -> bool {
        if self.switcher.pending() == Some(mode) || !self.switcher.propose(mode) {
            return false;
        }
        self.log(
            format!("Suggested switching to {} mode", mode),
            LogType::Info,
            LogSource::ModeSwitcher,
        );
        self.events.emit(CoreEvent::SuggestionProposed { mode });
        true
    }

    /// Switch to the pending suggestion. False when there is none.
    pub fn confirm_suggestion(&mut self) -> bool {
        let Some(mode) = self.switcher.take_pending() else {
            return false;
        };
        self.events.emit(CoreEvent::SuggestionCleared);
        self.switch_mode(mode, "suggestion confirmed")
    }

    pub fn dismiss_suggestion(&mut self) -> bool {
        let Some(mode) = self.switcher.pending() else {
            return false;
        };
        self.switcher.dismiss();
        self.log(
            format!("Dismissed suggestion to switch to {} mode", mode),
            LogType::Info,
            LogSource::ModeSwitcher,
        );
        self.events.emit(CoreEvent::SuggestionCleared);
        true
    }

    /// Validate and store a new custom persona. It is not selected.
    pub fn add_custom_agent(&mut self, draft: PersonaDraft) -> Result<Persona> {
        let persona = draft.into_persona()?;
        self.switcher.registry_mut().add_custom(persona.clone());
        self.log(
            format!("Custom agent created: {} ({})", persona.name, persona.role),
            LogType::Success,
            LogSource::System,
        );
        self.persist_custom_agents();
        Ok(persona)
    }

    /// Remove a custom persona. Deleting the active one falls back to
    /// companion. Returns false when nothing changed.
    pub fn delete_custom_agent(&mut self, id: &str) -> bool {
        let from = self.mode();
        let outcome = self.switcher.registry_mut().remove_custom(id);
        if !outcome.removed && !outcome.fell_back {
            return false;
        }
        if outcome.removed {
            self.log(format!("Custom agent deleted: {}", id), LogType::Info, LogSource::System);
        }
        if outcome.fell_back {
            self.log(
                "Active custom agent removed; falling back to companion mode",
                LogType::Warning,
                LogSource::ModeSwitcher,
            );
            let persona_id = self.active_persona().id;
            self.events.emit(CoreEvent::ModeChanged {
                from,
                to: AgentMode::Companion,
                persona_id,
            });
        }
        if self.switcher.reconcile_pending() {
            self.events.emit(CoreEvent::SuggestionCleared);
        }
        self.persist_custom_agents();
        self.persist(keys::MODE, &self.mode());
        true
    }

    /// Select a custom persona and switch to custom mode. Unknown ids are a no-op.
    pub fn select_custom_agent(&mut self, id: &str) -> bool {
        if !self.switcher.registry_mut().select_custom(id) {
            log::debug!("select_custom_agent: unknown id {}", id);
            return false;
        }
        let active = self.active_custom_agent_id().map(str::to_string);
        self.persist(keys::ACTIVE_CUSTOM_AGENT_ID, &active);
        self.switch_mode(AgentMode::Custom, "custom agent selected");
        true
    }

    // -----------------------------------------------------------------------
    // Progression
    // -----------------------------------------------------------------------

    /// Award skill XP. `None` for an unknown skill id.
    ///
    /// Each level reached notifies, logs, and feeds `level × bonus` XP to the
    /// agent level.
    pub fn award_skill_xp(&mut self, skill_id: &str, amount: u64) -> Option<SkillAward> {
        let Some(award) = self.skills.award(skill_id, amount) else {
            log::debug!("award_skill_xp: unknown skill {}", skill_id);
            return None;
        };
        for &level in &award.levels_reached {
            let message = format!("{} reached level {}", award.skill_name, level);
            self.notifier.notify(NotificationKind::Reward, &message, "Skill level up");
            self.log(message, LogType::Success, LogSource::Skills);
            self.events.emit(CoreEvent::SkillLeveled {
                skill_id: award.skill_id.clone(),
                level,
            });
            self.feed_agent(u64::from(level) * self.config.progression.skill_level_bonus_xp);
        }
        self.persist(keys::SKILLS, self.skills.all());
        Some(award)
    }

    pub fn train_skill(&mut self, skill_id: &str) -> Option<SkillAward> {
        let amount = self.config.progression.train_xp;
        let name = self.skills.get(skill_id)?.name.clone();
        self.log(format!("Training {} (+{} XP)", name, amount), LogType::Info, LogSource::Skills);
        self.award_skill_xp(skill_id, amount)
    }

    /// Add XP to the agent level.
    ///
    /// A multi-level gain produces one log entry, one notification and one
    /// event for the final level.
    pub fn feed_agent(&mut self, amount: u64) -> Option<LevelGain> {
        if amount == 0 {
            return None;
        }
        let gain = self.level.award(amount);
        if let Some(gain) = gain {
            let message = match gain.levels() {
                1 => format!("Agent reached level {}", gain.to),
                n => format!("Agent reached level {} (+{} levels)", gain.to, n),
            };
            self.notifier.notify(NotificationKind::Reward, &message, "Level up");
            self.log(message, LogType::Success, LogSource::Skills);
            self.events.emit(CoreEvent::AgentLeveled { level: gain.to });
        }
        self.persist(keys::AGENT_LEVEL, &self.level);
        gain
    }

    // -----------------------------------------------------------------------
    // Journeys
    // -----------------------------------------------------------------------

    /// Start a journey from the catalog, replacing any active one.
    pub fn start_journey(&mut self, template_id: &str) -> Result<JourneyStarted> {
        let started = self.journeys.start(template_id)?;
        if let Some(abandoned) = &started.abandoned {
            self.log(format!("Journey abandoned: {}", abandoned), LogType::Warning, LogSource::Journey);
        }
        let first = self.current_instruction().unwrap_or_default().to_string();
        self.log(
            format!("Journey started: {}. {}", started.name, first),
            LogType::Info,
            LogSource::Journey,
        );
        self.events.emit(CoreEvent::JourneyStarted {
            journey_id: started.journey_id.clone(),
        });
        Ok(started)
    }

    /// Complete the current step. False without an active journey.
    pub fn advance_journey(&mut self) -> bool {
        match self.journeys.advance() {
            None => false,
            Some(StepAdvance::Next { completed, current }) => {
                self.log(
                    format!("Step completed: {}. Next: {}", completed, current),
                    LogType::Info,
                    LogSource::Journey,
                );
                if let Some(journey) = self.journeys.active() {
                    let event = CoreEvent::JourneyAdvanced {
                        journey_id: journey.id.clone(),
                        step_index: journey.current_step_index,
                    };
                    self.events.emit(event);
                }
                true
            }
            Some(StepAdvance::Finished { completed, journey_name }) => {
                self.log(format!("Step completed: {}", completed), LogType::Info, LogSource::Journey);
                self.on_journey_completed(journey_name);
                true
            }
        }
    }

    /// Finish the active journey now and award the completion bonus.
    pub fn complete_journey(&mut self) -> bool {
        match self.journeys.complete() {
            Some(name) => {
                self.on_journey_completed(name);
                true
            }
            None => false,
        }
    }

    fn on_journey_completed(&mut self, name: String) {
        let message = format!("Journey completed: {}", name);
        self.notifier.notify(NotificationKind::Success, &message, "Journey complete");
        self.log(message, LogType::Success, LogSource::Journey);
        if let Some(journey) = self.journeys.last_completed() {
            let event = CoreEvent::JourneyCompleted {
                journey_id: journey.id.clone(),
            };
            self.events.emit(event);
        }
        self.feed_agent(self.config.progression.journey_bonus_xp);
    }

    // -----------------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------------

    /// `STABLE → UNSTABLE` and arm the degrade chain. False unless stable.
    pub fn trigger_system_crash(&mut self) -> bool {
        let Some((transition, timer)) = self.health.trigger_crash() else {
            log::debug!("trigger_system_crash ignored in {}", self.health.state());
            return false;
        };
        self.apply_health(transition);
        self.timers.schedule(timer.delay, TimerEvent::Health(timer));
        true
    }

    /// Force `REBOOTING` from anything but `REBOOTING`.
    pub fn initiate_self_healing(&mut self) -> bool {
        let Some((transition, timer)) = self.health.initiate_self_healing() else {
            log::debug!("initiate_self_healing ignored while rebooting");
            return false;
        };
        self.log("Self-healing initiated", LogType::Info, LogSource::Health);
        self.apply_health(transition);
        self.timers.schedule(timer.delay, TimerEvent::Health(timer));
        true
    }

    fn apply_health(&mut self, transition: HealthTransition) {
        let (message, log_type) = match transition.to {
            HealthState::Unstable => ("System instability detected", LogType::Warning),
            HealthState::Critical => ("Critical failure: core services unresponsive", LogType::Error),
            HealthState::Rebooting => ("Rebooting subsystems", LogType::Warning),
            HealthState::Stable => ("System stabilized", LogType::Success),
        };
        self.log(
            format!("{} ({} -> {})", message, transition.from, transition.to),
            log_type,
            LogSource::Health,
        );
        self.events.emit(CoreEvent::HealthChanged {
            from: transition.from,
            to: transition.to,
        });
        if transition.stabilized() {
            self.notifier
                .notify(NotificationKind::Success, "All systems nominal.", "System stabilized");
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub fn extract_action_from_text(&mut self, text: &str) -> Option<ActionItem> {
        let item = self.actions.extract(text)?;
        self.log(
            format!("Action captured ({:?}): {}", item.priority, truncate_chars(&item.text, 48)),
            LogType::Info,
            LogSource::Actions,
        );
        self.events.emit(CoreEvent::ActionExtracted { item: item.clone() });
        Some(item)
    }

    pub fn mark_action_synced(&mut self, id: &str) -> bool {
        if !self.actions.mark_synced(id) {
            return false;
        }
        self.log(format!("Action synced: {}", id), LogType::Success, LogSource::Actions);
        self.events.emit(CoreEvent::ActionSynced { id: id.to_string() });
        true
    }

    // -----------------------------------------------------------------------
    // Logs
    // -----------------------------------------------------------------------

    pub fn add_log(&mut self, message: impl Into<String>, log_type: LogType, source: LogSource) -> LogEntry {
        self.log(message, log_type, source)
    }

    pub fn clear_logs(&mut self) -> usize {
        let count = self.logs.clear();
        self.events.emit(CoreEvent::LogsCleared { archived: false, count });
        count
    }

    pub fn archive_logs(&mut self) -> usize {
        let count = self.logs.archive();
        self.events.emit(CoreEvent::LogsCleared { archived: true, count });
        count
    }

    /// Write the current ledger to a timestamped JSON file in `dir`.
    pub fn export_logs(&self, dir: &Path) -> Result<PathBuf> {
        let path = self.logs.export(dir)?;
        log::info!("Exported {} log entries to {}", self.logs.len(), path.display());
        Ok(path)
    }

    pub fn export_logs_json(&self) -> Result<String> {
        Ok(self.logs.to_json()?)
    }

    // -----------------------------------------------------------------------
    // View and theme
    // -----------------------------------------------------------------------

    /// Record the host's current view and propose its preferred mode.
    pub fn set_view(&mut self, view: &str) -> Option<AgentMode> {
        self.view = Some(view.to_string());
        let suggestion = classifier::classify("", Some(view), self.mode())?;
        self.propose_suggestion(suggestion).then_some(suggestion)
    }

    pub fn set_theme(&mut self, theme: ThemePreferences) -> bool {
        if theme == self.theme {
            return false;
        }
        self.theme = theme;
        self.log(
            format!(
                "Theme updated: {} / {}",
                if self.theme.dark_mode { "dark" } else { "light" },
                self.theme.accent
            ),
            LogType::Info,
            LogSource::System,
        );
        self.persist(keys::THEME, &self.theme);
        true
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Move virtual time forward by `elapsed`, firing every timer that comes
    /// due, including timers armed by earlier ones within the window.
    pub fn advance(&mut self, elapsed: Duration) {
        let horizon = self.timers.now() + elapsed;
        while let Some(event) = self.timers.pop_due(horizon) {
            self.fire(event);
        }
        self.timers.set_now(horizon);
    }

    /// Fire timers until the queue is empty.
    pub fn settle(&mut self) {
        while let Some(due) = self.timers.next_due() {
            let step = due.saturating_sub(self.timers.now());
            self.advance(step);
        }
    }

    fn fire(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::SwitchOptimized(ticket) => {
                let notice = ticket.notice();
                self.log(
                    format!("Switch optimized: {} online in {} mode", ticket.persona.name, ticket.to),
                    LogType::Success,
                    LogSource::ModeSwitcher,
                );
                self.notifier.notify(NotificationKind::Info, &notice.message, &notice.title);
                self.events.emit(CoreEvent::SwitchOptimized {
                    mode: ticket.to,
                    persona_id: ticket.persona.id,
                });
            }
            TimerEvent::Health(timer) => {
                if let Some((transition, next)) = self.health.on_timer(timer) {
                    self.apply_health(transition);
                    if let Some(next) = next {
                        self.timers.schedule(next.delay, TimerEvent::Health(next));
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    pub(super) fn log(&mut self, message: impl Into<String>, log_type: LogType, source: LogSource) -> LogEntry {
        let entry = self.logs.add(message, log_type, source).clone();
        self.events.emit(CoreEvent::LogAppended { entry: entry.clone() });
        entry
    }

    fn persist_custom_agents(&self) {
        let registry = self.switcher.registry();
        self.persist(keys::CUSTOM_AGENTS, registry.custom_agents());
        self.persist(keys::ACTIVE_CUSTOM_AGENT_ID, &registry.active_custom_agent_id());
    }

    /// Serialize and save. Failures are logged, never returned.
    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let blob = match serde_json::to_string(value) {
            Ok(blob) => blob,
            Err(e) => {
                log::error!("Failed to serialize '{}': {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.save(key, &blob) {
            log::warn!("Failed to persist '{}': {}", key, e);
        }
    }
}

fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.load(key) {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding malformed '{}', using defaults: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("Failed to load '{}', using defaults: {}", key, e);
            None
        }
    }
}

/// Keep loaded progress, repair it, and add catalog skills the blob lacks.
fn merge_with_catalog(loaded: Vec<Skill>) -> Vec<Skill> {
    let mut loaded: Vec<Skill> = loaded.into_iter().map(Skill::repaired).collect();
    for default in default_skills() {
        if !loaded.iter().any(|s| s.id == default.id) {
            loaded.push(default);
        }
    }
    loaded
}
