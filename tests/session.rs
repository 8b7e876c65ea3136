//! End-to-end sessions through the public API.

use std::sync::Arc;
use std::time::Duration;

use adaptive_agent_core::core::keys;
use adaptive_agent_core::interfaces::{MemoryStore, RecordingNotifier};
use adaptive_agent_core::{
    AgentCore, AgentMode, CoreConfig, CoreEvent, HealthState, PersonaDraft, ThemePreferences,
};

fn open(store: &MemoryStore, notifier: &RecordingNotifier) -> AgentCore {
    AgentCore::open(CoreConfig::default(), Arc::new(store.clone()), Arc::new(notifier.clone()))
}

#[test]
fn test_session_state_survives_reopen() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();

    let custom_id = {
        let mut core = open(&store, &notifier);
        let persona = core
            .add_custom_agent(PersonaDraft {
                name: "Eco".into(),
                instruction: "Track emissions per supplier".into(),
                ..Default::default()
            })
            .unwrap();
        assert!(core.select_custom_agent(&persona.id));
        core.award_skill_xp("sk-1", 250).unwrap();
        assert!(core.set_theme(ThemePreferences {
            dark_mode: false,
            accent: "amber".into(),
        }));
        persona.id
    };

    let core = open(&store, &notifier);
    assert_eq!(core.mode(), AgentMode::Custom);
    assert_eq!(core.active_custom_agent_id(), Some(custom_id.as_str()));
    assert_eq!(core.active_persona().name, "Eco");
    assert!(!core.theme().dark_mode);

    let skill = core.skill("sk-1").unwrap();
    assert_eq!((skill.level, skill.current_xp, skill.xp_required), (3, 0, 225));
    assert!(core.agent_level().xp > 0 || core.agent_level().level > 1);
}

#[test]
fn test_malformed_blobs_fall_back_to_defaults() {
    let store = MemoryStore::new();
    store.insert(keys::CUSTOM_AGENTS, "{not json");
    store.insert(keys::MODE, "\"pirate\"");
    store.insert(keys::SKILLS, "42");

    let core = open(&store, &RecordingNotifier::new());
    assert!(core.custom_agents().is_empty());
    assert_eq!(core.mode(), AgentMode::Companion);
    assert_eq!(core.skill("sk-1").unwrap().level, 1);
}

#[test]
fn test_crash_cycle_in_order() {
    let notifier = RecordingNotifier::new();
    let mut core = open(&MemoryStore::new(), &notifier);
    let mut events = core.subscribe();

    assert!(core.trigger_system_crash());
    assert!(!core.trigger_system_crash());

    core.advance(Duration::from_millis(1_500));
    assert_eq!(core.health(), HealthState::Critical);
    core.advance(Duration::from_millis(4_000));
    assert_eq!(core.health(), HealthState::Rebooting);
    core.advance(Duration::from_millis(7_999));
    assert_eq!(core.health(), HealthState::Rebooting);
    core.advance(Duration::from_millis(1));
    assert_eq!(core.health(), HealthState::Stable);

    let mut path = Vec::new();
    while let Ok(envelope) = events.try_recv() {
        if let CoreEvent::HealthChanged { to, .. } = envelope.event {
            path.push(to);
        }
    }
    assert_eq!(
        path,
        vec![
            HealthState::Unstable,
            HealthState::Critical,
            HealthState::Rebooting,
            HealthState::Stable
        ]
    );
    assert!(notifier.titles().iter().any(|t| t == "System stabilized"));
}

#[test]
fn test_guided_journey_through_input() {
    let mut core = AgentCore::default();
    assert!(core.process_universal_input("/journey onboarding", None).command_applied);
    let steps = core.active_journey().unwrap().steps.len();

    for _ in 0..steps {
        assert!(core.advance_journey());
    }
    assert!(core.active_journey().is_none());
    assert!(core.last_completed_journey().unwrap().is_completed);
    assert_eq!(core.agent_level().xp, 200);
    assert!(!core.advance_journey());
}

#[test]
fn test_suggestion_then_confirm_switches_in_two_phases() {
    let notifier = RecordingNotifier::new();
    let mut core = open(&MemoryStore::new(), &notifier);

    let outcome = core.process_universal_input("check the api latency log", None);
    assert_eq!(outcome.suggestion, Some(AgentMode::Phantom));
    assert!(core.confirm_suggestion());
    assert!(!core.confirm_suggestion());
    assert_eq!(core.mode(), AgentMode::Phantom);
    assert_eq!(core.pending_timers(), 1);
    assert!(notifier.notifications().is_empty());

    core.settle();
    assert_eq!(core.pending_timers(), 0);
    assert_eq!(notifier.notifications().len(), 1);
    assert!(!core.switch_mode(AgentMode::Phantom, "again"));
}

#[test]
fn test_deleting_active_custom_agent_falls_back() {
    let mut core = AgentCore::default();
    let persona = core
        .add_custom_agent(PersonaDraft {
            name: "Auditor".into(),
            instruction: "Check every invoice".into(),
            ..Default::default()
        })
        .unwrap();
    core.select_custom_agent(&persona.id);
    assert_eq!(core.mode(), AgentMode::Custom);

    assert!(core.delete_custom_agent(&persona.id));
    assert_eq!(core.mode(), AgentMode::Companion);
    assert_eq!(core.active_persona().id, "companion");
    assert!(!core.select_custom_agent(&persona.id));
}
