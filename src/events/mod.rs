//! Core events and the broadcast hub that delivers them.
//!
//! Every committed state change is published as a [`CoreEvent`] wrapped in
//! an [`EventEnvelope`] carrying an id, a UTC timestamp and a per-hub
//! emission sequence. Subscribers get their own `broadcast::Receiver`; a
//! slow subscriber lags and drops old events without blocking the core.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::actions::ActionItem;
use crate::health::HealthState;
use crate::logs::LogEntry;
use crate::persona::AgentMode;

/// Default broadcast buffer per subscriber.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    ModeChanged {
        from: AgentMode,
        to: AgentMode,
        persona_id: String,
    },
    SwitchOptimized {
        mode: AgentMode,
        persona_id: String,
    },
    SuggestionProposed {
        mode: AgentMode,
    },
    SuggestionCleared,
    SkillLeveled {
        skill_id: String,
        level: u32,
    },
    AgentLeveled {
        level: u32,
    },
    JourneyStarted {
        journey_id: String,
    },
    JourneyAdvanced {
        journey_id: String,
        step_index: usize,
    },
    JourneyCompleted {
        journey_id: String,
    },
    HealthChanged {
        from: HealthState,
        to: HealthState,
    },
    ActionExtracted {
        item: ActionItem,
    },
    ActionSynced {
        id: String,
    },
    LogAppended {
        entry: LogEntry,
    },
    LogsCleared {
        archived: bool,
        count: usize,
    },
}

impl CoreEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CoreEvent::ModeChanged { .. } => "mode_changed",
            CoreEvent::SwitchOptimized { .. } => "switch_optimized",
            CoreEvent::SuggestionProposed { .. } => "suggestion_proposed",
            CoreEvent::SuggestionCleared => "suggestion_cleared",
            CoreEvent::SkillLeveled { .. } => "skill_leveled",
            CoreEvent::AgentLeveled { .. } => "agent_leveled",
            CoreEvent::JourneyStarted { .. } => "journey_started",
            CoreEvent::JourneyAdvanced { .. } => "journey_advanced",
            CoreEvent::JourneyCompleted { .. } => "journey_completed",
            CoreEvent::HealthChanged { .. } => "health_changed",
            CoreEvent::ActionExtracted { .. } => "action_extracted",
            CoreEvent::ActionSynced { .. } => "action_synced",
            CoreEvent::LogAppended { .. } => "log_appended",
            CoreEvent::LogsCleared { .. } => "logs_cleared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEnvelope {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub emission_sequence: u64,
    #[serde(flatten)]
    pub event: CoreEvent,
}

/// Broadcast sender plus the emission counter.
#[derive(Debug)]
pub struct EventHub {
    sender: broadcast::Sender<EventEnvelope>,
    next_sequence: u64,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            next_sequence: 1,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish `event`. Sending with no subscribers is not an error.
    pub fn emit(&mut self, event: CoreEvent) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let envelope = EventEnvelope {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            emission_sequence: sequence,
            event,
        };
        // Err only means nobody is listening.
        let _ = self.sender.send(envelope);
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers() {
        let mut hub = EventHub::default();
        assert_eq!(hub.emit(CoreEvent::SuggestionCleared), 1);
        assert_eq!(hub.emit(CoreEvent::AgentLeveled { level: 2 }), 2);
    }

    #[test]
    fn test_subscribers_receive_in_order() {
        let mut hub = EventHub::new(8);
        let mut rx = hub.subscribe();
        hub.emit(CoreEvent::SuggestionProposed { mode: AgentMode::Phantom });
        hub.emit(CoreEvent::SuggestionCleared);

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.emission_sequence, 1);
        assert_eq!(first.event.event_type(), "suggestion_proposed");
        assert_eq!(second.event, CoreEvent::SuggestionCleared);
    }

    #[test]
    fn test_envelope_serializes_flat() {
        let mut hub = EventHub::new(4);
        let mut rx = hub.subscribe();
        hub.emit(CoreEvent::HealthChanged {
            from: HealthState::Stable,
            to: HealthState::Unstable,
        });
        let json = serde_json::to_value(rx.try_recv().unwrap()).unwrap();
        assert_eq!(json["type"], "health_changed");
        assert_eq!(json["to"], "UNSTABLE");
        assert_eq!(json["emission_sequence"], 1);
    }
}
