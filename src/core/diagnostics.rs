//! Self-diagnostics snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::agent::AgentCore;
use crate::health::HealthState;
use crate::interfaces::NotificationKind;
use crate::logs::{LogSource, LogType};
use crate::persona::AgentMode;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub generated_at: DateTime<Utc>,
    pub health: HealthState,
    pub health_epoch: u64,
    pub mode: AgentMode,
    pub persona_id: String,
    pub agent_level: u32,
    pub agent_xp: u64,
    pub active_journey: Option<String>,
    pub current_step: Option<String>,
    pub log_entries: usize,
    pub error_entries: usize,
    pub archived_entries: usize,
    pub pending_actions: usize,
    pub pending_timers: usize,
    pub virtual_time_ms: u128,
}

impl DiagnosticsReport {
    pub fn summary(&self) -> String {
        format!(
            "Diagnostics: health={}, mode={}, level={}, journey={}, logs={} ({} errors), timers={}",
            self.health,
            self.mode,
            self.agent_level,
            self.active_journey.as_deref().unwrap_or("none"),
            self.log_entries,
            self.error_entries,
            self.pending_timers
        )
    }
}

impl AgentCore {
    pub fn diagnostics(&self) -> DiagnosticsReport {
        let journey = self.journeys.active();
        DiagnosticsReport {
            generated_at: Utc::now(),
            health: self.health.state(),
            health_epoch: self.health.epoch(),
            mode: self.mode(),
            persona_id: self.active_persona().id,
            agent_level: self.level.level,
            agent_xp: self.level.xp,
            active_journey: journey.map(|j| j.id.clone()),
            current_step: journey.and_then(|j| j.current_step()).map(|s| s.label.clone()),
            log_entries: self.logs.len(),
            error_entries: self.logs.errors().count(),
            archived_entries: self.logs.archived().len(),
            pending_actions: self.actions.pending().count(),
            pending_timers: self.timers.len(),
            virtual_time_ms: self.timers.now().as_millis(),
        }
    }

    /// Snapshot the session, log the summary and raise an info notification.
    pub fn run_self_diagnostics(&mut self) -> DiagnosticsReport {
        let report = self.diagnostics();
        let summary = report.summary();
        self.log(summary.clone(), LogType::Info, LogSource::Health);
        self.notifier.notify(NotificationKind::Info, &summary, "Self-diagnostics");
        report
    }
}
