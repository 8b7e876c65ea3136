//! Real-time driver for the virtual timer queue.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::agent::AgentCore;

/// A core shared between the clock task and request handlers.
pub type SharedCore = Arc<Mutex<AgentCore>>;

pub fn shared(core: AgentCore) -> SharedCore {
    Arc::new(Mutex::new(core))
}

/// Advance `core` by wall-clock time every `tick`. Abort the handle to stop.
pub fn spawn_clock(core: SharedCore, tick: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();
        loop {
            interval.tick().await;
            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;
            core.lock().advance(elapsed);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{LogNotifier, MemoryStore};
    use crate::persona::AgentMode;
    use crate::utilities::config::CoreConfig;

    #[tokio::test]
    async fn test_clock_fires_switch_phase_two() {
        let mut config = CoreConfig::default();
        config.timing.mode_switch_delay_ms = 20;
        let core = shared(AgentCore::open(config, Arc::new(MemoryStore::new()), Arc::new(LogNotifier)));

        core.lock().switch_mode(AgentMode::Phantom, "clock test");
        let handle = spawn_clock(core.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        let core = core.lock();
        assert_eq!(core.pending_timers(), 0);
        assert_eq!(core.logs().len(), 2);
        assert!(core.now() >= Duration::from_millis(20));
    }
}
