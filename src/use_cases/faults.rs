// Rate-limited reporting of unexpected faults to the local player.

use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::error;

use crate::domain::notifications::MessageColor;
use crate::domain::ports::{Clock, NotificationSink};

/// Logs every fault and shows at most one notice per cooldown window.
pub struct FaultReporter {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    cooldown: Duration,
    last_notice_ms: Mutex<Option<u64>>,
}

impl FaultReporter {
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn NotificationSink>, cooldown: Duration) -> Self {
        Self {
            clock,
            sink,
            cooldown,
            last_notice_ms: Mutex::new(None),
        }
    }

    // Returns true when a player-visible notice was shown.
    pub fn report(&self, component: &str, fault: &dyn Display) -> bool {
        error!(component, error = %fault, "unexpected fault");

        let now = self.clock.now_millis();
        let cooldown_ms = u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX);
        let mut last = self
            .last_notice_ms
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last.is_some_and(|previous| now.saturating_sub(previous) < cooldown_ms) {
            return false;
        }
        *last = Some(now);
        drop(last);

        self.sink.notify_local(
            &format!("[ ERROR: {component}: {fault} | Send the server log to the mod author ]"),
            MessageColor::Red,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::memory_host::MemoryHost;
    use crate::use_cases::test_support::FixedClock;

    #[test]
    fn when_faults_repeat_within_cooldown_then_only_first_is_shown() {
        let clock = Arc::new(FixedClock::new(1_000));
        let host = Arc::new(MemoryHost::new());
        let reporter = FaultReporter::new(clock.clone(), host.clone(), Duration::from_secs(10));

        assert!(reporter.report("governor", &"boom"));
        clock.advance_millis(9_999);
        assert!(!reporter.report("governor", &"boom again"));
        clock.advance_millis(1);
        assert!(reporter.report("combat zones", &"later"));

        let notices = host.local_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(
            notices[0],
            "[ ERROR: governor: boom | Send the server log to the mod author ]"
        );
    }
}
