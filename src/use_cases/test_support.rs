use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::ports::Clock;
use crate::interface_adapters::memory_host::{MemoryHost, MemorySettingsRepository};
use crate::use_cases::session::{HostPorts, InterdictionSession, SessionConfig};

pub(crate) struct FixedClock(AtomicU64);

impl FixedClock {
    pub(crate) fn new(now_millis: u64) -> Self {
        Self(AtomicU64::new(now_millis))
    }

    pub(crate) fn advance_millis(&self, millis: u64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub(crate) struct SessionFixture {
    pub(crate) host: Arc<MemoryHost>,
    pub(crate) repository: Arc<MemorySettingsRepository>,
    pub(crate) session: InterdictionSession,
}

impl SessionFixture {
    pub(crate) fn new() -> Self {
        Self::with_config(SessionConfig {
            hook_delay_ticks: 0,
            ..SessionConfig::default()
        })
    }

    pub(crate) fn with_config(config: SessionConfig) -> Self {
        let host = Arc::new(MemoryHost::new());
        let repository = Arc::new(MemorySettingsRepository::default());
        let ports = HostPorts {
            world: host.clone(),
            environment: host.clone(),
            storage: host.clone(),
            sink: host.clone(),
            settings: repository.clone(),
            clock: Arc::new(FixedClock::new(0)),
        };
        Self {
            host,
            repository,
            session: InterdictionSession::new(config, ports),
        }
    }

    pub(crate) fn started() -> Self {
        let fixture = Self::new();
        fixture.session.start();
        fixture
    }

    pub(crate) fn started_with_hook_delay(hook_delay_ticks: u32) -> Self {
        let fixture = Self::with_config(SessionConfig {
            hook_delay_ticks,
            ..SessionConfig::default()
        });
        fixture.session.start();
        fixture
    }
}
