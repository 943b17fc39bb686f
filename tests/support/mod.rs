// Shared fixtures for driving a session through the in-memory host.
#![allow(dead_code)]

use std::sync::Arc;

use combat_interdiction::domain::ports::SettingsRepository;
use combat_interdiction::domain::ship::{SizeClass, VehicleId};
use combat_interdiction::frameworks::runtime::SystemClock;
use combat_interdiction::interface_adapters::memory_host::{
    ControllerSpec, GridSpec, MemoryHost, MemorySettingsRepository, ThrusterSpec,
};
use combat_interdiction::{HostPorts, InterdictionSession, SessionConfig};

pub struct Harness {
    pub host: Arc<MemoryHost>,
    pub session: InterdictionSession,
}

// Session over a fresh memory host; hooks attach on the first tick.
pub fn session_with(settings: Arc<dyn SettingsRepository>) -> Harness {
    let host = Arc::new(MemoryHost::new());
    let ports = HostPorts {
        world: host.clone(),
        environment: host.clone(),
        storage: host.clone(),
        sink: host.clone(),
        settings,
        clock: Arc::new(SystemClock),
    };
    let config = SessionConfig {
        hook_delay_ticks: 0,
        ..SessionConfig::default()
    };
    Harness {
        host,
        session: InterdictionSession::new(config, ports),
    }
}

pub fn started_session() -> Harness {
    let harness = session_with(Arc::new(MemorySettingsRepository::default()));
    harness.session.start().expect("fresh session starts");
    harness
}

// Adds a registered ship with one ion thruster (id * 10) and, when given, a
// piloted cockpit (id * 10 + 1).
pub fn add_ship(harness: &Harness, spec: GridSpec, pilot: Option<i64>) -> VehicleId {
    let id = harness.host.add_grid(spec);
    harness
        .host
        .add_thruster(id, ThrusterSpec::ion(id * 10).with_thrust(50_000.0));
    if let Some(pilot) = pilot {
        harness
            .host
            .add_controller(id, ControllerSpec::new(id * 10 + 1).piloted_by(pilot));
    }
    harness
        .session
        .on_entity_added(id)
        .expect("dynamic grid registers");
    id
}

pub fn small_ship(id: VehicleId) -> GridSpec {
    GridSpec::new(id, SizeClass::Small)
}

pub fn run_ticks(harness: &Harness, ticks: usize) {
    for _ in 0..ticks {
        harness.session.update_ships();
        harness.session.process_notifications();
    }
}
