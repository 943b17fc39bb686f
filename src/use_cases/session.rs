// Session: explicitly constructed owner of the registry, settings and workflows.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::damage::DamageEvent;
use crate::domain::physics::SpeedLimits;
use crate::domain::ports::{
    BlockStorage, Clock, EnvironmentOracle, HostWorld, NotificationSink, SettingsRepository,
};
use crate::domain::ship::{BlockId, BlockInfo, EntityId, VehicleId};
use crate::use_cases::combat_zones::{CombatZoneDetector, ZoneReport};
use crate::use_cases::cruise::CruiseControl;
use crate::use_cases::faults::FaultReporter;
use crate::use_cases::governor::{Governor, GovernorTiming, PassReport};
use crate::use_cases::notifier::{NotificationQueue, notification_channel};
use crate::use_cases::registry::ShipRegistry;
use crate::use_cases::settings::{LoadOutcome, SettingsService};

/// Tick and queue tuning for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ticks_per_second: u32,
    // Combat messages delivered per tick at most.
    pub notification_drain_per_tick: usize,
    // Ticks a new ship waits before block hooks attach.
    pub hook_delay_ticks: u32,
    pub mass_refresh_ticks: u32,
    pub fault_notice_cooldown: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            notification_drain_per_tick: 10,
            hook_delay_ticks: 300,
            mass_refresh_ticks: 60,
            fault_notice_cooldown: Duration::from_secs(10),
        }
    }
}

/// Host collaborators the session is wired to.
#[derive(Clone)]
pub struct HostPorts {
    pub world: Arc<dyn HostWorld>,
    pub environment: Arc<dyn EnvironmentOracle>,
    pub storage: Arc<dyn BlockStorage>,
    pub sink: Arc<dyn NotificationSink>,
    pub settings: Arc<dyn SettingsRepository>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct Lifecycle {
    running: bool,
    // Engine limits found at start, restored on stop.
    saved_limits: Option<SpeedLimits>,
}

pub struct InterdictionSession {
    config: SessionConfig,
    ports: HostPorts,
    registry: ShipRegistry,
    settings: SettingsService,
    detector: CombatZoneDetector,
    governor: Governor,
    cruise: CruiseControl,
    notifications: Mutex<NotificationQueue>,
    faults: FaultReporter,
    lifecycle: Mutex<Lifecycle>,
}

impl InterdictionSession {
    pub fn new(config: SessionConfig, ports: HostPorts) -> Self {
        let (notifier, queue) = notification_channel();
        let cruise = CruiseControl::new(ports.world.clone(), ports.storage.clone());
        let governor = Governor::new(
            ports.world.clone(),
            ports.environment.clone(),
            cruise.clone(),
            notifier.clone(),
            GovernorTiming {
                ticks_per_second: config.ticks_per_second,
                mass_refresh_ticks: config.mass_refresh_ticks,
            },
        );
        let detector =
            CombatZoneDetector::new(ports.world.clone(), notifier, config.ticks_per_second);
        let faults = FaultReporter::new(
            ports.clock.clone(),
            ports.sink.clone(),
            config.fault_notice_cooldown,
        );

        Self {
            registry: ShipRegistry::new(config.hook_delay_ticks),
            settings: SettingsService::new(),
            detector,
            governor,
            cruise,
            notifications: Mutex::new(queue),
            faults,
            lifecycle: Mutex::new(Lifecycle::default()),
            config,
            ports,
        }
    }

    fn lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        // Lifecycle fields are plain values; a poisoned guard still holds a valid state.
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Loads settings and installs the engine speed limits. `None` when already running.
    pub fn start(&self) -> Option<LoadOutcome> {
        let mut lifecycle = self.lifecycle();
        if lifecycle.running {
            return None;
        }

        let outcome = self
            .settings
            .load(self.ports.settings.as_ref(), self.ports.sink.as_ref());
        lifecycle.saved_limits = Some(self.ports.world.world_speed_limits());
        let limits = self.settings.snapshot().world_speed_limits();
        self.ports.world.set_world_speed_limits(limits);
        lifecycle.running = true;

        info!(
            small_limit = limits.small,
            large_limit = limits.large,
            ?outcome,
            "interdiction session started"
        );
        Some(outcome)
    }

    // Restores the engine limits, saves settings and forgets every ship.
    pub fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle();
        if !lifecycle.running {
            return false;
        }

        self.governor.release_boosts(&self.registry);
        if let Some(limits) = lifecycle.saved_limits.take() {
            self.ports.world.set_world_speed_limits(limits);
        }
        if let Err(e) = self.settings.save(self.ports.settings.as_ref()) {
            warn!(error = %e, "failed to save settings on stop");
        }
        self.registry.clear();
        lifecycle.running = false;

        info!("interdiction session stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle().running
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &ShipRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn on_entity_added(&self, entity: EntityId) -> Option<VehicleId> {
        if !self.is_running() || !self.ports.world.is_grid(entity) {
            return None;
        }
        self.registry.register(self.ports.world.as_ref(), entity)
    }

    pub fn on_static_changed(&self, grid: VehicleId, is_static: bool) {
        if !self.is_running() {
            return;
        }
        if is_static {
            let vehicle_id = self.ports.world.resolve_top_level(grid).unwrap_or(grid);
            self.registry.unregister(vehicle_id);
        } else {
            self.registry.register(self.ports.world.as_ref(), grid);
        }
    }

    pub fn on_marked_for_close(&self, entity: EntityId) {
        self.registry.unregister(entity);
    }

    // Routes a block notification through the grid subscription table.
    pub fn on_block_added(&self, grid: VehicleId, block: BlockInfo) -> bool {
        let Some(ship) = self
            .registry
            .vehicle_for_grid(grid)
            .and_then(|vehicle_id| self.registry.get(vehicle_id))
        else {
            return false;
        };
        ship.add_block(block)
    }

    pub fn on_block_removed(&self, grid: VehicleId, block: BlockId) -> bool {
        let Some(ship) = self
            .registry
            .vehicle_for_grid(grid)
            .and_then(|vehicle_id| self.registry.get(vehicle_id))
        else {
            return false;
        };
        ship.remove_block(block)
    }

    // Damage entry point. Faults are reported and swallowed.
    pub fn on_damage(&self, event: &DamageEvent) -> ZoneReport {
        if !self.is_running() {
            return ZoneReport::default();
        }
        let settings = self.settings.snapshot();
        match self.detector.handle_damage(event, &self.registry, &settings) {
            Ok(report) => report,
            Err(e) => {
                self.faults.report("combat zones", &e);
                ZoneReport::default()
            }
        }
    }

    // Governor pass over every ship.
    pub fn update_ships(&self) -> PassReport {
        if !self.is_running() || self.registry.is_empty() {
            return PassReport::default();
        }
        let settings = self.settings.snapshot();
        let report = self.governor.update_ships(&self.registry, &settings);
        if let Some((_, e)) = report.failures.first() {
            self.faults.report("governor", e);
        }
        report
    }

    // Delivers queued combat messages, bounded per tick.
    pub fn process_notifications(&self) -> usize {
        let mut queue = self
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let delivered = queue.drain(
            self.config.notification_drain_per_tick,
            self.ports.sink.as_ref(),
        );
        if delivered > 0 {
            debug!(delivered, pending = queue.pending(), "combat messages delivered");
        }
        delivered
    }

    pub fn report_fault(&self, component: &str, fault: &dyn std::fmt::Display) -> bool {
        self.faults.report(component, fault)
    }

    pub fn get_cruise_engaged(&self, vehicle_id: VehicleId, controller: BlockId) -> bool {
        self.cruise
            .get_cruise_engaged(&self.registry, vehicle_id, controller)
    }

    pub fn set_cruise_engaged(&self, vehicle_id: VehicleId, controller: BlockId, value: bool) -> bool {
        self.cruise
            .set_cruise_engaged(&self.registry, vehicle_id, controller, value)
    }

    pub fn toggle_cruise(&self, vehicle_id: VehicleId, controller: BlockId) -> Option<bool> {
        self.cruise
            .toggle_cruise(&self.registry, vehicle_id, controller)
    }

    pub fn sync_boost_request(&self, vehicle_id: VehicleId, controller: BlockId, value: bool) -> bool {
        self.cruise
            .sync_boost_request(&self.registry, vehicle_id, controller, value)
    }

    pub fn list_setting_names(&self) -> Vec<String> {
        self.settings.list_setting_names()
    }

    pub fn get_setting(&self, name: &str) -> Option<String> {
        self.settings.get_setting(name)
    }

    pub fn update_setting(&self, name: &str, value: &str) -> bool {
        self.settings.update_setting(name, value)
    }

    pub fn reset_to_defaults(&self) {
        self.settings.reset_to_defaults();
    }
}
