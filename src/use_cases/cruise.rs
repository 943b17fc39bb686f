// Per-controller cruise flag stored in the host's block storage.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::{BlockStorage, HostWorld};
use crate::domain::ship::{BlockId, Ship, VehicleId};
use crate::use_cases::registry::ShipRegistry;

/// Storage key of the cruise flag; must stay stable across saves.
pub const CRUISE_STORAGE_KEY: &str = "2d14d3e8-a962-424d-b011-4056c53bbb01";

/// Reads and writes the cruise flag of controllers.
#[derive(Clone)]
pub struct CruiseControl {
    world: Arc<dyn HostWorld>,
    storage: Arc<dyn BlockStorage>,
}

impl CruiseControl {
    pub fn new(world: Arc<dyn HostWorld>, storage: Arc<dyn BlockStorage>) -> Self {
        Self { world, storage }
    }

    // Flag of a single controller. A missing flag is initialised to `false`.
    pub fn read_flag(&self, controller: BlockId) -> bool {
        match self.storage.read(controller, CRUISE_STORAGE_KEY) {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                warn!(controller, value = %raw, "unreadable cruise flag, treating as off");
                false
            }),
            None => {
                self.storage
                    .write(controller, CRUISE_STORAGE_KEY, false.to_string());
                false
            }
        }
    }

    fn write_flag(&self, controller: BlockId, value: bool) {
        self.storage
            .write(controller, CRUISE_STORAGE_KEY, value.to_string());
    }

    // True when the controller can steer the ship; cruise is offered on those only.
    fn can_control(&self, controller: BlockId) -> bool {
        self.world
            .controller_state(controller)
            .is_some_and(|state| state.can_control_ship)
    }

    pub fn get_cruise_engaged(
        &self,
        registry: &ShipRegistry,
        vehicle_id: VehicleId,
        controller: BlockId,
    ) -> bool {
        registry
            .get(vehicle_id)
            .is_some_and(|ship| ship.has_controller(controller))
            && self.read_flag(controller)
    }

    // Sets the flag from the terminal UI. Returns false when the controller
    // does not belong to the vehicle or cannot steer it.
    pub fn set_cruise_engaged(
        &self,
        registry: &ShipRegistry,
        vehicle_id: VehicleId,
        controller: BlockId,
        value: bool,
    ) -> bool {
        let owned = registry
            .get(vehicle_id)
            .is_some_and(|ship| ship.has_controller(controller));
        if !owned || !self.can_control(controller) {
            return false;
        }
        self.write_flag(controller, value);
        debug!(vehicle_id, controller, value, "cruise flag set");
        true
    }

    // Terminal toggle action. Returns the new value, or `None` when not applicable.
    pub fn toggle_cruise(
        &self,
        registry: &ShipRegistry,
        vehicle_id: VehicleId,
        controller: BlockId,
    ) -> Option<bool> {
        let current = self.get_cruise_engaged(registry, vehicle_id, controller);
        self.set_cruise_engaged(registry, vehicle_id, controller, !current)
            .then_some(!current)
    }

    // Applies a boost flag replicated from another peer. Only functional,
    // ship-controlling controllers accept it; repeating a request is harmless.
    pub fn sync_boost_request(
        &self,
        registry: &ShipRegistry,
        vehicle_id: VehicleId,
        controller: BlockId,
        value: bool,
    ) -> bool {
        let Some(ship) = registry.get(vehicle_id) else {
            return false;
        };
        if !ship.has_controller(controller) {
            return false;
        }
        let eligible = self
            .world
            .controller_state(controller)
            .is_some_and(|state| state.functional && state.can_control_ship);
        if !eligible {
            return false;
        }
        self.write_flag(controller, value);
        true
    }

    // Whether a functional, piloted, ship-controlling seat has cruise on.
    pub fn is_cruise_engaged(&self, ship: &Ship, allow_super_cruise: bool) -> bool {
        if !allow_super_cruise {
            return false;
        }
        ship.controllers().into_iter().any(|controller| {
            self.world.controller_state(controller).is_some_and(|state| {
                state.functional && state.can_control_ship && state.is_piloted()
            }) && self.read_flag(controller)
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ship::SizeClass;
    use crate::interface_adapters::memory_host::{ControllerSpec, GridSpec, MemoryHost};

    struct Fixture {
        host: Arc<MemoryHost>,
        registry: ShipRegistry,
        cruise: CruiseControl,
    }

    fn fixture() -> Fixture {
        let host = Arc::new(MemoryHost::new());
        host.add_grid(GridSpec::new(1, SizeClass::Small));
        host.add_controller(1, ControllerSpec::new(10).piloted_by(77));
        host.add_controller(1, ControllerSpec::new(11).passenger_seat());
        let registry = ShipRegistry::new(0);
        registry.register(host.as_ref(), 1);
        let ship = registry.get(1).expect("registered");
        for block in host.blocks(1) {
            ship.add_block(block);
        }
        let cruise = CruiseControl::new(host.clone(), host.clone());
        Fixture {
            host,
            registry,
            cruise,
        }
    }

    #[test]
    fn when_flag_is_missing_then_read_stores_false() {
        let f = fixture();

        assert!(!f.cruise.read_flag(10));
        assert_eq!(
            f.host.stored_value(10, CRUISE_STORAGE_KEY).as_deref(),
            Some("false")
        );
    }

    #[test]
    fn when_flag_is_toggled_then_value_flips_and_persists() {
        let f = fixture();

        assert_eq!(f.cruise.toggle_cruise(&f.registry, 1, 10), Some(true));
        assert!(f.cruise.get_cruise_engaged(&f.registry, 1, 10));
        assert_eq!(f.cruise.toggle_cruise(&f.registry, 1, 10), Some(false));
        assert_eq!(
            f.host.stored_value(10, CRUISE_STORAGE_KEY).as_deref(),
            Some("false")
        );
    }

    #[test]
    fn when_seat_cannot_control_ship_then_set_is_refused() {
        let f = fixture();

        assert!(!f.cruise.set_cruise_engaged(&f.registry, 1, 11, true));
        assert!(!f.cruise.sync_boost_request(&f.registry, 1, 11, true));
        assert!(!f.cruise.set_cruise_engaged(&f.registry, 2, 10, true));
    }

    #[test]
    fn when_sync_request_repeats_then_result_is_unchanged() {
        let f = fixture();

        assert!(f.cruise.sync_boost_request(&f.registry, 1, 10, true));
        assert!(f.cruise.sync_boost_request(&f.registry, 1, 10, true));

        assert!(f.cruise.get_cruise_engaged(&f.registry, 1, 10));
    }

    #[test]
    fn when_piloted_seat_has_flag_then_cruise_is_engaged_unless_disallowed() {
        let f = fixture();
        let ship = f.registry.get(1).expect("ship");
        f.cruise.set_cruise_engaged(&f.registry, 1, 10, true);

        assert!(f.cruise.is_cruise_engaged(&ship, true));
        assert!(!f.cruise.is_cruise_engaged(&ship, false));

        f.host.set_pilot(10, None);
        assert!(!f.cruise.is_cruise_engaged(&ship, true));
    }
}
