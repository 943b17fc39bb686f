// Vehicle registry: the only place ship records are created or dropped.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::domain::ports::HostWorld;
use crate::domain::ship::{EntityId, Ship, VehicleId};

/// Thread-safe registry of governed vehicles.
///
/// Besides the ships it keeps the grid subscription table that routes block
/// add/remove notifications to the vehicle owning the grid.
#[derive(Debug)]
pub struct ShipRegistry {
    // Ticks a new ship waits before its block hooks are attached.
    hook_delay_ticks: u32,
    ships: RwLock<HashMap<VehicleId, Arc<Ship>>>,
    // Subscribed grid id to owning vehicle id.
    grid_subscriptions: RwLock<HashMap<VehicleId, VehicleId>>,
}

impl ShipRegistry {
    pub fn new(hook_delay_ticks: u32) -> Self {
        Self {
            hook_delay_ticks,
            ships: RwLock::new(HashMap::new()),
            grid_subscriptions: RwLock::new(HashMap::new()),
        }
    }

    // Registers the top-level structure owning `entity` when it is a dynamic,
    // physically simulated grid. Returns the vehicle id when it is tracked.
    pub fn register(&self, world: &dyn HostWorld, entity: EntityId) -> Option<VehicleId> {
        let vehicle_id = world.resolve_top_level(entity)?;
        let grid = world.grid_state(vehicle_id)?;
        if !grid.is_governable() {
            return None;
        }

        // Every mutation is a single insert or remove, so a poisoned map is still consistent.
        let mut ships = self.ships.write().unwrap_or_else(PoisonError::into_inner);
        if ships.contains_key(&vehicle_id) {
            return Some(vehicle_id);
        }

        let ship = Ship::new(vehicle_id, grid.name, grid.size, self.hook_delay_ticks);
        info!(vehicle_id, name = ship.name(), size = ?ship.size(), "ship registered");
        ships.insert(vehicle_id, Arc::new(ship));
        Some(vehicle_id)
    }

    // Drops the ship and every grid subscription pointing at it.
    pub fn unregister(&self, vehicle_id: VehicleId) -> bool {
        let removed = self
            .ships
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&vehicle_id)
            .is_some();

        self.grid_subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, owner| *owner != vehicle_id);

        if removed {
            info!(vehicle_id, "ship unregistered");
        }
        removed
    }

    pub fn get(&self, vehicle_id: VehicleId) -> Option<Arc<Ship>> {
        let ships = self.ships.read().unwrap_or_else(PoisonError::into_inner);
        ships.get(&vehicle_id).cloned()
    }

    pub fn contains(&self, vehicle_id: VehicleId) -> bool {
        let ships = self.ships.read().unwrap_or_else(PoisonError::into_inner);
        ships.contains_key(&vehicle_id)
    }

    // Point-in-time snapshot; later registry changes do not affect it.
    pub fn all(&self) -> Vec<Arc<Ship>> {
        let ships = self.ships.read().unwrap_or_else(PoisonError::into_inner);
        ships.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ships.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Routes block notifications of `grids` to `vehicle_id`.
    pub fn subscribe_grids(&self, vehicle_id: VehicleId, grids: &[VehicleId]) {
        if !self.contains(vehicle_id) {
            return;
        }
        let mut subscriptions = self
            .grid_subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for grid in grids {
            subscriptions.insert(*grid, vehicle_id);
        }
        debug!(vehicle_id, grids = grids.len(), "grid hooks attached");
    }

    pub fn vehicle_for_grid(&self, grid: VehicleId) -> Option<VehicleId> {
        let subscriptions = self
            .grid_subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        subscriptions.get(&grid).copied()
    }

    pub fn subscription_count(&self) -> usize {
        self.grid_subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear(&self) {
        self.ships.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.grid_subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ship::SizeClass;
    use crate::interface_adapters::memory_host::{GridSpec, MemoryHost};

    #[test]
    fn when_dynamic_grid_is_added_then_it_is_registered_once() {
        let host = MemoryHost::new();
        let grid = host.add_grid(GridSpec::new(1, SizeClass::Small));
        let registry = ShipRegistry::new(0);

        assert_eq!(registry.register(&host, grid), Some(grid));
        assert_eq!(registry.register(&host, grid), Some(grid));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn when_grid_is_static_or_ghost_then_it_is_not_registered() {
        let host = MemoryHost::new();
        let station = host.add_grid(GridSpec::new(1, SizeClass::Large).with_static(true));
        let projection = host.add_grid(GridSpec::new(2, SizeClass::Small).with_physics(false));
        let registry = ShipRegistry::new(0);

        assert_eq!(registry.register(&host, station), None);
        assert_eq!(registry.register(&host, projection), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn when_subgrid_is_added_then_top_level_grid_is_registered() {
        let host = MemoryHost::new();
        let parent = host.add_grid(GridSpec::new(1, SizeClass::Large));
        let rotor_head = host.add_grid(GridSpec::new(2, SizeClass::Large).with_parent(parent));
        let registry = ShipRegistry::new(0);

        assert_eq!(registry.register(&host, rotor_head), Some(parent));
        assert!(registry.contains(parent));
        assert!(!registry.contains(rotor_head));
    }

    #[test]
    fn when_snapshot_is_taken_then_later_removals_do_not_affect_it() {
        let host = MemoryHost::new();
        let registry = ShipRegistry::new(0);
        for id in 1..=3 {
            host.add_grid(GridSpec::new(id, SizeClass::Small));
            registry.register(&host, id);
        }

        let snapshot = registry.all();
        registry.unregister(2);

        assert_eq!(snapshot.len(), 3);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn when_ship_is_unregistered_then_its_grid_subscriptions_are_dropped() {
        let host = MemoryHost::new();
        host.add_grid(GridSpec::new(1, SizeClass::Large));
        host.add_grid(GridSpec::new(5, SizeClass::Small));
        let registry = ShipRegistry::new(0);
        registry.register(&host, 1);
        registry.register(&host, 5);
        registry.subscribe_grids(1, &[1, 2, 3]);
        registry.subscribe_grids(5, &[5]);

        registry.unregister(1);

        assert_eq!(registry.vehicle_for_grid(2), None);
        assert_eq!(registry.vehicle_for_grid(5), Some(5));
        assert_eq!(registry.subscription_count(), 1);
    }

    #[test]
    fn when_vehicle_is_unknown_then_subscription_is_ignored() {
        let registry = ShipRegistry::new(0);

        registry.subscribe_grids(42, &[42]);

        assert_eq!(registry.subscription_count(), 0);
    }
}
