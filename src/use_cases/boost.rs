// Boost controller: thrust redistribution for cruising large ships.

use std::sync::Arc;

use tracing::debug;

use crate::domain::flight_model::GRAVITY;
use crate::domain::ports::HostWorld;
use crate::domain::ship::{BlockId, Ship, ShipState};

// Thrust below this (N) counts as an idle thruster.
const IDLE_THRUST: f32 = 1e-4;
pub const NEUTRAL_THRUST_MULTIPLIER: f32 = 1.0;

#[derive(Clone)]
pub struct BoostController {
    world: Arc<dyn HostWorld>,
}

impl BoostController {
    pub fn new(world: Arc<dyn HostWorld>) -> Self {
        Self { world }
    }

    // Scales every active thruster so total thrust approaches
    // `physics_mass * GRAVITY * boost_twr`, keeping each thruster's share.
    // Returns the number of thrusters adjusted.
    pub fn engage(
        &self,
        ship: &Ship,
        state: &mut ShipState,
        physics_mass: f32,
        boost_twr: f32,
    ) -> usize {
        let active: Vec<(BlockId, f32)> = ship
            .thrusters()
            .into_iter()
            .filter_map(|block| {
                let thruster = self.world.thruster_state(block)?;
                (thruster.functional && thruster.current_thrust.abs() >= IDLE_THRUST)
                    .then_some((block, thruster.current_thrust))
            })
            .collect();
        let total: f32 = active.iter().map(|(_, thrust)| thrust).sum();
        let target_total = physics_mass * GRAVITY * boost_twr;

        if total.abs() >= IDLE_THRUST {
            for (block, thrust) in &active {
                let share = thrust / total;
                let multiplier = (target_total * share / thrust).max(NEUTRAL_THRUST_MULTIPLIER);
                self.world.set_thrust_multiplier(*block, multiplier);
            }
        }

        if !state.is_on_boost {
            debug!(vehicle_id = ship.id(), thrusters = active.len(), "thrust boost engaged");
        }
        state.is_on_boost = true;
        active.len()
    }

    // Restores neutral multipliers. Does nothing when the ship is not boosted.
    pub fn disengage(&self, ship: &Ship, state: &mut ShipState) -> bool {
        if !state.is_on_boost {
            return false;
        }
        for block in ship.thrusters() {
            self.world
                .set_thrust_multiplier(block, NEUTRAL_THRUST_MULTIPLIER);
        }
        state.is_on_boost = false;
        debug!(vehicle_id = ship.id(), "thrust boost removed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ship::SizeClass;
    use crate::interface_adapters::memory_host::{GridSpec, MemoryHost, ThrusterSpec};
    use crate::use_cases::registry::ShipRegistry;

    fn boosted_ship() -> (Arc<MemoryHost>, Arc<Ship>) {
        let host = Arc::new(MemoryHost::new());
        host.add_grid(GridSpec::new(1, SizeClass::Large).with_physics_mass(100_000.0));
        host.add_thruster(1, ThrusterSpec::ion(20).with_thrust(300_000.0));
        host.add_thruster(1, ThrusterSpec::ion(21).with_thrust(100_000.0));
        host.add_thruster(1, ThrusterSpec::ion(22).with_thrust(0.0));
        let registry = ShipRegistry::new(0);
        registry.register(host.as_ref(), 1);
        let ship = registry.get(1).expect("ship");
        for block in host.blocks(1) {
            ship.add_block(block);
        }
        (host, ship)
    }

    #[test]
    fn when_engaged_then_active_thrusters_share_the_boost_target() {
        let (host, ship) = boosted_ship();
        let controller = BoostController::new(host.clone());
        let mut state = ShipState::new(0);

        let adjusted = controller.engage(&ship, &mut state, 100_000.0, 3.5);

        assert_eq!(adjusted, 2);
        assert!(state.is_on_boost);
        // target 3_433_500 N over 400_000 N of active thrust
        let expected = 100_000.0 * GRAVITY * 3.5 / 400_000.0;
        assert!((host.thrust_multiplier(20) - expected).abs() < 1e-3);
        assert!((host.thrust_multiplier(21) - expected).abs() < 1e-3);
        assert_eq!(host.thrust_multiplier(22), NEUTRAL_THRUST_MULTIPLIER);
    }

    #[test]
    fn when_thrust_already_exceeds_target_then_multiplier_stays_neutral() {
        let (host, ship) = boosted_ship();
        let controller = BoostController::new(host.clone());
        let mut state = ShipState::new(0);

        controller.engage(&ship, &mut state, 1_000.0, 1.0);

        assert_eq!(host.thrust_multiplier(20), NEUTRAL_THRUST_MULTIPLIER);
    }

    #[test]
    fn when_disengaged_twice_then_second_call_has_no_effect() {
        let (host, ship) = boosted_ship();
        let controller = BoostController::new(host.clone());
        let mut state = ShipState::new(0);
        controller.engage(&ship, &mut state, 100_000.0, 3.5);

        assert!(controller.disengage(&ship, &mut state));
        let writes_after_first = host.thrust_multiplier_writes();
        assert_eq!(host.thrust_multiplier(20), NEUTRAL_THRUST_MULTIPLIER);

        assert!(!controller.disengage(&ship, &mut state));
        assert_eq!(host.thrust_multiplier_writes(), writes_after_first);
        assert!(!state.is_on_boost);
    }
}
