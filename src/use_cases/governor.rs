// Speed and turn-rate governor: the per-tick pass over every registered ship.

use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::domain::errors::{GovernorError, OracleError};
use crate::domain::flight_model::{
    self, BOUNDING_BOX_CORNERS, FlightEnvironment, MIN_PARENT_GRID_VOLUME, WATER_CORNER_THRESHOLD,
};
use crate::domain::notifications::CombatMessage;
use crate::domain::physics::{Aabb, FuelKind, GridState};
use crate::domain::ports::{EnvironmentOracle, HostWorld};
use crate::domain::settings::{FlightClass, Settings};
use crate::domain::ship::{CombatTransition, PropulsionClass, Ship, ShipState, SizeClass, VehicleId};
use crate::use_cases::boost::BoostController;
use crate::use_cases::cruise::CruiseControl;
use crate::use_cases::notifier::CombatNotifier;
use crate::use_cases::registry::ShipRegistry;

/// Tick-based timing of the governor.
#[derive(Debug, Clone, Copy)]
pub struct GovernorTiming {
    pub ticks_per_second: u32,
    // Ticks between refreshes of the cached ship mass.
    pub mass_refresh_ticks: u32,
}

/// Why a governed ship was left untouched this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoThrusters,
    // Small and unpiloted; debris and drones.
    TooSmall,
    // Small ship docked to a large grid.
    Docked,
    // NPC traffic outside combat.
    IdleNpc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShipOutcome {
    // No physics, static or being removed.
    Inactive,
    Skipped(SkipReason),
    Governed {
        max_speed: f32,
        speed_limited: bool,
        turn_limited: bool,
    },
}

/// Summary of one pass over the registry.
#[derive(Debug, Default)]
pub struct PassReport {
    pub governed: usize,
    pub skipped: usize,
    pub speed_limited: usize,
    pub turn_limited: usize,
    pub failures: Vec<(VehicleId, GovernorError)>,
}

pub struct Governor {
    world: Arc<dyn HostWorld>,
    environment: Arc<dyn EnvironmentOracle>,
    cruise: CruiseControl,
    boost: BoostController,
    notifier: CombatNotifier,
    timing: GovernorTiming,
}

impl Governor {
    pub fn new(
        world: Arc<dyn HostWorld>,
        environment: Arc<dyn EnvironmentOracle>,
        cruise: CruiseControl,
        notifier: CombatNotifier,
        timing: GovernorTiming,
    ) -> Self {
        Self {
            boost: BoostController::new(world.clone()),
            world,
            environment,
            cruise,
            notifier,
            timing,
        }
    }

    // Governs every registered ship. A failing ship is logged and recorded,
    // the pass continues with the next one.
    pub fn update_ships(&self, registry: &ShipRegistry, settings: &Settings) -> PassReport {
        let mut report = PassReport::default();
        for ship in registry.all() {
            match self.update_ship(registry, &ship, settings) {
                Ok(ShipOutcome::Inactive) => {}
                Ok(ShipOutcome::Skipped(reason)) => {
                    trace!(vehicle_id = ship.id(), ?reason, "ship skipped");
                    report.skipped += 1;
                }
                Ok(ShipOutcome::Governed {
                    speed_limited,
                    turn_limited,
                    ..
                }) => {
                    report.governed += 1;
                    report.speed_limited += usize::from(speed_limited);
                    report.turn_limited += usize::from(turn_limited);
                }
                Err(e) => {
                    error!(vehicle_id = ship.id(), error = %e, "ship update failed");
                    report.failures.push((ship.id(), e));
                }
            }
        }
        report
    }

    pub fn update_ship(
        &self,
        registry: &ShipRegistry,
        ship: &Ship,
        settings: &Settings,
    ) -> Result<ShipOutcome, GovernorError> {
        let vehicle_id = ship.id();
        let Some(grid) = self.world.grid_state(vehicle_id) else {
            return Ok(ShipOutcome::Inactive);
        };
        if !grid.is_governable() {
            return Ok(ShipOutcome::Inactive);
        }

        let mut state = ship.state()?;
        self.initialize(registry, ship, &mut state);
        if state.mass_refresh_due(self.timing.mass_refresh_ticks) {
            if let Some(mass) = self.world.grid_mass(vehicle_id) {
                state.dry_mass = mass.base;
                state.total_mass = mass.physical;
            }
        }
        self.update_combat_status(vehicle_id, &mut state);
        self.apply_limits(ship, &grid, &mut state, settings)
    }

    // Returns every boosted ship to neutral thrust.
    pub fn release_boosts(&self, registry: &ShipRegistry) -> usize {
        registry
            .all()
            .iter()
            .filter(|ship| {
                ship.state()
                    .map(|mut state| self.boost.disengage(ship, &mut state))
                    .unwrap_or(false)
            })
            .count()
    }

    // First-tick block enumeration and the delayed hook attachment.
    fn initialize(&self, registry: &ShipRegistry, ship: &Ship, state: &mut ShipState) {
        let hooks_due = state.advance_hook_delay();
        let blocks_due = state.begin_block_initialization();
        if !hooks_due && !blocks_due {
            return;
        }

        let mut grids = self.world.mechanical_group(ship.id());
        if !grids.contains(&ship.id()) {
            grids.push(ship.id());
        }
        // Hooks enumerate again so blocks built during the delay are picked up.
        for grid in &grids {
            for block in self.world.blocks(*grid) {
                ship.add_block(block);
            }
        }
        if hooks_due {
            registry.subscribe_grids(ship.id(), &grids);
        }
        debug!(
            vehicle_id = ship.id(),
            thrusters = ship.thruster_count(),
            controllers = ship.controller_count(),
            hooks = hooks_due,
            "ship blocks enumerated"
        );
    }

    fn update_combat_status(&self, vehicle_id: VehicleId, state: &mut ShipState) {
        let transition = state.tick_combat(self.timing.ticks_per_second);
        if transition == CombatTransition::Unchanged {
            return;
        }
        if transition == CombatTransition::Ended {
            debug!(vehicle_id, "ship left combat");
        }
        let Some(pilot) = self.world.controlling_player(vehicle_id) else {
            return;
        };
        let message = match transition {
            CombatTransition::Ended => CombatMessage::entered_peace(pilot),
            CombatTransition::Countdown { seconds_left } => {
                CombatMessage::exit_countdown(pilot, seconds_left)
            }
            CombatTransition::Unchanged => return,
        };
        self.notifier.send(message);
    }

    fn skip_reason(
        &self,
        ship: &Ship,
        grid: &GridState,
        state: &ShipState,
        settings: &Settings,
    ) -> Option<SkipReason> {
        if ship.thruster_count() == 0 {
            return Some(SkipReason::NoThrusters);
        }
        if grid.volume() <= settings.minimum_grid_volume
            && self.world.controlling_player(ship.id()).is_none()
        {
            return Some(SkipReason::TooSmall);
        }
        if self.is_docked_small_grid(ship.id(), grid) {
            return Some(SkipReason::Docked);
        }
        if self.world.is_npc_owned(ship.id()) && !state.in_combat() {
            return Some(SkipReason::IdleNpc);
        }
        None
    }

    fn is_docked_small_grid(&self, vehicle_id: VehicleId, grid: &GridState) -> bool {
        if grid.size != SizeClass::Small {
            return false;
        }
        self.world
            .physical_group(vehicle_id)
            .into_iter()
            .filter(|other| *other != vehicle_id)
            .filter_map(|other| self.world.grid_state(other))
            .any(|other| other.size == SizeClass::Large && other.volume() > MIN_PARENT_GRID_VOLUME)
    }

    fn apply_limits(
        &self,
        ship: &Ship,
        grid: &GridState,
        state: &mut ShipState,
        settings: &Settings,
    ) -> Result<ShipOutcome, GovernorError> {
        if let Some(reason) = self.skip_reason(ship, grid, state, settings) {
            // A skipped ship never keeps redistributed thrust.
            if self.boost.disengage(ship, state) {
                debug!(vehicle_id = ship.id(), ?reason, "boost released on skipped ship");
            }
            return Ok(ShipOutcome::Skipped(reason));
        }

        let vehicle_id = ship.id();
        let speed = grid.linear_velocity.length();
        if !speed.is_finite() || !grid.angular_velocity.is_finite() {
            return Err(GovernorError::InvalidPhysics {
                vehicle_id,
                detail: "non-finite velocity",
            });
        }

        self.refresh_water(vehicle_id, &grid.world_aabb, state);
        self.refresh_atmosphere(vehicle_id, grid, state);
        state.propulsion = self.classify_propulsion(ship);

        let profile = settings.profile(FlightClass::new(grid.size, state.propulsion));
        let environment =
            FlightEnvironment::new(state, grid.linear_velocity, grid.natural_gravity);
        let base = flight_model::base_max_speed(state.dry_mass, profile, &environment);

        let cruising =
            !state.in_combat() && self.cruise.is_cruise_engaged(ship, settings.allow_super_cruise);
        if cruising && grid.size == SizeClass::Large {
            self.boost
                .engage(ship, state, grid.physics_mass, settings.large_grid_boost_twr);
        } else {
            self.boost.disengage(ship, state);
        }
        let boost = cruising.then(|| settings.boost_speed_multiplier(grid.size));
        let max_speed = flight_model::cap_speed(base, boost, settings.max_speed(grid.size));

        let mut linear = grid.linear_velocity;
        let mut angular = grid.angular_velocity;

        let speed_limited = speed > max_speed;
        if speed_limited {
            let target = flight_model::smooth_linear(speed, max_speed);
            linear = grid.linear_velocity.normalize_or_zero() * target;
        }

        let mut turn_limited = false;
        if grid.size == SizeClass::Small && state.in_atmosphere() && !state.in_water {
            let max_rate =
                flight_model::max_turn_rate(grid.angular_velocity, speed, state.dry_mass, profile);
            let rate = grid.angular_velocity.length();
            if rate > max_rate {
                angular = grid.angular_velocity.normalize_or_zero()
                    * flight_model::smooth_angular(rate, max_rate);
                turn_limited = true;
            }
        }

        if speed_limited || turn_limited {
            trace!(vehicle_id, speed, max_speed, "velocity corrected");
            self.world.set_velocities(vehicle_id, linear, angular);
        }

        Ok(ShipOutcome::Governed {
            max_speed,
            speed_limited,
            turn_limited,
        })
    }

    // Samples the bounding-box corners. An oracle failure means "not in water".
    fn refresh_water(&self, vehicle_id: VehicleId, aabb: &Aabb, state: &mut ShipState) {
        let (in_water, is_submerged) = match count_submerged_corners(self.environment.as_ref(), aabb)
        {
            Ok(submerged) => (
                submerged >= WATER_CORNER_THRESHOLD,
                submerged >= BOUNDING_BOX_CORNERS,
            ),
            Err(e) => {
                debug!(vehicle_id, error = %e, "water oracle failed");
                (false, false)
            }
        };
        state.in_water = in_water;
        state.is_submerged = is_submerged;
    }

    fn refresh_atmosphere(&self, vehicle_id: VehicleId, grid: &GridState, state: &mut ShipState) {
        state.natural_gravity = grid.natural_gravity.length();
        if !state.in_gravity() {
            state.air_density = 0.0;
            return;
        }
        state.air_density = match self.environment.air_density(grid.position) {
            Ok(density) if density.is_finite() => density.max(0.0),
            Ok(_) => 0.0,
            Err(e) => {
                debug!(vehicle_id, error = %e, "planet oracle failed");
                0.0
            }
        };
    }

    fn classify_propulsion(&self, ship: &Ship) -> PropulsionClass {
        let gas = ship
            .thrusters()
            .into_iter()
            .filter_map(|block| self.world.thruster_state(block))
            .any(|thruster| thruster.functional && thruster.fuel == FuelKind::Gas);
        if gas {
            PropulsionClass::GasBased
        } else {
            PropulsionClass::IonAtmospheric
        }
    }
}

/// Number of bounding-box corners below the water surface.
pub fn count_submerged_corners(
    oracle: &dyn EnvironmentOracle,
    aabb: &Aabb,
) -> Result<usize, OracleError> {
    aabb.corners().iter().try_fold(0, |count, corner| {
        Ok(count + usize::from(oracle.is_underwater(*corner)?))
    })
}
