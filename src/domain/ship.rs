// Per-vehicle record owned by the ship registry.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::errors::GovernorError;

/// Host entity id of the top-level grid that identifies a vehicle.
pub type VehicleId = i64;
pub type EntityId = i64;
pub type BlockId = i64;
pub type PlayerId = i64;

/// Seconds of remaining combat at which the exit countdown starts.
pub const COMBAT_COUNTDOWN_SECONDS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SizeClass {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PropulsionClass {
    // Ion and atmospheric thrusters.
    #[default]
    IonAtmospheric,
    // At least one functional gas-burning thruster.
    GasBased,
}

/// Capability tag assigned once when a block is first observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Thruster,
    Controller,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockInfo {
    pub id: BlockId,
    pub kind: BlockKind,
}

impl BlockInfo {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self { id, kind }
    }
}

/// Deduplicated block membership list.
///
/// Structural notifications mutate it while the governor reads it, so every
/// access goes through the lock and readers only ever see whole snapshots.
#[derive(Debug, Default)]
pub struct BlockList {
    blocks: Mutex<Vec<BlockId>>,
}

impl BlockList {
    fn guard(&self) -> MutexGuard<'_, Vec<BlockId>> {
        // Every mutation is a single push or remove, so a poisoned list is still consistent.
        self.blocks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Returns false when the block was already present.
    pub fn insert(&self, id: BlockId) -> bool {
        let mut blocks = self.guard();
        if blocks.contains(&id) {
            return false;
        }
        blocks.push(id);
        true
    }

    pub fn remove(&self, id: BlockId) -> bool {
        let mut blocks = self.guard();
        match blocks.iter().position(|existing| *existing == id) {
            Some(index) => {
                blocks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.guard().contains(&id)
    }

    pub fn snapshot(&self) -> Vec<BlockId> {
        self.guard().clone()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

/// Outcome of advancing the combat timer by one governed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatTransition {
    // Not in combat, or still in combat with nothing to announce.
    Unchanged,
    // Whole-second mark inside the exit countdown.
    Countdown { seconds_left: u32 },
    // The timer just reached zero.
    Ended,
}

/// Mutable per-vehicle state, guarded by the ship's lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipState {
    // Remaining combat ticks; the ship is in combat while this is non-zero.
    pub interdiction_duration: u32,
    pub natural_gravity: f32,
    // Planet-relative air density, 0 outside atmosphere.
    pub air_density: f32,
    pub in_water: bool,
    pub is_submerged: bool,
    pub is_on_boost: bool,
    pub propulsion: PropulsionClass,
    pub dry_mass: f32,
    pub total_mass: f32,
    mass_refresh_countdown: u32,
    blocks_initialized: bool,
    hooks_initialized: bool,
    hook_wait_ticks: u32,
}

impl ShipState {
    pub fn new(hook_delay_ticks: u32) -> Self {
        Self {
            interdiction_duration: 0,
            natural_gravity: 0.0,
            air_density: 0.0,
            in_water: false,
            is_submerged: false,
            is_on_boost: false,
            propulsion: PropulsionClass::default(),
            dry_mass: 0.0,
            total_mass: 0.0,
            mass_refresh_countdown: 0,
            blocks_initialized: false,
            hooks_initialized: false,
            hook_wait_ticks: hook_delay_ticks,
        }
    }

    pub fn in_combat(&self) -> bool {
        self.interdiction_duration > 0
    }

    pub fn in_atmosphere(&self) -> bool {
        self.air_density.abs() > 0.0
    }

    pub fn in_gravity(&self) -> bool {
        self.natural_gravity.abs() > 0.0
    }

    // Resets the combat timer. Returns whether the ship was already in combat.
    pub fn arm_combat(&mut self, duration_ticks: u32) -> bool {
        let was_in_combat = self.in_combat();
        self.interdiction_duration = duration_ticks;
        was_in_combat
    }

    pub fn tick_combat(&mut self, ticks_per_second: u32) -> CombatTransition {
        if !self.in_combat() {
            return CombatTransition::Unchanged;
        }

        self.interdiction_duration -= 1;
        if !self.in_combat() {
            return CombatTransition::Ended;
        }

        let ticks_per_second = ticks_per_second.max(1);
        if self.interdiction_duration <= COMBAT_COUNTDOWN_SECONDS * ticks_per_second
            && self.interdiction_duration % ticks_per_second == 0
        {
            return CombatTransition::Countdown {
                seconds_left: self.interdiction_duration / ticks_per_second,
            };
        }
        CombatTransition::Unchanged
    }

    // True exactly once: the first time block caches should be filled.
    pub fn begin_block_initialization(&mut self) -> bool {
        if self.blocks_initialized {
            return false;
        }
        self.blocks_initialized = true;
        true
    }

    // Counts down the hook delay; true exactly once when hooks should be attached.
    pub fn advance_hook_delay(&mut self) -> bool {
        if self.hooks_initialized {
            return false;
        }
        if self.hook_wait_ticks > 0 {
            self.hook_wait_ticks -= 1;
            return false;
        }
        self.hooks_initialized = true;
        true
    }

    pub fn hooks_initialized(&self) -> bool {
        self.hooks_initialized
    }

    // True when the cached mass should be refreshed this tick.
    pub fn mass_refresh_due(&mut self, refresh_ticks: u32) -> bool {
        self.mass_refresh_countdown = self.mass_refresh_countdown.saturating_sub(1);
        if self.mass_refresh_countdown == 0 {
            self.mass_refresh_countdown = refresh_ticks.max(1);
            return true;
        }
        false
    }
}

/// A governed vehicle: the top-level, mechanically connected structure.
#[derive(Debug)]
pub struct Ship {
    id: VehicleId,
    name: String,
    size: SizeClass,
    thrusters: BlockList,
    controllers: BlockList,
    state: Mutex<ShipState>,
}

impl Ship {
    pub(crate) fn new(id: VehicleId, name: String, size: SizeClass, hook_delay_ticks: u32) -> Self {
        Self {
            id,
            name,
            size,
            thrusters: BlockList::default(),
            controllers: BlockList::default(),
            state: Mutex::new(ShipState::new(hook_delay_ticks)),
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> SizeClass {
        self.size
    }

    pub fn thrusters(&self) -> Vec<BlockId> {
        self.thrusters.snapshot()
    }

    pub fn thruster_count(&self) -> usize {
        self.thrusters.len()
    }

    pub fn controllers(&self) -> Vec<BlockId> {
        self.controllers.snapshot()
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn has_controller(&self, block: BlockId) -> bool {
        self.controllers.contains(block)
    }

    // Files the block under its capability tag. Returns false for duplicates and
    // blocks the governor does not track.
    pub fn add_block(&self, block: BlockInfo) -> bool {
        match block.kind {
            BlockKind::Thruster => self.thrusters.insert(block.id),
            BlockKind::Controller => self.controllers.insert(block.id),
            BlockKind::Other => false,
        }
    }

    pub fn remove_block(&self, block: BlockId) -> bool {
        self.thrusters.remove(block) || self.controllers.remove(block)
    }

    pub fn state(&self) -> Result<MutexGuard<'_, ShipState>, GovernorError> {
        self.state
            .lock()
            .map_err(|_| GovernorError::StatePoisoned { vehicle_id: self.id })
    }

    // Point-in-time copy of the mutable state.
    pub fn snapshot(&self) -> Result<ShipState, GovernorError> {
        self.state().map(|state| state.clone())
    }

    pub fn in_combat(&self) -> bool {
        self.state().map(|state| state.in_combat()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_block_is_added_twice_then_list_keeps_one_entry() {
        let ship = Ship::new(1, "Test".to_string(), SizeClass::Small, 0);

        assert!(ship.add_block(BlockInfo::new(10, BlockKind::Thruster)));
        assert!(!ship.add_block(BlockInfo::new(10, BlockKind::Thruster)));
        assert!(ship.add_block(BlockInfo::new(11, BlockKind::Controller)));
        assert!(!ship.add_block(BlockInfo::new(12, BlockKind::Other)));

        assert_eq!(ship.thrusters(), vec![10]);
        assert_eq!(ship.controllers(), vec![11]);
    }

    #[test]
    fn when_block_is_removed_then_it_leaves_whichever_list_held_it() {
        let ship = Ship::new(1, "Test".to_string(), SizeClass::Small, 0);
        ship.add_block(BlockInfo::new(10, BlockKind::Thruster));
        ship.add_block(BlockInfo::new(11, BlockKind::Controller));

        assert!(ship.remove_block(11));
        assert!(!ship.remove_block(11));
        assert_eq!(ship.controller_count(), 0);
        assert_eq!(ship.thruster_count(), 1);
    }

    #[test]
    fn when_timer_runs_out_then_combat_ends_without_going_negative() {
        let mut state = ShipState::new(0);
        state.arm_combat(2);

        assert_eq!(state.tick_combat(60), CombatTransition::Unchanged);
        assert_eq!(state.tick_combat(60), CombatTransition::Ended);
        assert!(!state.in_combat());
        assert_eq!(state.tick_combat(60), CombatTransition::Unchanged);
        assert_eq!(state.interdiction_duration, 0);
    }

    #[test]
    fn when_timer_crosses_whole_seconds_in_last_five_then_countdown_is_reported() {
        let mut state = ShipState::new(0);
        state.arm_combat(6 * 60 + 1);

        let mut countdown = Vec::new();
        while state.in_combat() {
            if let CombatTransition::Countdown { seconds_left } = state.tick_combat(60) {
                countdown.push(seconds_left);
            }
        }

        assert_eq!(countdown, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn when_combat_is_armed_then_timer_is_reset_not_added() {
        let mut state = ShipState::new(0);

        assert!(!state.arm_combat(100));
        for _ in 0..40 {
            state.tick_combat(60);
        }
        assert!(state.arm_combat(100));
        assert_eq!(state.interdiction_duration, 100);
    }

    #[test]
    fn when_hook_delay_elapses_then_hooks_initialize_once() {
        let mut state = ShipState::new(2);

        assert!(!state.advance_hook_delay());
        assert!(!state.advance_hook_delay());
        assert!(state.advance_hook_delay());
        assert!(!state.advance_hook_delay());
        assert!(state.hooks_initialized());
    }

    #[test]
    fn when_mass_refresh_is_polled_then_it_fires_on_first_tick_and_every_interval() {
        let mut state = ShipState::new(0);

        let due: Vec<bool> = (0..7).map(|_| state.mass_refresh_due(3)).collect();

        assert_eq!(due, vec![true, false, false, true, false, false, true]);
    }
}
