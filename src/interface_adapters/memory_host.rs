// In-memory host: a scriptable world used by tests and the headless demo.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::{DVec3, Vec3};

use crate::domain::errors::{OracleError, SettingsError};
use crate::domain::notifications::MessageColor;
use crate::domain::physics::{
    Aabb, ControllerState, FuelKind, GridMass, GridState, SpeedLimits, ThrusterState,
};
use crate::domain::ports::{
    BlockStorage, EnvironmentOracle, HostWorld, NotificationSink, SettingsRepository, SettingsStore,
};
use crate::domain::settings::StoredSettings;
use crate::domain::ship::{BlockId, BlockInfo, BlockKind, EntityId, PlayerId, SizeClass, VehicleId};

/// Engine limits before the session overrides them.
pub const DEFAULT_WORLD_LIMITS: SpeedLimits = SpeedLimits {
    small: 100.0,
    large: 100.0,
};

/// Builder for a grid placed in the memory world.
#[derive(Debug, Clone)]
pub struct GridSpec {
    pub id: VehicleId,
    pub name: String,
    pub size: SizeClass,
    pub is_static: bool,
    pub has_physics: bool,
    pub parent: Option<VehicleId>,
    pub npc_owned: bool,
    pub position: DVec3,
    pub half_extents: DVec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub natural_gravity: Vec3,
    pub physics_mass: f32,
    pub mass: GridMass,
}

impl GridSpec {
    pub fn new(id: VehicleId, size: SizeClass) -> Self {
        let (half_extent, mass) = match size {
            SizeClass::Small => (2.5, 10_000.0),
            SizeClass::Large => (10.0, 500_000.0),
        };
        Self {
            id,
            name: format!("Grid {id}"),
            size,
            is_static: false,
            has_physics: true,
            parent: None,
            npc_owned: false,
            position: DVec3::ZERO,
            half_extents: DVec3::splat(half_extent),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            natural_gravity: Vec3::ZERO,
            physics_mass: mass,
            mass: GridMass {
                base: mass,
                physical: mass,
            },
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_physics(mut self, has_physics: bool) -> Self {
        self.has_physics = has_physics;
        self
    }

    // Attaches the grid to `parent` through a rotor, piston or hinge.
    pub fn with_parent(mut self, parent: VehicleId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_physics_mass(mut self, mass: f32) -> Self {
        self.physics_mass = mass;
        self
    }

    pub fn with_mass(mut self, base: f32, physical: f32) -> Self {
        self.mass = GridMass { base, physical };
        self
    }

    pub fn at(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_half_extents(mut self, half_extents: DVec3) -> Self {
        self.half_extents = half_extents;
        self
    }

    pub fn moving(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn spinning(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn in_gravity(mut self, gravity: Vec3) -> Self {
        self.natural_gravity = gravity;
        self
    }

    pub fn npc_owned(mut self) -> Self {
        self.npc_owned = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThrusterSpec {
    pub id: BlockId,
    pub state: ThrusterState,
}

impl ThrusterSpec {
    fn with_fuel(id: BlockId, fuel: FuelKind) -> Self {
        Self {
            id,
            state: ThrusterState {
                functional: true,
                fuel,
                current_thrust: 0.0,
                thrust_multiplier: 1.0,
            },
        }
    }

    pub fn ion(id: BlockId) -> Self {
        Self::with_fuel(id, FuelKind::Electricity)
    }

    pub fn gas(id: BlockId) -> Self {
        Self::with_fuel(id, FuelKind::Gas)
    }

    pub fn with_thrust(mut self, thrust: f32) -> Self {
        self.state.current_thrust = thrust;
        self
    }

    pub fn functional(mut self, functional: bool) -> Self {
        self.state.functional = functional;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSpec {
    pub id: BlockId,
    pub state: ControllerState,
}

impl ControllerSpec {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            state: ControllerState {
                functional: true,
                can_control_ship: true,
                pilot: None,
            },
        }
    }

    pub fn piloted_by(mut self, player: PlayerId) -> Self {
        self.state.pilot = Some(player);
        self
    }

    pub fn passenger_seat(mut self) -> Self {
        self.state.can_control_ship = false;
        self
    }

    pub fn functional(mut self, functional: bool) -> Self {
        self.state.functional = functional;
        self
    }
}

/// Chat line captured by the memory sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub recipient: PlayerId,
    pub text: String,
    pub color: MessageColor,
}

#[derive(Debug, Clone, Copy)]
enum BlockBody {
    Thruster(ThrusterState),
    Controller(ControllerState),
    Other,
}

#[derive(Debug, Clone, Copy)]
struct BlockRecord {
    grid: VehicleId,
    body: BlockBody,
}

impl BlockRecord {
    fn info(&self, id: BlockId) -> BlockInfo {
        let kind = match self.body {
            BlockBody::Thruster(_) => BlockKind::Thruster,
            BlockBody::Controller(_) => BlockKind::Controller,
            BlockBody::Other => BlockKind::Other,
        };
        BlockInfo::new(id, kind)
    }
}

#[derive(Debug)]
struct World {
    grids: HashMap<VehicleId, GridSpec>,
    characters: HashMap<EntityId, DVec3>,
    blocks: HashMap<BlockId, BlockRecord>,
    closing: HashSet<EntityId>,
    connectors: Vec<(VehicleId, VehicleId)>,
    storage: HashMap<(BlockId, String), String>,
    chats: Vec<ChatRecord>,
    notices: Vec<String>,
    limits: SpeedLimits,
    thrust_multiplier_writes: usize,
    velocity_writes: usize,
    // Points below this height are underwater; `None` means no water oracle.
    water_level: Option<f64>,
    water_failure: bool,
    air_density: f32,
    air_failure: bool,
}

impl World {
    fn top_level(&self, entity: EntityId) -> Option<VehicleId> {
        let mut grid = match self.blocks.get(&entity) {
            Some(block) => block.grid,
            None => entity,
        };
        let mut spec = self.grids.get(&grid)?;
        // Bounded walk; a parent cycle would otherwise never end.
        for _ in 0..self.grids.len() {
            match spec.parent.and_then(|parent| self.grids.get(&parent)) {
                Some(parent) => {
                    grid = parent.id;
                    spec = parent;
                }
                None => break,
            }
        }
        Some(grid)
    }

    fn group_of(&self, tops: &BTreeSet<VehicleId>) -> Vec<VehicleId> {
        let mut grids: Vec<VehicleId> = self
            .grids
            .keys()
            .copied()
            .filter(|grid| self.top_level(*grid).is_some_and(|top| tops.contains(&top)))
            .collect();
        grids.sort_unstable();
        grids
    }

    fn grid_state(&self, grid: VehicleId) -> Option<GridState> {
        let spec = self.grids.get(&grid)?;
        Some(GridState {
            name: spec.name.clone(),
            size: spec.size,
            has_physics: spec.has_physics,
            is_static: spec.is_static,
            marked_for_close: self.closing.contains(&grid),
            position: spec.position,
            world_aabb: Aabb::from_center(spec.position, spec.half_extents),
            linear_velocity: spec.linear_velocity,
            angular_velocity: spec.angular_velocity,
            natural_gravity: spec.natural_gravity,
            physics_mass: spec.physics_mass,
        })
    }
}

/// Host world, oracles, block storage and notification sink backed by memory.
#[derive(Debug)]
pub struct MemoryHost {
    world: Mutex<World>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            world: Mutex::new(World {
                grids: HashMap::new(),
                characters: HashMap::new(),
                blocks: HashMap::new(),
                closing: HashSet::new(),
                connectors: Vec::new(),
                storage: HashMap::new(),
                chats: Vec::new(),
                notices: Vec::new(),
                limits: DEFAULT_WORLD_LIMITS,
                thrust_multiplier_writes: 0,
                velocity_writes: 0,
                water_level: None,
                water_failure: false,
                air_density: 0.0,
                air_failure: false,
            }),
        }
    }

    fn world(&self) -> MutexGuard<'_, World> {
        // Each call mutates a single entry; a poisoned world is still usable.
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_grid(&self, spec: GridSpec) -> VehicleId {
        let id = spec.id;
        self.world().grids.insert(id, spec);
        id
    }

    pub fn remove_grid(&self, grid: VehicleId) {
        let mut world = self.world();
        world.grids.remove(&grid);
        world.blocks.retain(|_, block| block.grid != grid);
    }

    pub fn add_character(&self, id: EntityId, position: DVec3) {
        self.world().characters.insert(id, position);
    }

    pub fn add_thruster(&self, grid: VehicleId, spec: ThrusterSpec) -> BlockInfo {
        let record = BlockRecord {
            grid,
            body: BlockBody::Thruster(spec.state),
        };
        self.world().blocks.insert(spec.id, record);
        record.info(spec.id)
    }

    pub fn add_controller(&self, grid: VehicleId, spec: ControllerSpec) -> BlockInfo {
        let record = BlockRecord {
            grid,
            body: BlockBody::Controller(spec.state),
        };
        self.world().blocks.insert(spec.id, record);
        record.info(spec.id)
    }

    pub fn add_block(&self, grid: VehicleId, id: BlockId) -> BlockInfo {
        let record = BlockRecord {
            grid,
            body: BlockBody::Other,
        };
        self.world().blocks.insert(id, record);
        record.info(id)
    }

    pub fn remove_block(&self, id: BlockId) {
        self.world().blocks.remove(&id);
    }

    // Joins two grids through a connector; they share a physical group.
    pub fn dock(&self, a: VehicleId, b: VehicleId) {
        self.world().connectors.push((a, b));
    }

    pub fn mark_for_close(&self, entity: EntityId) {
        self.world().closing.insert(entity);
    }

    pub fn set_static(&self, grid: VehicleId, is_static: bool) {
        if let Some(spec) = self.world().grids.get_mut(&grid) {
            spec.is_static = is_static;
        }
    }

    pub fn set_npc_owned(&self, grid: VehicleId, npc_owned: bool) {
        if let Some(spec) = self.world().grids.get_mut(&grid) {
            spec.npc_owned = npc_owned;
        }
    }

    pub fn set_velocity(&self, grid: VehicleId, linear: Vec3, angular: Vec3) {
        if let Some(spec) = self.world().grids.get_mut(&grid) {
            spec.linear_velocity = linear;
            spec.angular_velocity = angular;
        }
    }

    pub fn set_position(&self, grid: VehicleId, position: DVec3) {
        if let Some(spec) = self.world().grids.get_mut(&grid) {
            spec.position = position;
        }
    }

    pub fn set_gravity(&self, grid: VehicleId, gravity: Vec3) {
        if let Some(spec) = self.world().grids.get_mut(&grid) {
            spec.natural_gravity = gravity;
        }
    }

    pub fn set_pilot(&self, controller: BlockId, pilot: Option<PlayerId>) {
        if let Some(BlockRecord {
            body: BlockBody::Controller(state),
            ..
        }) = self.world().blocks.get_mut(&controller)
        {
            state.pilot = pilot;
        }
    }

    pub fn set_thrust(&self, thruster: BlockId, thrust: f32) {
        if let Some(BlockRecord {
            body: BlockBody::Thruster(state),
            ..
        }) = self.world().blocks.get_mut(&thruster)
        {
            state.current_thrust = thrust;
        }
    }

    pub fn set_water_level(&self, level: Option<f64>) {
        self.world().water_level = level;
    }

    pub fn set_water_failure(&self, failing: bool) {
        self.world().water_failure = failing;
    }

    pub fn set_air_density(&self, density: f32) {
        self.world().air_density = density;
    }

    pub fn set_air_failure(&self, failing: bool) {
        self.world().air_failure = failing;
    }

    // Moves every dynamic top-level grid along its velocity.
    pub fn step(&self, seconds: f64) {
        let mut world = self.world();
        for spec in world.grids.values_mut() {
            if spec.parent.is_none() && !spec.is_static {
                spec.position += spec.linear_velocity.as_dvec3() * seconds;
            }
        }
    }

    pub fn velocities(&self, grid: VehicleId) -> Option<(Vec3, Vec3)> {
        self.world()
            .grids
            .get(&grid)
            .map(|spec| (spec.linear_velocity, spec.angular_velocity))
    }

    pub fn velocity_writes(&self) -> usize {
        self.world().velocity_writes
    }

    pub fn stored_value(&self, block: BlockId, key: &str) -> Option<String> {
        self.world().storage.get(&(block, key.to_string())).cloned()
    }

    // Multiplier last written to the thruster, 1.0 when never written.
    pub fn thrust_multiplier(&self, thruster: BlockId) -> f32 {
        match self.world().blocks.get(&thruster) {
            Some(BlockRecord {
                body: BlockBody::Thruster(state),
                ..
            }) => state.thrust_multiplier,
            _ => 1.0,
        }
    }

    pub fn thrust_multiplier_writes(&self) -> usize {
        self.world().thrust_multiplier_writes
    }

    pub fn chats(&self) -> Vec<ChatRecord> {
        self.world().chats.clone()
    }

    pub fn local_notices(&self) -> Vec<String> {
        self.world().notices.clone()
    }
}

impl HostWorld for MemoryHost {
    fn resolve_top_level(&self, entity: EntityId) -> Option<VehicleId> {
        self.world().top_level(entity)
    }

    fn grid_state(&self, grid: VehicleId) -> Option<GridState> {
        self.world().grid_state(grid)
    }

    fn entity_position(&self, entity: EntityId) -> Option<DVec3> {
        let world = self.world();
        if let Some(spec) = world.grids.get(&entity) {
            return Some(spec.position);
        }
        if let Some(position) = world.characters.get(&entity) {
            return Some(*position);
        }
        let grid = world.blocks.get(&entity)?.grid;
        world.grids.get(&grid).map(|spec| spec.position)
    }

    fn is_marked_for_close(&self, entity: EntityId) -> bool {
        self.world().closing.contains(&entity)
    }

    fn is_grid(&self, entity: EntityId) -> bool {
        self.world().grids.contains_key(&entity)
    }

    fn entities_in_sphere(&self, center: DVec3, radius: f64) -> Vec<EntityId> {
        let world = self.world();
        let grids = world.grids.values().map(|spec| (spec.id, spec.position));
        let characters = world.characters.iter().map(|(id, position)| (*id, *position));
        let mut found: Vec<EntityId> = grids
            .chain(characters)
            .filter(|(_, position)| position.distance(center) <= radius)
            .map(|(id, _)| id)
            .collect();
        found.sort_unstable();
        found
    }

    fn grid_mass(&self, grid: VehicleId) -> Option<GridMass> {
        let world = self.world();
        let top = world.top_level(grid)?;
        let group = world.group_of(&BTreeSet::from([top]));
        Some(
            group
                .iter()
                .filter_map(|member| world.grids.get(member))
                .fold(GridMass::default(), |total, spec| GridMass {
                    base: total.base + spec.mass.base,
                    physical: total.physical + spec.mass.physical,
                }),
        )
    }

    fn mechanical_group(&self, grid: VehicleId) -> Vec<VehicleId> {
        let world = self.world();
        match world.top_level(grid) {
            Some(top) => world.group_of(&BTreeSet::from([top])),
            None => Vec::new(),
        }
    }

    fn physical_group(&self, grid: VehicleId) -> Vec<VehicleId> {
        let world = self.world();
        let Some(top) = world.top_level(grid) else {
            return Vec::new();
        };
        let mut tops = BTreeSet::from([top]);
        loop {
            let before = tops.len();
            for (a, b) in &world.connectors {
                let (Some(a), Some(b)) = (world.top_level(*a), world.top_level(*b)) else {
                    continue;
                };
                if tops.contains(&a) || tops.contains(&b) {
                    tops.insert(a);
                    tops.insert(b);
                }
            }
            if tops.len() == before {
                break;
            }
        }
        world.group_of(&tops)
    }

    fn blocks(&self, grid: VehicleId) -> Vec<BlockInfo> {
        let mut blocks: Vec<BlockInfo> = self
            .world()
            .blocks
            .iter()
            .filter(|(_, block)| block.grid == grid)
            .map(|(id, block)| block.info(*id))
            .collect();
        blocks.sort_unstable_by_key(|block| block.id);
        blocks
    }

    fn thruster_state(&self, block: BlockId) -> Option<ThrusterState> {
        match self.world().blocks.get(&block)?.body {
            BlockBody::Thruster(state) => Some(state),
            _ => None,
        }
    }

    fn controller_state(&self, block: BlockId) -> Option<ControllerState> {
        match self.world().blocks.get(&block)?.body {
            BlockBody::Controller(state) => Some(state),
            _ => None,
        }
    }

    fn controlling_player(&self, grid: VehicleId) -> Option<PlayerId> {
        let world = self.world();
        let top = world.top_level(grid)?;
        let group = world.group_of(&BTreeSet::from([top]));
        let mut seats: Vec<(&BlockId, &BlockRecord)> = world
            .blocks
            .iter()
            .filter(|(_, block)| group.contains(&block.grid))
            .collect();
        seats.sort_unstable_by_key(|(id, _)| **id);
        seats.into_iter().find_map(|(_, block)| match block.body {
            BlockBody::Controller(state) if state.functional && state.can_control_ship => state.pilot,
            _ => None,
        })
    }

    fn is_npc_owned(&self, grid: VehicleId) -> bool {
        self.world()
            .grids
            .get(&grid)
            .is_some_and(|spec| spec.npc_owned)
    }

    fn set_velocities(&self, grid: VehicleId, linear: Vec3, angular: Vec3) {
        let mut guard = self.world();
        let world = &mut *guard;
        if let Some(spec) = world.grids.get_mut(&grid) {
            spec.linear_velocity = linear;
            spec.angular_velocity = angular;
            world.velocity_writes += 1;
        }
    }

    fn set_thrust_multiplier(&self, block: BlockId, multiplier: f32) {
        let mut guard = self.world();
        let world = &mut *guard;
        if let Some(BlockRecord {
            body: BlockBody::Thruster(state),
            ..
        }) = world.blocks.get_mut(&block)
        {
            state.thrust_multiplier = multiplier;
            world.thrust_multiplier_writes += 1;
        }
    }

    fn world_speed_limits(&self) -> SpeedLimits {
        self.world().limits
    }

    fn set_world_speed_limits(&self, limits: SpeedLimits) {
        self.world().limits = limits;
    }
}

impl EnvironmentOracle for MemoryHost {
    fn is_underwater(&self, point: DVec3) -> Result<bool, OracleError> {
        let world = self.world();
        if world.water_failure {
            return Err(OracleError::Failed("water level query failed".to_string()));
        }
        match world.water_level {
            Some(level) => Ok(point.y < level),
            None => Err(OracleError::Unavailable),
        }
    }

    fn air_density(&self, _position: DVec3) -> Result<f32, OracleError> {
        let world = self.world();
        if world.air_failure {
            return Err(OracleError::Failed("planet lookup failed".to_string()));
        }
        Ok(world.air_density)
    }
}

impl BlockStorage for MemoryHost {
    fn read(&self, block: BlockId, key: &str) -> Option<String> {
        self.stored_value(block, key)
    }

    fn write(&self, block: BlockId, key: &str, value: String) {
        self.world().storage.insert((block, key.to_string()), value);
    }
}

impl NotificationSink for MemoryHost {
    fn send_chat(&self, recipient: PlayerId, text: &str, color: MessageColor) {
        self.world().chats.push(ChatRecord {
            recipient,
            text: text.to_string(),
            color,
        });
    }

    fn notify_local(&self, text: &str, _color: MessageColor) {
        self.world().notices.push(text.to_string());
    }
}

/// Settings repository holding decoded settings in memory.
#[derive(Debug, Default)]
pub struct MemorySettingsRepository {
    stored: Mutex<Option<StoredSettings>>,
    fail_load: bool,
}

impl MemorySettingsRepository {
    pub fn with_stored(settings: StoredSettings) -> Self {
        Self {
            stored: Mutex::new(Some(settings)),
            fail_load: false,
        }
    }

    // Every load reports a corrupt document.
    pub fn with_load_failure(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn stored(&self) -> Option<StoredSettings> {
        self.stored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsRepository for MemorySettingsRepository {
    fn load(&self) -> Result<Option<StoredSettings>, SettingsError> {
        if self.fail_load {
            return Err(SettingsError::Parse("corrupt document".to_string()));
        }
        Ok(self.stored())
    }

    fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError> {
        *self.stored.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        Ok(())
    }
}

/// Raw settings document kept in memory.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    document: Mutex<Option<String>>,
}

impl MemorySettingsStore {
    pub fn with_document(document: &str) -> Self {
        Self {
            document: Mutex::new(Some(document.to_string())),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.document())
    }

    fn save(&self, document: &str) -> Result<(), SettingsError> {
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = Some(document.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_blocks_sit_on_subgrids_then_they_resolve_to_the_top_level_grid() {
        let host = MemoryHost::new();
        host.add_grid(GridSpec::new(1, SizeClass::Large));
        host.add_grid(GridSpec::new(2, SizeClass::Large).with_parent(1));
        host.add_grid(GridSpec::new(3, SizeClass::Small).with_parent(2));
        host.add_thruster(3, ThrusterSpec::ion(30));

        assert_eq!(host.resolve_top_level(30), Some(1));
        assert_eq!(host.mechanical_group(3), vec![1, 2, 3]);
        assert_eq!(host.resolve_top_level(99), None);
    }

    #[test]
    fn when_grids_are_docked_then_physical_group_spans_both() {
        let host = MemoryHost::new();
        host.add_grid(GridSpec::new(1, SizeClass::Large));
        host.add_grid(GridSpec::new(2, SizeClass::Small));
        host.dock(2, 1);

        assert_eq!(host.mechanical_group(2), vec![2]);
        assert_eq!(host.physical_group(2), vec![1, 2]);
    }

    #[test]
    fn when_seat_is_passenger_then_it_does_not_control_the_grid() {
        let host = MemoryHost::new();
        host.add_grid(GridSpec::new(1, SizeClass::Small));
        host.add_controller(1, ControllerSpec::new(10).passenger_seat().piloted_by(4));

        assert_eq!(host.controlling_player(1), None);

        host.add_controller(1, ControllerSpec::new(11).piloted_by(5));
        assert_eq!(host.controlling_player(1), Some(5));
    }

    #[test]
    fn when_water_oracle_is_missing_then_it_reports_unavailable() {
        let host = MemoryHost::new();

        assert_eq!(host.is_underwater(DVec3::ZERO), Err(OracleError::Unavailable));

        host.set_water_level(Some(0.0));
        assert_eq!(host.is_underwater(DVec3::new(0.0, -1.0, 0.0)), Ok(true));
        assert_eq!(host.is_underwater(DVec3::new(0.0, 1.0, 0.0)), Ok(false));
    }
}
