use glam::{DVec3, Vec3};

use crate::domain::errors::{OracleError, SettingsError};
use crate::domain::notifications::MessageColor;
use crate::domain::physics::{ControllerState, GridMass, GridState, SpeedLimits, ThrusterState};
use crate::domain::settings::StoredSettings;
use crate::domain::ship::{BlockId, BlockInfo, EntityId, PlayerId, VehicleId};

// Port for the host engine's entity, physics and grid system.
//
// Lookups return `None` for entities that no longer exist; callers treat that
// as a silent no-op.
pub trait HostWorld: Send + Sync {
    // Top-most parent grid of a block or grid entity.
    fn resolve_top_level(&self, entity: EntityId) -> Option<VehicleId>;
    fn grid_state(&self, grid: VehicleId) -> Option<GridState>;
    fn entity_position(&self, entity: EntityId) -> Option<DVec3>;
    fn is_marked_for_close(&self, entity: EntityId) -> bool;
    fn is_grid(&self, entity: EntityId) -> bool;
    fn entities_in_sphere(&self, center: DVec3, radius: f64) -> Vec<EntityId>;
    // Mass of the mechanically linked group the grid belongs to.
    fn grid_mass(&self, grid: VehicleId) -> Option<GridMass>;
    // Grids joined by rotors, pistons and hinges.
    fn mechanical_group(&self, grid: VehicleId) -> Vec<VehicleId>;
    // Mechanical group plus grids docked through connectors.
    fn physical_group(&self, grid: VehicleId) -> Vec<VehicleId>;
    fn blocks(&self, grid: VehicleId) -> Vec<BlockInfo>;
    fn thruster_state(&self, block: BlockId) -> Option<ThrusterState>;
    fn controller_state(&self, block: BlockId) -> Option<ControllerState>;
    fn controlling_player(&self, grid: VehicleId) -> Option<PlayerId>;
    fn is_npc_owned(&self, grid: VehicleId) -> bool;
    fn set_velocities(&self, grid: VehicleId, linear: Vec3, angular: Vec3);
    fn set_thrust_multiplier(&self, block: BlockId, multiplier: f32);
    fn world_speed_limits(&self) -> SpeedLimits;
    fn set_world_speed_limits(&self, limits: SpeedLimits);
}

// Port for the optional water and planet oracles.
pub trait EnvironmentOracle: Send + Sync {
    fn is_underwater(&self, point: DVec3) -> Result<bool, OracleError>;
    // Relative air density of the closest planet at the position (1.0 at sea level).
    fn air_density(&self, position: DVec3) -> Result<f32, OracleError>;
}

// Port for the host's per-block key-value storage, persisted with the world.
pub trait BlockStorage: Send + Sync {
    fn read(&self, block: BlockId, key: &str) -> Option<String>;
    fn write(&self, block: BlockId, key: &str, value: String);
}

// Port for player-visible chat and notifications.
pub trait NotificationSink: Send + Sync {
    fn send_chat(&self, recipient: PlayerId, text: &str, color: MessageColor);
    // Transient on-screen notification for the local player.
    fn notify_local(&self, text: &str, color: MessageColor);
}

// Port for the raw bytes of the settings document.
pub trait SettingsStore: Send + Sync {
    // Returns `Ok(None)` when no document has been saved yet.
    fn load(&self) -> Result<Option<String>, SettingsError>;
    fn save(&self, document: &str) -> Result<(), SettingsError>;
}

// Port for decoded settings; `SettingsError::Parse` means the document is corrupt.
pub trait SettingsRepository: Send + Sync {
    fn load(&self) -> Result<Option<StoredSettings>, SettingsError>;
    fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}
