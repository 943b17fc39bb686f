// Domain layer: vehicle state, gameplay parameters and the flight model.

pub mod damage;
pub mod errors;
pub mod flight_model;
pub mod notifications;
pub mod physics;
pub mod ports;
pub mod settings;
pub mod ship;

pub use damage::{DamageClass, DamageEvent, DamageType};
pub use errors::{GovernorError, OracleError, SettingsError};
pub use notifications::{CombatMessage, MessageColor};
pub use physics::{Aabb, ControllerState, FuelKind, GridMass, GridState, SpeedLimits, ThrusterState};
pub use settings::{FlightClass, FlightProfile, Settings, SettingsCatalog};
pub use ship::{
    BlockId, BlockInfo, BlockKind, EntityId, PlayerId, PropulsionClass, Ship, ShipState, SizeClass,
    VehicleId,
};
