// Domain-level errors for governance, settings and host oracles.
use std::fmt;

use super::ship::VehicleId;

/// Failures raised while governing a single vehicle.
///
/// These never abort a pass: the caller logs them, reports them through the
/// fault reporter and moves on to the next vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum GovernorError {
    // The per-vehicle state lock was poisoned by an earlier panic.
    StatePoisoned { vehicle_id: VehicleId },
    // The host produced a value the flight model cannot work with.
    InvalidPhysics {
        vehicle_id: VehicleId,
        detail: &'static str,
    },
    // Damage handling failed after the participants were resolved.
    CombatZone { detail: String },
}

impl fmt::Display for GovernorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GovernorError::StatePoisoned { vehicle_id } => {
                write!(f, "ship {vehicle_id} state lock poisoned")
            }
            GovernorError::InvalidPhysics { vehicle_id, detail } => {
                write!(f, "ship {vehicle_id} has invalid physics: {detail}")
            }
            GovernorError::CombatZone { detail } => write!(f, "combat zone update failed: {detail}"),
        }
    }
}

/// Failures of the external environment oracles (water level, planet density).
#[derive(Debug, Clone, PartialEq)]
pub enum OracleError {
    // The oracle is not installed or not ready yet.
    Unavailable,
    // The oracle answered with an error.
    Failed(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Unavailable => write!(f, "oracle unavailable"),
            OracleError::Failed(reason) => write!(f, "oracle failed: {reason}"),
        }
    }
}

/// Failures while loading or saving the settings document.
#[derive(Debug)]
pub enum SettingsError {
    // Reading or writing the backing store failed.
    Storage(String),
    // The stored document is not valid.
    Parse(String),
    // Encoding the document failed.
    Encode(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Storage(reason) => write!(f, "settings storage error: {reason}"),
            SettingsError::Parse(reason) => write!(f, "settings parse error: {reason}"),
            SettingsError::Encode(reason) => write!(f, "settings encode error: {reason}"),
        }
    }
}
