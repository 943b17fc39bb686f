// Use cases layer: registry, combat detection, governance and session lifecycle.

pub mod boost;
pub mod combat_zones;
pub mod cruise;
pub mod faults;
pub mod governor;
pub mod notifier;
pub mod registry;
pub mod session;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;

pub use combat_zones::{CombatZoneDetector, ZoneReport};
pub use governor::{Governor, GovernorTiming, PassReport, ShipOutcome, SkipReason};
pub use registry::ShipRegistry;
pub use session::{HostPorts, InterdictionSession, SessionConfig};
pub use settings::{LoadOutcome, SettingsService};
