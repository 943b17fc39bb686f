pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::runtime::{run, run_tick, run_with_config};
pub use use_cases::session::{HostPorts, InterdictionSession, SessionConfig};
