//! CLI command handlers for key-mon.
//!
//! Besides running the monitor, these give scriptable access to the modmap
//! and the configuration for automation and testing.

pub mod config;
pub mod kbd;
pub mod lookup;
pub mod run;

// Re-export types used by main.rs and tests
pub use config::ConfigArgs;
pub use kbd::KbdArgs;
pub use lookup::LookupArgs;
pub use run::{ReplayArgs, RunArgs};
