//! Background maintenance tasks.

mod registry_sweep;

pub use registry_sweep::start_registry_sweep;
