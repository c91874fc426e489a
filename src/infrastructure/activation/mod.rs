//! Application activation infrastructure module

mod system;

pub use system::{is_bundle_identifier, SystemActivator};
