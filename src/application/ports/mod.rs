//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod activator;
pub mod config;
pub mod executor;
pub mod handoff;
pub mod image;
pub mod notification_center;
pub mod opener;

// Re-export common types
pub use activator::{ActivationError, AppActivator};
pub use config::ConfigStore;
pub use executor::{CommandExecutor, DetachedProcess, ExecutionResult, ExecutorError};
pub use handoff::{HandoffStore, StoreError};
pub use image::{ImageError, ImageResolver};
pub use notification_center::{InteractionCallback, NotificationCenter, NotificationError};
pub use opener::{OpenError, UrlOpener};
