//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod action;
pub mod config;
pub mod context;
pub mod duration;
pub mod error;
pub mod lifecycle;
pub mod notification;
pub mod sound;

// Re-export common types
pub use action::{ActionPayload, ClickPayload};
pub use config::AppConfig;
pub use context::{ContextRecord, LaunchContext};
pub use duration::Duration;
pub use error::*;
pub use lifecycle::{InvalidStateTransition, LifecycleSession, LifecycleState};
pub use notification::{InteractionEvent, NotificationInfo, NotificationRequest};
pub use sound::SoundName;
