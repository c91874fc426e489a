//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod classify;
pub mod dispatch;
pub mod lifecycle;
pub mod ports;
pub mod send;

// Re-export use cases
pub use classify::LaunchContextClassifier;
pub use dispatch::{DispatchError, DispatchOutcome, DispatchReport, InteractionDispatcher};
pub use lifecycle::{
    LifecycleConfig, LifecycleController, LifecycleEvent, LifecycleReport, LifecycleSender,
    ShutdownReason, TerminationSignal, WaitMode,
};
pub use send::{notification_identifier, SendError, SendNotificationUseCase, SendOutput};
