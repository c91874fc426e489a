//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the shell, the filesystem, the desktop notification
//! server and the system launchers.

pub mod activation;
pub mod config;
pub mod executor;
pub mod handoff;
pub mod image;
pub mod notification;
pub mod opener;
pub mod sound;

// Re-export adapters
pub use activation::SystemActivator;
pub use config::XdgConfigStore;
pub use executor::ShellExecutor;
pub use handoff::FsMailbox;
pub use image::SystemImageResolver;
pub use notification::{DeliveryLedger, NotifyRustCenter};
pub use opener::SystemUrlOpener;
pub use sound::SoundCatalog;
