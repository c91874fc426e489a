//! smart-notify - desktop notifications with click actions from the command line
//!
//! Posts a notification and, when the user clicks it, opens a URL, runs a
//! shell command or activates an application. The click action survives the
//! sending process: it is handed to a later relaunch through an on-disk
//! mailbox.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the lifecycle state machine, and errors
//! - **Application**: Use cases (send, classify, dispatch, lifecycle) and port traits
//! - **Infrastructure**: Adapters (shell executor, filesystem mailbox, notify-rust, etc.)
//! - **CLI**: Argument parsing, output formatting, signal forwarding, and command handlers

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
