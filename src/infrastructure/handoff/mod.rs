//! Handoff store infrastructure module

mod fs_mailbox;

pub use fs_mailbox::FsMailbox;
