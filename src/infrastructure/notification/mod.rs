//! Notification infrastructure module
//!
//! Desktop notifications via notify-rust plus a local delivery ledger used to
//! list and remove what was posted.

mod ledger;
mod notify_rust;

pub use ledger::{DeliveryLedger, LedgerEntry};
pub use notify_rust::NotifyRustCenter;
