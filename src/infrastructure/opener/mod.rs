//! URL opener infrastructure module

mod system;

pub use system::SystemUrlOpener;
