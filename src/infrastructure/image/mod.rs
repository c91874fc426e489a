//! Notification image infrastructure module

mod resolver;

pub use resolver::{expand_tilde, validate_local_image, SystemImageResolver, SUPPORTED_IMAGE_EXTENSIONS};
