//! Data models

pub mod layout;
pub mod device;
pub mod validate;

pub use device::*;
pub use validate::*;
