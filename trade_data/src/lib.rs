//! Shared catalogue model for the wandering trader command compiler.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_catalogue};
