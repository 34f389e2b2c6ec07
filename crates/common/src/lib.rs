//! Shared error taxonomy and fixed-offset layout codec for the rayswap crates

pub mod error;
pub mod layout;

pub use error::*;
pub use layout::*;
