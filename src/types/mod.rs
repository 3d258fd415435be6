//! Protocol types shared across the crate.

pub mod message;
pub mod result;
pub mod usage;

pub use message::*;
pub use result::*;
pub use usage::*;
