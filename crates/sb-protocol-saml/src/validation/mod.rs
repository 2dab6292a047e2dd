//! Per-message validation.
//!
//! Validation never returns `Err`: every outcome is a [`ValidationResult`],
//! and the first failing check decides the error kind.

mod assertion;
mod replay;
mod result;

pub use assertion::*;
pub use replay::*;
pub use result::*;
