//! SAML types and data structures.
//!
//! The structs double as the wire model: field renames follow the element
//! and attribute names used on the wire (`@` marks an attribute).

mod assertion;
mod constants;
mod name_id;
mod response;
mod status;
mod version;

pub use assertion::*;
pub use constants::*;
pub use name_id::*;
pub use response::*;
pub use status::*;
pub use version::*;
