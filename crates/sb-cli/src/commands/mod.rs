//! Command implementations.

pub mod policy;
pub mod translate;
pub mod validate;

pub use policy::run_policy;
pub use translate::run_translate;
pub use validate::run_validate;
