//! Request binding: declarative payload rules and the extractors that run
//! them before any handler executes.

pub mod extract;
pub mod validate;

pub use extract::{ValidJson, ValidQuery};
pub use validate::{FieldErrors, Validate};
