//! Shared types for the person list workspace.

pub mod types;

pub use types::{ParsePersonIdError, PersonId};
