//! Domain models for Quire.
//!
//! These are the aggregates shared across all crates. Storage details
//! (row layout, serialized block strings) stay in the db layer.

pub mod category;
pub mod menu;
pub mod page;
pub mod post;
pub mod settings;
pub mod status;
pub mod user;
