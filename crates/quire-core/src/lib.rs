//! Quire Core: domain models, the block registry, the error taxonomy and
//! repository traits shared by every other crate.

pub mod block;
pub mod error;
pub mod models;
pub mod repository;
pub mod tenant;

pub use error::{QuireError, QuireResult};
