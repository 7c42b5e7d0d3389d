//! Domain logic shared by the etude backend crates.
//!
//! Everything in this crate is pure: no I/O, no database handles, no HTTP.
//! The db, bunny, and api crates depend on these types and validators.

pub mod content;
pub mod curriculum;
pub mod error;
pub mod ordering;
pub mod signing;
pub mod types;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
