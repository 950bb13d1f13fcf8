//! Shelf-store domain module.
//!
//! This crate contains the business rules for shelf state, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage). Randomness is
//! injected by the caller so tests can seed it.

pub mod shelf;
pub mod state;

pub use shelf::{Shelf, ShelfStatus, Traffic, EMPTY_MINUTES_MAX, EMPTY_MINUTES_MIN};
pub use state::{RobotPosition, StoreState};
