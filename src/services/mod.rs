//! Business rules on top of the stores. Handlers stay thin and call these.

pub mod bids;
pub mod gigs;
pub mod hire;

pub use hire::{HireOutcome, hire};
