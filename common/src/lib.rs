//! Generic, engine-agnostic primitives shared by the order book crate.
//!
//! Nothing in this crate knows what a `PriceLevel` or an `Order` is — that
//! domain vocabulary lives in `exchange`. This crate only provides the
//! fixed-point numeric aliases, a low-latency logger, and timing helpers
//! that the domain crate (and its surrounding application) build on.

pub mod lf_queue;
pub mod logging;
pub mod time;
pub mod types;

pub use types::{AccountId, Price, Quantity, SequenceId, Side};
