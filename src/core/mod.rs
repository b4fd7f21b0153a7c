//! Core functionality for the usage meter
//!
//! Provider handlers, response processing, stream reconstruction and cost
//! calculation. Nothing in here performs I/O.

pub mod cost;
pub mod processing;
pub mod providers;
pub mod streaming;
pub mod types;
