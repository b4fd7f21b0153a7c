//! Response processing
//!
//! Handler-driven extraction of usage, identity and signals from provider
//! responses, plus the shape-independent helpers it relies on.

pub mod generic;
pub mod processor;
pub mod reasoning;
pub mod sanitize;
pub mod tools;

pub use processor::{DEFAULT_BASE64_MIN_LENGTH, ProcessOutcome, ResponseProcessor};
pub use sanitize::{BASE64_MARKER, BINARY_MARKER, EMBEDDING_MARKER, sanitize_json};
pub use tools::tally_tool_calls;
