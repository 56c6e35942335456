//! Integration tests for the sensitivity engine
//!
//! Tests are organized by topic:
//! - `end_to_end` - Full curve builds from small synthetic samples
//! - `properties` - Monotonicity and conservation properties of the model
