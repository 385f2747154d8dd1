//! Entity extraction and aggregation.
//!
//! Turns raw tool output into the deduplicated artifact stored per scan.

pub mod aggregator;
pub mod extractor;

pub use aggregator::merge;
pub use extractor::EntityExtractor;
