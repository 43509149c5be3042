//! Domain types shared by the Piata server and its client widgets.
//!
//! Nothing in this crate performs I/O: it holds the wire contracts,
//! status enumerations, validation and the small amount of pure logic
//! (price formatting, main image selection, geo math) both sides agree on.

pub mod error;
pub mod geo;
pub mod listing;
pub mod query;
pub mod slug;
pub mod types;
