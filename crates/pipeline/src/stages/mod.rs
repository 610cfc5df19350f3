//! Per-recording processing stages
//!
//! A recording flows through `select` (container keys to channel roles),
//! `align` (label upsampling and length reconciliation) and `csv_sink`.

pub mod align;
pub mod csv_sink;
pub mod select;

// Re-export stage implementations
pub use align::*;
pub use csv_sink::*;
pub use select::*;
