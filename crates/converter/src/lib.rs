//! Command-line front end for the sleep-recording converter.

pub mod config;
pub mod prompt;
