//! Utility functions
//!
//! Provides logging and network utilities.

pub mod logging;
pub mod network;
