//! Server core functionality
//!
//! Binds the listener and runs the HTTP service.

pub mod core;

pub use self::core::Server;
