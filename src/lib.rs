//! Bookshelf application library
//!
//! The books module and the startup sequence that wires it to the database
//! and the HTTP server.

pub mod bootstrap;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;
