//! Shared utilities for the Musubi chat coordinator.
//!
//! Cross-cutting concerns used by both the server and the client:
//! time/clock abstraction and logging setup.

pub mod logger;
pub mod time;
