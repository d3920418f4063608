//! Musubi CLI client library.
//!
//! Submits a thought over HTTP, connects to the coordination server over
//! WebSocket and drives chat negotiation from a readline loop.

pub mod command;
pub mod error;
pub mod formatter;
pub mod session;
