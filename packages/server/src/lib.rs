//! Musubi coordination server library.
//!
//! Anonymous participants submit a short "thought", discover participants
//! with similar thoughts, and negotiate ephemeral one-to-one chat sessions.
//! This crate implements the matching and session-coordination core plus its
//! Axum transport binding.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
