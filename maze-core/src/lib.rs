//! Core organic labyrinth simulation library.
//!
//! Evolves a closed polygonal curve under brownian, smoothing and
//! near-field repulsion forces into a dense, maze-like pattern, inside
//! an optional fixed boundary polygon.
//!
//! Main components:
//! - [`angle`] — normalized angles with trig accessors.
//! - [`point`] — curve points and segment geometry helpers.
//! - [`config`] — simulation constants and derived thresholds.
//! - [`force_buffer`] — per-point force accumulation between phases.
//! - [`phases`] — barrier-separated per-step simulation phases.
//! - [`maze`] — the engine owning the live curve and boundary.

pub mod angle;
pub mod config;
pub mod force_buffer;
pub mod maze;
pub mod phases;
pub mod point;
