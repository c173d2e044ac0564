//! Crowd safety monitoring service.
//!
//! Turns per-frame motion measurements into debounced, cooldown-gated
//! crowd risk alerts (panic, stampede, unsafe density).
//!
//! Modules:
//! - `model`    — shared domain types and errors
//! - `config`   — TOML configuration and validation
//! - `logging`  — structured diagnostic logging
//! - `analysis` — region list → motion area and density
//! - `alert`    — classification, debouncing, cooldown gate, alert records
//! - `session`  — per-frame pipeline with the state carried between frames
//! - `sinks`    — console, alert log, and audible alert delivery
//! - `replay`   — recorded frame input for development and regression runs

pub mod alert;
pub mod analysis;
pub mod config;
pub mod logging;
pub mod model;
pub mod replay;
pub mod session;
pub mod sinks;
