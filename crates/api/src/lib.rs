//! Panomax API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! WebSocket infrastructure, task pipeline) so integration tests and
//! the binary entrypoint can both access them.

pub mod background;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod retrieve;
pub mod routes;
pub mod state;
pub mod ws;
