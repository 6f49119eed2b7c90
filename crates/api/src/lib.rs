//! Video generation API server library.
//!
//! Exposes the building blocks (config, state, error handling, the
//! generation runner, routes) so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod refine;
pub mod routes;
pub mod state;
