//! Background generation engine.
//!
//! One detached task per job drives the remote worker from submission to
//! a terminal job state.

pub mod runner;

pub use runner::{GenerationRunner, RunnerConfig};
