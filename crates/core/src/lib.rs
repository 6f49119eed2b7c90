//! Domain layer for the video generation backend.
//!
//! Holds the job lifecycle model ([`job::JobStore`] and friends), artifact
//! storage path helpers, and request validation. This crate performs no
//! network IO; the HTTP server and the remote worker client build on top
//! of it.

pub mod error;
pub mod job;
pub mod storage;
pub mod validation;
