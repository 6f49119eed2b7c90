//! Client for the remote video worker service.
//!
//! The worker exposes a three-endpoint contract: submit a generation
//! request, poll its status, and download the finished video. Any service
//! implementing that contract (the ffmpeg dummy worker or the diffusion
//! pipeline) is interchangeable behind the [`VideoWorker`] trait; the
//! generation runner only ever talks to the trait.

pub mod client;
pub mod worker;

pub use client::{FramepackClient, WorkerError};
pub use worker::{RemoteStatus, VideoWorker};
