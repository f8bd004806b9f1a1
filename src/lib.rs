//! frqkit - UTAU Frequency-Track Toolkit
//!
//! frqkit implements the pitch-curve subsystem used when packaging UTAU
//! singing voicebanks:
//! 1. The binary "frq" format - one frequency/amplitude pair per fixed-size
//!    waveform window, cached next to each sample of a voicebank
//! 2. The correction pipeline - turns a raw extracted pitch curve into a
//!    usable track (silence gating, octave-error correction, gap filling)
//! 3. Concurrent generation - a fixed-size worker pool drives an external
//!    pitch analysis engine without blocking the caller
//!
//! # Architecture
//!
//! Tracks are generated from raw waveforms by an [`engine::PitchEngine`]
//! (an external Harvest-style estimator reached over a subprocess bridge, or
//! a mock), wrapped by [`worker::AnalysisWorker`] and scheduled through
//! [`pool::WorkerPool`]. The [`export`] module ties generation into a batch
//! archive-export pipeline that finalizes only after every in-flight
//! generation has settled.

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod pool;
pub mod track;
pub mod wave;
pub mod worker;

pub mod cli;

pub use error::{FrqError, Result};
pub use track::{FrequencyTrack, FrqPoint};
pub use worker::GenerationRequest;
