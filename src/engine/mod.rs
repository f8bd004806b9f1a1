//! Pitch analysis engine interfaces and bindings
//!
//! This module provides:
//! - `PitchEngine` trait for Harvest-style f0 estimators
//! - Wire protocol with request-id correlation for out-of-process engines
//! - `SubprocessEngine`, a JSON-lines bridge to an external engine process
//! - `MockEngine` for pipeline testing

mod bridge;
mod mock;
pub mod protocol;

pub use bridge::SubprocessEngine;
pub use mock::MockEngine;

use async_trait::async_trait;

use crate::error::Result;

/// External pitch analysis engine
///
/// Implementations start initializing when constructed; callers gate on
/// [`PitchEngine::ready`] before the first analysis call.
#[async_trait]
pub trait PitchEngine: Send + Sync {
    /// Resolves once engine initialization has completed
    ///
    /// Resolves immediately on every call after the first completion.
    /// Fails when the engine died before becoming ready.
    async fn ready(&self) -> Result<()>;

    /// Extract the raw f0 curve from a normalized mono waveform
    ///
    /// `frame_period_ms` is the analysis frame period in milliseconds.
    /// Returns `Ok(None)` when the engine produced no result; engine-side
    /// errors surface as `AnalysisFailure` carrying the engine's message
    /// and are not retried here.
    async fn harvest(
        &self,
        samples: &[f64],
        sample_rate: u32,
        frame_period_ms: f64,
    ) -> Result<Option<Vec<f64>>>;
}
