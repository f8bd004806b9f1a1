//! Analysis worker
//!
//! A stateful wrapper around one pitch engine instance. Each worker runs
//! one analysis call at a time; readiness is awaited inside the call, so
//! schedulers never gate on it.

use std::sync::Arc;

use log::debug;

use crate::engine::PitchEngine;
use crate::error::Result;
use crate::track::FrequencyTrack;

/// A pitch-analysis request
///
/// Ownership of the waveform buffer moves into the worker call; the caller
/// must not hold on to it.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Normalized mono samples in ±1.0
    pub samples: Vec<f64>,
    /// Waveform sample rate in Hz
    pub sample_rate: u32,
    /// Waveform-sample stride between analysis points
    pub samples_per_point: u32,
}

impl GenerationRequest {
    pub fn new(samples: Vec<f64>, sample_rate: u32, samples_per_point: u32) -> Self {
        Self {
            samples,
            sample_rate,
            samples_per_point,
        }
    }

    /// Analysis frame period implied by the stride, in milliseconds
    pub fn frame_period_ms(&self) -> f64 {
        self.samples_per_point as f64 * 1000.0 / self.sample_rate as f64
    }
}

/// Wrapper around one pitch engine instance
pub struct AnalysisWorker {
    engine: Arc<dyn PitchEngine>,
}

impl AnalysisWorker {
    /// Wrap an engine whose initialization is already underway
    pub fn new(engine: Arc<dyn PitchEngine>) -> Self {
        Self { engine }
    }

    /// Resolves once the underlying engine finished initializing
    ///
    /// After the first resolution, later calls return without waiting.
    pub async fn wait_until_ready(&self) -> Result<()> {
        self.engine.ready().await
    }

    /// Run one analysis call
    ///
    /// Awaits readiness, issues exactly one harvest call, then builds the
    /// track from the f0 curve and the waveform (deriving amplitudes) and
    /// auto-corrects it before returning. `Ok(None)` means the engine
    /// produced no result; engine errors propagate without retry.
    pub async fn process(&self, request: GenerationRequest) -> Result<Option<FrequencyTrack>> {
        self.engine.ready().await?;

        let frame_period_ms = request.frame_period_ms();
        let GenerationRequest {
            samples,
            sample_rate,
            samples_per_point,
        } = request;

        let f0 = self
            .engine
            .harvest(&samples, sample_rate, frame_period_ms)
            .await?;
        let Some(f0) = f0 else {
            debug!("engine produced no f0 curve");
            return Ok(None);
        };

        let mut track = FrequencyTrack::from_f0_and_waveform(f0, &samples, samples_per_point);
        track.auto_correct();
        Ok(Some(track))
    }
}
