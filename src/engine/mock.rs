//! Mock pitch engine for pipeline testing
//!
//! Produces a flat configurable f0 curve instead of running a real
//! estimator, with simulated initialization and per-call latency so
//! scheduler and export behavior can be exercised. An in-flight gauge
//! records the peak number of concurrent calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::engine::PitchEngine;
use crate::error::{FrqError, Result};

/// Configurable stand-in for a real pitch analysis engine
pub struct MockEngine {
    f0_hz: f64,
    init_delay: Duration,
    call_delay: Duration,
    failure: Option<String>,
    silent: bool,
    initialized: OnceCell<()>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockEngine {
    /// Engine that detects a flat curve at `f0_hz`
    pub fn new(f0_hz: f64) -> Self {
        Self {
            f0_hz,
            init_delay: Duration::ZERO,
            call_delay: Duration::ZERO,
            failure: None,
            silent: false,
            initialized: OnceCell::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Simulate slow engine initialization
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    /// Simulate per-call analysis latency
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Fail every analysis call with the given message
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Produce no result from any analysis call
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Peak number of concurrent harvest calls observed so far
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PitchEngine for MockEngine {
    async fn ready(&self) -> Result<()> {
        self.initialized
            .get_or_init(|| async {
                if !self.init_delay.is_zero() {
                    tokio::time::sleep(self.init_delay).await;
                }
            })
            .await;
        Ok(())
    }

    async fn harvest(
        &self,
        samples: &[f64],
        sample_rate: u32,
        frame_period_ms: f64,
    ) -> Result<Option<Vec<f64>>> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(reason) = &self.failure {
            return Err(FrqError::AnalysisFailure {
                reason: reason.clone(),
            });
        }
        if samples.is_empty() {
            return Err(FrqError::AnalysisFailure {
                reason: "empty waveform".to_string(),
            });
        }
        if self.silent {
            return Ok(None);
        }

        // One frame per frame period plus the trailing partial frame,
        // like a Harvest call would produce
        let frame_samples = (frame_period_ms * sample_rate as f64 / 1000.0)
            .round()
            .max(1.0) as usize;
        let frames = samples.len() / frame_samples + 1;
        Ok(Some(vec![self.f0_hz; frames]))
    }
}
