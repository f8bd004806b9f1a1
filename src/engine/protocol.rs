//! Wire protocol for out-of-process pitch engines
//!
//! One serialized request per call, one response correlated by `id`. Ids
//! are process-unique and monotonically increasing so that a single engine
//! channel can serve multiple in-flight calls without confusing them; a
//! response whose id matches no pending request is ignored by the reader.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique, monotonically increasing request id
pub fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Analysis request sent over an engine channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRequest {
    /// Correlation id, echoed back in the response
    pub id: u64,
    /// Normalized mono waveform samples
    pub data: Vec<f64>,
    /// Waveform sample rate in Hz
    pub sample_rate: u32,
    /// Waveform-sample stride between analysis points
    #[serde(rename = "perSamples")]
    pub per_samples: u32,
}

/// Analysis response read back from an engine channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    /// Correlation id of the request this answers
    pub id: u64,
    /// Extracted f0 curve; absent when the engine found no pitch
    #[serde(default)]
    pub result: Option<Vec<f64>>,
    /// Waveform buffer handed back by the engine; unused past transport
    #[serde(default)]
    pub data: Option<Vec<f64>>,
    /// Engine-side error message
    #[serde(default)]
    pub error: Option<String>,
}
