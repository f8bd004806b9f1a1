//! Generation configuration
//!
//! Settings shared by batch generation paths, loadable from a JSON file.
//! Every field has a default so partial config files work; CLI flags
//! override loaded values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::track::DEFAULT_SAMPLES_PER_POINT;

/// Default number of concurrent analysis workers
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Settings for batch frq generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Waveform-sample stride between analysis points
    pub samples_per_point: u32,
    /// Number of concurrent analysis workers
    pub pool_size: usize,
    /// External engine command to spawn for the subprocess bridge
    pub engine_command: Option<String>,
    /// Arguments passed to the engine command
    pub engine_args: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            samples_per_point: DEFAULT_SAMPLES_PER_POINT,
            pool_size: DEFAULT_POOL_SIZE,
            engine_command: None,
            engine_args: Vec::new(),
        }
    }
}

impl GenerationConfig {
    /// Load a config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
