//! Subprocess pitch engine bridge
//!
//! Speaks the engine wire protocol as JSON lines over a child process's
//! stdin/stdout. The child prints the bare line `ready` once its estimator
//! is initialized; every later stdout line is one serialized
//! [`EngineResponse`]. A single reader task routes responses to waiting
//! calls through an id-keyed pending map, so the one channel can serve
//! several in-flight calls from different workers.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{oneshot, watch};

use crate::engine::protocol::{next_request_id, EngineRequest, EngineResponse};
use crate::engine::PitchEngine;
use crate::error::{FrqError, Result};

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<EngineResponse>>>>;

/// Pitch engine reached over a spawned subprocess
pub struct SubprocessEngine {
    stdin: tokio::sync::Mutex<ChildStdin>,
    pending: PendingMap,
    ready_rx: watch::Receiver<bool>,
    _child: Child,
}

impl SubprocessEngine {
    /// Spawn `command` and begin engine initialization immediately
    ///
    /// Must be called within a tokio runtime: the bridge spawns a reader
    /// task for the child's stdout as part of construction.
    pub fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| FrqError::AnalysisFailure {
            reason: "engine process has no stdin".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| FrqError::AnalysisFailure {
            reason: "engine process has no stdout".to_string(),
        })?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (ready_tx, ready_rx) = watch::channel(false);

        let reader_pending = Arc::clone(&pending);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "ready" {
                    debug!("engine process reported ready");
                    let _ = ready_tx.send(true);
                    continue;
                }
                match serde_json::from_str::<EngineResponse>(line) {
                    Ok(response) => {
                        let waiter = reader_pending
                            .lock()
                            .expect("engine pending map poisoned")
                            .remove(&response.id);
                        match waiter {
                            Some(tx) => {
                                let _ = tx.send(response);
                            }
                            None => {
                                warn!(
                                    "engine response for unknown request id {}, ignoring",
                                    response.id
                                );
                            }
                        }
                    }
                    Err(e) => warn!("unparseable engine output line: {}", e),
                }
            }
            // Child went away; dropping the senders fails every pending
            // call, and dropping ready_tx wakes unready waiters.
            warn!("engine process closed its output");
            reader_pending
                .lock()
                .expect("engine pending map poisoned")
                .clear();
            drop(ready_tx);
        });

        Ok(Self {
            stdin: tokio::sync::Mutex::new(stdin),
            pending,
            ready_rx,
            _child: child,
        })
    }

    async fn send_request(&self, request: &EngineRequest) -> Result<()> {
        let line = serde_json::to_string(request)?;
        let mut stdin = self.stdin.lock().await;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl PitchEngine for SubprocessEngine {
    async fn ready(&self) -> Result<()> {
        let mut rx = self.ready_rx.clone();
        rx.wait_for(|ready| *ready)
            .await
            .map_err(|_| FrqError::AnalysisFailure {
                reason: "engine process exited during initialization".to_string(),
            })?;
        Ok(())
    }

    async fn harvest(
        &self,
        samples: &[f64],
        sample_rate: u32,
        frame_period_ms: f64,
    ) -> Result<Option<Vec<f64>>> {
        let per_samples = (frame_period_ms * sample_rate as f64 / 1000.0).round() as u32;
        let id = next_request_id();
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("engine pending map poisoned")
            .insert(id, tx);

        let request = EngineRequest {
            id,
            data: samples.to_vec(),
            sample_rate,
            per_samples,
        };
        if let Err(e) = self.send_request(&request).await {
            self.pending
                .lock()
                .expect("engine pending map poisoned")
                .remove(&id);
            return Err(e);
        }

        let response = rx.await.map_err(|_| FrqError::AnalysisFailure {
            reason: "engine channel closed before responding".to_string(),
        })?;
        if let Some(message) = response.error {
            return Err(FrqError::AnalysisFailure { reason: message });
        }
        Ok(response.result)
    }
}
