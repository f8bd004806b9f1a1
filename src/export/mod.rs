//! Batch export orchestration
//!
//! Integrates frq generation into an archive-export pipeline. Entries are
//! copied one at a time in sorted order; frq generation for waveform
//! entries is fire-and-forget relative to that loop, and the archive is
//! finalized only after every generation future has settled. A failed
//! generation is logged and simply produces no frq entry; it never aborts
//! the batch.

mod memory;
pub use memory::MemoryArchive;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::pool::{TrackFuture, WorkerPool};
use crate::wave::DecodedWaveform;
use crate::worker::GenerationRequest;

// ============================================================================
// Collaborator traits
// ============================================================================

/// Archive container collaborator
///
/// Entry storage plus a final serialize step. The orchestrator calls
/// `serialize` exactly once, after all generation futures settled.
pub trait ArchiveContainer {
    fn has_entry(&self, name: &str) -> bool;
    fn read_entry(&self, name: &str) -> Result<Vec<u8>>;
    fn write_entry(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
    fn serialize(&mut self) -> Result<Vec<u8>>;
}

/// Waveform decoder collaborator: encoded audio entry bytes to normalized
/// mono samples
pub trait WaveformDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedWaveform>;
}

// ============================================================================
// Naming
// ============================================================================

/// frq entry name for a waveform entry: `foo.wav` becomes `foo_wav.frq`
pub fn frq_entry_name(wav_name: &str) -> String {
    match wav_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.frq", stem, ext.to_ascii_lowercase()),
        None => format!("{}.frq", wav_name),
    }
}

fn is_wav_entry(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".wav")
}

// ============================================================================
// Session context
// ============================================================================

/// Per-export context: session identity plus generation progress counters
///
/// Counters live on this object and are threaded through the pipeline,
/// never kept as ambient globals. `settled` increases exactly once per
/// settled future regardless of outcome.
#[derive(Debug)]
pub struct ExportSession {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    requested: usize,
    settled: usize,
    generated: usize,
}

impl ExportSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            requested: 0,
            settled: 0,
            generated: 0,
        }
    }

    /// Generations requested so far
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Generation futures settled so far, regardless of outcome
    pub fn settled(&self) -> usize {
        self.settled
    }

    /// Generations that produced a track
    pub fn generated(&self) -> usize {
        self.generated
    }

    fn note_requested(&mut self) {
        self.requested += 1;
    }

    fn note_settled(&mut self, produced_track: bool) {
        self.settled += 1;
        if produced_track {
            self.generated += 1;
        }
    }
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of one finished export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries_copied: usize,
    pub frq_requested: usize,
    pub frq_generated: usize,
    pub frq_failed: usize,
}

/// Finalized archive bytes plus the run's report
#[derive(Debug)]
pub struct ExportOutcome {
    pub archive: Vec<u8>,
    pub report: ExportReport,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives one batch export over a source archive
pub struct ExportOrchestrator<'a, S, O, D>
where
    S: ArchiveContainer,
    O: ArchiveContainer,
    D: WaveformDecoder,
{
    source: &'a S,
    output: &'a mut O,
    decoder: &'a D,
    pool: &'a WorkerPool,
    samples_per_point: u32,
}

impl<'a, S, O, D> ExportOrchestrator<'a, S, O, D>
where
    S: ArchiveContainer,
    O: ArchiveContainer,
    D: WaveformDecoder,
{
    pub fn new(
        source: &'a S,
        output: &'a mut O,
        decoder: &'a D,
        pool: &'a WorkerPool,
        samples_per_point: u32,
    ) -> Self {
        Self {
            source,
            output,
            decoder,
            pool,
            samples_per_point,
        }
    }

    /// Export the given entries and finalize the output archive
    ///
    /// Entries are visited in sorted order and copied synchronously; frq
    /// generation tasks are submitted along the way without blocking the
    /// loop. The output is serialized strictly after the post-loop join
    /// over every generation future.
    pub async fn run(self, entries: &[String]) -> Result<ExportOutcome> {
        let mut session = ExportSession::new();
        info!(
            "export session {} started: {} entries",
            session.session_id,
            entries.len()
        );

        let mut sorted: Vec<&String> = entries.iter().collect();
        sorted.sort();

        let mut pending: Vec<(String, TrackFuture)> = Vec::new();
        let mut entries_copied = 0usize;

        for name in sorted {
            let bytes = self.source.read_entry(name)?;
            self.output.write_entry(name, &bytes)?;
            entries_copied += 1;

            if !is_wav_entry(name) {
                continue;
            }
            let frq_name = frq_entry_name(name);
            if self.output.has_entry(&frq_name) || self.source.has_entry(&frq_name) {
                continue; // track already cached alongside the sample
            }
            if pending.iter().any(|(queued, _)| *queued == frq_name) {
                continue;
            }

            let waveform = match self.decoder.decode(&bytes) {
                Ok(waveform) => waveform,
                Err(e) => {
                    warn!("skipping frq generation for {}: {}", name, e);
                    continue;
                }
            };
            let request = GenerationRequest::new(
                waveform.samples,
                waveform.sample_rate,
                self.samples_per_point,
            );
            let future = self.pool.submit(request, session.requested());
            session.note_requested();
            pending.push((frq_name, future));
        }

        let mut frq_failed = 0usize;
        for (frq_name, future) in pending {
            match future.await {
                Ok(Some(track)) => {
                    self.output.write_entry(&frq_name, &track.to_binary())?;
                    session.note_settled(true);
                }
                Ok(None) => {
                    warn!("no pitch detected, skipping {}", frq_name);
                    session.note_settled(false);
                    frq_failed += 1;
                }
                Err(e) => {
                    warn!("frq generation failed for {}: {}", frq_name, e);
                    session.note_settled(false);
                    frq_failed += 1;
                }
            }
        }

        let archive = self.output.serialize()?;
        let report = ExportReport {
            session_id: session.session_id,
            started_at: session.started_at,
            finished_at: Utc::now(),
            entries_copied,
            frq_requested: session.requested(),
            frq_generated: session.generated(),
            frq_failed,
        };
        info!(
            "export session {} finished: {}/{} tracks generated",
            report.session_id, report.frq_generated, report.frq_requested
        );
        Ok(ExportOutcome { archive, report })
    }
}
