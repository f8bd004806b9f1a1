//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command. Library errors gain
//! file-path context here, at the binary boundary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use walkdir::WalkDir;

use crate::config::GenerationConfig;
use crate::engine::{PitchEngine, SubprocessEngine};
use crate::pool::WorkerPool;
use crate::track::FrequencyTrack;
use crate::wave;
use crate::worker::GenerationRequest;

/// Print frq header fields and voicing statistics.
pub fn info(path: &Path) -> Result<()> {
    let track = load_track(path)?;

    println!("File:              {}", path.display());
    println!("Samples per point: {}", track.samples_per_point());
    println!("Points:            {}", track.point_count());
    println!("Voiced points:     {}", track.voiced_count());
    if track.voiced_count() > 0 {
        println!("Average frequency: {:.3} Hz", track.average_frequency());
    } else {
        println!("Average frequency: (no voiced points)");
    }

    Ok(())
}

/// Run the auto-correction pipeline on an existing frq file.
pub fn correct(path: &Path, output: Option<&Path>) -> Result<()> {
    let mut track = load_track(path)?;
    let voiced_before = track.voiced_count();

    track.auto_correct();

    let target = output.unwrap_or(path);
    std::fs::write(target, track.to_binary())
        .with_context(|| format!("writing {}", target.display()))?;
    info!("corrected {} -> {}", path.display(), target.display());

    println!("Corrected: {}", target.display());
    println!(
        "Voiced points: {} -> {}",
        voiced_before,
        track.voiced_count()
    );
    if track.voiced_count() > 0 {
        println!("Average frequency: {:.3} Hz", track.average_frequency());
    }

    Ok(())
}

/// Generate missing frq files for every .wav under a voicebank directory.
pub async fn gen(
    dir: &Path,
    engine: Option<String>,
    pool_size: Option<usize>,
    samples_per_point: Option<u32>,
    force: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => GenerationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    if let Some(command) = engine {
        config.engine_command = Some(command);
    }
    if let Some(size) = pool_size {
        config.pool_size = size;
    }
    if let Some(stride) = samples_per_point {
        config.samples_per_point = stride;
    }

    let Some(engine_command) = config.engine_command.clone() else {
        bail!("no engine command configured; pass --engine or set engine_command in the config file");
    };

    let targets = scan_voicebank(dir, force)?;
    if targets.is_empty() {
        println!("Nothing to do: no waveform needs an frq file");
        return Ok(());
    }
    info!(
        "{} waveform(s) need frq generation, pool size {}",
        targets.len(),
        config.pool_size
    );

    let engine: Arc<dyn PitchEngine> =
        Arc::new(SubprocessEngine::spawn(&engine_command, &config.engine_args)?);
    let pool = WorkerPool::new(engine, config.pool_size);

    let mut pending = Vec::new();
    for (index, (wav_path, frq_path)) in targets.iter().enumerate() {
        let waveform = match wave::read_wav_file(wav_path) {
            Ok(waveform) => waveform,
            Err(e) => {
                warn!("skipping {}: {}", wav_path.display(), e);
                continue;
            }
        };
        let request = GenerationRequest::new(
            waveform.samples,
            waveform.sample_rate,
            config.samples_per_point,
        );
        pending.push((frq_path.clone(), pool.submit(request, index)));
    }

    let mut generated = 0usize;
    let mut failed = 0usize;
    for (frq_path, future) in pending {
        match future.await {
            Ok(Some(track)) => {
                std::fs::write(&frq_path, track.to_binary())
                    .with_context(|| format!("writing {}", frq_path.display()))?;
                generated += 1;
            }
            Ok(None) => {
                warn!("no pitch detected for {}", frq_path.display());
                failed += 1;
            }
            Err(e) => {
                warn!("generation failed for {}: {}", frq_path.display(), e);
                failed += 1;
            }
        }
    }

    println!("Generated {} frq file(s), {} failed", generated, failed);
    Ok(())
}

/// Collect (wav, frq) path pairs that need generation, in sorted order.
fn scan_voicebank(dir: &Path, force: bool) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut targets = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if !is_wav {
            continue;
        }
        let frq_path = frq_sibling_path(path);
        if !force && frq_path.exists() {
            continue;
        }
        targets.push((path.to_path_buf(), frq_path));
    }
    targets.sort();
    Ok(targets)
}

/// frq path next to a waveform: `foo.wav` becomes `foo_wav.frq`.
fn frq_sibling_path(wav: &Path) -> PathBuf {
    let stem = wav
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("sample");
    wav.with_file_name(format!("{}_wav.frq", stem))
}

fn load_track(path: &Path) -> Result<FrequencyTrack> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let track = FrequencyTrack::from_binary(&bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frq_sibling_path() {
        assert_eq!(
            frq_sibling_path(Path::new("/bank/KA.wav")),
            PathBuf::from("/bank/KA_wav.frq")
        );
    }

    #[test]
    fn test_scan_skips_existing_frq() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.wav"), b"x").unwrap();
        std::fs::write(dir.path().join("b.wav"), b"x").unwrap();
        std::fs::write(dir.path().join("b_wav.frq"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let targets = scan_voicebank(dir.path(), false).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].0, dir.path().join("a.wav"));

        let forced = scan_voicebank(dir.path(), true).unwrap();
        assert_eq!(forced.len(), 2);
    }
}
