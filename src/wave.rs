//! WAV waveform input
//!
//! Decodes PCM WAV data into the normalized mono f64 samples the analysis
//! engine consumes. All supported bit depths are scaled to ±1.0; stereo is
//! downmixed by frame averaging; more than two channels is rejected.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::{FrqError, Result};
use crate::export::WaveformDecoder;

/// Decoded mono waveform ready for analysis
#[derive(Debug, Clone)]
pub struct DecodedWaveform {
    /// Normalized samples in ±1.0
    pub samples: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// Decode in-memory WAV data
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<DecodedWaveform> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| FrqError::InvalidWaveform {
        reason: format!("failed to parse WAV data: {}", e),
        source: Some(Box::new(e)),
    })?;
    decode_reader(reader)
}

/// Read and decode a WAV file
pub fn read_wav_file(path: &Path) -> Result<DecodedWaveform> {
    let reader = WavReader::open(path).map_err(|e| FrqError::InvalidWaveform {
        reason: format!("failed to open {}: {}", path.display(), e),
        source: Some(Box::new(e)),
    })?;
    decode_reader(reader)
}

/// hound-backed [`WaveformDecoder`] binding
#[derive(Debug, Default, Clone)]
pub struct WavDecoder;

impl WaveformDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedWaveform> {
        decode_wav_bytes(bytes)
    }
}

fn decode_reader<R: std::io::Read>(reader: WavReader<R>) -> Result<DecodedWaveform> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 || channels > 2 {
        return Err(FrqError::InvalidWaveform {
            reason: format!("{}-channel audio (only mono/stereo supported)", channels),
            source: None,
        });
    }

    let interleaved = read_samples_as_f64(reader, spec.bits_per_sample, spec.sample_format)?;
    let samples = downmix(&interleaved, channels);
    Ok(DecodedWaveform {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Read samples from a WAV reader and convert to normalized f64
fn read_samples_as_f64<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f64>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| FrqError::InvalidWaveform {
                reason: format!("failed to read float samples: {}", e),
                source: Some(Box::new(e)),
            }),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f64 / 128.0))
                .collect::<std::result::Result<Vec<f64>, _>>()
                .map_err(|e| FrqError::InvalidWaveform {
                    reason: format!("failed to read 8-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f64 / 32768.0))
                .collect::<std::result::Result<Vec<f64>, _>>()
                .map_err(|e| FrqError::InvalidWaveform {
                    reason: format!("failed to read 16-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / 8388608.0))
                .collect::<std::result::Result<Vec<f64>, _>>()
                .map_err(|e| FrqError::InvalidWaveform {
                    reason: format!("failed to read 24-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / 2147483648.0))
                .collect::<std::result::Result<Vec<f64>, _>>()
                .map_err(|e| FrqError::InvalidWaveform {
                    reason: format!("failed to read 32-bit int samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            other => Err(FrqError::InvalidWaveform {
                reason: format!("{}-bit integer audio is not supported", other),
                source: None,
            }),
        },
    }
}

/// Downmix interleaved samples to mono by frame averaging
fn downmix(samples: &[f64], channels: usize) -> Vec<f64> {
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hound::{WavSpec, WavWriter};

    fn write_wav(spec: WavSpec, frames: &[Vec<i16>]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for frame in frames {
                for &sample in frame {
                    writer.write_sample(sample).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn int_spec(channels: u16) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn test_decode_mono_16bit() {
        let bytes = write_wav(int_spec(1), &[vec![0], vec![16384], vec![-32768]]);
        let decoded = decode_wav_bytes(&bytes).unwrap();

        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.samples.len(), 3);
        assert_relative_eq!(decoded.samples[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(decoded.samples[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(decoded.samples[2], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_decode_downmixes_stereo() {
        let bytes = write_wav(int_spec(2), &[vec![16384, -16384], vec![16384, 16384]]);
        let decoded = decode_wav_bytes(&bytes).unwrap();

        assert_eq!(decoded.samples.len(), 2);
        assert_relative_eq!(decoded.samples[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(decoded.samples[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_decode_rejects_multichannel() {
        let bytes = write_wav(int_spec(4), &[vec![0, 0, 0, 0]]);
        let err = decode_wav_bytes(&bytes).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_WAVEFORM");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_wav_bytes(b"not a wav file").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_WAVEFORM");
    }

    #[test]
    fn test_decoder_trait_binding() {
        let bytes = write_wav(int_spec(1), &[vec![8192]]);
        let decoded = WavDecoder.decode(&bytes).unwrap();
        assert_eq!(decoded.samples.len(), 1);
        assert_relative_eq!(decoded.samples[0], 0.25, epsilon = 1e-12);
    }
}
