//! Binary frq layout
//!
//! Little-endian throughout: 8-byte ASCII magic, u32 stride, f64 average
//! frequency, a 16-byte processor-name field (written as zero bytes), u32
//! point count, then 16-byte records of f64 frequency + f64 amplitude.

use byteorder::{ByteOrder, LittleEndian};

use super::{FrequencyTrack, FrqPoint};
use crate::error::{FrqError, Result};

/// Magic tag at the start of every frq file
pub const FRQ_MAGIC: &[u8; 8] = b"FREQ0003";

/// Header size: magic + stride + average + processor name + point count
const HEADER_LEN: usize = 40;

/// Record size: f64 frequency + f64 amplitude
const RECORD_LEN: usize = 16;

/// Minimum accepted file size
///
/// A zero-point file is structurally expressible at 40 bytes, but the
/// loader keeps a defensive 56-byte minimum and rejects anything shorter.
pub const MIN_FILE_LEN: usize = 56;

impl FrequencyTrack {
    /// Parse a track from frq binary data
    ///
    /// # Errors
    /// * `TruncatedFrq` - buffer shorter than the 56-byte minimum
    /// * `BadMagic` - leading tag is not `FREQ0003`
    /// * `TruncatedPoints` - declared point count exceeds the buffer
    pub fn from_binary(buf: &[u8]) -> Result<Self> {
        if buf.len() < MIN_FILE_LEN {
            return Err(FrqError::TruncatedFrq {
                len: buf.len(),
                min: MIN_FILE_LEN,
            });
        }
        if &buf[0..8] != FRQ_MAGIC {
            return Err(FrqError::BadMagic {
                found: buf[0..8].to_vec(),
            });
        }

        let samples_per_point = LittleEndian::read_u32(&buf[8..12]);
        let average_frequency = LittleEndian::read_f64(&buf[12..20]);
        // bytes 20..36 hold the processor-name field, not modeled
        let point_count = LittleEndian::read_u32(&buf[36..40]) as usize;

        let expected = HEADER_LEN + point_count * RECORD_LEN;
        if buf.len() < expected {
            return Err(FrqError::TruncatedPoints {
                points: point_count,
                expected,
                len: buf.len(),
            });
        }

        let mut points = Vec::with_capacity(point_count);
        for record in buf[HEADER_LEN..expected].chunks_exact(RECORD_LEN) {
            points.push(FrqPoint {
                frequency: LittleEndian::read_f64(&record[0..8]),
                amplitude: LittleEndian::read_f64(&record[8..16]),
            });
        }

        Ok(FrequencyTrack {
            samples_per_point,
            average_frequency,
            points,
        })
    }

    /// Serialize the track to frq binary data
    ///
    /// Round-trips byte-for-byte with [`FrequencyTrack::from_binary`] on
    /// the header and point region; the processor-name field is written as
    /// zero bytes.
    pub fn to_binary(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN + self.points.len() * RECORD_LEN];
        buf[0..8].copy_from_slice(FRQ_MAGIC);
        LittleEndian::write_u32(&mut buf[8..12], self.samples_per_point);
        LittleEndian::write_f64(&mut buf[12..20], self.average_frequency);
        // 20..36 stays zero-filled
        LittleEndian::write_u32(&mut buf[36..40], self.points.len() as u32);

        for (i, point) in self.points.iter().enumerate() {
            let offset = HEADER_LEN + i * RECORD_LEN;
            LittleEndian::write_f64(&mut buf[offset..offset + 8], point.frequency);
            LittleEndian::write_f64(&mut buf[offset + 8..offset + 16], point.amplitude);
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_track() -> FrequencyTrack {
        FrequencyTrack::from_parallel(
            256,
            vec![220.0, 0.0, 440.5, 261.626],
            vec![0.25, 0.001, 0.5, 0.125],
        )
    }

    #[test]
    fn test_round_trip_is_bit_identical() {
        let track = sample_track();
        let bytes = track.to_binary();
        let parsed = FrequencyTrack::from_binary(&bytes).unwrap();

        assert_eq!(parsed.samples_per_point(), track.samples_per_point());
        assert_eq!(
            parsed.average_frequency().to_bits(),
            track.average_frequency().to_bits()
        );
        assert_eq!(parsed.point_count(), track.point_count());
        for i in 0..track.point_count() {
            assert_eq!(
                parsed.frequency_at(i).to_bits(),
                track.frequency_at(i).to_bits()
            );
            assert_eq!(
                parsed.amplitude_at(i).to_bits(),
                track.amplitude_at(i).to_bits()
            );
        }

        // Second serialization is byte-for-byte stable
        assert_eq!(parsed.to_binary(), bytes);
    }

    #[test]
    fn test_round_trip_preserves_nan_average() {
        let track = FrequencyTrack::from_parallel(256, vec![0.0; 4], vec![0.5; 4]);
        assert!(track.average_frequency().is_nan());

        let parsed = FrequencyTrack::from_binary(&track.to_binary()).unwrap();
        assert!(parsed.average_frequency().is_nan());
    }

    #[test]
    fn test_layout_offsets() {
        let track = sample_track();
        let bytes = track.to_binary();

        assert_eq!(&bytes[0..8], FRQ_MAGIC);
        assert_eq!(LittleEndian::read_u32(&bytes[8..12]), 256);
        assert_eq!(&bytes[20..36], &[0u8; 16]);
        assert_eq!(LittleEndian::read_u32(&bytes[36..40]), 4);
        assert_eq!(bytes.len(), HEADER_LEN + 4 * RECORD_LEN);
        assert_eq!(LittleEndian::read_f64(&bytes[40..48]), 220.0);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = FrequencyTrack::from_binary(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, FrqError::TruncatedFrq { len: 12, .. }));
    }

    #[test]
    fn test_rejects_zero_point_file_under_guard() {
        // Structurally valid 40-byte header, still under the 56-byte guard
        let track = FrequencyTrack::from_parallel(256, vec![], vec![]);
        let bytes = track.to_binary();
        assert_eq!(bytes.len(), HEADER_LEN);

        let err = FrequencyTrack::from_binary(&bytes).unwrap_err();
        assert!(matches!(err, FrqError::TruncatedFrq { .. }));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = sample_track().to_binary();
        bytes[0..8].copy_from_slice(b"FREQ0002");

        let err = FrequencyTrack::from_binary(&bytes).unwrap_err();
        match err {
            FrqError::BadMagic { found } => assert_eq!(found, b"FREQ0002".to_vec()),
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_truncated_points() {
        let mut bytes = sample_track().to_binary();
        bytes.truncate(bytes.len() - 1);

        let err = FrequencyTrack::from_binary(&bytes).unwrap_err();
        assert!(matches!(err, FrqError::TruncatedPoints { points: 4, .. }));
    }

    #[test]
    fn test_minimum_valid_file_has_one_point() {
        let track = FrequencyTrack::from_parallel(256, vec![220.0], vec![0.5]);
        let bytes = track.to_binary();
        assert_eq!(bytes.len(), MIN_FILE_LEN);
        assert!(FrequencyTrack::from_binary(&bytes).is_ok());
    }
}
