//! Pitch curve auto-correction
//!
//! Deterministic four-stage pipeline: silence gating, guarded average
//! recompute, octave-error correction, gap filling. Stage order and the
//! band table are fixed; reordering either changes results.

use super::FrequencyTrack;

/// Amplitude at or below which a point is treated as silent
pub const SILENCE_THRESHOLD: f64 = 0.01;

/// Rescale a frequency whose ratio to the track average (in percent) falls
/// into a known octave-error band
///
/// Bands are tried in this fixed order and the first match wins:
///
/// | ratio (%)  | action |
/// |------------|--------|
/// | [350, 450] | / 4    |
/// | [267, 333] | / 3    |
/// | [175, 225] | / 2    |
/// | [140, 160] | * 2/3  |
/// | [62, 72]   | * 3/2  |
/// | [21, 29)   | * 4    |
/// | [29, 44)   | * 3    |
/// | [44, 62)   | * 2    |
///
/// No band matching leaves the frequency unchanged.
fn octave_adjust(ratio: f64, frequency: f64) -> f64 {
    if (350.0..=450.0).contains(&ratio) {
        frequency / 4.0
    } else if (267.0..=333.0).contains(&ratio) {
        frequency / 3.0
    } else if (175.0..=225.0).contains(&ratio) {
        frequency / 2.0
    } else if (140.0..=160.0).contains(&ratio) {
        frequency * 2.0 / 3.0
    } else if (62.0..=72.0).contains(&ratio) {
        frequency * 3.0 / 2.0
    } else if (21.0..29.0).contains(&ratio) {
        frequency * 4.0
    } else if (29.0..44.0).contains(&ratio) {
        frequency * 3.0
    } else if (44.0..62.0).contains(&ratio) {
        frequency * 2.0
    } else {
        frequency
    }
}

impl FrequencyTrack {
    /// Run the full correction pipeline in place
    ///
    /// 1. Silence gating: amplitude at or below [`SILENCE_THRESHOLD`]
    ///    forces the frequency to 0.
    /// 2. Average recompute on the gated data; a zero or non-finite
    ///    average aborts the remaining stages.
    /// 3. Octave-error correction against the gated average.
    /// 4. Gap filling for amplitude-voiced points that lost their
    ///    frequency, with a final average recompute.
    pub fn auto_correct(&mut self) {
        self.gate_silence();
        let average = self.recompute_average();
        if average == 0.0 || !average.is_finite() {
            return;
        }
        self.correct_octaves();
        self.recompute_average();
        self.fill_gaps();
        self.recompute_average();
    }

    /// Stage 1: force silent points to unvoiced
    fn gate_silence(&mut self) {
        for point in &mut self.points {
            if point.amplitude <= SILENCE_THRESHOLD {
                point.frequency = 0.0;
            }
        }
    }

    /// Stage 3: rescale octave-error outliers toward the average
    fn correct_octaves(&mut self) {
        let average = self.average_frequency;
        for point in &mut self.points {
            if point.frequency == 0.0 || point.amplitude <= SILENCE_THRESHOLD {
                continue;
            }
            let ratio = point.frequency / average * 100.0;
            point.frequency = octave_adjust(ratio, point.frequency);
        }
    }

    /// Stage 4: interpolate frequencies for amplitude-voiced gaps
    ///
    /// Anchors are the points that were amplitude-voiced and
    /// frequency-nonzero before any filling; interior gaps blend linearly
    /// between the nearest anchors, edge gaps copy the single available
    /// side, and gaps with no anchors stay at 0.
    fn fill_gaps(&mut self) {
        let n = self.points.len();
        let anchor: Vec<bool> = self
            .points
            .iter()
            .map(|p| p.amplitude > SILENCE_THRESHOLD && p.frequency != 0.0)
            .collect();

        let mut preceding = vec![None; n];
        let mut last = None;
        for i in 0..n {
            preceding[i] = last;
            if anchor[i] {
                last = Some(i);
            }
        }

        let mut following = vec![None; n];
        let mut next = None;
        for i in (0..n).rev() {
            following[i] = next;
            if anchor[i] {
                next = Some(i);
            }
        }

        for i in 0..n {
            let point = self.points[i];
            if point.amplitude <= SILENCE_THRESHOLD || point.frequency != 0.0 {
                continue;
            }
            let filled = match (preceding[i], following[i]) {
                (Some(a), Some(b)) => {
                    let t = (i - a) as f64 / (b - a) as f64;
                    let fa = self.points[a].frequency;
                    let fb = self.points[b].frequency;
                    fa + (fb - fa) * t
                }
                (Some(a), None) => self.points[a].frequency,
                (None, Some(b)) => self.points[b].frequency,
                (None, None) => 0.0,
            };
            self.points[i].frequency = filled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(400.0, 100.0, 100.0; "400 percent divides by 4")]
    #[test_case(350.0, 100.0, 87.5; "band edge 350 takes the first listed band")]
    #[test_case(300.0, 100.0, 100.0; "300 percent divides by 3")]
    #[test_case(200.0, 100.0, 100.0; "200 percent divides by 2")]
    #[test_case(150.0, 100.0, 100.0 * 2.0 / 3.0; "150 percent scales by two thirds")]
    #[test_case(66.0, 100.0, 150.0; "66 percent scales by three halves")]
    #[test_case(25.0, 100.0, 400.0; "25 percent multiplies by 4")]
    #[test_case(29.0, 100.0, 300.0; "band edge 29 falls to the times-3 band")]
    #[test_case(35.0, 100.0, 300.0; "35 percent multiplies by 3")]
    #[test_case(50.0, 100.0, 200.0; "50 percent multiplies by 2")]
    #[test_case(100.0, 100.0, 100.0; "in-tune point is untouched")]
    #[test_case(500.0, 100.0, 100.0; "far outlier is untouched")]
    fn test_octave_bands(ratio: f64, frequency: f64, expected: f64) {
        assert_relative_eq!(octave_adjust(ratio, frequency), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_silence_gating_forces_unvoiced() {
        let mut track =
            FrequencyTrack::from_parallel(256, vec![220.0, 220.0], vec![0.005, 0.5]);
        track.gate_silence();
        assert_eq!(track.frequency_at(0), 0.0);
        assert_eq!(track.frequency_at(1), 220.0);
    }

    #[test]
    fn test_auto_correct_aborts_when_everything_is_silent() {
        let mut track = FrequencyTrack::from_parallel(256, vec![220.0; 4], vec![0.001; 4]);
        track.auto_correct();
        // All points gated, average NaN, later stages skipped
        for i in 0..4 {
            assert_eq!(track.frequency_at(i), 0.0);
        }
        assert!(track.average_frequency().is_nan());
    }

    #[test]
    fn test_octave_correction_halves_doubled_point() {
        // Eight in-tune points and one octave-up outlier; the outlier sits
        // near 180% of the track average and gets halved
        let mut frequencies = vec![200.0; 8];
        frequencies.push(400.0);
        let mut track = FrequencyTrack::from_parallel(256, frequencies, vec![0.5; 9]);

        track.auto_correct();
        for i in 0..9 {
            assert_relative_eq!(track.frequency_at(i), 200.0, epsilon = 1e-12);
        }
        assert_relative_eq!(track.average_frequency(), 200.0, epsilon = 1e-12);
    }

    #[test]
    fn test_auto_correct_is_idempotent_on_corrected_track() {
        let mut frequencies = vec![200.0; 8];
        frequencies.push(400.0);
        let mut track = FrequencyTrack::from_parallel(256, frequencies, vec![0.5; 9]);

        track.auto_correct();
        let first_pass: Vec<f64> = (0..9).map(|i| track.frequency_at(i)).collect();

        track.auto_correct();
        let second_pass: Vec<f64> = (0..9).map(|i| track.frequency_at(i)).collect();
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn test_gap_fill_interpolates_between_anchors() {
        // Anchors at 2 (100 Hz) and 6 (300 Hz), amplitude-voiced zeros between
        let frequencies = vec![0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 300.0, 0.0];
        let amplitudes = vec![0.001, 0.001, 0.5, 0.5, 0.5, 0.5, 0.5, 0.001];
        let mut track = FrequencyTrack::from_parallel(256, frequencies, amplitudes);

        track.fill_gaps();
        assert_relative_eq!(track.frequency_at(3), 150.0, epsilon = 1e-12);
        assert_relative_eq!(track.frequency_at(4), 200.0, epsilon = 1e-12);
        assert_relative_eq!(track.frequency_at(5), 250.0, epsilon = 1e-12);
        // Silent points stay unvoiced
        assert_eq!(track.frequency_at(0), 0.0);
        assert_eq!(track.frequency_at(7), 0.0);
    }

    #[test]
    fn test_gap_fill_copies_single_sided_anchor() {
        let frequencies = vec![0.0, 0.0, 120.0, 0.0, 0.0];
        let amplitudes = vec![0.5; 5];
        let mut track = FrequencyTrack::from_parallel(256, frequencies, amplitudes);

        track.fill_gaps();
        assert_eq!(track.frequency_at(0), 120.0);
        assert_eq!(track.frequency_at(1), 120.0);
        assert_eq!(track.frequency_at(3), 120.0);
        assert_eq!(track.frequency_at(4), 120.0);
    }

    #[test]
    fn test_gap_fill_without_anchors_leaves_zeros() {
        let mut track = FrequencyTrack::from_parallel(256, vec![0.0; 3], vec![0.5; 3]);
        track.fill_gaps();
        for i in 0..3 {
            assert_eq!(track.frequency_at(i), 0.0);
        }
    }

    #[test]
    fn test_full_pipeline_gates_then_fills() {
        // A silent dropout inside a voiced region: gated to 0 in stage 1,
        // it stays 0 because it is not amplitude-voiced; a detection gap
        // (zero frequency, healthy amplitude) is filled instead
        let frequencies = vec![200.0, 210.0, 0.0, 190.0, 200.0];
        let amplitudes = vec![0.5, 0.5, 0.5, 0.002, 0.5];
        let mut track = FrequencyTrack::from_parallel(256, frequencies, amplitudes);

        track.auto_correct();
        // Index 2: amplitude-voiced gap, interpolated a third of the way
        // from the anchor at 1 (210 Hz) to the anchor at 4 (200 Hz)
        assert_relative_eq!(track.frequency_at(2), 210.0 - 10.0 / 3.0, epsilon = 1e-9);
        // Index 3: silent, gated to unvoiced
        assert_eq!(track.frequency_at(3), 0.0);
    }
}
