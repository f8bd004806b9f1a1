//! Interactive editing operations
//!
//! Range operations used by interactive correction. All of them are total:
//! out-of-bounds indices are silently ignored and degenerate selections are
//! no-ops, so UI-facing edits never fail.

use super::FrequencyTrack;

impl FrequencyTrack {
    /// Multiply the frequency of each selected point by `factor`
    pub fn scale_range(&mut self, indices: &[usize], factor: f64) {
        for &index in indices {
            if let Some(point) = self.points.get_mut(index) {
                point.frequency *= factor;
            }
        }
    }

    /// Set the frequency of each selected point to `value`
    pub fn set_range(&mut self, indices: &[usize], value: f64) {
        for &index in indices {
            if let Some(point) = self.points.get_mut(index) {
                point.frequency = value;
            }
        }
    }

    /// Blend frequencies linearly across the selection
    ///
    /// `indices` is expected ascending. Every point strictly between the
    /// first and last in-bounds index is set to the proportional blend of
    /// the frequencies at those two endpoints. Fewer than two in-bounds
    /// indices is a no-op.
    pub fn linear_interpolate(&mut self, indices: &[usize]) {
        let mut in_bounds = indices.iter().copied().filter(|&i| i < self.points.len());
        let Some(first) = in_bounds.next() else {
            return;
        };
        let Some(last) = in_bounds.last() else {
            return;
        };
        if last <= first {
            return;
        }

        let start = self.points[first].frequency;
        let end = self.points[last].frequency;
        let span = (last - first) as f64;
        for i in first + 1..last {
            let t = (i - first) as f64 / span;
            self.points[i].frequency = start + (end - start) * t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_track() -> FrequencyTrack {
        FrequencyTrack::from_parallel(
            256,
            vec![100.0, 110.0, 120.0, 130.0, 140.0],
            vec![0.5; 5],
        )
    }

    #[test]
    fn test_scale_range() {
        let mut track = sample_track();
        track.scale_range(&[1, 3], 2.0);
        assert_eq!(track.frequency_at(1), 220.0);
        assert_eq!(track.frequency_at(3), 260.0);
        // Unselected points untouched
        assert_eq!(track.frequency_at(2), 120.0);
    }

    #[test]
    fn test_set_range_ignores_out_of_bounds() {
        let mut track = sample_track();
        track.set_range(&[0, 4, 99], 300.0);
        assert_eq!(track.frequency_at(0), 300.0);
        assert_eq!(track.frequency_at(4), 300.0);
        assert_eq!(track.point_count(), 5);
    }

    #[test]
    fn test_linear_interpolate_blends_interior() {
        let mut track = sample_track();
        track.set_range(&[0], 100.0);
        track.set_range(&[4], 200.0);
        track.linear_interpolate(&[0, 1, 2, 3, 4]);

        assert_relative_eq!(track.frequency_at(1), 125.0, epsilon = 1e-12);
        assert_relative_eq!(track.frequency_at(2), 150.0, epsilon = 1e-12);
        assert_relative_eq!(track.frequency_at(3), 175.0, epsilon = 1e-12);
        // Endpoints untouched
        assert_eq!(track.frequency_at(0), 100.0);
        assert_eq!(track.frequency_at(4), 200.0);
    }

    #[test]
    fn test_linear_interpolate_spans_unselected_interior() {
        // Only the endpoints selected; the whole span between them blends
        let mut track = sample_track();
        track.linear_interpolate(&[0, 4]);
        assert_relative_eq!(track.frequency_at(2), 120.0, epsilon = 1e-12);
        assert_relative_eq!(track.frequency_at(1), 110.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_interpolate_small_selection_is_noop() {
        let mut track = sample_track();
        track.linear_interpolate(&[2]);
        track.linear_interpolate(&[]);
        track.linear_interpolate(&[3, 99]);
        assert_eq!(track.frequency_at(2), 120.0);
        assert_eq!(track.frequency_at(3), 130.0);
    }
}
