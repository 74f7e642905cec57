//! Mathematical helpers for pose grids and footprint geometry.

/// Computes sine and cosine for an angle in degrees.
pub(crate) fn sin_cos_deg(angle_deg: f32) -> (f32, f32) {
    angle_deg.to_radians().sin_cos()
}

/// Returns `count` evenly spaced samples over `[start, stop]`, endpoints included.
///
/// A single sample yields `start`; zero samples yield an empty vector.
pub fn linspace(start: f32, stop: f32, count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (f64::from(stop) - f64::from(start)) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        stop
                    } else {
                        (f64::from(start) + step * i as f64) as f32
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{linspace, sin_cos_deg};

    #[test]
    fn linspace_includes_both_endpoints() {
        let values = linspace(0.8, 1.2, 5);
        assert_eq!(values.len(), 5);
        assert!((values[0] - 0.8).abs() < 1e-6);
        assert!((values[2] - 1.0).abs() < 1e-6);
        assert!((values[4] - 1.2).abs() < 1e-6);
    }

    #[test]
    fn linspace_handles_degenerate_counts() {
        assert!(linspace(-90.0, 90.0, 0).is_empty());
        assert_eq!(linspace(-90.0, 90.0, 1), vec![-90.0]);
    }

    #[test]
    fn linspace_default_rotations_span_half_turn() {
        let values = linspace(-90.0, 90.0, 16);
        assert_eq!(values.len(), 16);
        assert!((values[1] - (-78.0)).abs() < 1e-4);
        assert!((values[15] - 90.0).abs() < 1e-6);
    }

    #[test]
    fn sin_cos_deg_matches_quadrants() {
        let (sin, cos) = sin_cos_deg(90.0);
        assert!(sin > 0.999);
        assert!(cos.abs() < 1e-6);
    }
}
