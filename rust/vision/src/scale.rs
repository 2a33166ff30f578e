// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pixel-to-meter scale estimation

use crate::config::ScaleConfig;
use crate::types::{ScaleFactor, WallSegment};

/// Estimate meters per pixel
///
/// Priority: an explicit positive scale wins; otherwise the assumed wall
/// length is divided by the mean wall length in pixels, and multiplied by the
/// correction factor when the real floor area is known. With no walls the
/// default scale is returned. The result is always clamped.
pub fn estimate_scale(
    walls: &[WallSegment],
    known_area: Option<f64>,
    explicit: Option<f64>,
    config: &ScaleConfig,
) -> ScaleFactor {
    if let Some(scale) = explicit.filter(|s| *s > 0.0) {
        tracing::debug!(scale, "Using explicit scale");
        return ScaleFactor::clamped(scale);
    }

    if walls.is_empty() {
        return ScaleFactor::DEFAULT;
    }

    let mean_length = walls.iter().map(WallSegment::length).sum::<f64>() / walls.len() as f64;
    if mean_length <= 0.0 {
        return ScaleFactor::DEFAULT;
    }

    let mut scale = config.assumed_wall_length_m / mean_length;
    if known_area.is_some() {
        scale *= config.known_area_correction;
    }

    let factor = ScaleFactor::clamped(scale);
    tracing::debug!(
        mean_length,
        raw = scale,
        clamped = factor.value(),
        "Estimated scale"
    );
    factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineSegment;
    use approx::assert_relative_eq;

    fn walls_of_length(lengths: &[u32]) -> Vec<WallSegment> {
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| LineSegment::horizontal(i as u32 * 10, 0, len))
            .map(|line| WallSegment::from_line(&line, 0.12))
            .collect()
    }

    #[test]
    fn test_mean_length_rule() {
        let walls = walls_of_length(&[100, 300]);
        let scale = estimate_scale(&walls, None, None, &ScaleConfig::default());
        assert_relative_eq!(scale.value(), 4.0 / 200.0);
    }

    #[test]
    fn test_known_area_correction() {
        let walls = walls_of_length(&[200]);
        let scale = estimate_scale(&walls, Some(54.3), None, &ScaleConfig::default());
        assert_relative_eq!(scale.value(), 0.02 * 0.8);
    }

    #[test]
    fn test_explicit_scale_wins() {
        let walls = walls_of_length(&[200]);
        let scale = estimate_scale(&walls, Some(10.0), Some(0.03), &ScaleConfig::default());
        assert_relative_eq!(scale.value(), 0.03);

        // Non-positive explicit values are ignored
        let scale = estimate_scale(&walls, None, Some(0.0), &ScaleConfig::default());
        assert_relative_eq!(scale.value(), 0.02);
    }

    #[test]
    fn test_no_walls_uses_default() {
        let scale = estimate_scale(&[], None, None, &ScaleConfig::default());
        assert_eq!(scale, ScaleFactor::DEFAULT);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let mut previous = f64::INFINITY;
        for len in [10u32, 50, 80, 100, 200, 400, 800, 1000, 5000] {
            let walls = walls_of_length(&[len]);
            let scale = estimate_scale(&walls, None, None, &ScaleConfig::default()).value();
            assert!(scale <= previous, "scale must not grow with wall length");
            assert!((ScaleFactor::MIN..=ScaleFactor::MAX).contains(&scale));
            previous = scale;
        }
    }

    #[test]
    fn test_explicit_scale_clamped() {
        let scale = estimate_scale(&[], None, Some(0.5), &ScaleConfig::default());
        assert_eq!(scale.value(), ScaleFactor::MAX);
    }
}
