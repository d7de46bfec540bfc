//! Level-of-detail and screen-space unit conversion
//!
//! Both conversions here are pure functions of the frame's camera state
//! and are re-evaluated every frame per command: projected size and
//! pixel-specified thickness are view-dependent and must never be
//! cached across frames.

use crate::config::LodConfig;

fn tan_half_fov(vertical_fov_degrees: f32) -> f32 {
    (vertical_fov_degrees * 0.5).to_radians().tan()
}

/// Radius in screen pixels that a world-space radius projects to
///
/// `world_radius * viewport_height / (2 * distance * tan(fov / 2))`.
/// A camera sitting on the primitive projects to an unbounded radius,
/// which selects full detail.
pub fn projected_pixel_radius(
    world_radius: f32,
    camera_distance: f32,
    vertical_fov_degrees: f32,
    viewport_height_px: f32,
) -> f32 {
    if camera_distance <= f32::EPSILON {
        return f32::INFINITY;
    }
    world_radius * viewport_height_px / (2.0 * camera_distance * tan_half_fov(vertical_fov_degrees))
}

/// World-unit width of a stroke specified in screen pixels
///
/// The inverse of [`projected_pixel_radius`]: the farther the geometry,
/// the wider the world-space ribbon needed to cover the same pixels.
pub fn pixels_to_world_thickness(
    pixels: f32,
    camera_distance: f32,
    vertical_fov_degrees: f32,
    viewport_height_px: f32,
) -> f32 {
    if viewport_height_px <= 0.0 {
        return 0.0;
    }
    pixels * 2.0 * camera_distance * tan_half_fov(vertical_fov_degrees) / viewport_height_px
}

/// Discrete detail tier for curved primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Requested segment counts divided by the low divisor
    Low,

    /// Requested segment counts divided by the medium divisor
    Medium,

    /// Full requested segment counts
    Full,
}

impl DetailLevel {
    /// Pick the tier for a projected on-screen radius
    pub fn for_pixel_radius(pixel_radius: f32, config: &LodConfig) -> Self {
        if pixel_radius < config.low_pixel_radius {
            DetailLevel::Low
        } else if pixel_radius < config.medium_pixel_radius {
            DetailLevel::Medium
        } else {
            DetailLevel::Full
        }
    }

    /// Divisor applied to requested segment counts at this tier
    pub fn divisor(self, config: &LodConfig) -> u32 {
        match self {
            DetailLevel::Low => config.low_divisor.max(1),
            DetailLevel::Medium => config.medium_divisor.max(1),
            DetailLevel::Full => 1,
        }
    }

    /// Downgrade a requested segment count, clamped to its minimum
    pub fn scale_segments(self, requested: u32, minimum: u32, config: &LodConfig) -> u32 {
        (requested / self.divisor(config)).max(minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projected_radius_formula() {
        // radius 1 at distance 257, 70 degree FOV, 1080 px viewport
        // projects to just over 3 px.
        let px = projected_pixel_radius(1.0, 257.0, 70.0, 1080.0);
        assert_relative_eq!(px, 3.0, epsilon = 0.05);
    }

    #[test]
    fn test_projected_radius_decreases_with_distance() {
        let mut previous = f32::INFINITY;
        for distance in [1.0, 5.0, 25.0, 125.0, 625.0] {
            let px = projected_pixel_radius(2.0, distance, 70.0, 1080.0);
            assert!(px < previous, "distance {distance} gave {px}");
            previous = px;
        }
    }

    #[test]
    fn test_detail_tier_break_points() {
        let config = LodConfig::default();
        assert_eq!(
            DetailLevel::for_pixel_radius(3.0, &config),
            DetailLevel::Low
        );
        assert_eq!(
            DetailLevel::for_pixel_radius(8.0, &config),
            DetailLevel::Medium
        );
        assert_eq!(
            DetailLevel::for_pixel_radius(20.0, &config),
            DetailLevel::Full
        );
    }

    #[test]
    fn test_detail_is_non_increasing_in_distance() {
        let config = LodConfig::default();
        let tier_rank = |d: f32| {
            match DetailLevel::for_pixel_radius(
                projected_pixel_radius(1.0, d, 70.0, 1080.0),
                &config,
            ) {
                DetailLevel::Full => 2,
                DetailLevel::Medium => 1,
                DetailLevel::Low => 0,
            }
        };
        let mut previous = 2;
        for distance in [10.0, 50.0, 100.0, 300.0, 1000.0] {
            let rank = tier_rank(distance);
            assert!(rank <= previous);
            previous = rank;
        }
    }

    #[test]
    fn test_segment_scaling_with_clamp() {
        let config = LodConfig::default();
        assert_eq!(DetailLevel::Low.scale_segments(16, 2, &config), 4);
        assert_eq!(DetailLevel::Low.scale_segments(20, 3, &config), 5);
        assert_eq!(DetailLevel::Low.scale_segments(4, 2, &config), 2);
        assert_eq!(DetailLevel::Medium.scale_segments(16, 2, &config), 8);
        assert_eq!(DetailLevel::Full.scale_segments(16, 2, &config), 16);
    }

    #[test]
    fn test_pixel_thickness_scales_with_distance() {
        let near = pixels_to_world_thickness(2.0, 10.0, 70.0, 1080.0);
        let far = pixels_to_world_thickness(2.0, 20.0, 70.0, 1080.0);
        assert_relative_eq!(far, near * 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_projection_and_thickness_are_inverse() {
        // Converting N pixels to world units and projecting back yields N.
        let world = pixels_to_world_thickness(5.0, 42.0, 60.0, 720.0);
        let px = projected_pixel_radius(world, 42.0, 60.0, 720.0);
        assert_relative_eq!(px, 5.0, epsilon = 1e-4);
    }
}
