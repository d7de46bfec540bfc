//! Unit-space tessellation of curved primitives
//!
//! Builders produce flat triangle lists in unit space so that per-instance
//! rendering only has to scale and translate. The subdivision strategies
//! (lat/lon quad strip for the sphere, side quads plus cap fans for the
//! cylinder) are fixed; changing them changes every curved effect's vertex
//! counts and appearance.

use crate::foundation::math::Vec3;

/// A unit-space tessellation as a flat triangle list
///
/// Sphere vertices lie on the unit sphere. Cylinder vertices carry the
/// unit circle in X/Z and a normalized height fraction in `0.0..=1.0` in
/// Y, so the caller applies the actual radius and height at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitMesh {
    /// Vertices, three per triangle
    pub vertices: Vec<Vec3>,
}

impl UnitMesh {
    /// Number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

fn sphere_point(theta: f32, phi: f32) -> Vec3 {
    let sin_theta = theta.sin();
    Vec3::new(sin_theta * phi.cos(), theta.cos(), sin_theta * phi.sin())
}

/// Tessellate a unit-radius sphere
///
/// Latitude bands from pole to pole, longitude slices around the up
/// axis; each lat/lon quad becomes two triangles, so the vertex count is
/// exactly `lat_segments * lon_segments * 6`. The quads touching the
/// poles degenerate on one edge, which keeps the count formula uniform.
pub fn unit_sphere(lat_segments: u32, lon_segments: u32) -> UnitMesh {
    let mut vertices = Vec::with_capacity(lat_segments as usize * lon_segments as usize * 6);
    let pi = std::f32::consts::PI;
    let tau = std::f32::consts::TAU;

    for lat in 0..lat_segments {
        let theta0 = pi * lat as f32 / lat_segments as f32;
        let theta1 = pi * (lat + 1) as f32 / lat_segments as f32;
        for lon in 0..lon_segments {
            let phi0 = tau * lon as f32 / lon_segments as f32;
            let phi1 = tau * (lon + 1) as f32 / lon_segments as f32;

            let a = sphere_point(theta0, phi0);
            let b = sphere_point(theta1, phi0);
            let c = sphere_point(theta1, phi1);
            let d = sphere_point(theta0, phi1);

            vertices.extend_from_slice(&[a, b, c]);
            vertices.extend_from_slice(&[a, c, d]);
        }
    }

    UnitMesh { vertices }
}

fn cylinder_point(angle: f32, height_fraction: f32) -> Vec3 {
    Vec3::new(angle.cos(), height_fraction, angle.sin())
}

/// Tessellate a unit cylinder along the +Y axis
///
/// Side quads by `(radial, height)` subdivision plus one triangle-fan
/// cap at each end; vertex count is exactly
/// `radial_segments * height_segments * 6 + 2 * radial_segments * 3`.
pub fn unit_cylinder(radial_segments: u32, height_segments: u32) -> UnitMesh {
    let side = radial_segments as usize * height_segments as usize * 6;
    let caps = 2 * radial_segments as usize * 3;
    let mut vertices = Vec::with_capacity(side + caps);
    let tau = std::f32::consts::TAU;

    for band in 0..height_segments {
        let y0 = band as f32 / height_segments as f32;
        let y1 = (band + 1) as f32 / height_segments as f32;
        for slice in 0..radial_segments {
            let a0 = tau * slice as f32 / radial_segments as f32;
            let a1 = tau * (slice + 1) as f32 / radial_segments as f32;

            let a = cylinder_point(a0, y0);
            let b = cylinder_point(a1, y0);
            let c = cylinder_point(a1, y1);
            let d = cylinder_point(a0, y1);

            vertices.extend_from_slice(&[a, b, c]);
            vertices.extend_from_slice(&[a, c, d]);
        }
    }

    let bottom_center = Vec3::new(0.0, 0.0, 0.0);
    let top_center = Vec3::new(0.0, 1.0, 0.0);
    for slice in 0..radial_segments {
        let a0 = tau * slice as f32 / radial_segments as f32;
        let a1 = tau * (slice + 1) as f32 / radial_segments as f32;

        // Bottom cap winds opposite the top so both face outward.
        vertices.extend_from_slice(&[
            bottom_center,
            cylinder_point(a1, 0.0),
            cylinder_point(a0, 0.0),
        ]);
        vertices.extend_from_slice(&[
            top_center,
            cylinder_point(a0, 1.0),
            cylinder_point(a1, 1.0),
        ]);
    }

    UnitMesh { vertices }
}
