//! Reusable wireframe shape library
//!
//! A wireframe is authored once as a named list of local-space line
//! segments, then stamped any number of times by draw calls that supply
//! the anchor, transform, color and thickness per instance. One
//! dodecahedron skeleton serves every target it is drawn on.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::command::SubmitError;
use crate::config::ConfigError;
use crate::foundation::math::Vec3;

slotmap::new_key_type! {
    /// Handle to a registered wireframe shape
    pub struct WireframeKey;
}

/// A named list of local-space line segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireframeShape {
    /// Author-facing name, used in logs and shape files
    pub name: String,

    /// Line segments in the shape's local space
    pub segments: Vec<[Vec3; 2]>,
}

impl WireframeShape {
    /// Create a shape from a name and segment list
    pub fn new(name: impl Into<String>, segments: Vec<[Vec3; 2]>) -> Self {
        Self {
            name: name.into(),
            segments,
        }
    }

    /// Axis-aligned unit box skeleton (12 edges), a common debug shape
    pub fn unit_box_edges(name: impl Into<String>) -> Self {
        let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        let corners = [
            c(-0.5, -0.5, -0.5),
            c(0.5, -0.5, -0.5),
            c(0.5, -0.5, 0.5),
            c(-0.5, -0.5, 0.5),
            c(-0.5, 0.5, -0.5),
            c(0.5, 0.5, -0.5),
            c(0.5, 0.5, 0.5),
            c(-0.5, 0.5, 0.5),
        ];
        let edges = [
            (0, 1), (1, 2), (2, 3), (3, 0), // bottom ring
            (4, 5), (5, 6), (6, 7), (7, 4), // top ring
            (0, 4), (1, 5), (2, 6), (3, 7), // verticals
        ];
        Self::new(
            name,
            edges
                .iter()
                .map(|&(a, b)| [corners[a], corners[b]])
                .collect(),
        )
    }
}

/// Registry of authored wireframe shapes
///
/// Shapes are registered up front (code or RON files) and referenced by
/// key from wireframe commands. A stale key at render time is a soft
/// skip, mirroring how missing anchors behave.
#[derive(Default)]
pub struct WireframeLibrary {
    shapes: SlotMap<WireframeKey, WireframeShape>,
}

impl WireframeLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape, rejecting empty segment lists
    pub fn register(&mut self, shape: WireframeShape) -> Result<WireframeKey, SubmitError> {
        if shape.segments.is_empty() {
            return Err(SubmitError::EmptyWireframe { name: shape.name });
        }
        log::debug!(
            "registered wireframe '{}' with {} segments",
            shape.name,
            shape.segments.len()
        );
        Ok(self.shapes.insert(shape))
    }

    /// Load every shape from a RON file holding a `Vec<WireframeShape>`
    pub fn load_ron_file(&mut self, path: &str) -> Result<Vec<WireframeKey>, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let shapes: Vec<WireframeShape> =
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        shapes
            .into_iter()
            .map(|shape| {
                self.register(shape)
                    .map_err(|e| ConfigError::Parse(e.to_string()))
            })
            .collect()
    }

    /// Look up a registered shape
    pub fn get(&self, key: WireframeKey) -> Option<&WireframeShape> {
        self.shapes.get(key)
    }

    /// Remove a shape; outstanding commands referencing it skip silently
    pub fn remove(&mut self, key: WireframeKey) -> Option<WireframeShape> {
        self.shapes.remove(key)
    }

    /// Number of registered shapes
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// True when no shapes are registered
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut library = WireframeLibrary::new();
        let key = library
            .register(WireframeShape::unit_box_edges("box"))
            .unwrap();
        let shape = library.get(key).unwrap();
        assert_eq!(shape.name, "box");
        assert_eq!(shape.segments.len(), 12);
    }

    #[test]
    fn test_empty_shape_rejected() {
        let mut library = WireframeLibrary::new();
        let result = library.register(WireframeShape::new("nothing", Vec::new()));
        assert!(matches!(result, Err(SubmitError::EmptyWireframe { .. })));
    }

    #[test]
    fn test_removed_shape_resolves_to_none() {
        let mut library = WireframeLibrary::new();
        let key = library
            .register(WireframeShape::unit_box_edges("box"))
            .unwrap();
        library.remove(key);
        assert!(library.get(key).is_none());
    }

    #[test]
    fn test_ron_round_trip() {
        let shapes = vec![WireframeShape::unit_box_edges("box")];
        let text = ron::ser::to_string(&shapes).expect("serialize");
        let parsed: Vec<WireframeShape> = ron::from_str(&text).expect("parse");
        assert_eq!(parsed[0].segments.len(), 12);
    }
}
