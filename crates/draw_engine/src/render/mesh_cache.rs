//! Memoized unit-space tessellations
//!
//! Curved primitives are expensive to tessellate, so unit meshes are
//! built once per distinct detail parameter set and reused by every
//! instance for the rest of the process lifetime. Entries are never
//! invalidated.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::render::tessellation::{unit_cylinder, unit_sphere, UnitMesh};

/// Cache key: primitive kind plus its detail parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    /// Lat/lon sphere tessellation
    Sphere {
        /// Latitude bands
        lat: u32,
        /// Longitude slices
        lon: u32,
    },

    /// Radial/height cylinder tessellation
    Cylinder {
        /// Radial slices
        radial: u32,
        /// Height bands
        height: u32,
    },
}

/// Read-mostly cache of unit tessellations
///
/// Two frames racing to build the same key is safe: building is a pure
/// function of the key, so whichever insert lands the entry serves
/// identical content. Lookups share the built mesh through `Arc`, so
/// identical parameters always hand back the same vertex data without
/// copying.
#[derive(Default)]
pub struct MeshCache {
    entries: RwLock<HashMap<MeshKey, Arc<UnitMesh>>>,
}

impl MeshCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (building on first request) a unit sphere tessellation
    pub fn unit_sphere(&self, lat: u32, lon: u32) -> Arc<UnitMesh> {
        self.fetch(MeshKey::Sphere { lat, lon })
    }

    /// Fetch (building on first request) a unit cylinder tessellation
    pub fn unit_cylinder(&self, radial: u32, height: u32) -> Arc<UnitMesh> {
        self.fetch(MeshKey::Cylinder { radial, height })
    }

    fn fetch(&self, key: MeshKey) -> Arc<UnitMesh> {
        if let Some(mesh) = self.entries.read().get(&key) {
            return Arc::clone(mesh);
        }

        // Built outside the write lock; a concurrent builder of the same
        // key produces identical content, so either insert may win.
        let built = Arc::new(match key {
            MeshKey::Sphere { lat, lon } => unit_sphere(lat, lon),
            MeshKey::Cylinder { radial, height } => unit_cylinder(radial, height),
        });
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key).or_insert(built))
    }

    /// Number of distinct tessellations built so far
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_keys_share_one_mesh() {
        let cache = MeshCache::new();
        let first = cache.unit_sphere(16, 20);
        let second = cache.unit_sphere(16, 20);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn test_different_keys_scale_vertex_counts() {
        let cache = MeshCache::new();
        let coarse = cache.unit_sphere(4, 5);
        let fine = cache.unit_sphere(8, 10);
        assert_eq!(coarse.vertices.len(), 4 * 5 * 6);
        assert_eq!(fine.vertices.len(), 8 * 10 * 6);
        assert_eq!(cache.entry_count(), 2);
    }

    #[test]
    fn test_sphere_and_cylinder_keys_are_distinct() {
        let cache = MeshCache::new();
        cache.unit_sphere(8, 8);
        cache.unit_cylinder(8, 8);
        assert_eq!(cache.entry_count(), 2);
    }

    #[test]
    fn test_concurrent_fetches_agree() {
        let cache = std::sync::Arc::new(MeshCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = std::sync::Arc::clone(&cache);
                std::thread::spawn(move || cache.unit_cylinder(12, 2))
            })
            .collect();
        let meshes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for mesh in &meshes {
            assert_eq!(mesh.vertices, meshes[0].vertices);
        }
        assert_eq!(cache.entry_count(), 1);
    }
}
