//! Fixture geometry and the loader seam.
//!
//! The studio core never touches files. A host hands it a [`GeometryLoader`]
//! that resolves an asset reference (see [`asset_path`]) into the vertex
//! positions of the fixture model, which is all the placement solver and the
//! floor snap need.

use std::collections::HashMap;
use std::future::Future;

use glam::Vec3;
use softbox_ipc::RigKind;
use thiserror::Error;

use crate::geometry::Aabb;

/// Errors raised while resolving fixture geometry
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset {0} contains no vertices")]
    EmptyGeometry(String),

    #[error("Loader failed for {path}: {message}")]
    Loader { path: String, message: String },
}

/// Geometry asset reference of a fixture profile
pub fn asset_path(kind: RigKind) -> &'static str {
    match kind {
        RigKind::L1 => "./assets/Lights/SM5_Photography_Flash_Long_Rectangular_Softbox.glb",
        RigKind::L2 => "./assets/Lights/SM5_Photography_Flash_Rectangular_Softbox.glb",
        RigKind::L3 => "./assets/Lights/SM5_Photography_Flash_Square_Softbox.glb",
        RigKind::L5 => "./assets/Lights/SM5_Photography_Studio_Flash_-_Type_02.glb",
    }
}

/// Vertex positions of a loaded fixture model, in model space.
#[derive(Debug, Clone, PartialEq)]
pub struct RigGeometry {
    positions: Vec<Vec3>,
    bounds: Aabb,
}

impl RigGeometry {
    /// Wrap loaded positions. Fails on an empty vertex list.
    pub fn from_positions(path: &str, positions: Vec<Vec3>) -> Result<Self, AssetError> {
        let bounds = Aabb::from_points(positions.iter().copied())
            .ok_or_else(|| AssetError::EmptyGeometry(path.to_string()))?;
        Ok(Self { positions, bounds })
    }

    /// Box-shaped stand-in geometry
    pub fn cuboid(center: Vec3, size: Vec3) -> Self {
        let bounds = Aabb::new(center - size * 0.5, center + size * 0.5);
        Self {
            positions: bounds.corners().to_vec(),
            bounds,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Model-space bounds
    pub fn local_bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Resolves asset references into fixture geometry.
///
/// Loading is the only suspension point of rig creation. Every call must
/// produce an independent geometry value; the studio never shares one
/// between rigs.
pub trait GeometryLoader {
    fn load(&self, path: &str) -> impl Future<Output = Result<RigGeometry, AssetError>> + Send;
}

/// Loader serving geometry registered in memory.
///
/// Used by hosts that preload their assets and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    assets: HashMap<String, RigGeometry>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box fixtures for every rig kind, modelled with their origin above the
    /// lowest point. Each solved emitter anchor lies inside the editable
    /// anchor ranges.
    pub fn with_default_fixtures() -> Self {
        let mut loader = Self::new();
        for kind in RigKind::ALL {
            let (center, size) = match kind {
                RigKind::L1 => (Vec3::new(0.0, 0.55, 0.0), Vec3::new(0.3, 1.3, 0.2)),
                RigKind::L2 => (Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.35, 1.2, 0.25)),
                RigKind::L3 => (Vec3::new(0.0, 0.45, 0.0), Vec3::new(0.4, 1.1, 0.25)),
                RigKind::L5 => (Vec3::new(0.0, 0.6, 0.05), Vec3::new(0.4, 1.6, 0.4)),
            };
            loader.insert(asset_path(kind), RigGeometry::cuboid(center, size));
        }
        loader
    }

    pub fn insert(&mut self, path: impl Into<String>, geometry: RigGeometry) {
        self.assets.insert(path.into(), geometry);
    }

    pub fn remove(&mut self, path: &str) -> Option<RigGeometry> {
        self.assets.remove(path)
    }
}

impl GeometryLoader for MemoryLoader {
    fn load(&self, path: &str) -> impl Future<Output = Result<RigGeometry, AssetError>> + Send {
        let result = self
            .assets
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()));
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_geometry_rejected() {
        let err = RigGeometry::from_positions("empty.glb", Vec::new()).unwrap_err();
        assert_eq!(err, AssetError::EmptyGeometry("empty.glb".to_string()));
    }

    #[test]
    fn test_cuboid_bounds() {
        let geometry = RigGeometry::cuboid(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.6, 2.6, 0.4));
        let bounds = geometry.local_bounds();
        assert!((bounds.min.y + 0.3).abs() < 1e-6);
        assert!((bounds.max.y - 2.3).abs() < 1e-6);
        assert_eq!(geometry.positions().len(), 8);
    }

    #[test]
    fn test_asset_paths_are_distinct() {
        let mut paths: Vec<_> = RigKind::ALL.iter().map(|k| asset_path(*k)).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), RigKind::ALL.len());
    }

    #[tokio::test]
    async fn test_default_fixture_anchors_are_editable() {
        use glam::Mat4;
        use softbox_ipc::AnchorAxis;

        use crate::placement::solve_emitter;

        let loader = MemoryLoader::with_default_fixtures();
        for kind in RigKind::ALL {
            let geometry = loader.load(asset_path(kind)).await.unwrap();
            let anchor = solve_emitter(&geometry, kind, &Mat4::IDENTITY).anchor_local;

            for (axis, value) in [
                (AnchorAxis::X, anchor.x),
                (AnchorAxis::Y, anchor.y),
                (AnchorAxis::Z, anchor.z),
            ] {
                assert_eq!(axis.clamp(value), value, "{kind} anchor {axis:?} = {value}");
            }
        }
    }

    #[tokio::test]
    async fn test_memory_loader() {
        let loader = MemoryLoader::with_default_fixtures();
        for kind in RigKind::ALL {
            assert!(loader.load(asset_path(kind)).await.is_ok());
        }

        let missing = loader.load("./assets/Lights/nope.glb").await;
        assert!(matches!(missing, Err(AssetError::NotFound(_))));
    }
}
