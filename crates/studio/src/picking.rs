//! Overhead-view picking.
//!
//! Pointer positions are unprojected through the overhead camera into a ray.
//! The ray is tested against a flat table of pick nodes filtered by render
//! layer; the rig a hit belongs to is found by walking up the node's parent
//! chain to the first tagged node.

use glam::{Mat4, Vec2, Vec3};
use softbox_config::OverheadCameraConfig;
use softbox_ipc::RigId;

use crate::geometry::Aabb;
use crate::rig::LightRig;

/// Epsilon for floating point comparisons
const EPSILON: f32 = 1e-6;

/// Selection ring drawn under every fixture, in holder units
pub const SELECTION_RING_INNER: f32 = 0.16;
pub const SELECTION_RING_OUTER: f32 = 0.22;
pub const SELECTION_RING_HEIGHT: f32 = 0.006;

/// A half-line with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Intersection with a plane through `point` with `normal`. `None` when
    /// parallel or behind the origin.
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Hit point on the horizontal plane at height `y`
    pub fn intersect_plane_y(&self, y: f32) -> Option<Vec3> {
        self.intersect_plane(Vec3::new(0.0, y, 0.0), Vec3::Y)
            .map(|t| self.at(t))
    }
}

/// Pixel rectangle of the overhead canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Normalized device coordinates (y up) of a pointer position
    pub fn ndc_from_pointer(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (x - self.left) / self.width * 2.0 - 1.0,
            -((y - self.top) / self.height * 2.0 - 1.0),
        ))
    }
}

/// Perspective camera looking down on the studio
#[derive(Debug, Clone, PartialEq)]
pub struct OverheadCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl OverheadCamera {
    pub fn from_config(config: &OverheadCameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            fov_y: config.fov_y_deg.to_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World-space ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        // Depth range is [0, 1]
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    /// Normalized device coordinates of a world point
    pub fn project(&self, point: Vec3) -> Vec3 {
        let clip = self.view_projection() * point.extend(1.0);
        clip.truncate() / clip.w
    }
}

/// Render layer a pick node lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Subject, backdrop and other scene geometry
    World,
    /// Fixture icons of the overhead view
    Icons,
}

/// Hit-testable shape of a pick node, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickShape {
    Box(Aabb),
    /// Flat annulus
    Disc {
        center: Vec3,
        normal: Vec3,
        inner: f32,
        outer: f32,
    },
}

impl PickShape {
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match *self {
            PickShape::Box(bounds) => bounds.ray_intersection(ray.origin, ray.direction),
            PickShape::Disc {
                center,
                normal,
                inner,
                outer,
            } => {
                let t = ray.intersect_plane(center, normal)?;
                let radius = ray.at(t).distance(center);
                (radius >= inner && radius <= outer).then_some(t)
            }
        }
    }
}

/// Index of a node in a [`PickScene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct PickNode {
    pub parent: Option<NodeId>,
    /// Rig owning this node and its untagged descendants
    pub tag: Option<RigId>,
    pub layer: Layer,
    /// Grouping nodes have no shape of their own
    pub shape: Option<PickShape>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub distance: f32,
}

/// Flat table of hit-testable nodes
#[derive(Debug, Clone, Default)]
pub struct PickScene {
    nodes: Vec<PickNode>,
}

impl PickScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Icon nodes of every rig: a tagged holder with the model box and the
    /// selection ring as untagged children.
    pub fn from_rigs<'a>(rigs: impl IntoIterator<Item = &'a LightRig>) -> Self {
        let mut scene = Self::new();
        for rig in rigs {
            scene.add_rig(rig);
        }
        scene
    }

    pub fn add_rig(&mut self, rig: &LightRig) -> NodeId {
        let holder = self.add(PickNode {
            parent: None,
            tag: Some(rig.id().clone()),
            layer: Layer::Icons,
            shape: None,
        });

        self.add(PickNode {
            parent: Some(holder),
            tag: None,
            layer: Layer::Icons,
            shape: Some(PickShape::Box(rig.world_bounds())),
        });

        let world = rig.holder_world();
        let scale = world.x_axis.truncate().length();
        self.add(PickNode {
            parent: Some(holder),
            tag: None,
            layer: Layer::Icons,
            shape: Some(PickShape::Disc {
                center: world.transform_point3(Vec3::new(0.0, SELECTION_RING_HEIGHT, 0.0)),
                normal: Vec3::Y,
                inner: SELECTION_RING_INNER * scale,
                outer: SELECTION_RING_OUTER * scale,
            }),
        });

        holder
    }

    pub fn add(&mut self, node: PickNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&PickNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All hits on `layer`, nearest first
    pub fn raycast(&self, ray: &Ray, layer: Layer) -> Vec<PickHit> {
        let mut hits: Vec<PickHit> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.layer == layer)
            .filter_map(|(index, node)| {
                let distance = node.shape?.intersect(ray)?;
                Some(PickHit {
                    node: NodeId(index),
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// First tag found walking up from `id`
    pub fn tag_of(&self, id: NodeId) -> Option<&RigId> {
        let mut current = Some(id);
        // Bounded by the node count so a malformed parent cycle cannot spin
        for _ in 0..=self.nodes.len() {
            let node = self.node(current?)?;
            if let Some(tag) = &node.tag {
                return Some(tag);
            }
            current = node.parent;
        }
        None
    }

    /// Rig owning the nearest hit on `layer`
    pub fn pick(&self, ray: &Ray, layer: Layer) -> Option<RigId> {
        let first = self.raycast(ray, layer).into_iter().next()?;
        self.tag_of(first.node).cloned()
    }
}
