use std::collections::HashMap;
use std::rc::Rc;
use glam::{Affine3A, Quat, Vec3};
use rapier3d::na;
use rapier3d::parry::query::Ray;
use rapier3d::prelude::{ColliderBuilder, ColliderHandle, ColliderSet, IslandManager, RigidBodySet, SharedShape};

use crate::api::types::NodeId;
use crate::components::model::Mesh;
use crate::extensions::transform::swap_yz;

// ---------------------------------------------------------------------------
// Conversion helpers (private), glam to nalgebra
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> na::Vector3<f32> {
    na::Vector3::new(v.x, v.y, v.z)
}

fn vec3_to_point(v: Vec3) -> na::Point3<f32> {
    na::Point3::new(v.x, v.y, v.z)
}

fn iso_from(rotation: Quat, translation: Vec3) -> na::Isometry3<f32> {
    na::Isometry3::from_parts(
        na::Translation3::new(translation.x, translation.y, translation.z),
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(
            rotation.w, rotation.x, rotation.y, rotation.z,
        )),
    )
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The three supported collider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Box,
    Sphere,
    Mesh,
}

/// Collider description, relative to the owning node, external convention.
/// The node's world scale is applied when the collider is synced.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Box { center: Vec3, size: Vec3 },
    Sphere { center: Vec3, radius: f32 },
    Mesh { center: Vec3, mesh: Rc<Mesh> },
}

impl ColliderShape {
    pub fn kind(&self) -> ColliderKind {
        match self {
            ColliderShape::Box { .. } => ColliderKind::Box,
            ColliderShape::Sphere { .. } => ColliderKind::Sphere,
            ColliderShape::Mesh { .. } => ColliderKind::Mesh,
        }
    }

    pub fn center(&self) -> Vec3 {
        match self {
            ColliderShape::Box { center, .. }
            | ColliderShape::Sphere { center, .. }
            | ColliderShape::Mesh { center, .. } => *center,
        }
    }

    /// Build the collision-library shape in the internal convention,
    /// scaled by the owner's internal world scale. The center offset is
    /// baked into mesh vertices and applied as a translation otherwise.
    fn build(&self, scale: Vec3) -> Option<SharedShape> {
        let scale = scale.abs();
        match self {
            ColliderShape::Box { size, .. } => {
                let half = (swap_yz(*size).abs() * 0.5 * scale).max(Vec3::splat(f32::EPSILON));
                Some(SharedShape::cuboid(half.x, half.y, half.z))
            }
            ColliderShape::Sphere { radius, .. } => {
                Some(SharedShape::ball((radius.abs() * scale.max_element()).max(f32::EPSILON)))
            }
            ColliderShape::Mesh { center, mesh } => {
                if mesh.triangles.is_empty() || mesh.vertices.is_empty() {
                    return None;
                }
                let count = mesh.vertices.len() as u32;
                if mesh.triangles.iter().flatten().any(|&i| i >= count) {
                    return None;
                }
                let vertices = mesh
                    .vertices
                    .iter()
                    .map(|v| vec3_to_point(swap_yz(*v + *center) * scale))
                    .collect();
                Some(SharedShape::trimesh(vertices, mesh.triangles.clone()))
            }
        }
    }

    /// Translation from the owner's origin, internal convention, scaled.
    fn offset(&self, scale: Vec3) -> Vec3 {
        match self {
            ColliderShape::Mesh { .. } => Vec3::ZERO,
            _ => swap_yz(self.center()) * scale,
        }
    }
}

/// A collider bound to a node. Exclusively owned: dropping the binding
/// without `CollisionWorld::remove` leaks the collision-world entry.
#[derive(Debug, Clone)]
pub struct Collider {
    pub(crate) handle: ColliderHandle,
    shape: ColliderShape,
}

impl Collider {
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    pub fn kind(&self) -> ColliderKind {
        self.shape.kind()
    }

    pub fn handle(&self) -> ColliderHandle {
        self.handle
    }
}

/// One ray intersection, before resolution to a node.
#[derive(Debug, Clone, Copy)]
pub struct RayCandidate {
    /// Node id stored on the collider when it was inserted.
    pub owner: NodeId,
    pub handle: ColliderHandle,
    /// Distance along the (normalized) ray.
    pub distance: f32,
    /// World-space surface point, internal convention.
    pub point: Vec3,
}

// ---------------------------------------------------------------------------
// CollisionWorld
// ---------------------------------------------------------------------------

/// Wraps the collider storage of the collision library.
/// Colliders here have no rigid bodies; their poses are written by `sync`.
pub struct CollisionWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    islands: IslandManager,
    /// World scale each collider's shape was last built at.
    built_scale: HashMap<ColliderHandle, Vec3>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            islands: IslandManager::new(),
            built_scale: HashMap::new(),
        }
    }

    /// Insert a collider owned by `owner`. Returns `None` for a shape the
    /// collision library cannot build (e.g. a mesh without triangles).
    /// The owner id is stored in the collider's `user_data` for hit lookups.
    pub fn insert(&mut self, owner: NodeId, shape: ColliderShape) -> Option<Collider> {
        let shared = shape.build(Vec3::ONE)?;
        let collider = ColliderBuilder::new(shared)
            .position(iso_from(Quat::IDENTITY, shape.offset(Vec3::ONE)))
            .user_data(owner.0 as u128)
            .build();
        let handle = self.colliders.insert(collider);
        self.built_scale.insert(handle, Vec3::ONE);
        Some(Collider { handle, shape })
    }

    /// Destroy a collider. Returns `false` if it was already gone.
    pub fn remove(&mut self, collider: &Collider) -> bool {
        self.built_scale.remove(&collider.handle);
        self.colliders
            .remove(collider.handle, &mut self.islands, &mut self.bodies, false)
            .is_some()
    }

    /// Include or exclude a collider from ray traversal without destroying it.
    pub fn set_enabled(&mut self, collider: &Collider, enabled: bool) {
        if let Some(co) = self.colliders.get_mut(collider.handle) {
            co.set_enabled(enabled);
        }
    }

    pub fn is_enabled(&self, collider: &Collider) -> bool {
        self.colliders
            .get(collider.handle)
            .is_some_and(|co| co.is_enabled())
    }

    /// Place a collider at its owner's world transform (internal convention).
    pub fn sync(&mut self, collider: &Collider, world: &Affine3A) {
        let Some(co) = self.colliders.get_mut(collider.handle) else { return };
        let (scale, rotation, translation) = world.to_scale_rotation_translation();
        if self.built_scale.get(&collider.handle) != Some(&scale) {
            if let Some(shape) = collider.shape.build(scale) {
                co.set_shape(shape);
            }
            self.built_scale.insert(collider.handle, scale);
        }
        let offset = rotation * collider.shape.offset(scale);
        co.set_position(iso_from(rotation, translation + offset));
    }

    /// Cast an infinite ray (internal convention) against every enabled
    /// collider accepted by `filter`. Candidates come back nearest first.
    pub fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        filter: impl Fn(NodeId) -> bool,
    ) -> Vec<RayCandidate> {
        let Some(direction) = direction.try_normalize() else {
            return Vec::new();
        };
        let ray = Ray::new(vec3_to_point(origin), vec3_to_na(direction));
        let mut hits: Vec<RayCandidate> = self
            .colliders
            .iter()
            .filter(|(_, co)| co.is_enabled())
            .filter_map(|(handle, co)| {
                let owner = NodeId(co.user_data as u32);
                if !filter(owner) {
                    return None;
                }
                let toi = co.shape().cast_ray(co.position(), &ray, f32::MAX, true)?;
                Some(RayCandidate {
                    owner,
                    handle,
                    distance: toi,
                    point: origin + direction * toi,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Number of live colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.len() == 0
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
