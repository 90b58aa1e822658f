// systems/raycast.rs
//
// Ray queries against node colliders.
// A dedicated eternal node carries the ray: it is placed at the origin and
// turned to face along the direction, and its forward axis is what gets cast.
//
// Usage:
//   let mut raycaster = Raycaster::new(&mut scene);
//   let hit = raycaster.raycast(&mut scene, &RayQuery::new(origin, dir).with_max_distance(10.0));
//   if let Some(node) = hit.node { ... }

use glam::Vec3;
use crate::api::types::NodeId;
use crate::core::collision::RayCandidate;
use crate::core::scene::Scene;
use crate::extensions::transform::{swap_yz, LookAxis};

const RAY_NODE_NAME: &str = "raycaster";

/// Parameters of one ray query, external convention.
#[derive(Debug, Clone)]
pub struct RayQuery {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
    /// Only colliders under this node are tested.
    pub traverse_target: NodeId,
    /// Nodes whose colliders (and their descendants' colliders) are skipped.
    pub ignore: Vec<NodeId>,
    /// Leave the ray node visible after the query.
    pub debug: bool,
}

impl RayQuery {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            max_distance: 1000.0,
            traverse_target: NodeId::ROOT,
            ignore: Vec::new(),
            debug: false,
        }
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_traverse_target(mut self, target: NodeId) -> Self {
        self.traverse_target = target;
        self
    }

    pub fn with_ignore(mut self, ignore: impl IntoIterator<Item = NodeId>) -> Self {
        self.ignore.extend(ignore);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Result of one ray query. `node` may be empty even when `hit` is set,
/// if the intersected collider no longer maps to a live node.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub hit: bool,
    pub node: Option<NodeId>,
    /// World-space surface point, external convention.
    pub point: Option<Vec3>,
    /// Distance from the ray origin to `point`; infinite on a miss.
    pub distance: f32,
    /// Owners of every intersected collider, nearest first.
    pub nodes: Vec<NodeId>,
}

impl Hit {
    pub fn miss() -> Self {
        Self {
            hit: false,
            node: None,
            point: None,
            distance: f32::INFINITY,
            nodes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayPhase {
    Idle,
    Aimed,
    Traversed,
    Resolved,
}

/// Synchronous ray query service.
#[derive(Debug)]
pub struct Raycaster {
    node: NodeId,
    phase: RayPhase,
}

impl Raycaster {
    /// Spawn the eternal ray node in `scene`.
    pub fn new(scene: &mut Scene) -> Self {
        Self {
            node: spawn_ray_node(scene),
            phase: RayPhase::Idle,
        }
    }

    /// The node carrying the ray.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn phase(&self) -> RayPhase {
        self.phase
    }

    /// Cast a ray and report the nearest hit within `max_distance`.
    ///
    /// Only the nearest candidate is considered: when it lies beyond
    /// `max_distance` the query misses even if a farther candidate exists.
    pub fn raycast(&mut self, scene: &mut Scene, query: &RayQuery) -> Hit {
        self.phase = RayPhase::Idle;
        if !scene.contains(self.node) {
            log::debug!("ray node destroyed, respawning");
            self.node = spawn_ray_node(scene);
        }
        let Some(direction) = self.aim(scene, query) else {
            self.phase = RayPhase::Resolved;
            return Hit::miss();
        };

        let candidates = self.traverse(scene, query, direction);
        let hit = self.resolve(scene, query, &candidates);
        self.phase = RayPhase::Resolved;
        hit
    }

    /// Place the ray node at the origin facing along the direction.
    /// Returns the world forward of the ray node, or `None` for a zero direction.
    fn aim(&mut self, scene: &mut Scene, query: &RayQuery) -> Option<Vec3> {
        query.direction.try_normalize()?;
        let node = scene.node_mut(self.node)?;
        node.set_position(query.origin);
        node.set_rotation(Vec3::ZERO);
        if let Err(e) = scene.look_at(self.node, query.origin + query.direction, LookAxis::Forward) {
            log::warn!("could not aim ray: {}", e);
            return None;
        }
        self.phase = RayPhase::Aimed;
        scene.forward(self.node)
    }

    fn traverse(&mut self, scene: &mut Scene, query: &RayQuery, direction: Vec3) -> Vec<RayCandidate> {
        if let Some(node) = scene.node_mut(self.node) {
            node.visible = query.debug;
        }
        scene.sync_colliders();

        let ray_node = self.node;
        let scene_ref: &Scene = scene;
        let accept = |owner: NodeId| {
            owner != ray_node
                && scene_ref.is_in_traversal(owner)
                && (owner == query.traverse_target || scene_ref.has_ancestor(owner, query.traverse_target))
                && !query
                    .ignore
                    .iter()
                    .any(|ignored| owner == *ignored || scene_ref.has_ancestor(owner, *ignored))
        };
        let candidates = scene_ref
            .collision()
            .cast_ray(swap_yz(query.origin), swap_yz(direction), accept);
        self.phase = RayPhase::Traversed;
        candidates
    }

    fn resolve(&self, scene: &Scene, query: &RayQuery, candidates: &[RayCandidate]) -> Hit {
        let Some(nearest) = candidates.first() else {
            return Hit::miss();
        };
        let point = swap_yz(nearest.point);
        let distance = point.distance(query.origin);
        if distance > query.max_distance {
            log::trace!("nearest hit at {} beyond max distance {}", distance, query.max_distance);
            return Hit::miss();
        }

        let owner = asset_root(scene, nearest.owner);
        Hit {
            hit: true,
            node: scene.iter().find(|n| n.id == owner).map(|n| n.id),
            point: Some(point),
            distance,
            nodes: candidates.iter().map(|c| asset_root(scene, c.owner)).collect(),
        }
    }
}

fn spawn_ray_node(scene: &mut Scene) -> NodeId {
    let id = scene.spawn(RAY_NODE_NAME);
    if let Some(node) = scene.node_mut(id) {
        node.eternal = true;
        node.visible = false;
    }
    id
}

/// The highest ancestor named like an asset file, or the node itself.
fn asset_root(scene: &Scene, id: NodeId) -> NodeId {
    let mut root = id;
    let mut current = Some(id);
    for _ in 0..=scene.len() {
        let Some(node) = current.and_then(|c| scene.node(c)) else { break };
        if scene.config().is_asset_boundary(&node.name) {
            root = node.id;
        }
        current = node.parent();
    }
    root
}
