// extensions/transform.rs
//
// Transform mapper: converts between the external authoring convention
// (X right, Y up, Z forward) and the internal engine convention
// (X right, Y forward, Z up).
//
// Nodes store their pose in the internal convention. Every external getter
// is computed from that pose on demand; nothing derived is cached.
//
//   position  (x, y, z)    <->  (x, z, y)
//   rotation  (rx, ry, rz) <->  heading = -ry, pitch = -rx, roll = rz  (degrees)
//   scale     (sx, sy, sz) <->  (sx, sz, sy), zero axes floored to SCALE_EPSILON

use glam::{Affine3A, EulerRot, Quat, Vec3};
use crate::api::types::NodeId;
use crate::components::node::Node;
use crate::core::error::NodeError;
use crate::core::scene::Scene;

/// Floor for scale axes that resolve to exactly zero.
pub const SCALE_EPSILON: f32 = 0.001;

/// Swap the Y and Z axes. The mapping is its own inverse.
#[inline]
pub const fn swap_yz(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

/// External rotation (degrees) to internal heading/pitch/roll.
#[inline]
pub fn rotation_to_hpr(rotation: Vec3) -> Vec3 {
    Vec3::new(-rotation.y, -rotation.x, rotation.z)
}

/// Internal heading/pitch/roll to external rotation (degrees).
#[inline]
pub fn hpr_to_rotation(hpr: Vec3) -> Vec3 {
    Vec3::new(-hpr.y, -hpr.x, hpr.z)
}

/// Heading about Z, then pitch about X, then roll about Y.
pub fn hpr_to_quat(hpr: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::ZXY,
        hpr.x.to_radians(),
        hpr.y.to_radians(),
        hpr.z.to_radians(),
    )
}

pub fn quat_to_hpr(q: Quat) -> Vec3 {
    let (h, p, r) = q.to_euler(EulerRot::ZXY);
    Vec3::new(h.to_degrees(), p.to_degrees(), r.to_degrees())
}

/// Replace exactly-zero axes with `SCALE_EPSILON`.
pub fn clamp_scale(scale: Vec3) -> Vec3 {
    let floor = |v: f32| if v == 0.0 { SCALE_EPSILON } else { v };
    Vec3::new(floor(scale.x), floor(scale.y), floor(scale.z))
}

/// Compatibility shim for flattened component lists.
///
/// A length divisible by 3 is summed as 3-tuples. Otherwise an even length is
/// summed as 2-tuples and `depth` supplies the third axis. Any other length
/// cannot be mapped without dropping components and yields `None`.
pub fn expand_components(values: &[f32], depth: f32) -> Option<Vec3> {
    if values.is_empty() {
        return None;
    }
    if values.len() % 3 == 0 {
        Some(values.chunks_exact(3).fold(Vec3::ZERO, |acc, c| {
            acc + Vec3::new(c[0], c[1], c[2])
        }))
    } else if values.len() % 2 == 0 {
        let xy = values
            .chunks_exact(2)
            .fold(glam::Vec2::ZERO, |acc, c| acc + glam::Vec2::new(c[0], c[1]));
        Some(xy.extend(depth))
    } else {
        None
    }
}

/// Local pose of a node, internal convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: Vec3,
    /// Heading, pitch, roll in degrees.
    pub hpr: Vec3,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            hpr: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Pose {
    /// Local-to-parent transform.
    pub fn affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, hpr_to_quat(self.hpr), self.pos)
    }

    /// Decompose a local transform. Shear is discarded.
    pub fn from_affine(affine: &Affine3A) -> Self {
        let (scale, rotation, pos) = affine.to_scale_rotation_translation();
        Self {
            pos,
            hpr: quat_to_hpr(rotation),
            scale: clamp_scale(scale),
        }
    }
}

/// Which local axis `look_at` points at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookAxis {
    #[default]
    Forward,
    Back,
    Right,
    Left,
    Up,
    Down,
}

impl LookAxis {
    /// Rotation added after aiming forward, external convention.
    fn offset(self) -> Vec3 {
        match self {
            LookAxis::Forward => Vec3::ZERO,
            LookAxis::Back => Vec3::new(180.0, 0.0, 0.0),
            LookAxis::Right => Vec3::new(0.0, -90.0, 0.0),
            LookAxis::Left => Vec3::new(0.0, 90.0, 0.0),
            LookAxis::Up => Vec3::new(90.0, 0.0, 0.0),
            LookAxis::Down => Vec3::new(-90.0, 0.0, 0.0),
        }
    }
}

// ── Local accessors (external convention) ───────────────────────────────

impl Node {
    pub fn position(&self) -> Vec3 {
        swap_yz(self.pose.pos)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.pose.pos = swap_yz(position);
    }

    pub fn x(&self) -> f32 {
        self.pose.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pose.pos.z
    }

    pub fn z(&self) -> f32 {
        self.pose.pos.y
    }

    pub fn set_x(&mut self, v: f32) {
        let p = self.position();
        self.set_position(Vec3::new(v, p.y, p.z));
    }

    pub fn set_y(&mut self, v: f32) {
        let p = self.position();
        self.set_position(Vec3::new(p.x, v, p.z));
    }

    pub fn set_z(&mut self, v: f32) {
        let p = self.position();
        self.set_position(Vec3::new(p.x, p.y, v));
    }

    pub fn rotation(&self) -> Vec3 {
        hpr_to_rotation(self.pose.hpr)
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.pose.hpr = rotation_to_hpr(rotation);
    }

    pub fn rotation_x(&self) -> f32 {
        self.rotation().x
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation().y
    }

    pub fn rotation_z(&self) -> f32 {
        self.rotation().z
    }

    pub fn set_rotation_x(&mut self, v: f32) {
        let r = self.rotation();
        self.set_rotation(Vec3::new(v, r.y, r.z));
    }

    pub fn set_rotation_y(&mut self, v: f32) {
        let r = self.rotation();
        self.set_rotation(Vec3::new(r.x, v, r.z));
    }

    pub fn set_rotation_z(&mut self, v: f32) {
        let r = self.rotation();
        self.set_rotation(Vec3::new(r.x, r.y, v));
    }

    pub fn scale(&self) -> Vec3 {
        swap_yz(self.pose.scale)
    }

    /// Every scale write lands here, so the zero guard always runs.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.pose.scale = clamp_scale(swap_yz(scale));
    }

    pub fn scale_x(&self) -> f32 {
        self.scale().x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale().y
    }

    pub fn scale_z(&self) -> f32 {
        self.scale().z
    }

    pub fn set_scale_x(&mut self, v: f32) {
        let s = self.scale();
        self.set_scale(Vec3::new(v, s.y, s.z));
    }

    pub fn set_scale_y(&mut self, v: f32) {
        let s = self.scale();
        self.set_scale(Vec3::new(s.x, v, s.z));
    }

    pub fn set_scale_z(&mut self, v: f32) {
        let s = self.scale();
        self.set_scale(Vec3::new(s.x, s.y, v));
    }

    /// Raw internal pose.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }
}

// ── World-space accessors ────────────────────────────────────────────────

impl Scene {
    /// Local-to-world transform of a node, internal convention.
    pub fn world_affine(&self, id: NodeId) -> Option<Affine3A> {
        let node = self.node(id)?;
        let mut affine = node.pose.affine();
        let mut parent = node.parent;
        // Bounded walk: a hierarchy deeper than the node count is a cycle.
        for _ in 0..self.len() {
            let Some(pid) = parent else { break };
            let Some(p) = self.node(pid) else { break };
            affine = p.pose.affine() * affine;
            parent = p.parent;
        }
        Some(affine)
    }

    /// World transform of a node's parent (identity for top-level nodes).
    pub fn parent_affine(&self, id: NodeId) -> Affine3A {
        self.node(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.world_affine(p))
            .unwrap_or(Affine3A::IDENTITY)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_affine(id).map(|a| swap_yz(a.translation.into()))
    }

    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> Result<(), NodeError> {
        let local = self.parent_affine(id).inverse().transform_point3(swap_yz(position));
        self.node_mut(id).ok_or(NodeError::UnknownNode(id))?.pose.pos = local;
        Ok(())
    }

    pub fn world_rotation(&self, id: NodeId) -> Option<Vec3> {
        let (_, rotation, _) = self.world_affine(id)?.to_scale_rotation_translation();
        Some(hpr_to_rotation(quat_to_hpr(rotation)))
    }

    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Vec3) -> Result<(), NodeError> {
        let (_, parent_rot, _) = self.parent_affine(id).to_scale_rotation_translation();
        let world = hpr_to_quat(rotation_to_hpr(rotation));
        let local = parent_rot.inverse() * world;
        self.node_mut(id).ok_or(NodeError::UnknownNode(id))?.pose.hpr = quat_to_hpr(local);
        Ok(())
    }

    pub fn world_scale(&self, id: NodeId) -> Option<Vec3> {
        let (scale, _, _) = self.world_affine(id)?.to_scale_rotation_translation();
        Some(swap_yz(scale))
    }

    pub fn set_world_scale(&mut self, id: NodeId, scale: Vec3) -> Result<(), NodeError> {
        let (parent_scale, _, _) = self.parent_affine(id).to_scale_rotation_translation();
        let local = clamp_scale(swap_yz(scale)) / clamp_scale(parent_scale);
        self.node_mut(id).ok_or(NodeError::UnknownNode(id))?.pose.scale = clamp_scale(local);
        Ok(())
    }

    /// Unit vector of an internal basis axis, in world space, external convention.
    fn world_axis(&self, id: NodeId, axis: Vec3) -> Option<Vec3> {
        let world = self.world_affine(id)?;
        Some(swap_yz(world.transform_vector3(axis).normalize_or_zero()))
    }

    pub fn forward(&self, id: NodeId) -> Option<Vec3> {
        self.world_axis(id, Vec3::Y)
    }

    pub fn back(&self, id: NodeId) -> Option<Vec3> {
        self.forward(id).map(|v| -v)
    }

    pub fn right(&self, id: NodeId) -> Option<Vec3> {
        self.world_axis(id, Vec3::X)
    }

    pub fn left(&self, id: NodeId) -> Option<Vec3> {
        self.right(id).map(|v| -v)
    }

    pub fn up(&self, id: NodeId) -> Option<Vec3> {
        self.world_axis(id, Vec3::Z)
    }

    pub fn down(&self, id: NodeId) -> Option<Vec3> {
        self.up(id).map(|v| -v)
    }

    /// Position of a node relative to another node's frame.
    pub fn get_position(&self, id: NodeId, relative_to: NodeId) -> Option<Vec3> {
        let world: Vec3 = self.world_affine(id)?.translation.into();
        let frame = self.world_affine(relative_to)?;
        Some(swap_yz(frame.inverse().transform_point3(world)))
    }

    /// Orient a node so `axis` points at a world-space target.
    /// A target at the node's own position leaves the rotation unchanged.
    pub fn look_at(&mut self, id: NodeId, target: Vec3, axis: LookAxis) -> Result<(), NodeError> {
        let world = self.world_affine(id).ok_or(NodeError::UnknownNode(id))?;
        let from: Vec3 = world.translation.into();
        let Some(dir) = (swap_yz(target) - from).try_normalize() else {
            return Ok(());
        };
        let heading = (-dir.x).atan2(dir.y);
        let pitch = dir.z.clamp(-1.0, 1.0).asin();
        let world_rot = Quat::from_rotation_z(heading) * Quat::from_rotation_x(pitch);
        let (_, parent_rot, _) = self.parent_affine(id).to_scale_rotation_translation();

        let node = self.node_mut(id).ok_or(NodeError::UnknownNode(id))?;
        node.pose.hpr = quat_to_hpr(parent_rot.inverse() * world_rot);
        if axis != LookAxis::Forward {
            let rotated = node.rotation() + axis.offset();
            node.set_rotation(rotated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-3)
    }

    #[test]
    fn axis_mapping_is_an_involution() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(swap_yz(v), Vec3::new(1.0, 3.0, 2.0));
        assert_eq!(swap_yz(swap_yz(v)), v);
        let r = Vec3::new(10.0, 20.0, 30.0);
        assert_eq!(rotation_to_hpr(r), Vec3::new(-20.0, -10.0, 30.0));
        assert_eq!(hpr_to_rotation(rotation_to_hpr(r)), r);
    }

    #[test]
    fn hpr_quat_round_trip() {
        let hpr = Vec3::new(35.0, -20.0, 15.0);
        assert!(close(quat_to_hpr(hpr_to_quat(hpr)), hpr));
    }

    #[test]
    fn expand_components_shapes() {
        assert_eq!(expand_components(&[1.0, 2.0, 3.0], 9.0), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(expand_components(&[1.0, 2.0], 9.0), Some(Vec3::new(1.0, 2.0, 9.0)));
        // Two 2-tuples accumulate.
        assert_eq!(expand_components(&[1.0, 2.0, 3.0, 4.0], 0.5), Some(Vec3::new(4.0, 6.0, 0.5)));
        // Two 3-tuples accumulate.
        assert_eq!(
            expand_components(&[1.0, 1.0, 1.0, 2.0, 2.0, 2.0], 0.0),
            Some(Vec3::splat(3.0))
        );
        assert_eq!(expand_components(&[1.0], 0.0), None);
        assert_eq!(expand_components(&[], 0.0), None);
    }

    #[test]
    fn local_round_trip() {
        let mut scene = Scene::new();
        let id = scene.spawn("cube");
        let node = scene.node_mut(id).unwrap();

        node.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!((node.x(), node.y(), node.z()), (1.0, 2.0, 3.0));
        assert_eq!(node.pose().pos, Vec3::new(1.0, 3.0, 2.0));

        node.set_rotation(Vec3::new(10.0, 20.0, 30.0));
        assert!(close(node.rotation(), Vec3::new(10.0, 20.0, 30.0)));
        assert_eq!(node.pose().hpr, Vec3::new(-20.0, -10.0, 30.0));

        node.set_scale(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.scale(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(node.pose().scale, Vec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn per_axis_setters_delegate() {
        let mut scene = Scene::new();
        let id = scene.spawn("cube");
        let node = scene.node_mut(id).unwrap();
        node.set_y(4.0);
        node.set_rotation_y(45.0);
        node.set_scale_z(2.0);
        assert_eq!(node.position(), Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(node.pose().hpr.x, -45.0);
        assert_eq!(node.scale(), Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn zero_scale_is_floored() {
        let mut scene = Scene::new();
        let id = scene.spawn("flat");
        let node = scene.node_mut(id).unwrap();
        node.set_scale(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(node.scale(), Vec3::new(SCALE_EPSILON, 1.0, SCALE_EPSILON));
        node.set_scale_y(0.0);
        assert_eq!(node.scale_y(), SCALE_EPSILON);
    }

    #[test]
    fn world_round_trip_under_transformed_parent() {
        let mut scene = Scene::new();
        let parent = scene.spawn("parent");
        {
            let p = scene.node_mut(parent).unwrap();
            p.set_position(Vec3::new(5.0, -2.0, 1.0));
            p.set_rotation(Vec3::new(0.0, 30.0, 0.0));
            p.set_scale(Vec3::splat(2.0));
        }
        let child = scene.spawn("child");
        scene.reparent(child, parent, false).unwrap();

        scene.set_world_position(child, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert!(close(scene.world_position(child).unwrap(), Vec3::new(1.0, 2.0, 3.0)));

        scene.set_world_rotation(child, Vec3::new(10.0, 60.0, -5.0)).unwrap();
        assert!(close(scene.world_rotation(child).unwrap(), Vec3::new(10.0, 60.0, -5.0)));

        scene.set_world_scale(child, Vec3::new(3.0, 4.0, 5.0)).unwrap();
        assert!(close(scene.world_scale(child).unwrap(), Vec3::new(3.0, 4.0, 5.0)));
    }

    #[test]
    fn directions_follow_rotation() {
        let mut scene = Scene::new();
        let id = scene.spawn("walker");
        assert!(close(scene.forward(id).unwrap(), Vec3::Z));
        assert!(close(scene.right(id).unwrap(), Vec3::X));
        assert!(close(scene.up(id).unwrap(), Vec3::Y));

        scene.node_mut(id).unwrap().set_rotation_y(90.0);
        assert!(close(scene.forward(id).unwrap(), Vec3::X));
        assert!(close(scene.back(id).unwrap(), Vec3::NEG_X));
        assert!(close(scene.right(id).unwrap(), Vec3::NEG_Z));
        assert!(close(scene.up(id).unwrap(), Vec3::Y));
    }

    #[test]
    fn directions_are_unit_under_scale() {
        let mut scene = Scene::new();
        let id = scene.spawn("big");
        scene.node_mut(id).unwrap().set_scale(Vec3::new(5.0, 0.5, 3.0));
        assert!((scene.forward(id).unwrap().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut scene = Scene::new();
        let id = scene.spawn("eye");
        scene.node_mut(id).unwrap().set_position(Vec3::new(1.0, 1.0, 1.0));

        for target in [Vec3::new(4.0, 1.0, 1.0), Vec3::new(1.0, 5.0, 1.0), Vec3::new(-3.0, 2.0, 7.0)] {
            scene.look_at(id, target, LookAxis::Forward).unwrap();
            let expected = (target - Vec3::ONE).normalize();
            assert!(close(scene.forward(id).unwrap(), expected), "target {:?}", target);
        }
    }

    #[test]
    fn look_at_own_position_is_a_no_op() {
        let mut scene = Scene::new();
        let id = scene.spawn("eye");
        scene.node_mut(id).unwrap().set_rotation_y(30.0);
        scene.look_at(id, Vec3::ZERO, LookAxis::Forward).unwrap();
        assert!((scene.node(id).unwrap().rotation_y() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn relative_position() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        let b = scene.spawn("b");
        scene.node_mut(a).unwrap().set_position(Vec3::new(1.0, 0.0, 0.0));
        scene.node_mut(b).unwrap().set_position(Vec3::new(4.0, 2.0, 0.0));
        assert!(close(scene.get_position(b, a).unwrap(), Vec3::new(3.0, 2.0, 0.0)));
    }
}
