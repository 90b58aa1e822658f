// components/node.rs
//
// Scene node: one struct holding the canonical pose plus optional
// resource bindings. Nodes live in `Scene`; hierarchy is a parent id.

use std::collections::HashMap;
use glam::{Vec2, Vec3, Vec4};
use crate::api::types::{NodeId, SequenceId};
use crate::api::value::Value;
use crate::components::model::{Model, Vertex};
use crate::components::script::Script;
use crate::components::texture::Texture;
use crate::core::collision::Collider;
use crate::core::error::NodeError;
use crate::extensions::transform::Pose;

#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    /// Name used by `find_by_name` and in log messages.
    pub name: String,
    /// Survives `Scene::clear`.
    pub eternal: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) pose: Pose,
    pub(crate) enabled: bool,
    pub(crate) visible: bool,
    pub(crate) color: Vec4,
    /// External convention.
    pub(crate) origin: Vec3,
    pub(crate) model: Option<Model>,
    pub(crate) texture: Option<Texture>,
    pub(crate) reflection_map: Option<Texture>,
    pub(crate) reflectivity: f32,
    pub(crate) collider: Option<Collider>,
    pub(crate) collision: bool,
    pub(crate) render_queue: i32,
    pub(crate) double_sided: bool,
    pub(crate) scripts: Vec<Box<dyn Script>>,
    /// `<property>_animator` -> most recent sequence for that property.
    pub(crate) animators: HashMap<String, SequenceId>,
    pub(crate) animations: Vec<SequenceId>,
    pub(crate) vertex_cache: Option<Vec<Vertex>>,
    pub(crate) fields: HashMap<String, Value>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: impl Into<String>, color: Vec4) -> Self {
        Self {
            id,
            name: name.into(),
            eternal: false,
            parent: None,
            pose: Pose::default(),
            enabled: true,
            visible: true,
            color,
            origin: Vec3::ZERO,
            model: None,
            texture: None,
            reflection_map: None,
            reflectivity: 0.0,
            collider: None,
            collision: false,
            render_queue: 0,
            double_sided: false,
            scripts: Vec::new(),
            animators: HashMap::new(),
            animations: Vec::new(),
            vertex_cache: None,
            fields: HashMap::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn alpha(&self) -> f32 {
        self.color.w
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn reflection_map(&self) -> Option<&Texture> {
        self.reflection_map.as_ref()
    }

    pub fn reflectivity(&self) -> f32 {
        self.reflectivity
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    /// Whether the collider takes part in ray and collision traversal.
    pub fn collision(&self) -> bool {
        self.collision
    }

    pub fn render_queue(&self) -> i32 {
        self.render_queue
    }

    pub fn double_sided(&self) -> bool {
        self.double_sided
    }

    pub fn scripts(&self) -> &[Box<dyn Script>] {
        &self.scripts
    }

    /// Active animation sequences started on this node, oldest first.
    pub fn animations(&self) -> &[SequenceId] {
        &self.animations
    }

    pub fn animator(&self, property: &str) -> Option<SequenceId> {
        self.animators.get(&animator_key(property)).copied()
    }

    /// Plain field stored by the dispatcher fallthrough.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    // -- Geometry views --

    /// Local-space bounds of the bound model's geometry, external convention.
    pub fn model_bounds(&self) -> Option<(Vec3, Vec3)> {
        self.model.as_ref()?.mesh().bounds()
    }

    /// Model bounds multiplied by the node's local scale.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let (lo, hi) = self.model_bounds()?;
        let scale = self.scale();
        Some((lo * scale, hi * scale))
    }

    pub fn vertices(&self) -> &[Vec3] {
        match &self.model {
            Some(model) => &model.mesh().vertices,
            None => &[],
        }
    }

    pub fn normals(&self) -> &[Vec3] {
        match &self.model {
            Some(model) => &model.mesh().normals,
            None => &[],
        }
    }

    pub fn uvs(&self) -> &[Vec2] {
        match &self.model {
            Some(model) => &model.mesh().uvs,
            None => &[],
        }
    }

    /// Interleaved vertex bytes of the bound model. Built on first use and
    /// cached until the model changes.
    pub fn vertex_data(&mut self) -> Result<&[u8], NodeError> {
        if self.vertex_cache.is_none() {
            let model = self.model.as_ref().ok_or(NodeError::MissingTransformData {
                property: "vertex_data",
                requires: "model",
            })?;
            self.vertex_cache = Some(model.mesh().interleave());
        }
        let vertices: &[Vertex] = self.vertex_cache.as_deref().unwrap_or_default();
        Ok(bytemuck::cast_slice(vertices))
    }

    // -- Script hooks --

    /// Run a hook on every attached script. Failures are logged and do not
    /// stop the remaining scripts. Scripts added by a hook are kept.
    pub(crate) fn run_scripts(
        &mut self,
        hook: &str,
        mut call: impl FnMut(&mut dyn Script, &mut Node) -> Result<(), NodeError>,
    ) {
        let mut scripts = std::mem::take(&mut self.scripts);
        for script in scripts.iter_mut() {
            if let Err(e) = call(script.as_mut(), self) {
                log::warn!(
                    "{} hook of '{}' on '{}' failed: {}",
                    hook,
                    script.type_name(),
                    self.name,
                    e
                );
            }
        }
        scripts.append(&mut self.scripts);
        self.scripts = scripts;
    }
}

pub(crate) fn animator_key(property: &str) -> String {
    format!("{}_animator", property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::model::Mesh;

    #[derive(Debug)]
    struct Failing;

    impl Script for Failing {
        fn type_name(&self) -> &str {
            "failing"
        }
        fn on_enable(&mut self, _node: &mut Node) -> Result<(), NodeError> {
            Err(NodeError::Script {
                script: "failing".into(),
                reason: "boom".into(),
            })
        }
    }

    #[derive(Debug)]
    struct Renamer;

    impl Script for Renamer {
        fn type_name(&self) -> &str {
            "renamer"
        }
        fn on_enable(&mut self, node: &mut Node) -> Result<(), NodeError> {
            node.name.push('!');
            Ok(())
        }
    }

    #[test]
    fn defaults() {
        let node = Node::new(NodeId(3), "n", Vec4::ONE);
        assert!(node.is_enabled());
        assert!(node.is_visible());
        assert!(!node.collision());
        assert_eq!(node.scale(), Vec3::ONE);
        assert!(node.vertices().is_empty());
    }

    #[test]
    fn failing_hook_does_not_stop_others() {
        let mut node = Node::new(NodeId(1), "n", Vec4::ONE);
        node.scripts.push(Box::new(Failing));
        node.scripts.push(Box::new(Renamer));
        node.run_scripts("on_enable", |s, n| s.on_enable(n));
        assert_eq!(node.name, "n!");
        assert_eq!(node.scripts().len(), 2);
    }

    #[test]
    fn vertex_data_is_cached_bytes() {
        let mut node = Node::new(NodeId(1), "n", Vec4::ONE);
        assert!(node.vertex_data().is_err());
        node.model = Some(Model::new("quad", Mesh::quad()));
        let len = node.vertex_data().unwrap().len();
        assert_eq!(len, 4 * std::mem::size_of::<Vertex>());
        assert!(node.vertex_cache.is_some());
    }

    #[test]
    fn bounds_follow_scale() {
        let mut node = Node::new(NodeId(1), "n", Vec4::ONE);
        node.model = Some(Model::new("cube", Mesh::cube()));
        node.set_scale(Vec3::new(2.0, 4.0, 1.0));
        let (lo, hi) = node.bounds().unwrap();
        assert_eq!(lo, Vec3::new(-1.0, -2.0, -0.5));
        assert_eq!(hi, Vec3::new(1.0, 2.0, 0.5));
    }
}
