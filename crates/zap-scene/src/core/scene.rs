use glam::Vec4;
use crate::api::config::SceneConfig;
use crate::api::types::NodeId;
use crate::api::value::Value;
use crate::assets::library::AssetLibrary;
use crate::assets::loader::AssetLoader;
use crate::components::node::Node;
use crate::components::script::{Script, ScriptRegistry};
use crate::core::collision::CollisionWorld;
use crate::core::error::NodeError;
use crate::extensions::transform::Pose;

/// Live-node registry using a flat Vec in creation order.
/// Designed for small-to-medium node counts (hundreds, not millions).
///
/// Index 0 is always the root node. Every other node has a live parent;
/// destroying a node destroys its subtree.
pub struct Scene {
    config: SceneConfig,
    nodes: Vec<Node>,
    next_id: u32,
    pub(crate) collision: CollisionWorld,
    assets: Box<dyn AssetLoader>,
    scripts: ScriptRegistry,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Scene backed by the built-in primitive library.
    pub fn with_config(config: SceneConfig) -> Self {
        let library = AssetLibrary::with_builtins(&config.internal_models_folder);
        Self::with_loader(config, library)
    }

    pub fn with_loader(config: SceneConfig, loader: impl AssetLoader + 'static) -> Self {
        let mut root = Node::new(NodeId::ROOT, "scene", Vec4::from_array(config.default_color));
        root.eternal = true;
        let mut nodes = Vec::with_capacity(256);
        nodes.push(root);
        Self {
            config,
            nodes,
            next_id: NodeId::ROOT.0 + 1,
            collision: CollisionWorld::new(),
            assets: Box::new(loader),
            scripts: ScriptRegistry::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn assets(&self) -> &dyn AssetLoader {
        self.assets.as_ref()
    }

    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    pub fn script_registry(&self) -> &ScriptRegistry {
        &self.scripts
    }

    pub fn script_registry_mut(&mut self) -> &mut ScriptRegistry {
        &mut self.scripts
    }

    // -- Registry --

    /// Create a node under the root with default attributes.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let mut node = Node::new(id, name, Vec4::from_array(self.config.default_color));
        node.parent = Some(NodeId::ROOT);
        if let Some(map) = &self.config.reflection_map {
            node.reflection_map = self.find_texture(map);
            if node.reflection_map.is_none() {
                log::warn!("reflection map '{}' not found", map);
            }
        }
        log::trace!("spawn {:?} '{}'", id, node.name);
        self.nodes.push(node);
        id
    }

    /// Create a node, then apply each attribute through `set` in order.
    pub fn spawn_with<'a>(
        &mut self,
        name: impl Into<String>,
        attrs: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> NodeId {
        let id = self.spawn(name);
        for (property, value) in attrs {
            self.set(id, property, value);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub(crate) fn node_or_err(&self, id: NodeId) -> Result<&Node, NodeError> {
        self.node(id).ok_or(NodeError::UnknownNode(id))
    }

    pub(crate) fn node_mut_or_err(&mut self, id: NodeId) -> Result<&mut Node, NodeError> {
        self.node_mut(id).ok_or(NodeError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Iterate over live nodes in creation order, root first.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Number of nodes with a bound model.
    pub fn live_model_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.model.is_some()).count()
    }

    // -- Hierarchy --

    /// Direct children in creation order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent == Some(id))
            .map(|n| n.id)
            .collect()
    }

    /// Every node below `id`, parents before children.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = self.children(id);
        let mut i = 0;
        while i < out.len() {
            let next = self.children(out[i]);
            out.extend(next);
            i += 1;
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn has_ancestor(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.node(id).and_then(|n| n.parent);
        for _ in 0..self.nodes.len() {
            match current {
                Some(p) if p == ancestor => return true,
                Some(p) => current = self.node(p).and_then(|n| n.parent),
                None => return false,
            }
        }
        false
    }

    /// Whether the node and every ancestor are enabled.
    pub fn is_in_traversal(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.nodes.len() {
            let Some(cid) = current else { return true };
            match self.node(cid) {
                Some(n) if n.enabled => current = n.parent,
                _ => return false,
            }
        }
        false
    }

    /// Move a node under a new parent. With `keep_world`, the local pose is
    /// recomputed so the world transform is unchanged.
    pub fn reparent(&mut self, id: NodeId, parent: NodeId, keep_world: bool) -> Result<(), NodeError> {
        let rejected = id == NodeId::ROOT
            || id == parent
            || !self.contains(id)
            || !self.contains(parent)
            || self.has_ancestor(parent, id);
        if rejected {
            return Err(NodeError::InvalidParent { node: id, parent });
        }
        let pose = if keep_world {
            let world = self.world_affine(id).ok_or(NodeError::UnknownNode(id))?;
            let parent_world = self.world_affine(parent).ok_or(NodeError::UnknownNode(parent))?;
            Some(Pose::from_affine(&(parent_world.inverse() * world)))
        } else {
            None
        };
        let node = self.node_mut_or_err(id)?;
        node.parent = Some(parent);
        if let Some(pose) = pose {
            node.pose = pose;
        }
        Ok(())
    }

    // -- Lifetime --

    /// Destroy a node and its subtree, releasing their models and colliders.
    /// The root cannot be destroyed. Returns `false` if nothing was removed.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if id == NodeId::ROOT {
            log::warn!("the scene root cannot be destroyed");
            return false;
        }
        if !self.contains(id) {
            return false;
        }
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in self.nodes.iter_mut().filter(|n| doomed.contains(&n.id)) {
            if let Some(collider) = node.collider.take() {
                self.collision.remove(&collider);
            }
            if let Some(model) = node.model.take() {
                log::debug!("release model '{}' of '{}'", model.name, node.name);
            }
        }
        self.nodes.retain(|n| !doomed.contains(&n.id));
        log::trace!("destroyed {} node(s) under {:?}", doomed.len(), id);
        true
    }

    /// Destroy every node that is not eternal. The root always survives;
    /// an eternal node below a destroyed parent goes with its parent.
    pub fn clear(&mut self) {
        let doomed: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| !n.eternal)
            .map(|n| n.id)
            .collect();
        for id in doomed {
            self.destroy(id);
        }
    }

    // -- Collision --

    /// Write every collider's pose from its owner's current world transform.
    pub fn sync_colliders(&mut self) {
        let updates: Vec<(usize, glam::Affine3A)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.collider.is_some())
            .filter_map(|(i, n)| self.world_affine(n.id).map(|a| (i, a)))
            .collect();
        for (i, world) in updates {
            if let Some(collider) = &self.nodes[i].collider {
                self.collision.sync(collider, &world);
            }
        }
    }

    // -- Scripts --

    /// Attach a script and run its `on_attach` hook.
    pub fn add_script(&mut self, id: NodeId, mut script: Box<dyn Script>) -> Result<(), NodeError> {
        let node = self.node_mut_or_err(id)?;
        if let Err(e) = script.on_attach(node) {
            log::warn!("on_attach of '{}' on '{}' failed: {}", script.type_name(), node.name, e);
        }
        node.scripts.push(script);
        Ok(())
    }

    /// Construct a registered script by type name and attach it.
    pub fn add_script_by_name(&mut self, id: NodeId, name: &str) -> Result<(), NodeError> {
        let script = self.scripts.create(name).ok_or_else(|| NodeError::Script {
            script: name.to_string(),
            reason: "not registered".to_string(),
        })?;
        self.add_script(id, script)
    }

    /// Detach the first script with the given type name.
    pub fn remove_script(&mut self, id: NodeId, type_name: &str) -> Option<Box<dyn Script>> {
        let node = self.node_mut(id)?;
        let index = node.scripts.iter().position(|s| s.type_name() == type_name)?;
        Some(node.scripts.remove(index))
    }

    /// Run `update` on the scripts of every node included in traversal.
    pub fn update(&mut self, dt: f32) {
        let ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| !n.scripts.is_empty())
            .map(|n| n.id)
            .collect();
        for id in ids {
            if !self.is_in_traversal(id) {
                continue;
            }
            if let Some(node) = self.node_mut(id) {
                node.run_scripts("update", |script, node| script.update(node, dt));
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::components::model::{Mesh, Model};
    use crate::core::collision::ColliderShape;

    #[derive(Debug, Default)]
    struct Counter {
        ticks: u32,
    }

    impl Script for Counter {
        fn type_name(&self) -> &str {
            "counter"
        }
        fn update(&mut self, node: &mut Node, _dt: f32) -> Result<(), NodeError> {
            self.ticks += 1;
            node.set_x(self.ticks as f32);
            Ok(())
        }
    }

    fn counter() -> Box<dyn Script> {
        Box::new(Counter::default())
    }

    #[test]
    fn spawn_and_find() {
        let mut scene = Scene::new();
        let id = scene.spawn("hero");
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.find_by_name("hero"), Some(id));
        assert_eq!(scene.node(id).unwrap().parent(), Some(NodeId::ROOT));
        assert_eq!(scene.children(NodeId::ROOT), vec![id]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        scene.destroy(a);
        let b = scene.spawn("b");
        assert_ne!(a, b);
    }

    #[test]
    fn destroy_takes_subtree() {
        let mut scene = Scene::new();
        let parent = scene.spawn("parent");
        let child = scene.spawn("child");
        let grandchild = scene.spawn("grandchild");
        scene.reparent(child, parent, false).unwrap();
        scene.reparent(grandchild, child, false).unwrap();
        assert!(scene.has_ancestor(grandchild, parent));

        assert!(scene.destroy(parent));
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn destroy_releases_resources() {
        let mut scene = Scene::new();
        let id = scene.spawn("crate");
        let collider = scene
            .collision
            .insert(id, ColliderShape::Sphere { center: Vec3::ZERO, radius: 0.5 })
            .unwrap();
        {
            let node = scene.node_mut(id).unwrap();
            node.model = Some(Model::new("cube", Mesh::cube()));
            node.collider = Some(collider);
        }
        assert_eq!(scene.live_model_count(), 1);
        assert_eq!(scene.collision().len(), 1);
        scene.destroy(id);
        assert_eq!(scene.live_model_count(), 0);
        assert!(scene.collision().is_empty());
    }

    #[test]
    fn root_is_permanent() {
        let mut scene = Scene::new();
        assert!(!scene.destroy(NodeId::ROOT));
        assert!(scene.reparent(NodeId::ROOT, NodeId::ROOT, true).is_err());
        assert!(scene.contains(NodeId::ROOT));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.spawn("a");
        let b = scene.spawn("b");
        scene.reparent(b, a, true).unwrap();
        assert_eq!(
            scene.reparent(a, b, true),
            Err(NodeError::InvalidParent { node: a, parent: b })
        );
        assert_eq!(scene.node(a).unwrap().parent(), Some(NodeId::ROOT));
    }

    #[test]
    fn reparent_keeps_world_transform() {
        let mut scene = Scene::new();
        let parent = scene.spawn("parent");
        {
            let p = scene.node_mut(parent).unwrap();
            p.set_position(Vec3::new(10.0, 0.0, 0.0));
            p.set_rotation_y(90.0);
        }
        let child = scene.spawn("child");
        scene.node_mut(child).unwrap().set_position(Vec3::new(1.0, 2.0, 3.0));
        scene.reparent(child, parent, true).unwrap();
        let world = scene.world_position(child).unwrap();
        assert!(world.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-4));
    }

    #[test]
    fn clear_spares_eternal_nodes() {
        let mut scene = Scene::new();
        let keep = scene.spawn("ui");
        scene.node_mut(keep).unwrap().eternal = true;
        scene.spawn("level");
        scene.spawn("enemy");
        scene.clear();
        assert_eq!(scene.len(), 2);
        assert!(scene.contains(keep));
    }

    #[test]
    fn traversal_requires_enabled_chain() {
        let mut scene = Scene::new();
        let parent = scene.spawn("parent");
        let child = scene.spawn("child");
        scene.reparent(child, parent, false).unwrap();
        assert!(scene.is_in_traversal(child));
        scene.node_mut(parent).unwrap().enabled = false;
        assert!(!scene.is_in_traversal(child));
    }

    #[test]
    fn update_ticks_scripts_of_enabled_nodes() {
        let mut scene = Scene::new();
        scene.script_registry_mut().register("counter", counter);
        let on = scene.spawn("on");
        let off = scene.spawn("off");
        scene.add_script_by_name(on, "counter").unwrap();
        scene.add_script_by_name(off, "counter").unwrap();
        scene.node_mut(off).unwrap().enabled = false;

        scene.update(0.016);
        scene.update(0.016);
        assert_eq!(scene.node(on).unwrap().x(), 2.0);
        assert_eq!(scene.node(off).unwrap().x(), 0.0);

        assert!(scene.add_script_by_name(on, "missing").is_err());
        assert!(scene.remove_script(on, "counter").is_some());
        assert!(scene.node(on).unwrap().scripts().is_empty());
    }
}
