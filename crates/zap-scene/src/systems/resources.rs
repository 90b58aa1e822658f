// systems/resources.rs
//
// Resource lifecycle: model, texture, collider and reflection bindings.
// A replaced model or collider is released before its successor is
// attached. A failed assignment leaves the previous binding in place.

use glam::Vec3;
use crate::api::types::NodeId;
use crate::api::value::Value;
use crate::components::model::{Model, TextureBinding};
use crate::components::texture::Texture;
use crate::core::collision::ColliderShape;
use crate::core::error::NodeError;
use crate::core::scene::Scene;

/// Texture-stage priority for static textures. Movies bind at 0.
pub const STATIC_TEXTURE_PRIORITY: i32 = 1;

fn binding(texture: Texture) -> TextureBinding {
    let priority = if texture.is_movie() { 0 } else { STATIC_TEXTURE_PRIORITY };
    TextureBinding { texture, priority }
}

impl Scene {
    /// Bind a model from a `Value::Model` or an asset name; `Value::None` clears it.
    pub fn assign_model(&mut self, id: NodeId, value: Value) -> Result<(), NodeError> {
        self.node_or_err(id)?;
        let mut model = match value {
            Value::None => {
                let node = self.node_mut_or_err(id)?;
                if let Some(old) = node.model.take() {
                    log::debug!("release model '{}' of '{}'", old.name, node.name);
                }
                node.vertex_cache = None;
                return Ok(());
            }
            Value::Model(model) => model,
            Value::Str(name) => self
                .find_model(&name)
                .ok_or(NodeError::ResourceNotFound(name))?,
            other => return Err(NodeError::invalid("model", "model or asset name", &other)),
        };

        let node = self.node_mut_or_err(id)?;
        if let Some(old) = node.model.take() {
            if !old.same_as(&model) {
                log::debug!("release model '{}' of '{}'", old.name, node.name);
            }
        }

        // A fresh model carries no render state; reapply the node's.
        model.color_scale = node.color;
        model.transparency = true;
        model.offset = -node.origin;
        model.bin = (node.render_queue != 0).then_some(node.render_queue);
        if let Some(texture) = &node.texture {
            model.texture = Some(binding(texture.clone()));
        }
        let hook = model.on_assign();
        log::debug!("attach model '{}' to '{}'", model.name, node.name);
        node.model = Some(model);
        node.vertex_cache = None;
        if let Some(hook) = hook {
            hook(node);
        }
        Ok(())
    }

    /// Bind a texture from a `Value::Texture` or an asset name. Requires a
    /// bound model. `Value::None` switches texturing off.
    pub fn assign_texture(&mut self, id: NodeId, value: Value) -> Result<(), NodeError> {
        if self.node_or_err(id)?.model.is_none() {
            return Err(NodeError::MissingTransformData {
                property: "texture",
                requires: "model",
            });
        }
        let texture = match value {
            Value::None => None,
            Value::Texture(texture) => Some(texture),
            Value::Str(name) => Some(
                self.find_texture(&name)
                    .ok_or(NodeError::ResourceNotFound(name))?,
            ),
            other => return Err(NodeError::invalid("texture", "texture or asset name", &other)),
        };

        let node = self.node_mut_or_err(id)?;
        let Some(model) = node.model.as_mut() else {
            return Ok(());
        };
        match texture {
            Some(texture) => {
                model.texture = Some(binding(texture.clone()));
                model.texture_off = false;
                node.texture = Some(texture);
            }
            None => {
                model.texture = None;
                model.texture_off = true;
                node.texture = None;
            }
        }
        Ok(())
    }

    /// Replace the collider. The previous collider is destroyed only once
    /// the new one is built, so a failed assignment keeps it.
    pub fn assign_collider(&mut self, id: NodeId, value: Value) -> Result<(), NodeError> {
        let shape = match &value {
            Value::None => None,
            Value::Collider(shape) => Some(shape.clone()),
            Value::Str(kind) => Some(self.collider_shape(id, kind)?),
            other => return Err(NodeError::invalid("collider", "collider or kind", other)),
        };

        self.node_or_err(id)?;
        let collider = match shape {
            Some(shape) => Some(
                self.collision
                    .insert(id, shape)
                    .ok_or_else(|| NodeError::invalid("collider", "buildable shape", &value))?,
            ),
            None => None,
        };
        let node = self.node_mut_or_err(id)?;
        let old = std::mem::replace(&mut node.collider, collider);
        node.collision = node.collider.is_some();
        if let Some(old) = old {
            self.collision.remove(&old);
        }
        Ok(())
    }

    /// Shape for a named collider kind, sized from the bound model.
    fn collider_shape(&self, id: NodeId, kind: &str) -> Result<ColliderShape, NodeError> {
        let node = self.node_or_err(id)?;
        let center = -node.origin;
        match kind {
            "box" => Ok(match node.model_bounds() {
                Some((lo, hi)) => ColliderShape::Box { center, size: hi - lo },
                None => ColliderShape::Box {
                    center: Vec3::ZERO,
                    size: Vec3::from_array(self.config().default_box_size),
                },
            }),
            "sphere" => Ok(ColliderShape::Sphere {
                center: Vec3::ZERO,
                radius: self.config().default_sphere_radius,
            }),
            "mesh" => {
                let model = node.model.as_ref().ok_or(NodeError::MissingTransformData {
                    property: "collider",
                    requires: "model",
                })?;
                Ok(ColliderShape::Mesh {
                    center,
                    mesh: model.shared_mesh().clone(),
                })
            }
            other => Err(NodeError::InvalidColliderKind(other.to_string())),
        }
    }

    /// Include or exclude the collider from traversal without destroying it.
    pub fn set_collision(&mut self, id: NodeId, enabled: bool) -> Result<(), NodeError> {
        let node = self.node_mut_or_err(id)?;
        node.collision = enabled;
        if let Some(collider) = node.collider.clone() {
            self.collision.set_enabled(&collider, enabled);
        }
        Ok(())
    }

    /// Zero unbinds the texture. A positive value generates normals if the
    /// model has none, then binds the reflection map as the texture.
    pub fn set_reflectivity(&mut self, id: NodeId, reflectivity: f32) -> Result<(), NodeError> {
        let node = self.node_mut_or_err(id)?;
        node.reflectivity = reflectivity;
        if reflectivity == 0.0 {
            return self.assign_texture(id, Value::None);
        }
        if reflectivity < 0.0 {
            return Ok(());
        }
        let model: &mut Model = node.model.as_mut().ok_or(NodeError::MissingTransformData {
            property: "reflectivity",
            requires: "model",
        })?;
        if !model.mesh().has_normals() {
            model.mesh_mut().generate_normals();
            node.vertex_cache = None;
        }
        let map = node.reflection_map.clone().map_or(Value::None, Value::Texture);
        self.assign_texture(id, map)
    }

    /// Set the reflection map from a texture or asset name.
    pub fn set_reflection_map(&mut self, id: NodeId, value: Value) -> Result<(), NodeError> {
        let texture = match value {
            Value::None => None,
            Value::Texture(texture) => Some(texture),
            Value::Str(name) => Some(
                self.find_texture(&name)
                    .ok_or(NodeError::ResourceNotFound(name))?,
            ),
            other => {
                return Err(NodeError::invalid("reflection_map", "texture or asset name", &other))
            }
        };
        self.node_mut_or_err(id)?.reflection_map = texture;
        Ok(())
    }
}
