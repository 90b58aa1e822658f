//! Attribute dispatcher: the single gate for named property writes.
//!
//! `Scene::try_set` looks the property up in an ordered handler table and
//! falls through to a plain field store when nothing matches. `Scene::set`
//! is the fail-soft form: it logs the error and leaves the node in its last
//! valid state, so one bad attribute never aborts the rest of a batch.

use glam::{Vec2, Vec3, Vec4};
use crate::api::types::NodeId;
use crate::api::value::Value;
use crate::core::error::NodeError;
use crate::core::scene::Scene;
use crate::extensions::transform::expand_components;

type Handler = fn(&mut Scene, NodeId, &str, Value) -> Result<(), NodeError>;

/// Handlers in match order. The first entry naming the property wins.
const HANDLERS: &[(&[&str], Handler)] = &[
    (&["enabled"], set_enabled),
    (&["world_parent", "parent"], set_parent),
    (&["model"], set_model),
    (&["color", "alpha"], set_color),
    (&["texture_scale", "texture_offset"], set_texture_transform),
    (
        &[
            "position", "x", "y", "z",
            "origin", "origin_x", "origin_y", "origin_z",
            "rotation", "rotation_x", "rotation_y", "rotation_z",
            "scale", "scale_x", "scale_y", "scale_z",
            "world_position", "world_x", "world_y", "world_z",
            "world_rotation", "world_rotation_x", "world_rotation_y", "world_rotation_z",
            "world_scale", "world_scale_x", "world_scale_y", "world_scale_z",
        ],
        set_transform,
    ),
    (&["collider"], set_collider),
    (&["collision"], set_collision),
    (&["render_queue"], set_render_queue),
    (&["double_sided"], set_double_sided),
];

impl Scene {
    /// Apply a property, logging and swallowing any failure.
    pub fn set(&mut self, id: NodeId, property: &str, value: impl Into<Value>) {
        let Err(e) = self.try_set(id, property, value) else {
            return;
        };
        if e.is_silent() {
            log::trace!("skip '{}' on {:?}: {}", property, id, e);
        } else if matches!(e, NodeError::ResourceNotFound(_) | NodeError::InvalidColliderKind(_)) {
            log::error!("set '{}' on {:?}: {}", property, id, e);
        } else {
            log::warn!("set '{}' on {:?}: {}", property, id, e);
        }
    }

    /// Apply a property and report failure to the caller.
    pub fn try_set(&mut self, id: NodeId, property: &str, value: impl Into<Value>) -> Result<(), NodeError> {
        self.node_or_err(id)?;
        let handler = HANDLERS
            .iter()
            .find(|(names, _)| names.contains(&property))
            .map_or(set_field as Handler, |(_, handler)| *handler);
        handler(self, id, property, value.into())
    }

    /// Read a property. `None` for unknown nodes, unset fields, and
    /// properties that need an absent resource.
    pub fn get(&self, id: NodeId, property: &str) -> Option<Value> {
        let node = self.node(id)?;
        let value = match property {
            "name" => Value::Str(node.name.clone()),
            "enabled" => Value::Bool(node.enabled),
            "visible" => Value::Bool(node.visible),
            "eternal" => Value::Bool(node.eternal),
            "parent" | "world_parent" => node.parent.into(),
            "model" => node.model.clone().map_or(Value::None, Value::Model),
            "texture" => node.texture.clone().map_or(Value::None, Value::Texture),
            "reflection_map" => node.reflection_map.clone().map_or(Value::None, Value::Texture),
            "reflectivity" => Value::Float(node.reflectivity),
            "color" => Value::Vec4(node.color),
            "alpha" => Value::Float(node.alpha()),
            "texture_scale" => Value::Vec2(node.model.as_ref()?.texture_scale()),
            "texture_offset" => Value::Vec2(node.model.as_ref()?.texture_offset()),
            "position" => Value::Vec3(node.position()),
            "x" => Value::Float(node.x()),
            "y" => Value::Float(node.y()),
            "z" => Value::Float(node.z()),
            "origin" => Value::Vec3(node.origin),
            "origin_x" => Value::Float(node.origin.x),
            "origin_y" => Value::Float(node.origin.y),
            "origin_z" => Value::Float(node.origin.z),
            "rotation" => Value::Vec3(node.rotation()),
            "rotation_x" => Value::Float(node.rotation_x()),
            "rotation_y" => Value::Float(node.rotation_y()),
            "rotation_z" => Value::Float(node.rotation_z()),
            "scale" => Value::Vec3(node.scale()),
            "scale_x" => Value::Float(node.scale_x()),
            "scale_y" => Value::Float(node.scale_y()),
            "scale_z" => Value::Float(node.scale_z()),
            "world_position" => Value::Vec3(self.world_position(id)?),
            "world_x" => Value::Float(self.world_position(id)?.x),
            "world_y" => Value::Float(self.world_position(id)?.y),
            "world_z" => Value::Float(self.world_position(id)?.z),
            "world_rotation" => Value::Vec3(self.world_rotation(id)?),
            "world_rotation_x" => Value::Float(self.world_rotation(id)?.x),
            "world_rotation_y" => Value::Float(self.world_rotation(id)?.y),
            "world_rotation_z" => Value::Float(self.world_rotation(id)?.z),
            "world_scale" => Value::Vec3(self.world_scale(id)?),
            "world_scale_x" => Value::Float(self.world_scale(id)?.x),
            "world_scale_y" => Value::Float(self.world_scale(id)?.y),
            "world_scale_z" => Value::Float(self.world_scale(id)?.z),
            "forward" => Value::Vec3(self.forward(id)?),
            "back" => Value::Vec3(self.back(id)?),
            "right" => Value::Vec3(self.right(id)?),
            "left" => Value::Vec3(self.left(id)?),
            "up" => Value::Vec3(self.up(id)?),
            "down" => Value::Vec3(self.down(id)?),
            "model_bounds" => {
                let (lo, hi) = node.model_bounds()?;
                Value::Vec3(hi - lo)
            }
            "bounds" => {
                let (lo, hi) = node.bounds()?;
                Value::Vec3(hi - lo)
            }
            "collider" => node
                .collider
                .as_ref()
                .map_or(Value::None, |c| Value::Collider(c.shape().clone())),
            "collision" => Value::Bool(node.collision),
            "render_queue" => Value::Int(node.render_queue),
            "double_sided" => Value::Bool(node.double_sided),
            other => node.fields.get(other)?.clone(),
        };
        Some(value)
    }
}

// ── Value readers ────────────────────────────────────────────────────────

fn read_bool(property: &str, value: &Value) -> Result<bool, NodeError> {
    value.as_bool().ok_or_else(|| NodeError::invalid(property, "bool", value))
}

fn read_f32(property: &str, value: &Value) -> Result<f32, NodeError> {
    value.as_f32().ok_or_else(|| NodeError::invalid(property, "number", value))
}

fn read_vec2(property: &str, value: &Value) -> Result<Vec2, NodeError> {
    value.as_vec2().ok_or_else(|| NodeError::invalid(property, "vec2", value))
}

/// Read a 3-vector. Two-component shapes keep `depth` as the third axis.
pub(crate) fn read_vec3(property: &str, value: &Value, depth: f32) -> Result<Vec3, NodeError> {
    match value {
        Value::Vec3(v) => Ok(*v),
        Value::Vec2(v) => Ok(v.extend(depth)),
        Value::Floats(f) => {
            expand_components(f, depth).ok_or_else(|| NodeError::invalid(property, "2- or 3-tuples", value))
        }
        _ => Err(NodeError::invalid(property, "vec3", value)),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

fn set_enabled(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    let enabled = read_bool(property, &value)?;
    let node = scene.node_mut_or_err(id)?;
    if enabled {
        node.run_scripts("on_enable", |script, node| script.on_enable(node));
    } else {
        node.run_scripts("on_disable", |script, node| script.on_disable(node));
    }
    if id == NodeId::ROOT {
        log::debug!("the scene root is always included in traversal");
        return Ok(());
    }
    node.enabled = enabled;
    Ok(())
}

fn set_parent(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    match value {
        Value::None => {
            scene.destroy(id);
            Ok(())
        }
        Value::Node(parent) => scene.reparent(id, parent, true),
        other => Err(NodeError::invalid(property, "node or none", &other)),
    }
}

fn set_model(scene: &mut Scene, id: NodeId, _property: &str, value: Value) -> Result<(), NodeError> {
    scene.assign_model(id, value)
}

fn set_color(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    let node = scene.node_mut_or_err(id)?;
    let color = if property == "alpha" {
        let alpha = read_f32(property, &value)?;
        let alpha = if alpha > 1.0 { alpha / 255.0 } else { alpha };
        node.color.truncate().extend(alpha)
    } else {
        value
            .as_color()
            .ok_or_else(|| NodeError::invalid(property, "color", &value))?
    };
    node.color = color;
    if let Some(model) = node.model.as_mut() {
        model.color_scale = color;
    }
    Ok(())
}

fn set_texture_transform(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    let v = read_vec2(property, &value)?;
    let node = scene.node_mut_or_err(id)?;
    let model = match node.model.as_mut() {
        Some(model) if node.texture.is_some() => model,
        _ => {
            return Err(NodeError::MissingTransformData {
                property: if property == "texture_scale" { "texture_scale" } else { "texture_offset" },
                requires: "model and texture",
            })
        }
    };
    if property == "texture_scale" {
        model.texture_scale = v;
    } else {
        model.texture_offset = v;
    }
    Ok(())
}

fn set_transform(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    if let Some(axis) = property.strip_prefix("world_") {
        return set_world_transform(scene, id, axis, property, value);
    }
    let node = scene.node_mut_or_err(id)?;
    match property {
        "position" => {
            let v = read_vec3(property, &value, node.z())?;
            node.set_position(v);
        }
        "x" => node.set_x(read_f32(property, &value)?),
        "y" => node.set_y(read_f32(property, &value)?),
        "z" => node.set_z(read_f32(property, &value)?),
        "rotation" => {
            let v = read_vec3(property, &value, node.rotation_z())?;
            node.set_rotation(v);
        }
        "rotation_x" => node.set_rotation_x(read_f32(property, &value)?),
        "rotation_y" => node.set_rotation_y(read_f32(property, &value)?),
        "rotation_z" => node.set_rotation_z(read_f32(property, &value)?),
        "scale" => {
            let v = match value.as_f32() {
                Some(s) => Vec3::splat(s),
                None => read_vec3(property, &value, node.scale_z())?,
            };
            node.set_scale(v);
        }
        "scale_x" => node.set_scale_x(read_f32(property, &value)?),
        "scale_y" => node.set_scale_y(read_f32(property, &value)?),
        "scale_z" => node.set_scale_z(read_f32(property, &value)?),
        _ => {
            let mut origin = node.origin;
            match property {
                "origin" => origin = read_vec3(property, &value, origin.z)?,
                "origin_x" => origin.x = read_f32(property, &value)?,
                "origin_y" => origin.y = read_f32(property, &value)?,
                _ => origin.z = read_f32(property, &value)?,
            }
            node.origin = origin;
            if let Some(model) = node.model.as_mut() {
                model.offset = -origin;
            }
        }
    }
    Ok(())
}

fn set_world_transform(
    scene: &mut Scene,
    id: NodeId,
    axis: &str,
    property: &str,
    value: Value,
) -> Result<(), NodeError> {
    let unknown = || NodeError::UnknownNode(id);
    match axis {
        "position" | "x" | "y" | "z" => {
            let mut p = scene.world_position(id).ok_or_else(unknown)?;
            match axis {
                "position" => p = read_vec3(property, &value, p.z)?,
                "x" => p.x = read_f32(property, &value)?,
                "y" => p.y = read_f32(property, &value)?,
                _ => p.z = read_f32(property, &value)?,
            }
            scene.set_world_position(id, p)
        }
        "rotation" | "rotation_x" | "rotation_y" | "rotation_z" => {
            let mut r = scene.world_rotation(id).ok_or_else(unknown)?;
            match axis {
                "rotation" => r = read_vec3(property, &value, r.z)?,
                "rotation_x" => r.x = read_f32(property, &value)?,
                "rotation_y" => r.y = read_f32(property, &value)?,
                _ => r.z = read_f32(property, &value)?,
            }
            scene.set_world_rotation(id, r)
        }
        _ => {
            let mut s = scene.world_scale(id).ok_or_else(unknown)?;
            match axis {
                "scale" => {
                    s = match value.as_f32() {
                        Some(v) => Vec3::splat(v),
                        None => read_vec3(property, &value, s.z)?,
                    }
                }
                "scale_x" => s.x = read_f32(property, &value)?,
                "scale_y" => s.y = read_f32(property, &value)?,
                _ => s.z = read_f32(property, &value)?,
            }
            scene.set_world_scale(id, s)
        }
    }
}

fn set_collider(scene: &mut Scene, id: NodeId, _property: &str, value: Value) -> Result<(), NodeError> {
    scene.assign_collider(id, value)
}

fn set_collision(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    let enabled = read_bool(property, &value)?;
    scene.set_collision(id, enabled)
}

fn set_double_sided(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    scene.node_mut_or_err(id)?.double_sided = read_bool(property, &value)?;
    Ok(())
}

fn set_render_queue(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    let queue = value
        .as_i32()
        .ok_or_else(|| NodeError::invalid(property, "int", &value))?;
    let node = scene.node_mut_or_err(id)?;
    node.render_queue = queue;
    if let Some(model) = node.model.as_mut() {
        model.bin = Some(queue);
    }
    Ok(())
}

/// Fallthrough: typed node fields first, then the free-form field map.
fn set_field(scene: &mut Scene, id: NodeId, property: &str, value: Value) -> Result<(), NodeError> {
    match property {
        "texture" => scene.assign_texture(id, value),
        "reflection_map" => scene.set_reflection_map(id, value),
        "reflectivity" => {
            let reflectivity = read_f32(property, &value)?;
            scene.set_reflectivity(id, reflectivity)
        }
        "visible" => {
            scene.node_mut_or_err(id)?.visible = read_bool(property, &value)?;
            Ok(())
        }
        "eternal" => {
            scene.node_mut_or_err(id)?.eternal = read_bool(property, &value)?;
            Ok(())
        }
        "name" => {
            let name = value
                .as_str()
                .ok_or_else(|| NodeError::invalid(property, "string", &value))?;
            scene.node_mut_or_err(id)?.name = name.to_string();
            Ok(())
        }
        _ => {
            scene.node_mut_or_err(id)?.fields.insert(property.to_string(), value);
            Ok(())
        }
    }
}
