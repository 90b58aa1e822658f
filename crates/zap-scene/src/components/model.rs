use std::fmt;
use std::rc::Rc;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use crate::components::node::Node;
use crate::components::texture::Texture;

/// Triangle mesh geometry. Vertices are in the external (Y-up) convention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    /// Per-vertex normals. Empty until provided or generated.
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates. May be empty.
    pub uvs: Vec<Vec2>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
            normals: Vec::new(),
            uvs: Vec::new(),
        }
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    /// Unit quad in the XY plane.
    pub fn quad() -> Self {
        Mesh::new(
            vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .with_uvs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
    }

    /// Unit cube centered on the origin.
    pub fn cube() -> Self {
        let mut vertices = Vec::with_capacity(24);
        let mut triangles = Vec::with_capacity(12);
        let mut uvs = Vec::with_capacity(24);
        // (normal, u, v) per face, u x v == normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        for (n, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                vertices.push(n * 0.5 + u * su + v * sv);
                uvs.push(Vec2::new(su + 0.5, sv + 0.5));
            }
            triangles.push([base, base + 1, base + 2]);
            triangles.push([base, base + 2, base + 3]);
        }
        Mesh::new(vertices, triangles).with_uvs(uvs)
    }

    /// UV sphere of diameter 1.
    pub fn sphere(segments: u32) -> Self {
        let segments = segments.max(3);
        let rings = (segments / 2).max(2);
        let mut vertices = Vec::new();
        let mut uvs = Vec::new();
        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let phi = v * std::f32::consts::PI;
            for seg in 0..=segments {
                let u = seg as f32 / segments as f32;
                let theta = u * std::f32::consts::TAU;
                vertices.push(Vec3::new(
                    phi.sin() * theta.cos() * 0.5,
                    -phi.cos() * 0.5,
                    phi.sin() * theta.sin() * 0.5,
                ));
                uvs.push(Vec2::new(u, v));
            }
        }
        let stride = segments + 1;
        let mut triangles = Vec::new();
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                triangles.push([a, b, a + 1]);
                triangles.push([a + 1, b, b + 1]);
            }
        }
        Mesh::new(vertices, triangles).with_uvs(uvs)
    }

    /// Tight axis-aligned bounds as (min, max). `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        }))
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty() && self.normals.len() == self.vertices.len()
    }

    /// Compute smooth per-vertex normals from face normals.
    pub fn generate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| i as usize);
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let face = (self.vertices[b] - self.vertices[a])
                .cross(self.vertices[c] - self.vertices[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect();
    }

    /// Interleaved GPU-ready vertices.
    pub fn interleave(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                position: p.to_array(),
                normal: self.normals.get(i).copied().unwrap_or(Vec3::ZERO).to_array(),
                uv: self.uvs.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
            })
            .collect()
    }
}

/// Interleaved vertex layout exposed through `Node::vertex_data`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Hook run when a model is assigned to a node.
pub type AssignHook = Rc<dyn Fn(&mut Node)>;

/// A texture bound to a model at a texture-stage priority.
#[derive(Debug, Clone)]
pub struct TextureBinding {
    pub texture: Texture,
    pub priority: i32,
}

/// A renderable bound to exactly one node.
/// Carries the render state the node forwards to it (color, texture, bin).
#[derive(Clone)]
pub struct Model {
    pub name: String,
    mesh: Rc<Mesh>,
    /// Asset name this model was loaded from, if any.
    pub recipe: Option<String>,
    pub(crate) color_scale: Vec4,
    pub(crate) texture: Option<TextureBinding>,
    pub(crate) texture_off: bool,
    pub(crate) texture_scale: Vec2,
    pub(crate) texture_offset: Vec2,
    pub(crate) bin: Option<i32>,
    pub(crate) transparency: bool,
    /// Offset from the node, external convention (the negated origin).
    pub(crate) offset: Vec3,
    on_assign: Option<AssignHook>,
}

impl Model {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::from_shared(name, Rc::new(mesh))
    }

    /// Build a model around geometry shared with the caller.
    pub fn from_shared(name: impl Into<String>, mesh: Rc<Mesh>) -> Self {
        Self {
            name: name.into(),
            mesh,
            recipe: None,
            color_scale: Vec4::ONE,
            texture: None,
            texture_off: false,
            texture_scale: Vec2::ONE,
            texture_offset: Vec2::ZERO,
            bin: None,
            transparency: false,
            offset: Vec3::ZERO,
            on_assign: None,
        }
    }

    pub fn with_on_assign(mut self, hook: impl Fn(&mut Node) + 'static) -> Self {
        self.on_assign = Some(Rc::new(hook));
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn shared_mesh(&self) -> &Rc<Mesh> {
        &self.mesh
    }

    /// Mutable geometry. Clones the mesh first if it is shared.
    pub fn mesh_mut(&mut self) -> &mut Mesh {
        Rc::make_mut(&mut self.mesh)
    }

    /// Same renderable: same geometry instance under the same name.
    pub fn same_as(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.mesh, &other.mesh) && self.name == other.name
    }

    pub(crate) fn on_assign(&self) -> Option<AssignHook> {
        self.on_assign.clone()
    }

    pub fn color_scale(&self) -> Vec4 {
        self.color_scale
    }

    pub fn texture(&self) -> Option<&TextureBinding> {
        self.texture.as_ref()
    }

    /// Whether texturing is active (a texture is bound and not switched off).
    pub fn is_textured(&self) -> bool {
        self.texture.is_some() && !self.texture_off
    }

    pub fn texture_scale(&self) -> Vec2 {
        self.texture_scale
    }

    pub fn texture_offset(&self) -> Vec2 {
        self.texture_offset
    }

    /// Fixed draw-order bin, if one was set.
    pub fn bin(&self) -> Option<i32> {
        self.bin
    }

    pub fn has_transparency(&self) -> bool {
        self.transparency
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("vertices", &self.mesh.vertices.len())
            .field("color_scale", &self.color_scale)
            .field("texture", &self.texture)
            .field("bin", &self.bin)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
