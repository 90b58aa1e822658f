use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use glam::{Vec2, Vec3};
use crate::assets::loader::AssetLoader;
use crate::assets::manifest::{AssetManifest, MeshDescriptor};
use crate::components::model::{Mesh, Model};
use crate::components::texture::{Texture, TextureKind};

/// In-memory asset store keyed by (search root, name).
/// Meshes are shared between the models loaded from them; every
/// `load_model` call returns a new model.
#[derive(Debug, Default)]
pub struct AssetLibrary {
    meshes: HashMap<(PathBuf, String), Rc<Mesh>>,
    textures: HashMap<(PathBuf, String), Texture>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the `cube`, `quad` and `sphere` primitives under `internal_root`.
    pub fn with_builtins(internal_root: &Path) -> Self {
        let mut library = Self::new();
        for name in ["cube", "quad", "sphere"] {
            if let Some(mesh) = primitive(name) {
                library.add_mesh(internal_root, name, mesh);
            }
        }
        library
    }

    /// Register everything a manifest describes. Entries that cannot be
    /// built are skipped with a warning.
    pub fn load_manifest(&mut self, manifest: &AssetManifest) {
        for (name, desc) in &manifest.meshes {
            match mesh_from(desc) {
                Some(mesh) => self.add_mesh(&manifest.root, name, mesh),
                None => log::warn!("manifest mesh '{}' is invalid, skipped", name),
            }
        }
        for (name, desc) in &manifest.textures {
            let kind = if desc.movie { TextureKind::Movie } else { TextureKind::Static };
            self.add_texture(&manifest.root, Texture::new(name.as_str(), kind, desc.width, desc.height));
        }
    }

    pub fn add_mesh(&mut self, root: &Path, name: &str, mesh: Mesh) {
        self.meshes.insert((root.to_path_buf(), name.to_string()), Rc::new(mesh));
    }

    pub fn add_texture(&mut self, root: &Path, texture: Texture) {
        self.textures
            .insert((root.to_path_buf(), texture.name().to_string()), texture);
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl AssetLoader for AssetLibrary {
    fn load_model(&self, name: &str, root: &Path) -> Option<Model> {
        let mesh = self.meshes.get(&(root.to_path_buf(), name.to_string()))?;
        let mut model = Model::from_shared(name, Rc::clone(mesh));
        model.recipe = Some(name.to_string());
        Some(model)
    }

    fn load_texture(&self, name: &str, root: &Path) -> Option<Texture> {
        self.textures.get(&(root.to_path_buf(), name.to_string())).cloned()
    }
}

fn primitive(name: &str) -> Option<Mesh> {
    match name {
        "cube" => Some(Mesh::cube()),
        "quad" => Some(Mesh::quad()),
        "sphere" => Some(Mesh::sphere(16)),
        _ => None,
    }
}

fn mesh_from(desc: &MeshDescriptor) -> Option<Mesh> {
    if let Some(name) = &desc.primitive {
        return primitive(name);
    }
    if desc.vertices.is_empty() {
        return None;
    }
    let count = desc.vertices.len() as u32;
    if desc.triangles.iter().flatten().any(|&i| i >= count) {
        return None;
    }
    let mut mesh = Mesh::new(
        desc.vertices.iter().map(|v| Vec3::from_array(*v)).collect(),
        desc.triangles.clone(),
    );
    mesh.normals = desc.normals.iter().map(|n| Vec3::from_array(*n)).collect();
    mesh.uvs = desc.uvs.iter().map(|uv| Vec2::from_array(*uv)).collect();
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_live_under_internal_root() {
        let library = AssetLibrary::with_builtins(Path::new("internal"));
        assert_eq!(library.mesh_count(), 3);
        assert!(library.load_model("cube", Path::new("internal")).is_some());
        assert!(library.load_model("cube", Path::new("assets")).is_none());
    }

    #[test]
    fn models_share_geometry_but_not_identity() {
        let library = AssetLibrary::with_builtins(Path::new("internal"));
        let a = library.load_model("quad", Path::new("internal")).unwrap();
        let b = library.load_model("quad", Path::new("internal")).unwrap();
        assert!(Rc::ptr_eq(a.shared_mesh(), b.shared_mesh()));
        assert_eq!(a.recipe.as_deref(), Some("quad"));
    }

    #[test]
    fn loads_from_manifest() {
        let json = r#"{
            "meshes": {
                "tri": { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "triangles": [[0, 1, 2]] },
                "broken": { "vertices": [[0, 0, 0]], "triangles": [[0, 1, 2]] },
                "ball": { "primitive": "sphere" }
            },
            "textures": { "brick": { "width": 8, "height": 8 } }
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        let mut library = AssetLibrary::new();
        library.load_manifest(&manifest);

        assert_eq!(library.mesh_count(), 2);
        let tri = library.load_model("tri", Path::new("assets")).unwrap();
        assert_eq!(tri.mesh().triangles.len(), 1);
        let brick = library.load_texture("brick", Path::new("assets")).unwrap();
        assert_eq!(brick.size(), (8, 8));
        assert!(!brick.is_movie());
    }
}
