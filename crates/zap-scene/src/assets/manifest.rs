use std::collections::HashMap;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Asset manifest describing the meshes and textures available under one
/// search root. Loaded from a JSON file at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Search root the entries are registered under (default: "assets").
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Named meshes.
    #[serde(default)]
    pub meshes: HashMap<String, MeshDescriptor>,
    /// Named textures.
    #[serde(default)]
    pub textures: HashMap<String, TextureDescriptor>,
}

/// A mesh, either a built-in primitive or explicit geometry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshDescriptor {
    /// "cube", "quad" or "sphere". Overrides the geometry fields.
    pub primitive: Option<String>,
    /// Vertex positions, external (Y-up) convention.
    pub vertices: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
}

/// Describes a texture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    /// Movie textures are bound directly instead of at a stage priority.
    #[serde(default)]
    pub movie: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from("assets")
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
