use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Configuration for a scene, provided by the host application.
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// User asset search root, tried first for models and textures.
    pub asset_folder: PathBuf,
    /// Built-in asset root, tried when the user folder has no match.
    pub internal_models_folder: PathBuf,
    /// Expected frame rate; default animation resolution is one step per frame.
    pub animation_fps: f32,
    /// Color given to new nodes (RGBA).
    pub default_color: [f32; 4],
    /// Box collider size used when no model is bound.
    pub default_box_size: [f32; 3],
    /// Radius of `sphere` colliders.
    pub default_sphere_radius: f32,
    /// Node-name suffixes that mark an asset-file boundary for ray hits.
    pub asset_extensions: Vec<String>,
    /// Texture name used as the reflection map of new nodes.
    pub reflection_map: Option<String>,
    /// Seed for shake offsets.
    pub rng_seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_folder: PathBuf::from("assets"),
            internal_models_folder: PathBuf::from("internal/models"),
            animation_fps: 60.0,
            default_color: [1.0, 1.0, 1.0, 1.0],
            default_box_size: [1.0, 1.0, 1.0],
            default_sphere_radius: 0.5,
            asset_extensions: [".egg", ".bam", ".gltf", ".glb", ".obj"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reflection_map: None,
            rng_seed: 0x5eed,
        }
    }
}

impl SceneConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Search roots for assets, in lookup order.
    pub fn search_roots(&self) -> [&PathBuf; 2] {
        [&self.asset_folder, &self.internal_models_folder]
    }

    /// Whether a node name marks an asset-file boundary.
    pub fn is_asset_boundary(&self, name: &str) -> bool {
        self.asset_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SceneConfig::from_json(r#"{ "animation_fps": 30.0 }"#).unwrap();
        assert_eq!(config.animation_fps, 30.0);
        assert_eq!(config.default_sphere_radius, 0.5);
    }

    #[test]
    fn asset_boundary_by_suffix() {
        let config = SceneConfig::default();
        assert!(config.is_asset_boundary("tree.egg"));
        assert!(!config.is_asset_boundary("tree"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(SceneConfig::from_json("{ nope").is_err());
    }
}
