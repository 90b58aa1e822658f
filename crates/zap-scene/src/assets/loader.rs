use std::path::Path;
use crate::components::model::Model;
use crate::components::texture::Texture;
use crate::core::scene::Scene;

/// Asset-loading collaborator. Decoding files is the implementor's concern;
/// the scene only asks for a name under a search root.
pub trait AssetLoader {
    /// A fresh model instance, or `None` if `name` is unknown under `root`.
    fn load_model(&self, name: &str, root: &Path) -> Option<Model>;

    /// A shared texture handle, or `None` if `name` is unknown under `root`.
    fn load_texture(&self, name: &str, root: &Path) -> Option<Texture>;
}

impl Scene {
    /// Resolve a model by name: user asset folder first, then the internal folder.
    pub fn find_model(&self, name: &str) -> Option<Model> {
        self.config().search_roots().into_iter().find_map(|root| {
            let model = self.assets().load_model(name, root);
            if model.is_some() {
                log::trace!("model '{}' found under {}", name, root.display());
            }
            model
        })
    }

    /// Resolve a texture by name with the same search order as models.
    pub fn find_texture(&self, name: &str) -> Option<Texture> {
        self.config()
            .search_roots()
            .into_iter()
            .find_map(|root| self.assets().load_texture(name, root))
    }
}
