pub mod library;
pub mod loader;
pub mod manifest;

pub use library::AssetLibrary;
pub use loader::AssetLoader;
pub use manifest::{AssetManifest, MeshDescriptor, TextureDescriptor};
