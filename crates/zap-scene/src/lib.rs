pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod extensions;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::SceneConfig;
pub use api::types::{NodeId, SequenceId};
pub use api::value::Value;
pub use assets::{AssetLibrary, AssetLoader, AssetManifest};
pub use components::model::{Mesh, Model, Vertex};
pub use components::node::Node;
pub use components::script::{Script, ScriptFactory, ScriptRegistry};
pub use components::texture::{Texture, TextureKind};
pub use core::collision::{Collider, ColliderKind, ColliderShape, CollisionWorld};
pub use core::error::NodeError;
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use systems::raycast::{Hit, RayPhase, RayQuery, Raycaster};
pub use systems::resources::STATIC_TEXTURE_PRIORITY;

// Extensions
pub use extensions::{
    AnimateOptions, AnimationRequest, Animator, ShakeOptions,
    Easing, lerp, ease,
    Sequence, SequenceStatus, Step,
    LookAxis, Pose, SCALE_EPSILON,
};
