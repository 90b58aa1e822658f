// extensions/mod.rs
//
// Transform mapping, easing and the animation sequencer.
// Built on top of Scene/Node; games opt in by creating an Animator.

pub mod animator;
pub mod easing;
pub mod sequence;
pub mod transform;

pub use animator::{AnimateOptions, AnimationRequest, Animator, ShakeOptions};
pub use easing::{Easing, lerp, lerp_vec2, lerp_vec3, lerp_vec4, ease};
pub use sequence::{Sequence, SequenceStatus, Step};
pub use transform::{LookAxis, Pose, SCALE_EPSILON};
