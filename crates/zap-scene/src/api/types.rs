/// Unique identifier for a node in the scene.
/// Ids are never reused within a scene, so a stale id simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The scene root. Always live, never destroyed.
    pub const ROOT: NodeId = NodeId(0);
}

/// Handle to an animation sequence owned by an `Animator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(pub u32);
