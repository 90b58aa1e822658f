use crate::api::types::NodeId;

/// Failures raised while applying a property to a node.
///
/// None of these are fatal: `Scene::set` logs them and keeps the node in its
/// last valid state. `Scene::try_set` surfaces them to callers that care.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// Model or texture asset missing from every search root.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Unrecognized collider tag.
    #[error("'{0}' is not a collider")]
    InvalidColliderKind(String),

    /// Reparent target rejected by the scene graph.
    #[error("invalid parent {parent:?} for node {node:?}")]
    InvalidParent { node: NodeId, parent: NodeId },

    /// Property needs a bound resource that is absent (silently skipped).
    #[error("'{property}' requires a bound {requires}")]
    MissingTransformData {
        property: &'static str,
        requires: &'static str,
    },

    /// Payload has the wrong type or shape for the property.
    #[error("invalid value for '{property}': expected {expected}, got {got}")]
    InvalidValue {
        property: String,
        expected: &'static str,
        got: &'static str,
    },

    /// Id does not name a live node.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// A behavior script hook failed.
    #[error("script '{script}' failed: {reason}")]
    Script { script: String, reason: String },
}

impl NodeError {
    pub(crate) fn invalid(property: &str, expected: &'static str, got: &crate::api::value::Value) -> Self {
        NodeError::InvalidValue {
            property: property.to_string(),
            expected,
            got: got.kind(),
        }
    }

    /// Errors that are expected no-ops rather than mistakes.
    pub fn is_silent(&self) -> bool {
        matches!(self, NodeError::MissingTransformData { .. })
    }
}
