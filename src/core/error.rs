//=========================================================================
// Stage Errors
//=========================================================================
//
// Error taxonomy for the scene graph core.
//
// Categories:
//   Configuration  → fatal at construction (missing renderer, bad sizes)
//   Lifecycle      → soft failures (double attach, stale ids), logged
//   Transition     → invalid scene state requests, logged and ignored
//   Mapping        → coordinate queries that have no defined answer
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::node::NodeId;
use crate::core::scene::SceneState;

//=== StageError ==========================================================

/// Errors surfaced by the stage, the node tree and the scene machinery.
#[derive(Debug, Error)]
pub enum StageError {
    //--- Configuration ----------------------------------------------------

    /// A collaborator the stage cannot run without was not supplied.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// World properties failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// World properties could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    /// World properties could not be written out.
    #[error("configuration serialize error: {0}")]
    ConfigSerialize(String),

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    //--- Lifecycle --------------------------------------------------------

    /// `add_child` was called on a node that still has a parent.
    #[error("node {child:?} is already parented to {parent:?}; detach it first")]
    AlreadyParented { child: NodeId, parent: NodeId },

    /// The id does not resolve to a live node.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected { child: NodeId, parent: NodeId },

    //--- Transitions ------------------------------------------------------

    /// A scene was asked for a state it cannot reach from where it is.
    #[error("scene cannot go from {from:?} to {requested:?}")]
    InvalidTransition {
        from: SceneState,
        requested: SceneState,
    },

    /// The scene key was never registered.
    #[error("unknown scene {0}")]
    UnknownScene(String),

    //--- Coordinate Mapping -----------------------------------------------

    /// The two nodes do not share a root.
    #[error("nodes belong to different trees")]
    DisjointTrees,

    /// A composed transform has no inverse (zero scale).
    #[error("transform is not invertible")]
    SingularTransform,
}

//=== BehaviorError =======================================================

/// Failure reported by a node behavior during its update.
///
/// The frame driver logs these per target and keeps going; one failing
/// node never aborts the frame.
#[derive(Debug, Error)]
pub enum BehaviorError {
    /// Free-form failure message.
    #[error("{0}")]
    Message(String),

    /// A stage operation performed by the behavior failed.
    #[error(transparent)]
    Stage(#[from] StageError),
}

impl BehaviorError {
    /// Convenience constructor for message errors.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Result type returned by [`crate::core::node::Behavior::update`].
pub type BehaviorResult = Result<(), BehaviorError>;

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collaborator_names_the_collaborator() {
        let err = StageError::MissingCollaborator("renderer");
        assert_eq!(err.to_string(), "missing required collaborator: renderer");
    }

    #[test]
    fn invalid_transition_mentions_both_states() {
        let err = StageError::InvalidTransition {
            from: SceneState::OffStage,
            requested: SceneState::TransitionStartOut,
        };
        let text = err.to_string();
        assert!(text.contains("OffStage"));
        assert!(text.contains("TransitionStartOut"));
    }

    #[test]
    fn behavior_error_wraps_stage_error() {
        let err: BehaviorError = StageError::DisjointTrees.into();
        assert_eq!(err.to_string(), "nodes belong to different trees");
    }

    #[test]
    fn serialize_and_parse_failures_read_differently() {
        let written = StageError::ConfigSerialize("unsupported value".into());
        let parsed = StageError::ConfigParse("unexpected token".into());
        assert_eq!(
            written.to_string(),
            "configuration serialize error: unsupported value"
        );
        assert!(!written.to_string().contains("parse"));
        assert!(parsed.to_string().contains("parse"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: StageError = io.into();
        assert!(matches!(err, StageError::Io(_)));
    }
}
