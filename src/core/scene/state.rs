//=========================================================================
// Scene State
//=========================================================================
//
// States of the on/off-stage transition machine:
//
//   OffStage ─► TransitionStartIn ─► TransitioningIn ─► OnStage
//      ▲                                                   │
//      │                                                   ▼
//   ExitedStage ◄─ TransitioningOut ◄─ TransitionStartOut ◄┘
//
// The two `TransitionStart*` states are transient: the controller passes
// through them within the same `notify` call.
//
//=========================================================================

//=== SceneState ==========================================================

/// Where a scene is in its entry/exit animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneState {
    /// Not shown, not registered. Initial state.
    #[default]
    OffStage,

    /// Entry requested.
    TransitionStartIn,

    /// Entry tween running.
    TransitioningIn,

    /// Resting; the exit condition is polled each update.
    OnStage,

    /// Exit requested.
    TransitionStartOut,

    /// Exit tween running.
    TransitioningOut,

    /// Exit finished; waiting for the stack to pop and recycle it.
    ExitedStage,
}

impl SceneState {
    /// True while an entry or exit is in progress.
    pub fn is_transitioning(self) -> bool {
        matches!(
            self,
            Self::TransitionStartIn
                | Self::TransitioningIn
                | Self::TransitionStartOut
                | Self::TransitioningOut
        )
    }

    /// True while the scene root should be drawn.
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::OffStage | Self::ExitedStage)
    }

    /// True for states reached by an entry request.
    pub fn is_entering(self) -> bool {
        matches!(self, Self::TransitionStartIn | Self::TransitioningIn)
    }

    /// True for states reached by an exit request.
    pub fn is_exiting(self) -> bool {
        matches!(self, Self::TransitionStartOut | Self::TransitioningOut)
    }
}

//=== NotifyOutcome =======================================================

/// Result of a valid transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The request changed the state.
    Accepted,

    /// The scene was already heading there; nothing changed.
    Ignored,
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_off_stage() {
        assert_eq!(SceneState::default(), SceneState::OffStage);
    }

    #[test]
    fn visibility_follows_stage_presence() {
        assert!(!SceneState::OffStage.is_visible());
        assert!(!SceneState::ExitedStage.is_visible());
        assert!(SceneState::TransitioningIn.is_visible());
        assert!(SceneState::OnStage.is_visible());
        assert!(SceneState::TransitioningOut.is_visible());
    }

    #[test]
    fn only_animation_states_are_transitioning() {
        assert!(SceneState::TransitioningIn.is_transitioning());
        assert!(SceneState::TransitionStartOut.is_transitioning());
        assert!(!SceneState::OnStage.is_transitioning());
        assert!(!SceneState::ExitedStage.is_transitioning());
    }
}
