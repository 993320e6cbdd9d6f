//=========================================================================
// Scene Controller
//=========================================================================
//
// Drives one scene root through the on/off-stage state machine.
//
// Entry and exit:
//   notify(TransitionStartIn)  stage root, show it, tween offstage → rest
//   tween finished             OnStage, position snapped to rest
//   notify(TransitionStartOut) tween current → offstage
//   tween finished             ExitedStage, root unstaged and hidden
//   notify(OffStage)           recycle (the stack acknowledges the exit)
//
// Requests that reverse a running animation overwrite the active tween and
// start from wherever the root currently is. Repeated requests in the
// current direction are ignored. Anything else is rejected with
// `StageError::InvalidTransition` and leaves the controller untouched.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use kurbo::{Point, Vec2};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::state::{NotifyOutcome, SceneState};
use super::tween::{Easing, Tween};
use crate::core::config::WorldProperties;
use crate::core::error::StageError;
use crate::core::node::{NodeId, NodeTree};
use crate::core::registry::TargetRegistry;

//=== SlideDirection ======================================================

/// Side of the view a scene slides in from (and back out to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideDirection {
    #[default]
    Left,
    Right,
    Up,
    Down,
    /// Position is not animated; only the timing runs.
    None,
}

impl SlideDirection {
    /// Offstage displacement relative to the rest position.
    pub fn offset(self, props: &WorldProperties) -> Vec2 {
        // "Up" is towards the top of the screen in either Y convention.
        let up = if props.flip_y {
            props.view_height
        } else {
            -props.view_height
        };

        match self {
            Self::Left => Vec2::new(-props.view_width, 0.0),
            Self::Right => Vec2::new(props.view_width, 0.0),
            Self::Up => Vec2::new(0.0, up),
            Self::Down => Vec2::new(0.0, -up),
            Self::None => Vec2::ZERO,
        }
    }
}

//=== TransitionConfig ====================================================

/// How a scene animates on and off stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionConfig {
    pub duration: Duration,
    pub direction: SlideDirection,
    pub easing: Easing,
    pub rest_position: Point,
}

impl TransitionConfig {
    /// Defaults: configured duration, slide from the left, ease-out-cubic,
    /// resting at the view origin.
    pub fn from_properties(props: &WorldProperties) -> Self {
        Self {
            duration: props.transition_duration(),
            direction: SlideDirection::default(),
            easing: Easing::default(),
            rest_position: Point::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_direction(mut self, direction: SlideDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_rest_position(mut self, rest_position: Point) -> Self {
        self.rest_position = rest_position;
        self
    }
}

//=== SceneController =====================================================

#[derive(Debug)]
pub struct SceneController {
    root: NodeId,
    state: SceneState,
    transition_duration: Duration,
    easing: Easing,
    rest_position: Point,
    offstage_offset: Vec2,
    tween: Option<Tween>,
}

impl SceneController {
    //--- Construction -----------------------------------------------------

    pub fn new(root: NodeId, config: &TransitionConfig, props: &WorldProperties) -> Self {
        Self {
            root,
            state: SceneState::OffStage,
            transition_duration: config.duration,
            easing: config.easing,
            rest_position: config.rest_position,
            offstage_offset: config.direction.offset(props),
            tween: None,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn transition_duration(&self) -> Duration {
        self.transition_duration
    }

    pub fn rest_position(&self) -> Point {
        self.rest_position
    }

    pub fn offstage_position(&self) -> Point {
        self.rest_position + self.offstage_offset
    }

    /// The running tween, if any.
    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    //--- Requests ---------------------------------------------------------

    /// Requests a state change.
    pub fn notify(
        &mut self,
        requested: SceneState,
        tree: &mut NodeTree,
        registry: &mut TargetRegistry,
    ) -> Result<NotifyOutcome, StageError> {
        use SceneState::*;

        match (self.state, requested) {
            (OffStage, TransitionStartIn) => {
                let start = self.offstage_position();
                self.begin_in(start, tree, registry)?;
            }
            (ExitedStage, TransitionStartIn) => {
                self.recycle(tree);
                let start = self.offstage_position();
                self.begin_in(start, tree, registry)?;
            }
            (TransitionStartOut | TransitioningOut, TransitionStartIn) => {
                let start = self.current_position(tree);
                self.begin_in(start, tree, registry)?;
            }
            (OnStage | TransitionStartIn | TransitioningIn, TransitionStartOut) => {
                self.begin_out(tree);
            }
            (ExitedStage, OffStage) => {
                self.recycle(tree);
            }
            (TransitionStartIn | TransitioningIn | OnStage, TransitionStartIn)
            | (TransitionStartOut | TransitioningOut | ExitedStage, TransitionStartOut)
            | (OffStage, OffStage) => {
                debug!(
                    "Scene root {:?} already {:?}, ignoring {:?}",
                    self.root, self.state, requested
                );
                return Ok(NotifyOutcome::Ignored);
            }
            (from, requested) => {
                return Err(StageError::InvalidTransition { from, requested });
            }
        }

        Ok(NotifyOutcome::Accepted)
    }

    //--- Per-Frame --------------------------------------------------------

    /// Advances the running tween, or polls `exit` while on stage.
    ///
    /// Returns the state after the update.
    pub fn update<F>(
        &mut self,
        dt: Duration,
        tree: &mut NodeTree,
        registry: &mut TargetRegistry,
        exit: F,
    ) -> SceneState
    where
        F: FnOnce(&mut NodeTree, &mut TargetRegistry) -> bool,
    {
        match self.state {
            SceneState::TransitioningIn | SceneState::TransitioningOut => {
                self.advance_tween(dt, tree, registry);
            }
            SceneState::OnStage => {
                if exit(tree, registry) {
                    debug!("Scene root {:?} exit condition met", self.root);
                    self.begin_out(tree);
                }
            }
            _ => {}
        }

        self.state
    }

    /// Puts the root at its offstage position, hidden.
    pub fn park(&self, tree: &mut NodeTree) {
        tree.set_position(self.root, self.offstage_position());
        tree.set_visible(self.root, false);
    }

    //--- Internal Helpers -------------------------------------------------

    fn advance_tween(&mut self, dt: Duration, tree: &mut NodeTree, registry: &mut TargetRegistry) {
        let Some(tween) = self.tween.as_mut() else {
            return;
        };

        let step = tween.advance(dt);
        tree.set_position(self.root, step.value);
        trace!(
            "Scene root {:?} at ({:.2}, {:.2})",
            self.root,
            step.value.x,
            step.value.y
        );

        if !step.finished {
            return;
        }

        self.tween = None;
        match self.state {
            SceneState::TransitioningIn => {
                tree.set_position(self.root, self.rest_position);
                self.set_state(SceneState::OnStage);
            }
            SceneState::TransitioningOut => {
                tree.unstage(self.root, registry);
                tree.set_visible(self.root, false);
                self.set_state(SceneState::ExitedStage);
            }
            _ => {}
        }
    }

    fn begin_in(
        &mut self,
        start: Point,
        tree: &mut NodeTree,
        registry: &mut TargetRegistry,
    ) -> Result<(), StageError> {
        tree.stage(self.root, registry)?;

        self.set_state(SceneState::TransitionStartIn);
        tree.set_visible(self.root, true);
        tree.set_position(self.root, start);

        self.tween = Some(Tween::new(
            start,
            self.rest_position,
            self.transition_duration,
            self.easing,
        ));
        self.set_state(SceneState::TransitioningIn);
        Ok(())
    }

    fn begin_out(&mut self, tree: &mut NodeTree) {
        self.set_state(SceneState::TransitionStartOut);

        let start = self.current_position(tree);
        self.tween = Some(Tween::new(
            start,
            self.offstage_position(),
            self.transition_duration,
            self.easing,
        ));
        self.set_state(SceneState::TransitioningOut);
    }

    fn recycle(&mut self, tree: &mut NodeTree) {
        self.tween = None;
        self.park(tree);
        self.set_state(SceneState::OffStage);
    }

    fn current_position(&self, tree: &NodeTree) -> Point {
        tree.position(self.root).unwrap_or(self.rest_position)
    }

    fn set_state(&mut self, next: SceneState) {
        debug!("Scene root {:?}: {:?} -> {:?}", self.root, self.state, next);
        self.state = next;
    }
}

//=== ExitTimer ===========================================================

/// Exit condition that fires once a scene has been on stage long enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitTimer {
    limit: Duration,
    elapsed: Duration,
}

impl ExitTimer {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            elapsed: Duration::ZERO,
        }
    }

    /// Accumulates `dt`; true once the limit is reached.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.limit
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed)
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    //--- Test Helpers -----------------------------------------------------

    struct Fixture {
        tree: NodeTree,
        registry: TargetRegistry,
        controller: SceneController,
    }

    fn fixture(config: impl FnOnce(TransitionConfig) -> TransitionConfig) -> Fixture {
        let props = WorldProperties::with_resolution(800, 600);
        let mut tree = NodeTree::new();
        let root = tree.create("scene");
        let config = config(TransitionConfig::from_properties(&props));
        let controller = SceneController::new(root, &config, &props);
        controller.park(&mut tree);

        Fixture {
            tree,
            registry: TargetRegistry::new(),
            controller,
        }
    }

    impl Fixture {
        fn notify(&mut self, state: SceneState) -> Result<NotifyOutcome, StageError> {
            self.controller
                .notify(state, &mut self.tree, &mut self.registry)
        }

        fn update(&mut self, dt: Duration) -> SceneState {
            self.controller
                .update(dt, &mut self.tree, &mut self.registry, |_, _| false)
        }

        fn run_until(&mut self, state: SceneState, dt: Duration) -> usize {
            let mut frames = 0;
            while self.controller.state() != state {
                self.update(dt);
                frames += 1;
                assert!(frames < 10_000, "never reached {:?}", state);
            }
            frames
        }

        fn root_x(&self) -> f64 {
            self.tree.position(self.controller.root()).unwrap().x
        }
    }

    const STEP: Duration = Duration::from_micros(16_600);

    //=====================================================================
    // Entry & Exit
    //=====================================================================

    #[test]
    fn start_in_goes_straight_to_transitioning_in() {
        let mut f = fixture(|c| c);
        assert_eq!(f.controller.state(), SceneState::OffStage);
        assert!(!f.tree.is_visible(f.controller.root()));

        assert_eq!(f.notify(SceneState::TransitionStartIn).unwrap(), NotifyOutcome::Accepted);

        assert_eq!(f.controller.state(), SceneState::TransitioningIn);
        assert!(f.tree.is_visible(f.controller.root()));
        assert!(f.tree.is_staged(f.controller.root()));
        assert_abs_diff_eq!(f.root_x(), -800.0, epsilon = 1e-9);
    }

    #[test]
    fn entry_lands_exactly_on_rest_position() {
        let mut f = fixture(|c| c);
        f.notify(SceneState::TransitionStartIn).unwrap();

        let frames = f.run_until(SceneState::OnStage, STEP);

        assert_eq!(frames, 31);
        assert_eq!(f.root_x(), 0.0);
        assert!(f.controller.tween().is_none());
    }

    #[test]
    fn exit_hides_and_unstages_root() {
        let mut f = fixture(|c| c.with_duration(Duration::from_millis(100)));
        f.notify(SceneState::TransitionStartIn).unwrap();
        f.run_until(SceneState::OnStage, STEP);

        f.notify(SceneState::TransitionStartOut).unwrap();
        assert_eq!(f.controller.state(), SceneState::TransitioningOut);

        f.run_until(SceneState::ExitedStage, STEP);
        let root = f.controller.root();
        assert!(!f.tree.is_visible(root));
        assert!(!f.tree.is_staged(root));
        assert_abs_diff_eq!(f.root_x(), -800.0, epsilon = 1e-9);

        f.notify(SceneState::OffStage).unwrap();
        assert_eq!(f.controller.state(), SceneState::OffStage);
    }

    #[test]
    fn exit_condition_polled_only_on_stage() {
        let mut f = fixture(|c| c.with_duration(Duration::from_millis(50)));
        let mut polls = 0;

        f.notify(SceneState::TransitionStartIn).unwrap();
        while f.controller.state() != SceneState::OnStage {
            f.controller.update(STEP, &mut f.tree, &mut f.registry, |_, _| {
                polls += 1;
                true
            });
        }
        assert_eq!(polls, 0);

        let state = f.controller.update(STEP, &mut f.tree, &mut f.registry, |_, _| {
            polls += 1;
            true
        });
        assert_eq!(polls, 1);
        assert_eq!(state, SceneState::TransitioningOut);
    }

    #[test]
    fn slide_none_keeps_rest_position() {
        let mut f = fixture(|c| {
            c.with_direction(SlideDirection::None)
                .with_rest_position(Point::new(5.0, 5.0))
        });
        f.notify(SceneState::TransitionStartIn).unwrap();
        f.update(STEP);
        assert_eq!(f.tree.position(f.controller.root()), Some(Point::new(5.0, 5.0)));
    }

    //=====================================================================
    // Request Validation
    //=====================================================================

    #[test]
    fn repeated_requests_are_ignored() {
        let mut f = fixture(|c| c);
        f.notify(SceneState::TransitionStartIn).unwrap();
        assert_eq!(f.notify(SceneState::TransitionStartIn).unwrap(), NotifyOutcome::Ignored);

        f.notify(SceneState::TransitionStartOut).unwrap();
        assert_eq!(f.notify(SceneState::TransitionStartOut).unwrap(), NotifyOutcome::Ignored);
        assert_eq!(f.controller.state(), SceneState::TransitioningOut);
    }

    #[test]
    fn invalid_requests_leave_state_untouched() {
        let mut f = fixture(|c| c);

        let err = f.notify(SceneState::TransitionStartOut).unwrap_err();
        assert!(matches!(
            err,
            StageError::InvalidTransition {
                from: SceneState::OffStage,
                requested: SceneState::TransitionStartOut
            }
        ));
        assert!(f.notify(SceneState::OnStage).is_err());
        assert_eq!(f.controller.state(), SceneState::OffStage);

        f.notify(SceneState::TransitionStartIn).unwrap();
        assert!(f.notify(SceneState::OffStage).is_err());
        assert_eq!(f.controller.state(), SceneState::TransitioningIn);
    }

    #[test]
    fn reversal_restarts_from_current_position() {
        let mut f = fixture(|c| c);
        f.notify(SceneState::TransitionStartIn).unwrap();
        for _ in 0..5 {
            f.update(STEP);
        }
        let midway = f.root_x();
        assert!(midway > -800.0 && midway < 0.0);

        f.notify(SceneState::TransitionStartOut).unwrap();
        let tween = f.controller.tween().unwrap();
        assert_eq!(tween.start().x, midway);
        assert_eq!(tween.target().x, -800.0);

        f.notify(SceneState::TransitionStartIn).unwrap();
        assert_eq!(f.controller.state(), SceneState::TransitioningIn);
        assert_eq!(f.controller.tween().unwrap().target().x, 0.0);
    }

    #[test]
    fn exited_scene_can_reenter_directly() {
        let mut f = fixture(|c| c.with_duration(Duration::ZERO));
        f.notify(SceneState::TransitionStartIn).unwrap();
        f.update(STEP);
        f.notify(SceneState::TransitionStartOut).unwrap();
        f.update(STEP);
        assert_eq!(f.controller.state(), SceneState::ExitedStage);

        f.notify(SceneState::TransitionStartIn).unwrap();
        assert_eq!(f.controller.state(), SceneState::TransitioningIn);
        assert!(f.tree.is_staged(f.controller.root()));
    }

    //=====================================================================
    // ExitTimer
    //=====================================================================

    #[test]
    fn exit_timer_expires_after_limit() {
        let mut timer = ExitTimer::new(Duration::from_millis(40));
        assert!(!timer.tick(Duration::from_millis(20)));
        assert_eq!(timer.remaining(), Duration::from_millis(20));
        assert!(timer.tick(Duration::from_millis(20)));

        timer.reset();
        assert!(!timer.is_expired());
    }
}
