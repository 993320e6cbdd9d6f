//=========================================================================
// Stage Context
//=========================================================================
//
// Explicit world context threaded through the stage instead of hidden globals.
//
// Every collaborator a frame needs is owned here and handed out by
// reference: the renderer for the draw pass, the optional physics stepper
// for the step after updates, the properties for coordinate mapping and
// the input snapshot for behaviors.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use log::info;

//=== Internal Dependencies ===============================================

use super::Stage;
use crate::core::collaborators::{PhysicsStepper, Renderer};
use crate::core::config::WorldProperties;
use crate::core::error::StageError;
use crate::core::input::StateTracker;
use crate::core::scene::SceneKey;

//=== StageContext ========================================================

/// Collaborators and shared state owned by a [`Stage`].
pub struct StageContext {
    pub properties: WorldProperties,
    pub renderer: Box<dyn Renderer>,
    pub physics: Option<Box<dyn PhysicsStepper>>,
    pub input: StateTracker,
}

impl fmt::Debug for StageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageContext")
            .field("properties", &self.properties)
            .field("physics", &self.physics.is_some())
            .finish_non_exhaustive()
    }
}

//=== StageBuilder ========================================================

/// Assembles a [`StageContext`] and the [`Stage`] around it.
///
/// A renderer is required. Physics is optional and properties default to
/// [`WorldProperties::default`].
///
/// ```rust
/// use aetheric_stage::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Screen { Title }
/// impl SceneKey for Screen {}
///
/// let stage: Stage<Screen> = StageBuilder::new()
///     .with_properties(WorldProperties::with_resolution(640, 480))
///     .with_renderer(RecordingRenderer::new())
///     .build()
///     .unwrap();
/// assert!(stage.scenes().is_empty());
/// ```
#[derive(Default)]
pub struct StageBuilder {
    properties: WorldProperties,
    renderer: Option<Box<dyn Renderer>>,
    physics: Option<Box<dyn PhysicsStepper>>,
}

impl StageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(mut self, properties: WorldProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_renderer<R>(self, renderer: R) -> Self
    where
        R: Renderer + 'static,
    {
        self.with_boxed_renderer(Box::new(renderer))
    }

    pub fn with_boxed_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_physics<P>(mut self, physics: P) -> Self
    where
        P: PhysicsStepper + 'static,
    {
        self.physics = Some(Box::new(physics));
        self
    }

    pub fn with_boxed_physics(mut self, physics: Box<dyn PhysicsStepper>) -> Self {
        self.physics = Some(physics);
        self
    }

    /// Validates the properties and checks for a renderer.
    pub fn build_context(self) -> Result<StageContext, StageError> {
        self.properties.validate()?;
        let renderer = self
            .renderer
            .ok_or(StageError::MissingCollaborator("renderer"))?;

        info!(
            "Stage context ready ({}x{} device, {}x{} view, physics: {})",
            self.properties.device_width,
            self.properties.device_height,
            self.properties.view_width,
            self.properties.view_height,
            self.physics.is_some()
        );

        Ok(StageContext {
            properties: self.properties,
            renderer,
            physics: self.physics,
            input: StateTracker::new(),
        })
    }

    /// Builds the stage.
    ///
    /// # Errors
    ///
    /// [`StageError::MissingCollaborator`] without a renderer,
    /// [`StageError::InvalidConfig`] for unusable properties.
    pub fn build<K: SceneKey>(self) -> Result<Stage<K>, StageError> {
        self.build_context().map(Stage::with_context)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
