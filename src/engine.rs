//=========================================================================
// Aetheric Stage Engine
//
// Windowed runtime around a `Stage`.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_properties()       ├─ init(|stage| ...)
//         ├─ with_tps()              └─ run(): spawns logic thread,
//         ├─ with_channel_capacity()           runs platform,
//         ├─ with_renderer()                   blocks until exit
//         └─ with_physics()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::collaborators::{PhysicsStepper, Renderer};
use crate::core::config::WorldProperties;
use crate::core::error::StageError;
use crate::core::platform_bridge::{PlatformError, PlatformEvent};
use crate::core::scene::SceneKey;
use crate::core::stage::{Stage, StageBuilder};
use crate::core::CoreSystemsOrchestrator;
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Properties**: [`WorldProperties::default`]
/// - **TPS**: derived from `ms_per_update` (16.6ms → ~60 ticks per second)
/// - **Channel capacity**: 128 messages
///
/// A renderer must be supplied; [`EngineBuilder::build`] fails without one.
///
/// # Examples
///
/// ```no_run
/// use aetheric_stage::prelude::*;
/// # use std::time::Duration;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Screen { Title }
/// impl SceneKey for Screen {}
///
/// struct Title;
/// impl Scene<Screen> for Title {
///     fn update(&mut self, _ctx: &mut SceneContext<'_, Screen>, _dt: Duration) {}
/// }
///
/// EngineBuilder::<Screen>::new()
///     .with_tps(120.0)
///     .with_renderer(RecordingRenderer::new())
///     .build()?
///     .init(|stage| {
///         stage.register_scene(Screen::Title, Title)?;
///         stage.request(SceneTransition::Push(Screen::Title));
///         Ok(())
///     })?
///     .run()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EngineBuilder<K: SceneKey> {
    properties: WorldProperties,
    tps: Option<f64>,
    channel_capacity: usize,
    renderer: Option<Box<dyn Renderer>>,
    physics: Option<Box<dyn PhysicsStepper>>,
    _phantom: std::marker::PhantomData<K>,
}

impl<K: SceneKey> EngineBuilder<K> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            properties: WorldProperties::default(),
            tps: None,
            channel_capacity: 128,
            renderer: None,
            physics: None,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Device, view and window configuration.
    pub fn with_properties(mut self, properties: WorldProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// Overrides the rate implied by `ms_per_update`. Each tick advances
    /// the stage by exactly `1 / tps` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = Some(tps);
        self
    }

    /// Sets the channel capacity for platform → core communication.
    ///
    /// The platform blocks when the channel is full, so a small capacity
    /// throttles input rather than dropping it.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn with_renderer<R>(mut self, renderer: R) -> Self
    where
        R: Renderer + 'static,
    {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_physics<P>(mut self, physics: P) -> Self
    where
        P: PhysicsStepper + 'static,
    {
        self.physics = Some(Box::new(physics));
        self
    }

    /// Ticks per second the engine will run at.
    pub fn tps(&self) -> f64 {
        self.tps
            .unwrap_or_else(|| 1000.0 / self.properties.ms_per_update)
    }

    /// Builds the stage and the engine around it.
    ///
    /// # Errors
    ///
    /// [`StageError::MissingCollaborator`] without a renderer,
    /// [`StageError::InvalidConfig`] for unusable properties.
    pub fn build(self) -> Result<Engine<K>, StageError> {
        let tps = self.tps();
        info!("Building engine (TPS: {:.1}, channel: {})", tps, self.channel_capacity);

        let mut stage = StageBuilder::new().with_properties(self.properties);
        if let Some(renderer) = self.renderer {
            stage = stage.with_boxed_renderer(renderer);
        }
        if let Some(physics) = self.physics {
            stage = stage.with_boxed_physics(physics);
        }

        Ok(Engine {
            orchestrator: CoreSystemsOrchestrator::new(stage.build()?),
            tps,
            channel_capacity: self.channel_capacity,
        })
    }
}

impl<K: SceneKey> Default for EngineBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Windowed runtime.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreSystemsOrchestrator (Logic Thread @ TPS)
///   │     └─► Stage::tick: events, updates, physics, scenes, draw
///   │
///   └─► Platform (winit Event Loop)
///         └─► Window, input conversion and batching
///
/// Communication: bounded crossbeam channel (PlatformEvent)
/// ```
pub struct Engine<K: SceneKey> {
    orchestrator: CoreSystemsOrchestrator<K>,
    tps: f64,
    channel_capacity: usize,
}

impl<K: SceneKey> Engine<K> {
    //--- Initialization ---------------------------------------------------

    /// Gives mutable access to the stage before it moves to the logic
    /// thread: register scenes, push the first one, register shapes.
    pub fn init<F>(mut self, init_fn: F) -> Result<Self, StageError>
    where
        F: FnOnce(&mut Stage<K>) -> Result<(), StageError>,
    {
        info!("Initializing stage");
        init_fn(self.orchestrator.stage_mut())?;
        info!("Stage initialization complete");
        Ok(self)
    }

    pub fn stage(&mut self) -> &mut Stage<K> {
        self.orchestrator.stage_mut()
    }

    //--- Execution --------------------------------------------------------

    /// Starts the runtime and blocks until the window closes.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the platform → core channel
    /// 2. Spawns the logic thread at the configured TPS
    /// 3. Runs the platform event loop on this thread
    /// 4. On close: `WindowClosed` stops the logic thread, then it is joined
    ///
    /// A panic on the logic thread is logged; the platform keeps running so
    /// the window can still be closed.
    pub fn run(self) -> Result<(), PlatformError> {
        info!("Starting engine runtime (TPS: {:.1})", self.tps);

        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);

        let properties = self.orchestrator_properties();
        let core_handle = self.orchestrator.spawn_core_thread(rx, self.tps);
        info!("Core logic thread spawned");

        let result = Platform::new(tx, &properties).run();
        if let Err(e) = &result {
            error!("Platform error: {}", e);
        }
        info!("Platform event loop exited");

        match core_handle.join() {
            Ok(()) => info!("Core thread terminated cleanly"),
            Err(e) => error!("Core thread panicked: {:?}", e),
        }

        info!("Engine shutdown complete");
        result
    }

    fn orchestrator_properties(&self) -> WorldProperties {
        self.orchestrator.stage().properties().clone()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collaborators::RecordingRenderer;
    use crate::core::scene::{Scene, SceneContext, SceneState, SceneTransition};
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestScene {
        Main,
    }

    impl SceneKey for TestScene {}

    struct Idle;

    impl Scene<TestScene> for Idle {
        fn update(&mut self, _ctx: &mut SceneContext<'_, TestScene>, _dt: Duration) {}
    }

    fn builder() -> EngineBuilder<TestScene> {
        EngineBuilder::new().with_renderer(RecordingRenderer::new())
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::<TestScene>::new();
        assert_eq!(builder.channel_capacity, 128);
        assert!((builder.tps() - 1000.0 / 16.6).abs() < 1e-9);
    }

    #[test]
    fn builder_with_tps_overrides_update_step() {
        let builder = EngineBuilder::<TestScene>::new().with_tps(120.0);
        assert_eq!(builder.tps(), 120.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::<TestScene>::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_negative() {
        EngineBuilder::<TestScene>::new().with_tps(-60.0);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::<TestScene>::new().with_channel_capacity(0);
    }

    #[test]
    fn build_requires_renderer() {
        let err = EngineBuilder::<TestScene>::new().build().err().unwrap();
        assert!(matches!(err, StageError::MissingCollaborator("renderer")));
    }

    #[test]
    fn build_rejects_infinite_update_step() {
        let properties = WorldProperties {
            ms_per_update: f64::INFINITY,
            ..WorldProperties::default()
        };
        let err = builder().with_properties(properties).build().err().unwrap();
        assert!(matches!(err, StageError::InvalidConfig(_)));
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = builder()
            .with_properties(WorldProperties::with_resolution(1024, 768))
            .with_tps(30.0)
            .with_channel_capacity(256)
            .build()
            .unwrap();

        assert_eq!(engine.tps, 30.0);
        assert_eq!(engine.channel_capacity, 256);
        assert_eq!(engine.orchestrator_properties().device_width, 1024);
    }

    //=====================================================================
    // Engine Tests
    //=====================================================================

    #[test]
    fn init_configures_stage() {
        let mut engine = builder()
            .build()
            .unwrap()
            .init(|stage| {
                stage.register_scene(TestScene::Main, Idle)?;
                stage.request(SceneTransition::Push(TestScene::Main));
                Ok(())
            })
            .unwrap();

        let stage = engine.stage();
        assert_eq!(stage.scene_state(TestScene::Main), Some(SceneState::OffStage));
        stage.flush_transitions();
        assert_eq!(stage.scene_state(TestScene::Main), Some(SceneState::TransitioningIn));
    }

    #[test]
    fn init_propagates_errors() {
        let result = builder()
            .build()
            .unwrap()
            .init(|_| Err(StageError::UnknownScene("Missing".into())));
        assert!(result.is_err());
    }
}
