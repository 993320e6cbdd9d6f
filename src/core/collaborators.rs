//=========================================================================
// External Collaborators
//=========================================================================
//
// Narrow contracts for the systems the scene graph talks to but does not
// implement: the shape renderer and the physics stepper.
//
// The core only ever hands the renderer a composed matrix per node. Shape
// batching, atlases, shaders and GPU resources live behind the trait.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use kurbo::{Affine, Point};

//=== Shape Types =========================================================

/// Handle returned by [`Renderer::add_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u32);

/// Primitive assembly mode for a registered shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Triangles,
    TriangleStrip,
    TriangleFan,
    Lines,
    LineLoop,
    Points,
}

/// Straight RGBA color, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Opaque render payload carried by a node.
///
/// The draw pass sets the color and renders the shape with the node's
/// composed matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPayload {
    pub shape: ShapeId,
    pub color: Rgba,
}

//=== Renderer ============================================================

/// Shape registry and draw sink.
pub trait Renderer: Send {
    /// Registers a shape and returns its handle.
    fn add_shape(
        &mut self,
        name: &str,
        vertices: &[Point],
        indices: &[u16],
        mode: DrawMode,
    ) -> ShapeId;

    /// Sets the color used by subsequent [`Renderer::render`] calls.
    fn set_color(&mut self, color: Rgba);

    /// Draws a registered shape with the given composed matrix.
    fn render(&mut self, shape: ShapeId, matrix: Affine);

    /// Called once before the draw pass of a frame.
    fn begin_frame(&mut self) {}

    /// Called once after the draw pass of a frame.
    fn end_frame(&mut self) {}
}

//=== PhysicsStepper ======================================================

/// Rigid-body simulation stepped once per tick.
///
/// Position/rotation synchronization between bodies and nodes is glue code
/// outside the core (typically a node behavior holding body handles).
pub trait PhysicsStepper: Send {
    fn step(&mut self, dt: Duration);
}

//=== RecordingRenderer ===================================================

/// One call observed by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    AddShape { name: String, id: ShapeId },
    SetColor(Rgba),
    Render { shape: ShapeId, matrix: Affine },
    BeginFrame,
    EndFrame,
}

/// Headless renderer that records every call.
///
/// Useful for tests, tools and running the stage without a GPU. Clones
/// share the same log so a handle can be kept after the renderer has been
/// boxed into the stage.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<RenderCall>>>,
    next_shape: u32,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks and returns the recorded calls.
    pub fn calls(&self) -> MutexGuard<'_, Vec<RenderCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Matrices passed to `render`, in draw order.
    pub fn rendered(&self) -> Vec<(ShapeId, Affine)> {
        self.calls()
            .iter()
            .filter_map(|call| match call {
                RenderCall::Render { shape, matrix } => Some((*shape, *matrix)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls().clear();
    }

    fn record(&self, call: RenderCall) {
        self.calls().push(call);
    }
}

impl Renderer for RecordingRenderer {
    fn add_shape(
        &mut self,
        name: &str,
        _vertices: &[Point],
        _indices: &[u16],
        _mode: DrawMode,
    ) -> ShapeId {
        let id = ShapeId(self.next_shape);
        self.next_shape += 1;
        self.record(RenderCall::AddShape {
            name: name.to_string(),
            id,
        });
        id
    }

    fn set_color(&mut self, color: Rgba) {
        self.record(RenderCall::SetColor(color));
    }

    fn render(&mut self, shape: ShapeId, matrix: Affine) {
        self.record(RenderCall::Render { shape, matrix });
    }

    fn begin_frame(&mut self) {
        self.record(RenderCall::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.record(RenderCall::EndFrame);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
