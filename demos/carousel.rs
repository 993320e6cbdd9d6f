//=========================================================================
// Carousel Demo
//=========================================================================
//
// Three slides rotate through the stage every few seconds, each sliding
// in from the left while the previous one slides out. Space opens a
// transparent overlay; Escape closes it.
//
// There is no GPU backend here: `TraceRenderer` logs draw calls, so run
// with `RUST_LOG=carousel=trace` to watch the matrices.
//
//=========================================================================

use std::f64::consts::TAU;
use std::time::Duration;

use aetheric_stage::prelude::*;
use log::{info, trace};

//=== Scene Keys ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Screen {
    Red,
    Green,
    Blue,
    Overlay,
}

impl SceneKey for Screen {}

//=== Renderer ============================================================

#[derive(Default)]
struct TraceRenderer {
    shapes: Vec<String>,
    color: Rgba,
    calls: usize,
}

impl Renderer for TraceRenderer {
    fn add_shape(&mut self, name: &str, vertices: &[Point], indices: &[u16], mode: DrawMode) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        info!(
            target: "carousel",
            "Shape {:?} '{}' ({} vertices, {} indices, {:?})",
            id,
            name,
            vertices.len(),
            indices.len(),
            mode
        );
        self.shapes.push(name.to_string());
        id
    }

    fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    fn render(&mut self, shape: ShapeId, matrix: Affine) {
        self.calls += 1;
        let [a, b, c, d, e, f] = matrix.as_coeffs();
        trace!(
            target: "carousel",
            "{} {:?} [{:.2} {:.2} {:.2} {:.2} | {:.1} {:.1}]",
            self.shapes.get(shape.0 as usize).map_or("?", String::as_str),
            self.color,
            a, b, c, d, e, f
        );
    }

    fn end_frame(&mut self) {
        trace!(target: "carousel", "{} draw calls", self.calls);
        self.calls = 0;
    }
}

//=== Behaviors ===========================================================

/// Rotates its node at a fixed angular speed.
struct Spinner {
    turns_per_second: f64,
}

impl Behavior for Spinner {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>, dt: Duration) -> BehaviorResult {
        ctx.tree
            .rotate_by(ctx.node, self.turns_per_second * TAU * dt.as_secs_f64());
        Ok(())
    }
}

/// Grows while the pointer button is held over it.
struct PressToGrow {
    half: f64,
    pressed: bool,
}

impl Behavior for PressToGrow {
    fn capabilities(&self) -> Capabilities {
        Capabilities::EVENTS
    }

    fn handle_event(&mut self, ctx: &mut EventContext<'_>, event: &InputEvent) -> EventResponse {
        match event {
            InputEvent::MouseButtonDown { button: MouseButton::Left, .. } => {
                let Ok(local) = ctx.pointer_local() else {
                    return EventResponse::Ignored;
                };
                if local.x.abs() > self.half || local.y.abs() > self.half {
                    return EventResponse::Ignored;
                }
                self.pressed = true;
                ctx.tree.set_scale(ctx.node, 1.5, 1.5);
                EventResponse::Handled
            }
            InputEvent::MouseButtonUp { button: MouseButton::Left, .. } if self.pressed => {
                self.pressed = false;
                ctx.tree.set_scale(ctx.node, 1.0, 1.0);
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }
}

//=== Scenes ==============================================================

struct Slide {
    square: ShapeId,
    color: Rgba,
    next: Screen,
    timer: ExitTimer,
}

impl Scene<Screen> for Slide {
    fn build(&mut self, ctx: &mut SceneContext<'_, Screen>) -> Result<(), StageError> {
        for (i, x) in [-200.0, 0.0, 200.0].into_iter().enumerate() {
            let spinner = ctx.spawn_child(
                "spinner",
                Spinner {
                    turns_per_second: 0.25 * (i + 1) as f64,
                },
            )?;
            ctx.tree.set_position(spinner, Point::new(x, 0.0));
            ctx.tree.set_scale(spinner, 60.0, 60.0);
            ctx.tree.set_payload(
                spinner,
                Some(RenderPayload {
                    shape: self.square,
                    color: self.color,
                }),
            );
        }

        let button = ctx.spawn_child(
            "button",
            PressToGrow {
                half: 40.0,
                pressed: false,
            },
        )?;
        ctx.tree.set_position(button, Point::new(0.0, -180.0));
        ctx.tree.set_payload(
            button,
            Some(RenderPayload {
                shape: self.square,
                color: Rgba::WHITE,
            }),
        );
        Ok(())
    }

    fn on_enter(&mut self, ctx: &mut SceneContext<'_, Screen>) {
        info!(target: "carousel", "{:?} entering", ctx.key);
        self.timer.reset();
    }

    fn on_exit(&mut self, ctx: &mut SceneContext<'_, Screen>) {
        info!(target: "carousel", "{:?} gone", ctx.key);
    }

    fn update(&mut self, ctx: &mut SceneContext<'_, Screen>, _dt: Duration) {
        if ctx.input.is_key_pressed(KeyCode::Space) {
            ctx.request(SceneTransition::Push(Screen::Overlay));
        }
    }

    fn should_exit(&mut self, ctx: &mut SceneContext<'_, Screen>, dt: Duration) -> bool {
        if !self.timer.tick(dt) {
            return false;
        }
        ctx.request(SceneTransition::Push(self.next));
        true
    }
}

struct Overlay {
    square: ShapeId,
}

impl Scene<Screen> for Overlay {
    fn build(&mut self, ctx: &mut SceneContext<'_, Screen>) -> Result<(), StageError> {
        let panel = ctx.create_child("panel")?;
        ctx.tree.set_scale(panel, 300.0, 200.0);
        ctx.tree.set_payload(
            panel,
            Some(RenderPayload {
                shape: self.square,
                color: Rgba::new(0.0, 0.0, 0.0, 0.6),
            }),
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext<'_, Screen>, _dt: Duration) {
        if ctx.input.is_key_pressed(KeyCode::Escape) {
            ctx.request(SceneTransition::Remove(Screen::Overlay));
        }
    }

    fn is_transparent(&self) -> bool {
        true
    }

    fn transition(&self, props: &WorldProperties) -> TransitionConfig {
        TransitionConfig::from_properties(props)
            .with_direction(SlideDirection::Down)
            .with_duration(Duration::from_millis(250))
            .with_easing(Easing::EaseInOutCubic)
    }
}

//=== Main ================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut properties = WorldProperties::with_resolution(1024, 768);
    properties.title = "Aetheric Stage: Carousel".into();

    EngineBuilder::<Screen>::new()
        .with_properties(properties)
        .with_renderer(TraceRenderer::default())
        .build()?
        .init(|stage| {
            let square = stage.renderer_mut().add_shape(
                "unit-square",
                &[
                    Point::new(-0.5, -0.5),
                    Point::new(0.5, -0.5),
                    Point::new(0.5, 0.5),
                    Point::new(-0.5, 0.5),
                ],
                &[0, 1, 2, 0, 2, 3],
                DrawMode::Triangles,
            );

            let slides = [
                (Screen::Red, Rgba::new(0.9, 0.2, 0.2, 1.0), Screen::Green),
                (Screen::Green, Rgba::new(0.2, 0.8, 0.3, 1.0), Screen::Blue),
                (Screen::Blue, Rgba::new(0.2, 0.4, 0.9, 1.0), Screen::Red),
            ];
            for (key, color, next) in slides {
                stage.register_scene(
                    key,
                    Slide {
                        square,
                        color,
                        next,
                        timer: ExitTimer::new(Duration::from_secs(3)),
                    },
                )?;
            }
            stage.register_scene(Screen::Overlay, Overlay { square })?;

            stage.request(SceneTransition::Push(Screen::Red));
            Ok(())
        })?
        .run()?;

    Ok(())
}
