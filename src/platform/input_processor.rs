//=========================================================================
// Input Processor
//=========================================================================
//
// Converts winit window events into stage `InputEvent`s.
//
// Architecture:
//   winit WindowEvent → InputProcessor → InputEvent → InputBuffer
//
// Modifier state arrives separately (ModifiersChanged) and is cached,
// then stamped onto every key and button event that follows. Keys the
// stage has no code for are dropped here rather than forwarded as
// `Unidentified`.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};

/// Pixel scroll deltas are divided by this to approximate wheel lines.
const PIXELS_PER_LINE: f64 = 20.0;

//=== InputProcessor ======================================================

/// Stateful converter from winit events to stage events.
pub(crate) struct InputProcessor {
    modifiers: Modifiers,
}

impl InputProcessor {
    pub(crate) fn new() -> Self {
        Self {
            modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State ---------------------------------------------------

    pub(crate) fn update_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers::from(state);
    }

    #[cfg(test)]
    pub(crate) fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    //--- Conversion -------------------------------------------------------

    /// `None` for keys without a stage code.
    pub(crate) fn key(&self, event: &KeyEvent) -> Option<InputEvent> {
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };

        let key = KeyCode::from(code);
        if key == KeyCode::Unidentified {
            return None;
        }

        Some(match event.state {
            ElementState::Pressed => InputEvent::KeyDown {
                key,
                modifiers: self.modifiers,
            },
            ElementState::Released => InputEvent::KeyUp {
                key,
                modifiers: self.modifiers,
            },
        })
    }

    pub(crate) fn mouse_button(&self, button: WinitMouseButton, state: ElementState) -> InputEvent {
        let button = MouseButton::from(button);
        match state {
            ElementState::Pressed => InputEvent::MouseButtonDown {
                button,
                modifiers: self.modifiers,
            },
            ElementState::Released => InputEvent::MouseButtonUp {
                button,
                modifiers: self.modifiers,
            },
        }
    }

    /// Cursor position in device pixels.
    pub(crate) fn mouse_move(&self, x: f64, y: f64) -> InputEvent {
        InputEvent::MouseMoved {
            x: x as f32,
            y: y as f32,
        }
    }

    /// Scroll in lines; pixel deltas from touchpads are scaled down.
    pub(crate) fn mouse_wheel(&self, delta: MouseScrollDelta) -> InputEvent {
        let (dx, dy) = match delta {
            MouseScrollDelta::LineDelta(dx, dy) => (dx, dy),
            MouseScrollDelta::PixelDelta(pos) => (
                (pos.x / PIXELS_PER_LINE) as f32,
                (pos.y / PIXELS_PER_LINE) as f32,
            ),
        };
        InputEvent::MouseWheel { dx, dy }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// winit already folds Cmd into CONTROL and Option into ALT on macOS.
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        let mut modifiers = Modifiers::NONE;
        modifiers.set(Modifiers::SHIFT, state.shift_key());
        modifiers.set(Modifiers::CTRL, state.control_key());
        modifiers.set(Modifiers::ALT, state.alt_key());
        modifiers
    }
}

/// Expands to a match from identically-named winit codes.
macro_rules! same_name_keys {
    ($code:expr; $($name:ident),+ $(,)?) => {
        match $code {
            $(WinitKeyCode::$name => KeyCode::$name,)+
            _ => KeyCode::Unidentified,
        }
    };
}

impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        same_name_keys!(code;
            Digit0, Digit1, Digit2, Digit3, Digit4,
            Digit5, Digit6, Digit7, Digit8, Digit9,
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
            KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
            KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
            ArrowDown, ArrowLeft, ArrowRight, ArrowUp,
            Space, Enter, Escape, Tab, Backspace, Delete,
        )
    }
}

/// Back, Forward and numbered buttons collapse into `Other`.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    //--- Modifiers --------------------------------------------------------

    #[test]
    fn starts_with_no_modifiers() {
        assert_eq!(InputProcessor::new().modifiers(), Modifiers::NONE);
    }

    #[test]
    fn modifiers_map_to_flags() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(ModifiersState::SHIFT | ModifiersState::ALT);

        let mods = processor.modifiers();
        assert!(mods.shift() && mods.alt() && !mods.ctrl());
    }

    #[test]
    fn cached_modifiers_stamp_button_events() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(ModifiersState::CONTROL);

        let event = processor.mouse_button(WinitMouseButton::Left, ElementState::Pressed);
        assert_eq!(
            event,
            InputEvent::MouseButtonDown {
                button: MouseButton::Left,
                modifiers: Modifiers::CTRL,
            }
        );
    }

    //--- Codes ------------------------------------------------------------

    #[test]
    fn key_codes_map_by_name() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyW), KeyCode::KeyW);
        assert_eq!(KeyCode::from(WinitKeyCode::Digit7), KeyCode::Digit7);
        assert_eq!(KeyCode::from(WinitKeyCode::Escape), KeyCode::Escape);
        assert_eq!(KeyCode::from(WinitKeyCode::F13), KeyCode::Unidentified);
    }

    #[test]
    fn extra_mouse_buttons_collapse() {
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
        assert_eq!(MouseButton::from(WinitMouseButton::Other(7)), MouseButton::Other);
        assert_eq!(MouseButton::from(WinitMouseButton::Middle), MouseButton::Middle);
    }

    //--- Pointer ----------------------------------------------------------

    #[test]
    fn wheel_lines_pass_through() {
        let processor = InputProcessor::new();
        let event = processor.mouse_wheel(MouseScrollDelta::LineDelta(0.0, -2.0));
        assert_eq!(event, InputEvent::MouseWheel { dx: 0.0, dy: -2.0 });
    }

    #[test]
    fn wheel_pixels_scale_to_lines() {
        let processor = InputProcessor::new();
        let event =
            processor.mouse_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(40.0, 60.0)));
        assert_eq!(event, InputEvent::MouseWheel { dx: 2.0, dy: 3.0 });
    }

    #[test]
    fn mouse_move_narrows_to_f32() {
        let processor = InputProcessor::new();
        assert_eq!(
            processor.mouse_move(400.0, 300.0),
            InputEvent::MouseMoved { x: 400.0, y: 300.0 }
        );
    }
}
