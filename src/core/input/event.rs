//=========================================================================
// Input Events
//=========================================================================
//
// Platform-independent input events delivered to the stage.
//
// Event Flow:
// ```text
// Platform Layer (winit)
//         ↓ InputProcessor
//    InputEvent (this module)
//         ↓ Stage::tick
//    StateTracker  →  TargetRegistry::dispatch_event  →  Behavior
// ```
//
// Pointer coordinates are always device pixels (top-left origin, Y down).
// Behaviors convert them with the coordinate mapper when they need view
// or local space.
//
//=========================================================================

//=== External Dependencies ===============================================

use bitflags::bitflags;

//=== MouseButton =========================================================

/// Physical mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,

    /// Side, thumb and any other buttons.
    Other,
}

//=== KeyCode =============================================================

/// Physical key location, independent of keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Reported by the platform but not mapped.
    Unidentified,
}

//=== Modifiers ===========================================================

bitflags! {
    /// Modifier keys held when an event was produced.
    ///
    /// Left and right variants are not distinguished. `CTRL` covers
    /// Command on macOS, `ALT` covers Option.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const CTRL  = 0b010;
        const ALT   = 0b100;
    }
}

impl Modifiers {
    pub const NONE: Self = Self::empty();

    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    pub fn ctrl(self) -> bool {
        self.contains(Self::CTRL)
    }

    pub fn alt(self) -> bool {
        self.contains(Self::ALT)
    }
}

//=== InputKind ===========================================================

/// Coarse event family, used for routing and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Keyboard,
    MouseMotion,
    MouseButton,
    MouseWheel,
    Other,
}

//=== InputEvent ==========================================================

/// A single discrete input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown {
        key: KeyCode,
        modifiers: Modifiers,
    },

    KeyUp {
        key: KeyCode,
        modifiers: Modifiers,
    },

    MouseButtonDown {
        button: MouseButton,
        modifiers: Modifiers,
    },

    MouseButtonUp {
        button: MouseButton,
        modifiers: Modifiers,
    },

    /// Cursor moved to `(x, y)` device pixels.
    MouseMoved { x: f32, y: f32 },

    /// Scroll in lines (or pixel deltas scaled to lines by the platform).
    MouseWheel { dx: f32, dy: f32 },

    /// Platform event with no mapping; ignored by the stage.
    Unidentified,
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            Self::KeyDown { .. } | Self::KeyUp { .. } => InputKind::Keyboard,
            Self::MouseButtonDown { .. } | Self::MouseButtonUp { .. } => InputKind::MouseButton,
            Self::MouseMoved { .. } => InputKind::MouseMotion,
            Self::MouseWheel { .. } => InputKind::MouseWheel,
            Self::Unidentified => InputKind::Other,
        }
    }

    /// Key carried by keyboard events.
    pub fn key(&self) -> Option<KeyCode> {
        match self {
            Self::KeyDown { key, .. } | Self::KeyUp { key, .. } => Some(*key),
            _ => None,
        }
    }

    /// Button carried by mouse button events.
    pub fn button(&self) -> Option<MouseButton> {
        match self {
            Self::MouseButtonDown { button, .. } | Self::MouseButtonUp { button, .. } => {
                Some(*button)
            }
            _ => None,
        }
    }

    /// Modifier state, for events that carry one.
    pub fn modifiers(&self) -> Option<Modifiers> {
        match self {
            Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. }
            | Self::MouseButtonDown { modifiers, .. }
            | Self::MouseButtonUp { modifiers, .. } => Some(*modifiers),
            _ => None,
        }
    }

    /// Returns the event with its modifier state replaced.
    ///
    /// No effect on events that carry no modifiers.
    pub fn with_modifiers(mut self, new: Modifiers) -> Self {
        match &mut self {
            Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. }
            | Self::MouseButtonDown { modifiers, .. }
            | Self::MouseButtonUp { modifiers, .. } => *modifiers = new,
            _ => {}
        }
        self
    }

    /// True for press events (key or button going down).
    pub fn is_press(&self) -> bool {
        matches!(self, Self::KeyDown { .. } | Self::MouseButtonDown { .. })
    }

    /// True for events a pointer-driven behavior cares about.
    pub fn is_pointer(&self) -> bool {
        matches!(
            self.kind(),
            InputKind::MouseButton | InputKind::MouseMotion | InputKind::MouseWheel
        )
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
