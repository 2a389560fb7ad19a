//! Keyboard input handling.
//!
//! [`GameKey`] abstracts game actions from physical keys so the rest of the
//! app never matches on winit key codes directly. [`KeyState`] tracks the
//! held set and turns it into a per-frame movement intent; one-shot toggles
//! are handled edge-triggered by the event handler instead.

use std::collections::HashSet;

use glam::{Vec3, vec3};
use winit::keyboard;

/// In-game actions triggerable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    /// Move player forward (W or Up Arrow).
    MoveForward,
    /// Move player backward (S or Down Arrow).
    MoveBackward,
    /// Strafe left (A or Left Arrow).
    MoveLeft,
    /// Strafe right (D or Right Arrow).
    MoveRight,
    /// Rise (Space). Only effective in fly mode.
    MoveUp,
    /// Descend (Shift). Only effective in fly mode.
    MoveDown,
    /// Toggle collision resolution (C).
    ToggleCollision,
    /// Toggle fly mode (F).
    ToggleFly,
    /// Toggle the wall hitbox overlay (B).
    ToggleHitboxes,
    /// Dump the maze layout to a file (M).
    DumpMaze,
    /// Escape key (toggle mouse capture).
    Escape,
    /// Quit the game (`).
    Quit,
}

/// Tracks the set of currently held game keys.
#[derive(Debug, Default)]
pub struct KeyState {
    /// Set of currently pressed keys.
    pub pressed_keys: HashSet<GameKey>,
}

impl KeyState {
    /// Creates a new, empty [`KeyState`].
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
        }
    }

    /// Marks a key as pressed.
    pub fn press_key(&mut self, key: GameKey) {
        self.pressed_keys.insert(key);
    }

    /// Marks a key as released.
    pub fn release_key(&mut self, key: GameKey) {
        self.pressed_keys.remove(&key);
    }

    /// Checks if a key is currently pressed.
    pub fn is_pressed(&self, key: GameKey) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Local movement intent (forward, strafe-right, raise) from the held
    /// movement keys. Unit-range per axis; the caller scales by speed and
    /// elapsed time.
    pub fn movement_intent(&self) -> Vec3 {
        let axis = |pos, neg| {
            (self.is_pressed(pos) as i8 - self.is_pressed(neg) as i8) as f32
        };
        vec3(
            axis(GameKey::MoveForward, GameKey::MoveBackward),
            axis(GameKey::MoveRight, GameKey::MoveLeft),
            axis(GameKey::MoveUp, GameKey::MoveDown),
        )
    }
}

macro_rules! match_char_key {
    ($c:expr, {
        $($key:literal => $variant:expr),* $(,)?
    }) => {{
        match $c.to_ascii_lowercase().as_str() {
            $($key => Some($variant),)*
            _ => None,
        }
    }};
}

macro_rules! match_named_key {
    ($k:expr, {
        $($key:ident => $variant:expr),* $(,)?
    }) => {{
        match $k {
            $(winit::keyboard::NamedKey::$key => Some($variant),)*
            _ => None,
        }
    }};
}

/// Converts a winit [`keyboard::Key`] to a [`GameKey`] if it matches a
/// mapped action.
pub fn winit_key_to_game_key(key: &keyboard::Key) -> Option<GameKey> {
    match key {
        keyboard::Key::Named(named) => match_named_key!(named, {
            ArrowUp => GameKey::MoveForward,
            ArrowDown => GameKey::MoveBackward,
            ArrowLeft => GameKey::MoveLeft,
            ArrowRight => GameKey::MoveRight,
            Space => GameKey::MoveUp,
            Shift => GameKey::MoveDown,
            Escape => GameKey::Escape,
        }),

        keyboard::Key::Character(c) => match_char_key!(c, {
            "w" => GameKey::MoveForward,
            "s" => GameKey::MoveBackward,
            "a" => GameKey::MoveLeft,
            "d" => GameKey::MoveRight,
            "c" => GameKey::ToggleCollision,
            "f" => GameKey::ToggleFly,
            "b" => GameKey::ToggleHitboxes,
            "m" => GameKey::DumpMaze,
            "`" => GameKey::Quit,
        }),

        _ => None,
    }
}
