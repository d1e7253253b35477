//! Keyboard and mouse state tracking
//!
//! SDL events are folded into an `InputState`, which is reduced once per
//! frame to a plain `FrameInput` snapshot for the game core.

use std::collections::HashSet;

use sdl2::keyboard::Keycode;

use crate::display::{InputEvent, MouseButtonKind};
use crate::game::FrameInput;

/// Held keys, keys pressed this frame, mouse position and buttons
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Keycode>,
    keys_pressed: HashSet<Keycode>,
    mouse_pos: (i32, i32),
    left_down: bool,
    right_down: bool,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget edge-triggered presses from the previous frame
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Quit => self.quit = true,
            InputEvent::KeyDown(key) => {
                // Auto-repeat sends KeyDown again while held; only the first counts
                if self.keys_down.insert(*key) {
                    self.keys_pressed.insert(*key);
                }
            },
            InputEvent::KeyUp(key) => {
                self.keys_down.remove(key);
            },
            InputEvent::MouseMove { x, y } => self.mouse_pos = (*x, *y),
            InputEvent::MouseDown { x, y, button } => {
                self.mouse_pos = (*x, *y);
                self.set_button(*button, true);
            },
            InputEvent::MouseUp { x, y, button } => {
                self.mouse_pos = (*x, *y);
                self.set_button(*button, false);
            },
        }
    }

    fn set_button(&mut self, button: MouseButtonKind, down: bool) {
        match button {
            MouseButtonKind::Left => self.left_down = down,
            MouseButtonKind::Right => self.right_down = down,
            MouseButtonKind::Middle => {},
        }
    }

    #[inline]
    pub fn is_down(&self, key: Keycode) -> bool {
        self.keys_down.contains(&key)
    }

    #[inline]
    pub fn was_pressed(&self, key: Keycode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Window closed or Escape pressed
    pub fn quit_requested(&self) -> bool {
        self.quit || self.was_pressed(Keycode::Escape)
    }

    /// Reduce the tracked state to what the game core reads this frame
    pub fn snapshot(&self) -> FrameInput {
        FrameInput {
            up: self.is_down(Keycode::W),
            down: self.is_down(Keycode::S),
            left: self.is_down(Keycode::A),
            right: self.is_down(Keycode::D),
            fire: self.is_down(Keycode::Space),
            snapshot: self.was_pressed(Keycode::S) && self.is_down(Keycode::LShift),
            mouse_x: self.mouse_pos.0,
            mouse_y: self.mouse_pos.1,
            left_button: self.left_down,
            right_button: self.right_down,
        }
    }
}
