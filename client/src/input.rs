//! Input sampling for the play phase.
//!
//! Pointer position (touch wins over mouse), boost hold, and edge-detected
//! Escape for the abort prompt.

use macroquad::prelude::*;

/// One frame's worth of sampled input.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub target_x: f32,
    pub target_y: f32,
    pub boost: bool,
    pub abort: bool,
}

pub struct InputManager {
    // Previous frame state for edge detection
    prev_escape: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self { prev_escape: false }
    }

    pub fn sample(&mut self) -> FrameInput {
        let (mut target_x, mut target_y) = mouse_position();
        let touch_active = if let Some(touch) = touches().first() {
            target_x = touch.position.x;
            target_y = touch.position.y;
            true
        } else {
            false
        };

        let boost =
            touch_active || is_mouse_button_down(MouseButton::Left) || is_key_down(KeyCode::Space);

        let escape = is_key_down(KeyCode::Escape);
        let abort = escape && !self.prev_escape;
        self.prev_escape = escape;

        FrameInput {
            target_x,
            target_y,
            boost,
            abort,
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
