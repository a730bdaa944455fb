//! Keyboard controller for view manipulation
//!
//! Controls:
//! - Left/Right arrows: rotate the triangle about the Z axis
//! - Up/Down arrows: zoom in/out (field of view)
//!
//! Keys are level-triggered: a held key applies its fixed delta once per
//! frame until released.

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Something whose orientation and field of view the controller can drive
pub trait ViewControl {
    /// Rotate about the fixed Z axis by `degrees`
    fn rotate(&mut self, degrees: f32);
    /// Change the field of view by `delta` degrees
    fn zoom(&mut self, delta: f32);
}

/// Controller tracking held view-manipulation keys
pub struct KeyController {
    rotate_left: bool,
    rotate_right: bool,
    zoom_in: bool,
    zoom_out: bool,

    // Configuration
    pub rotate_step: f32,
    pub zoom_step: f32,
}

impl Default for KeyController {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyController {
    pub fn new() -> Self {
        Self {
            rotate_left: false,
            rotate_right: false,
            zoom_in: false,
            zoom_out: false,

            rotate_step: 2.0, // degrees per frame
            zoom_step: 2.0,   // fov degrees per frame
        }
    }

    pub fn with_rotate_step(mut self, degrees: f32) -> Self {
        self.rotate_step = degrees;
        self
    }

    pub fn with_zoom_step(mut self, degrees: f32) -> Self {
        self.zoom_step = degrees;
        self
    }

    /// Process keyboard input. Returns true if the key was consumed.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::ArrowLeft => { self.rotate_left = pressed; true }
            KeyCode::ArrowRight => { self.rotate_right = pressed; true }
            KeyCode::ArrowUp => { self.zoom_in = pressed; true }
            KeyCode::ArrowDown => { self.zoom_out = pressed; true }
            _ => false,
        }
    }

    /// Apply one frame's worth of held-key deltas to the view
    pub fn update(&self, view: &mut impl ViewControl) {
        if self.rotate_left {
            view.rotate(self.rotate_step);
        }
        if self.rotate_right {
            view.rotate(-self.rotate_step);
        }
        // A narrower field of view magnifies, so zoom-in shrinks it
        if self.zoom_in {
            view.zoom(-self.zoom_step);
        }
        if self.zoom_out {
            view.zoom(self.zoom_step);
        }
    }
}
