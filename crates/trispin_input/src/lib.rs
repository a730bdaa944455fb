//! Keyboard input handling
//!
//! This crate maps held keys to the discrete view commands of the demo:
//! rotate left/right and zoom in/out.

mod key_controller;

pub use key_controller::{KeyController, ViewControl};
