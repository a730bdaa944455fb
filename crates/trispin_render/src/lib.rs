//! Triangle Rendering Library
//!
//! This crate provides the wgpu-based rendering path for the Trispin demo:
//! one shader program, one vertex buffer, one uniform buffer.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`camera::Camera`] - orientation quaternion and field of view
//! - [`pipeline::TrianglePipeline`] - the single-triangle render pipeline
//! - [`shader_watch::ShaderWatcher`] - shader source hot-reload detection

pub mod context;
pub mod camera;
pub mod pipeline;
pub mod shader_watch;

pub use camera::Camera;
pub use context::{ContextError, RenderContext};
pub use pipeline::{ProgramBuilder, ShaderProgram, TrianglePipeline, Uniforms, Vertex};
pub use shader_watch::{ProgramFactory, ShaderSources, ShaderWatcher};
