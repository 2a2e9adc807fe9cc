//! Full-screen fragment shader canvas.
//!
//! This crate is a thin wrapper around wgpu + winit for running a single
//! fragment shader over the whole window, shader-sandbox style. It owns a
//! pixel-space orthographic camera, a viewport-covering quad, a uniform
//! table with pre-populated entries (`screenWidth`, `screenHeight`, `time`,
//! `deltaTime`, `frame`), and the render loop that keeps them up to date.
//! Everything non-trivial (shader compilation, GPU buffers, presentation)
//! is delegated to wgpu.

pub mod canvas;
pub mod device;
pub mod logging;
pub mod time;
pub mod uniforms;
pub mod window;

mod color;

pub use canvas::{CanvasConfig, CanvasControl, ShaderCanvas};
pub use color::Rgb;
pub use uniforms::UniformValue;
pub use window::CanvasRuntime;
