//! Uniform values and the per-canvas uniform table.
//!
//! Uniforms are a tagged union keyed by string name so that a value/shader
//! type mismatch is visible at assignment time instead of silently producing
//! garbage on the GPU. The table declares a WGSL struct (built-ins first,
//! caller entries in insertion order) and packs itself into a byte buffer
//! following WGSL uniform address-space layout rules.

mod layout;
mod table;
mod value;

pub use layout::UniformLayout;
pub use table::{builtin, UniformTable};
pub use value::UniformValue;
