//! GPU device + surface plumbing.
//!
//! Owns the wgpu Instance/Adapter/Device/Queue, configures the window
//! surface, acquires per-frame textures, and triages surface errors. The
//! canvas itself never talks to wgpu initialization directly; it receives a
//! ready [`Gpu`] from the runtime.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
