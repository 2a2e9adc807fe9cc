//! Window + event loop runtime.
//!
//! Owns the `winit` event loop and the single canvas window, couples the
//! window and GPU lifetimes, and drives the per-frame contract: re-arm the
//! next redraw, run the caller's frame hook, render. Closing the window
//! tears down the canvas and both host subscriptions (resize and redraw).

mod runtime;

pub use runtime::CanvasRuntime;
