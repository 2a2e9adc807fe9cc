//! Frame timing.
//!
//! One `FrameClock` per canvas. Sampling and committing are split so the
//! per-frame contract (write `time`/`deltaTime`, draw, then advance the
//! frame counter and baseline) maps onto two calls, and so tests can drive
//! the clock with synthetic instants.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameSample};
