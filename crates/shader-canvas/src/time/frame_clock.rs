use std::time::Instant;

/// Timing values for one frame callback.
#[derive(Debug, Copy, Clone)]
pub struct FrameSample {
    /// Seconds elapsed since the loop started.
    pub time: f32,

    /// Seconds elapsed since the previous committed frame.
    ///
    /// This is the exact wall-clock gap, unclamped. At the first frame after
    /// a (re)start both baselines coincide, so `delta` equals `time`.
    pub delta: f32,
}

/// Per-canvas frame clock.
///
/// Tracks the loop-start instant, the previous-frame instant, and how many
/// frames have been committed. `sample` is read-only; `commit` advances the
/// baseline. The split mirrors the frame contract: timing uniforms are
/// written before the draw, the counter advances after it.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    /// Creates a clock with both baselines at `now`.
    pub fn started_at(now: Instant) -> Self {
        Self {
            start: now,
            last: now,
            frames: 0,
        }
    }

    /// Resets both baselines to `now`, as when the loop is (re)started.
    ///
    /// The committed-frame count is not reset; the `frame` uniform is owned
    /// by the canvas and keeps its own monotonic value.
    pub fn restart(&mut self, now: Instant) {
        self.start = now;
        self.last = now;
    }

    /// Reads the timing values for a frame at `now` without advancing state.
    pub fn sample(&self, now: Instant) -> FrameSample {
        FrameSample {
            time: now.saturating_duration_since(self.start).as_secs_f32(),
            delta: now.saturating_duration_since(self.last).as_secs_f32(),
        }
    }

    /// Marks the frame at `now` as presented.
    pub fn commit(&mut self, now: Instant) {
        self.last = now;
        self.frames = self.frames.wrapping_add(1);
    }

    /// Number of committed frames since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn first_sample_has_equal_time_and_delta() {
        let t0 = Instant::now();
        let clock = FrameClock::started_at(t0);
        let s = clock.sample(t0 + ms(16));
        assert!((s.time - 0.016).abs() < 1e-6);
        assert!((s.delta - 0.016).abs() < 1e-6);
    }

    #[test]
    fn delta_is_gap_between_commits() {
        let t0 = Instant::now();
        let mut clock = FrameClock::started_at(t0);
        clock.commit(t0 + ms(16));
        let s = clock.sample(t0 + ms(40));
        assert!((s.delta - 0.024).abs() < 1e-6);
        assert!((s.time - 0.040).abs() < 1e-6);
    }

    #[test]
    fn time_is_non_decreasing_across_frames() {
        let t0 = Instant::now();
        let mut clock = FrameClock::started_at(t0);
        let mut prev = 0.0f32;
        for i in 1..=10u64 {
            let now = t0 + ms(i * 7);
            let s = clock.sample(now);
            assert!(s.time >= prev);
            prev = s.time;
            clock.commit(now);
        }
    }

    #[test]
    fn commit_counts_frames() {
        let t0 = Instant::now();
        let mut clock = FrameClock::started_at(t0);
        assert_eq!(clock.frames(), 0);
        for i in 1..=5u64 {
            clock.commit(t0 + ms(i * 16));
        }
        assert_eq!(clock.frames(), 5);
    }

    #[test]
    fn restart_rebases_time_but_keeps_frames() {
        let t0 = Instant::now();
        let mut clock = FrameClock::started_at(t0);
        clock.commit(t0 + ms(100));
        clock.restart(t0 + ms(200));
        assert_eq!(clock.frames(), 1);
        let s = clock.sample(t0 + ms(216));
        assert!((s.time - 0.016).abs() < 1e-6);
        assert!((s.delta - 0.016).abs() < 1e-6);
    }
}
