//! Frame clock for deterministic, tick-driven time.

/// Accumulates host frame time.
///
/// Nothing in the engine reads wall-clock time; every duration is measured by
/// summing the `dt` values the host passes to `tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    elapsed: f32,
    frame: u64,
}

impl FrameClock {
    /// Creates a clock at frame zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        self.frame += 1;
    }

    /// Seconds elapsed since the clock started.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of frames advanced so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
