//! Frame timing shared by every filter in one orchestration pass.

/// Timestamp pair for one rendered frame (seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Monotonic time since the clock started
    pub now: f32,
    /// Time since the previous frame, never negative
    pub delta: f32,
}

impl FrameTime {
    pub fn new(now: f32, delta: f32) -> Self {
        Self {
            now,
            delta: delta.max(0.0),
        }
    }
}

/// Source of frame times. One clock drives all buffers so samples stay in order.
pub trait FrameClock {
    /// Advance to the next frame
    fn tick(&mut self) -> FrameTime;
}

/// Clock that advances a fixed step each frame (offline playback, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedStepClock {
    step: f32,
    frame: u32,
}

impl FixedStepClock {
    pub fn new(step_seconds: f32) -> Self {
        Self {
            step: step_seconds.max(0.0),
            frame: 0,
        }
    }

    pub fn from_fps(fps: f32) -> Self {
        Self::new(if fps > 0.0 { 1.0 / fps } else { 0.0 })
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }
}

impl FrameClock for FixedStepClock {
    fn tick(&mut self) -> FrameTime {
        let now = self.frame as f32 * self.step;
        let delta = if self.frame == 0 { 0.0 } else { self.step };
        self.frame += 1;
        FrameTime::new(now, delta)
    }
}

/// Clamps host-reported times so `now` never goes backwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock {
    last: Option<f32>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a raw host timestamp (seconds) into a frame time
    pub fn advance(&mut self, raw_now: f32) -> FrameTime {
        let (now, delta) = match self.last {
            None => (raw_now, 0.0),
            Some(last) => {
                let now = raw_now.max(last);
                (now, now - last)
            }
        };
        self.last = Some(now);
        FrameTime::new(now, delta)
    }
}

/// Browser clock reading `performance.now()`
#[cfg(target_arch = "wasm32")]
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
    origin_ms: f64,
    monotonic: MonotonicClock,
}

#[cfg(target_arch = "wasm32")]
impl PerformanceClock {
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|window| window.performance());
        let origin_ms = performance.as_ref().map(|p| p.now()).unwrap_or(0.0);
        Self {
            performance,
            origin_ms,
            monotonic: MonotonicClock::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl FrameClock for PerformanceClock {
    fn tick(&mut self) -> FrameTime {
        let now_ms = self
            .performance
            .as_ref()
            .map(|p| p.now())
            .unwrap_or(self.origin_ms);
        let seconds = ((now_ms - self.origin_ms) / 1000.0) as f32;
        self.monotonic.advance(seconds)
    }
}
