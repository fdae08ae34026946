use std::collections::VecDeque;

use crate::bone::{BonePose, Sample};
use crate::effect_constants::MAX_BUFFER_LENGTH;

/// Fixed-delay line over timestamped poses.
///
/// Once the buffer holds `latency_seconds` of history the output lags the
/// input by that delay, at frame resolution (no interpolation between
/// samples). Until the first sample is played the raw pose passes straight
/// through; after that a frame with nothing due holds the last played pose.
#[derive(Debug, Clone, Default)]
pub struct TemporalBuffer {
    samples: VecDeque<Sample>,
    /// Pose most recently played back, None while cold
    played: Option<BonePose>,
}

impl TemporalBuffer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_BUFFER_LENGTH + 1),
            played: None,
        }
    }

    /// Advance one frame: record `raw` at `now` and return the pose to display.
    ///
    /// `now` must come from the shared monotonic clock.
    pub fn step(&mut self, raw: BonePose, now: f32, latency_seconds: f32) -> BonePose {
        self.samples.push_back(Sample::new(raw, now));

        let mut last_popped = None;
        while let Some(front) = self.samples.front() {
            if now - front.timestamp <= latency_seconds {
                break;
            }
            last_popped = self.samples.pop_front();
        }

        // Safety cap, independent of timestamps
        while self.samples.len() > MAX_BUFFER_LENGTH {
            self.samples.pop_front();
        }

        if let Some(sample) = last_popped {
            self.played = Some(sample.pose);
        }
        self.played.unwrap_or(raw)
    }

    /// Drop all history (cold start on next step)
    pub fn clear(&mut self) {
        self.samples.clear();
        self.played = None;
    }

    /// True once a delayed sample has been played since the last `clear`
    pub fn is_warm(&self) -> bool {
        self.played.is_some()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest sample still waiting to be played
    pub fn front(&self) -> Option<&Sample> {
        self.samples.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const FRAME: f32 = 1.0 / 90.0;

    fn pose(angle: f32) -> BonePose {
        BonePose::from_rotation(Quat::from_rotation_y(angle))
    }

    #[test]
    fn test_cold_start_passes_raw_through() {
        let mut buffer = TemporalBuffer::new();
        for i in 0..10 {
            let raw = pose(i as f32 * 0.1);
            let out = buffer.step(raw, i as f32 * FRAME, 0.35);
            assert_eq!(out, raw);
        }
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn test_step_change_scenario() {
        // 90 Hz, 0.35 s delay; R0 for 31 frames, then R1
        let r0 = pose(0.0);
        let r1 = pose(1.0);
        let mut buffer = TemporalBuffer::new();
        let mut outputs = Vec::new();

        for i in 0..120 {
            let raw = if i < 31 { r0 } else { r1 };
            outputs.push(buffer.step(raw, i as f32 * FRAME, 0.35));
        }

        // Cold: nothing old enough to pop, raw passes through
        for (i, out) in outputs.iter().enumerate().take(31) {
            assert_eq!(*out, r0, "frame {}", i);
        }
        // Frame 31 is still cold and shows the new raw pose
        assert_eq!(outputs[31], r1);
        // Warm: delayed R0 plays back
        for (i, out) in outputs.iter().enumerate().take(63).skip(32) {
            assert_eq!(*out, r0, "frame {}", i);
        }
        // 0.35 s of R1 accumulated
        for (i, out) in outputs.iter().enumerate().skip(63) {
            assert_eq!(*out, r1, "frame {}", i);
        }
    }

    #[test]
    fn test_steady_state_delay_is_latency() {
        let mut buffer = TemporalBuffer::new();
        let latency = 0.2;
        for i in 0..200 {
            let now = i as f32 * FRAME;
            let raw = BonePose::new(Quat::IDENTITY, Vec3::new(now, 0.0, 0.0));
            let out = buffer.step(raw, now, latency);

            if now > latency + FRAME {
                let delayed = out.position.unwrap().x;
                let lag = now - delayed;
                assert!(lag > latency && lag <= latency + FRAME + 1e-4, "lag {}", lag);
            }
        }
    }

    #[test]
    fn test_warm_frame_with_nothing_due_holds_last_played() {
        let mut buffer = TemporalBuffer::new();
        assert_eq!(buffer.step(pose(0.0), 0.0, 0.1), pose(0.0));
        assert_eq!(buffer.step(pose(0.1), 0.1, 0.1), pose(0.1));
        assert!(!buffer.is_warm());

        // Both queued samples are due; the newer one plays
        assert_eq!(buffer.step(pose(0.2), 0.25, 0.1), pose(0.1));
        assert!(buffer.is_warm());

        // Nothing due: keep showing the delayed pose, not the live one
        assert_eq!(buffer.step(pose(0.3), 0.3, 0.1), pose(0.1));
    }

    #[test]
    fn test_latency_exact_multiple_of_frame_never_shows_live_pose() {
        // 0.25 s at 60 Hz is exactly 15 frames, so due-ness sits on the float edge
        let mut buffer = TemporalBuffer::new();
        let latency = 0.25;
        let mut last_x = f32::NEG_INFINITY;

        for i in 0..600 {
            let now = i as f32 / 60.0;
            let raw = BonePose::new(Quat::IDENTITY, Vec3::new(now, 0.0, 0.0));
            let out = buffer.step(raw, now, latency);

            if buffer.is_warm() {
                let delayed = out.position.unwrap().x;
                assert!(now - delayed > latency, "frame {} lag {}", i, now - delayed);
                assert!(now - delayed <= latency + 2.0 / 60.0 + 1e-4, "frame {}", i);
                // Playback never jumps backward
                assert!(delayed >= last_x, "frame {}", i);
                last_x = delayed;
            }
        }
    }

    #[test]
    fn test_zero_latency_is_realtime_once_warm() {
        let mut buffer = TemporalBuffer::new();
        buffer.step(pose(0.0), 0.0, 0.0);
        let out = buffer.step(pose(0.5), FRAME, 0.0);
        // The previous frame was popped, the current one stays queued
        assert_eq!(out, pose(0.0));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_cap_holds_with_frozen_clock() {
        let mut buffer = TemporalBuffer::new();
        for i in 0..500 {
            buffer.step(pose(i as f32), 1.0, 0.35);
            assert!(buffer.len() <= MAX_BUFFER_LENGTH);
        }
        assert_eq!(buffer.len(), MAX_BUFFER_LENGTH);
    }

    #[test]
    fn test_bounded_for_random_frame_intervals() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut buffer = TemporalBuffer::new();
        let mut now = 0.0_f32;

        for _ in 0..5_000 {
            now += rng.random_range(0.0..0.03);
            let latency = rng.random_range(0.0..=1.0);
            buffer.step(pose(now), now, latency);
            assert!(buffer.len() <= MAX_BUFFER_LENGTH);

            if let Some(front) = buffer.front() {
                assert!(now - front.timestamp <= latency);
            }
        }
    }

    #[test]
    fn test_clear_restarts_cold() {
        let mut buffer = TemporalBuffer::new();
        for i in 0..60 {
            buffer.step(pose(0.0), i as f32 * FRAME, 0.1);
        }
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(!buffer.is_warm());

        let raw = pose(2.0);
        assert_eq!(buffer.step(raw, 60.0 * FRAME, 0.1), raw);
    }
}
