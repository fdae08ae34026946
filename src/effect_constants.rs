//! Shared effect constants used by both build.rs and runtime code.
//!
//! This module is included by both the build script and the config module
//! so preset validation at compile time uses the same limits as the filters.

// Some constants are only used by build.rs for validation
#![allow(dead_code)]

/// Hard cap on samples held by one temporal buffer, independent of frame rate.
pub const MAX_BUFFER_LENGTH: usize = 120;

/// Default playback delay for the latency filter (seconds)
pub const DEFAULT_LATENCY_SECONDS: f32 = 0.35;

/// Latency is clamped into this range (seconds)
pub const MIN_LATENCY_SECONDS: f32 = 0.0;
pub const MAX_LATENCY_SECONDS: f32 = 1.0;

/// Default damping strength. Larger values converge faster.
pub const DEFAULT_DAMP_STRENGTH: f32 = 3.0;

/// Floor applied to damp strength so the damped pose always converges.
pub const MIN_DAMP_STRENGTH: f32 = 0.01;

/// Fingertip must be within this distance of the button surface (meters)
pub const DEFAULT_PROXIMITY_EPSILON: f32 = 0.001;

/// Scene tag used by the host to locate the toggle button
pub const DEFAULT_BUTTON_TAG: &str = "button-toggle";

/// Valid latency range as a tuple, for validators.
pub const LATENCY_RANGE: (f32, f32) = (MIN_LATENCY_SECONDS, MAX_LATENCY_SECONDS);

/// Returns true if a preset's numeric values fall inside the accepted ranges.
pub fn preset_in_range(latency_seconds: f32, damp_strength: f32) -> bool {
    (LATENCY_RANGE.0..=LATENCY_RANGE.1).contains(&latency_seconds)
        && damp_strength.is_finite()
        && damp_strength >= MIN_DAMP_STRENGTH
}
