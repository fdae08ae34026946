//! Hand Tremor Effect - Wasm Core
//!
//! Simulates a motor impairment on a rendered hand rig driven by live hand
//! tracking. Two per-bone filters are available: exponential damping (lag
//! converging on the tracked pose) and fixed-latency playback. A fingertip
//! button toggles the effect, optionally shared across both hands.

pub mod bone;
pub mod clock;
pub mod config;
mod effect_constants;
pub mod error;
pub mod filter;
pub mod hands;
pub mod orchestrator;
pub mod state;
pub mod toggle;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use bone::{
    BoneId, BonePose, BoneRegistry, FilteredBone, HandJoint, HandPoseFrame, HandSkeleton, PoseMap,
    PoseSink, PoseSource, RigHierarchy, Sample,
};
pub use clock::{FixedStepClock, FrameClock, FrameTime, MonotonicClock};
pub use config::{ActiveMode, ConfigScope, EffectConfig, EffectMode, ToggleConfig};
pub use effect_constants::{
    DEFAULT_DAMP_STRENGTH, DEFAULT_LATENCY_SECONDS, DEFAULT_PROXIMITY_EPSILON, MAX_BUFFER_LENGTH,
    MIN_DAMP_STRENGTH,
};
pub use error::ConfigError;
pub use filter::{DampState, TemporalBuffer};
pub use glam::{Quat, Vec3};
pub use hands::{Hand, HandController, HandPair, ToggleScope};
pub use orchestrator::{EffectOrchestrator, ManagedRig, RigBinding};
pub use toggle::{
    BoxVolume, EffectFlag, ProximityVolume, SphereVolume, TaggedVolumes, ToggleController,
    VolumeLookup,
};

#[cfg(target_arch = "wasm32")]
pub use web::{
    begin_frame, init_effect, init_effect_preset, is_effect_enabled, rebuild_hand,
    set_effect_enabled, set_effect_mode, update_hand, update_hands,
};

/// Install the logger and panic hook (browser console on wasm, no-op on the host)
pub fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            console_error_panic_hook::set_once();
            // Ignore the error if a logger is already installed
            let _ = console_log::init_with_level(log::Level::Info);
        }
    }
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(msg: &str) {
    log::info!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario from the latency model: 90 Hz, 0.35 s, pose switch after 31 frames,
    /// driven through the full two-hand stack.
    #[test]
    fn test_hand_pair_latency_scenario() {
        let r0 = BonePose::from_rotation(Quat::from_rotation_x(0.0));
        let r1 = BonePose::from_rotation(Quat::from_rotation_x(0.9));
        let mut pair = HandPair::new(EffectConfig::default(), ToggleConfig::default(), true);
        let mut clock = FixedStepClock::from_fps(90.0);
        let mut out = HandPoseFrame::default();

        let mut tips = Vec::new();
        for i in 0..100 {
            let raw = HandPoseFrame::uniform(if i < 31 { r0 } else { r1 });
            pair.update(Hand::Left, clock.tick(), &raw, &mut out);
            tips.push(out.joint(HandJoint::IndexTip).unwrap());
        }

        assert!(tips[..31].iter().all(|&p| p == r0));
        assert!(tips[32..63].iter().all(|&p| p == r0));
        assert!(tips[63..].iter().all(|&p| p == r1));
    }
}
