//! Centralized application state with context passing pattern
//!
//! Implements a Context Passing pattern where:
//! 1. `AppState` is a single struct containing all effect state for both hands
//! 2. Core functions take explicit references (`&HandPoseFrame`, `FrameTime`)
//! 3. WASM bindings are thin wrappers that extract from AppState and call pure functions
//!
//! Host pose buffers are flat `f32` arrays, 8 floats per joint in `HandJoint` order:
//! `qx qy qz qw px py pz has_position`. A zero quaternion marks an untracked joint.

use std::cell::RefCell;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use static_assertions::{assert_eq_size, const_assert};

use crate::bone::{BonePose, HandJoint, HandPoseFrame};
use crate::clock::{FrameTime, MonotonicClock};
use crate::config::{EffectConfig, ToggleConfig};
use crate::effect_constants::MAX_BUFFER_LENGTH;
use crate::error::ConfigError;
use crate::hands::{Hand, HandPair};
use crate::toggle::{ProximityVolume, TaggedVolumes};

/// One joint as exchanged with the host
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PackedPose {
    pub rotation: [f32; 4],
    pub position: [f32; 3],
    /// 1.0 when `position` is valid
    pub has_position: f32,
}

pub const FLOATS_PER_JOINT: usize = 8;
pub const FLOATS_PER_HAND: usize = FLOATS_PER_JOINT * HandJoint::COUNT;

assert_eq_size!(PackedPose, [f32; FLOATS_PER_JOINT]);
const_assert!(MAX_BUFFER_LENGTH > 0);

impl PackedPose {
    pub fn unpack(&self) -> Option<BonePose> {
        let rotation = Quat::from_array(self.rotation);
        if rotation.length_squared() < 1e-12 || !rotation.is_finite() {
            return None;
        }
        let position = (self.has_position > 0.5).then(|| Vec3::from_array(self.position));
        Some(BonePose {
            rotation: rotation.normalize(),
            position,
        })
    }

    pub fn pack(pose: &BonePose) -> Self {
        Self {
            rotation: pose.rotation.to_array(),
            position: pose.position.unwrap_or(Vec3::ZERO).to_array(),
            has_position: if pose.position.is_some() { 1.0 } else { 0.0 },
        }
    }
}

/// Decode a host buffer into a hand frame
pub fn decode_hand(data: &[f32]) -> Result<HandPoseFrame, ConfigError> {
    let joints = packed_joints(data)?;
    let mut frame = HandPoseFrame::default();
    for (slot, packed) in frame.joints.iter_mut().zip(joints) {
        *slot = packed.unpack();
    }
    Ok(frame)
}

/// Write every tracked joint of `frame` into a host buffer.
/// Slots for untracked joints are left as they were.
pub fn encode_hand(frame: &HandPoseFrame, data: &mut [f32]) -> Result<(), ConfigError> {
    check_len(data.len())?;
    let joints: &mut [PackedPose] = bytemuck::cast_slice_mut(data);
    for (packed, pose) in joints.iter_mut().zip(frame.joints.iter()) {
        if let Some(pose) = pose {
            *packed = PackedPose::pack(pose);
        }
    }
    Ok(())
}

fn packed_joints(data: &[f32]) -> Result<&[PackedPose], ConfigError> {
    check_len(data.len())?;
    Ok(bytemuck::cast_slice(data))
}

fn check_len(found: usize) -> Result<(), ConfigError> {
    if found == FLOATS_PER_HAND {
        Ok(())
    } else {
        Err(ConfigError::PackedLength {
            expected: FLOATS_PER_HAND,
            found,
        })
    }
}

/// Functions should take explicit references to what they need, not access
/// this struct directly via globals.
pub struct AppState {
    /// Both hand controllers and their shared config
    pub hands: HandPair,
    /// Clamps host timestamps to a monotonic clock
    pub clock: MonotonicClock,
    /// Timing for the frame in progress
    pub frame: FrameTime,
    /// Last filtered output per hand
    pub outputs: [HandPoseFrame; 2],
    /// Host time of the first frame, in milliseconds
    pub time_origin_ms: Option<f64>,
    /// Button volumes the toggles can resolve by tag
    pub volumes: TaggedVolumes,
}

impl AppState {
    pub fn new(config: EffectConfig, toggle: ToggleConfig) -> Self {
        Self {
            hands: HandPair::new(config, toggle, true),
            clock: MonotonicClock::new(),
            frame: FrameTime::default(),
            outputs: [HandPoseFrame::default(); 2],
            time_origin_ms: None,
            volumes: TaggedVolumes::new(),
        }
    }

    /// Start a frame at host time `now_seconds`. Call once per rendered frame.
    pub fn begin_frame(&mut self, now_seconds: f32) -> FrameTime {
        self.frame = self.clock.advance(now_seconds);
        self.frame
    }

    /// Start a frame from an absolute host timestamp in milliseconds.
    ///
    /// Time is rebased to the first frame before narrowing to `f32`, so
    /// resolution does not degrade over long sessions.
    pub fn begin_frame_ms(&mut self, now_ms: f64) -> FrameTime {
        let origin = *self.time_origin_ms.get_or_insert(now_ms);
        self.begin_frame(((now_ms - origin) / 1000.0) as f32)
    }

    /// Filter both hands in place. Both toggles run before either hand
    /// filters. A hand with an all-zero buffer counts as untracked.
    pub fn update_hands(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), ConfigError> {
        let tracked_left = decode_hand(left)?;
        let tracked_right = decode_hand(right)?;

        self.hands
            .update_frame(self.frame, &tracked_left, &tracked_right, &mut self.outputs);

        encode_hand(&self.outputs[hand_slot(Hand::Left)], left)?;
        encode_hand(&self.outputs[hand_slot(Hand::Right)], right)
    }

    /// Register a button volume under `tag`
    pub fn register_volume(&mut self, tag: &str, volume: Rc<dyn ProximityVolume>) {
        self.volumes.insert(tag, volume);
    }

    /// (Re)activate both toggles, resolving unbound buttons from the registered volumes
    pub fn activate_toggles(&mut self) {
        self.hands.activate(Some(&self.volumes));
    }

    /// Filter one hand in place: `data` holds raw poses on entry and
    /// filtered poses on return.
    ///
    /// For single-hand hosts; with two hands prefer `update_hands`.
    pub fn update_hand(&mut self, hand: Hand, data: &mut [f32]) -> Result<(), ConfigError> {
        let tracked = decode_hand(data)?;
        let out = &mut self.outputs[hand_slot(hand)];
        self.hands.update(hand, self.frame, &tracked, out);
        encode_hand(out, data)
    }

    /// Re-scan one hand's rig from a host buffer
    pub fn rebuild_hand(&mut self, hand: Hand, data: &[f32]) -> Result<(), ConfigError> {
        let current = decode_hand(data)?;
        self.hands.rebuild(hand, &current);
        Ok(())
    }
}

fn hand_slot(hand: Hand) -> usize {
    match hand {
        Hand::Left => 0,
        Hand::Right => 1,
    }
}

// Global state access, thin wrapper for WASM bindings only
thread_local! {
    static APP_STATE: RefCell<Option<AppState>> = const { RefCell::new(None) };
}

/// Execute a closure with immutable access to AppState
///
/// Returns None if AppState is not initialized
pub fn with_app_state<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&AppState) -> R,
{
    APP_STATE.with(|state| {
        let borrowed = state.borrow();
        borrowed.as_ref().map(f)
    })
}

/// Execute a closure with mutable access to AppState
///
/// Returns None if AppState is not initialized
pub fn with_app_state_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut AppState) -> R,
{
    APP_STATE.with(|state| {
        let mut borrowed = state.borrow_mut();
        borrowed.as_mut().map(f)
    })
}

/// Initialize (or replace) the global AppState
pub fn initialize_app_state(config: EffectConfig, toggle: ToggleConfig) {
    APP_STATE.with(|state| {
        *state.borrow_mut() = Some(AppState::new(config, toggle));
    });
}
