use std::collections::HashMap;

use glam::{Quat, Vec3};

use super::id::{BoneId, HandJoint};

/// World-space pose of one bone.
///
/// Rotation is always tracked; position only when the source reports it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    pub rotation: Quat,
    pub position: Option<Vec3>,
}

impl Default for BonePose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BonePose {
    pub const IDENTITY: BonePose = BonePose {
        rotation: Quat::IDENTITY,
        position: None,
    };

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            position: None,
        }
    }

    pub fn new(rotation: Quat, position: Vec3) -> Self {
        Self {
            rotation,
            position: Some(position),
        }
    }

    /// Rotation angle plus positional distance to another pose.
    /// Positions only count when both poses carry one.
    pub fn distance(&self, other: &BonePose) -> f32 {
        let dot = self.rotation.dot(other.rotation).abs().min(1.0);
        let angle = 2.0 * dot.acos();
        let offset = match (self.position, other.position) {
            (Some(a), Some(b)) => a.distance(b),
            _ => 0.0,
        };
        angle + offset
    }

    /// Approximate equality, comparing quaternion components (either sign) and positions
    pub fn abs_diff_eq(&self, other: &BonePose, tolerance: f32) -> bool {
        let rotation_eq = self.rotation.abs_diff_eq(other.rotation, tolerance)
            || self.rotation.abs_diff_eq(-other.rotation, tolerance);
        let position_eq = match (self.position, other.position) {
            (Some(a), Some(b)) => a.abs_diff_eq(b, tolerance),
            (None, None) => true,
            _ => false,
        };
        rotation_eq && position_eq
    }
}

/// Immutable timestamped pose record held by the latency filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub pose: BonePose,
    /// Seconds on the shared frame clock
    pub timestamp: f32,
}

impl Sample {
    pub fn new(pose: BonePose, timestamp: f32) -> Self {
        Self { pose, timestamp }
    }
}

/// Read-only access to this frame's raw tracked poses.
///
/// Must be side-effect free. Returns None when the bone is not tracked this frame.
pub trait PoseSource {
    fn pose(&self, bone: BoneId) -> Option<BonePose>;
}

/// Receives the filtered pose to render for each bone
pub trait PoseSink {
    fn write(&mut self, bone: BoneId, pose: BonePose);
}

/// Pose storage keyed by arbitrary bone ids.
#[derive(Debug, Clone, Default)]
pub struct PoseMap {
    poses: HashMap<BoneId, BonePose>,
}

impl PoseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, bone: BoneId, pose: BonePose) {
        self.poses.insert(bone, pose);
    }

    pub fn get(&self, bone: BoneId) -> Option<BonePose> {
        self.poses.get(&bone).copied()
    }

    pub fn remove(&mut self, bone: BoneId) -> Option<BonePose> {
        self.poses.remove(&bone)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl PoseSource for PoseMap {
    fn pose(&self, bone: BoneId) -> Option<BonePose> {
        self.get(bone)
    }
}

impl PoseSink for PoseMap {
    fn write(&mut self, bone: BoneId, pose: BonePose) {
        self.set(bone, pose);
    }
}

/// One frame of hand joint poses, indexed by `HandJoint`.
///
/// Joints the tracker lost this frame are None.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPoseFrame {
    pub joints: [Option<BonePose>; HandJoint::COUNT],
}

impl Default for HandPoseFrame {
    fn default() -> Self {
        Self {
            joints: [None; HandJoint::COUNT],
        }
    }
}

impl HandPoseFrame {
    /// Every joint tracked at the same pose
    pub fn uniform(pose: BonePose) -> Self {
        Self {
            joints: [Some(pose); HandJoint::COUNT],
        }
    }

    /// Return a new frame with one joint replaced (Functional Set)
    pub fn with_joint(mut self, joint: HandJoint, pose: BonePose) -> Self {
        self.joints[joint.index()] = Some(pose);
        self
    }

    pub fn joint(&self, joint: HandJoint) -> Option<BonePose> {
        self.joints[joint.index()]
    }

    /// Position of a joint, used for the fingertip probe
    pub fn joint_position(&self, joint: HandJoint) -> Option<Vec3> {
        self.joint(joint).and_then(|pose| pose.position)
    }
}

impl PoseSource for HandPoseFrame {
    fn pose(&self, bone: BoneId) -> Option<BonePose> {
        self.joints.get(bone.index()).copied().flatten()
    }
}

impl PoseSink for HandPoseFrame {
    fn write(&mut self, bone: BoneId, pose: BonePose) {
        if let Some(slot) = self.joints.get_mut(bone.index()) {
            *slot = Some(pose);
        }
    }
}
