use crate::bone::BonePose;
use crate::effect_constants::MIN_DAMP_STRENGTH;

/// Persistent smoothed pose for exponential damping.
///
/// Each step moves the state a fraction `delta * strength` of the way toward
/// the raw pose (slerp for rotation, lerp for position). The fraction is
/// clamped to [0, 1] so a long frame snaps to the target instead of overshooting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DampState {
    pose: Option<BonePose>,
}

impl DampState {
    /// State seeded with the bone's current pose
    pub fn seeded(pose: BonePose) -> Self {
        Self { pose: Some(pose) }
    }

    /// Interpolation factor for one frame
    #[inline]
    pub fn factor(delta_seconds: f32, damp_strength: f32) -> f32 {
        (delta_seconds * damp_strength.max(MIN_DAMP_STRENGTH)).clamp(0.0, 1.0)
    }

    /// Advance one frame toward `raw` and return the damped pose.
    ///
    /// An unseeded state adopts the raw pose on its first step.
    pub fn step(&mut self, raw: BonePose, delta_seconds: f32, damp_strength: f32) -> BonePose {
        let t = Self::factor(delta_seconds, damp_strength);

        let next = match self.pose {
            None => raw,
            Some(current) => BonePose {
                rotation: current.rotation.slerp(raw.rotation, t),
                position: match (current.position, raw.position) {
                    (Some(from), Some(to)) => Some(from.lerp(to, t)),
                    (None, Some(to)) => Some(to),
                    (_, None) => None,
                },
            },
        };

        self.pose = Some(next);
        next
    }

    /// Snap the state to `pose` (used when the effect is disabled)
    pub fn reset(&mut self, pose: BonePose) {
        self.pose = Some(pose);
    }

    pub fn current(&self) -> Option<BonePose> {
        self.pose
    }
}
