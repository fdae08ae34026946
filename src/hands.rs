//! Two-hand composition
//!
//! `HandPair` owns both hand controllers, the shared config and, in shared
//! scope, the single effect flag both toggles write. Each frame a hand's
//! toggle is evaluated before its filters so a press takes effect immediately.

use std::rc::Rc;

use glam::Vec3;

use crate::bone::{HandJoint, HandPoseFrame, HandSkeleton};
use crate::clock::FrameTime;
use crate::config::{ConfigScope, EffectConfig, ToggleConfig};
use crate::orchestrator::{EffectOrchestrator, RigBinding};
use crate::toggle::{EffectFlag, ProximityVolume, ToggleController, VolumeLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn from_index(index: u8) -> Option<Hand> {
        match index {
            0 => Some(Hand::Left),
            1 => Some(Hand::Right),
            _ => None,
        }
    }
}

/// Whether both hands toggle one effect flag or each keeps its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleScope {
    Shared,
    Local,
}

impl ToggleScope {
    pub fn from_config(config: &ToggleConfig) -> Self {
        if config.sync_with_other_hand {
            Self::Shared
        } else {
            Self::Local
        }
    }
}

/// Toggle plus filters for one hand
pub struct HandController {
    pub hand: Hand,
    /// Joint whose position probes the toggle button
    pub fingertip: HandJoint,
    toggle: ToggleController,
    effect: EffectOrchestrator,
}

impl HandController {
    pub fn new(hand: Hand, toggle: ToggleController, effect: EffectOrchestrator) -> Self {
        Self {
            hand,
            fingertip: HandJoint::IndexTip,
            toggle,
            effect,
        }
    }

    /// One frame: toggle first, then filters. `tracked` is read-only.
    ///
    /// Only for a hand driven on its own; two hands sharing a flag go through
    /// [`HandPair::update_frame`] so both toggles run before either filter.
    pub fn update(&mut self, frame: FrameTime, tracked: &HandPoseFrame, out: &mut HandPoseFrame) {
        self.update_with_probe(frame, tracked, tracked.joint_position(self.fingertip), out);
    }

    /// Toggle phase: probe the button with this hand's fingertip.
    /// Returns true if the flag flipped.
    pub fn evaluate_toggle(&mut self, tracked: &HandPoseFrame) -> bool {
        self.toggle.update(tracked.joint_position(self.fingertip))
    }

    /// Filter phase, using whatever the flag says after every toggle ran
    pub fn apply_filters(
        &mut self,
        frame: FrameTime,
        tracked: &HandPoseFrame,
        out: &mut HandPoseFrame,
    ) {
        self.effect.update(frame, tracked, out);
    }

    /// Same as `update` with an explicit probe point (e.g. the other hand's fingertip)
    pub fn update_with_probe(
        &mut self,
        frame: FrameTime,
        tracked: &HandPoseFrame,
        probe: Option<Vec3>,
        out: &mut HandPoseFrame,
    ) {
        self.toggle.update(probe);
        self.effect.update(frame, tracked, out);
    }

    pub fn enabled(&self) -> bool {
        self.effect.flag().get()
    }

    pub fn toggle(&self) -> &ToggleController {
        &self.toggle
    }

    pub fn toggle_mut(&mut self) -> &mut ToggleController {
        &mut self.toggle
    }

    pub fn effect(&self) -> &EffectOrchestrator {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut EffectOrchestrator {
        &mut self.effect
    }
}

/// Both hands under one configuration.
pub struct HandPair {
    config: ConfigScope,
    scope: ToggleScope,
    left: HandController,
    right: HandController,
}

impl HandPair {
    /// Build both controllers. Per-bone rigs rooted at the wrist; `exclude_root`
    /// keeps the wrist realtime.
    pub fn new(config: EffectConfig, toggle: ToggleConfig, exclude_root: bool) -> Self {
        let config_scope = ConfigScope::global(config);
        let scope = ToggleScope::from_config(&toggle);

        let left_flag = EffectFlag::new(config.enabled);
        let right_flag = match scope {
            ToggleScope::Shared => left_flag.clone(),
            ToggleScope::Local => EffectFlag::new(config.enabled),
        };

        let binding = RigBinding::PerBone {
            root: Some(HandJoint::Wrist.into()),
            exclude_root,
        };
        let blank = HandPoseFrame::default();

        let make = |hand: Hand, flag: EffectFlag| {
            let mut effect = EffectOrchestrator::new(config_scope.clone(), flag.clone());
            effect.add_rig(binding, &HandSkeleton, &blank);
            HandController::new(hand, ToggleController::new(flag, toggle.clone()), effect)
        };

        let left = make(Hand::Left, left_flag);
        let right = make(Hand::Right, right_flag);

        Self {
            config: config_scope,
            scope,
            left,
            right,
        }
    }

    pub fn hand(&self, hand: Hand) -> &HandController {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn hand_mut(&mut self, hand: Hand) -> &mut HandController {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    pub fn scope(&self) -> ToggleScope {
        self.scope
    }

    /// Current parameters (shared by both hands)
    pub fn config(&self) -> EffectConfig {
        self.config.get()
    }

    /// Change parameters for both hands
    pub fn update_config<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EffectConfig),
    {
        self.config.update(f);
    }

    /// Bind the same button volume to both toggles
    pub fn bind_button(&mut self, volume: Rc<dyn ProximityVolume>) {
        for hand in Hand::ALL {
            self.hand_mut(hand).toggle_mut().bind_volume(Some(volume.clone()));
        }
    }

    /// Activate both toggles, resolving the button by tag where unbound
    pub fn activate(&mut self, lookup: Option<&dyn VolumeLookup>) {
        for hand in Hand::ALL {
            self.hand_mut(hand).toggle_mut().activate(lookup);
        }
    }

    /// Re-scan one hand's rig, seeding damp state from `current`
    pub fn rebuild(&mut self, hand: Hand, current: &HandPoseFrame) {
        self.hand_mut(hand)
            .effect_mut()
            .rebuild(&HandSkeleton, current);
    }

    /// Advance both hands by one frame. Both toggles are evaluated before
    /// either hand filters, so a press by one hand reaches the other hand's
    /// output in the same frame. `out` is indexed left, right.
    pub fn update_frame(
        &mut self,
        frame: FrameTime,
        left: &HandPoseFrame,
        right: &HandPoseFrame,
        out: &mut [HandPoseFrame; 2],
    ) {
        self.left.evaluate_toggle(left);
        self.right.evaluate_toggle(right);

        let [left_out, right_out] = out;
        self.left.apply_filters(frame, left, left_out);
        self.right.apply_filters(frame, right, right_out);
    }

    /// Advance one hand by a frame (single-hand hosts)
    pub fn update(
        &mut self,
        hand: Hand,
        frame: FrameTime,
        tracked: &HandPoseFrame,
        out: &mut HandPoseFrame,
    ) {
        self.hand_mut(hand).update(frame, tracked, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bone::BonePose;
    use crate::clock::{FixedStepClock, FrameClock};
    use crate::config::EffectMode;
    use crate::toggle::BoxVolume;
    use glam::Quat;

    const BUTTON_CENTER: Vec3 = Vec3::new(0.0, 1.0, 0.3);

    fn hand_frame(angle: f32, tip: Vec3) -> HandPoseFrame {
        HandPoseFrame::uniform(BonePose::from_rotation(Quat::from_rotation_y(angle)))
            .with_joint(HandJoint::IndexTip, BonePose::new(Quat::IDENTITY, tip))
    }

    fn pair(sync: bool) -> HandPair {
        let toggle = ToggleConfig {
            sync_with_other_hand: sync,
            ..Default::default()
        };
        let mut pair = HandPair::new(EffectConfig::default(), toggle, true);
        pair.bind_button(Rc::new(BoxVolume::axis_aligned(
            BUTTON_CENTER,
            Vec3::splat(0.02),
        )));
        pair
    }

    #[test]
    fn test_shared_scope_press_disables_both() {
        let mut pair = pair(true);
        let mut clock = FixedStepClock::from_fps(90.0);
        let mut out = HandPoseFrame::default();

        let frame = clock.tick();
        pair.update(Hand::Left, frame, &hand_frame(0.0, BUTTON_CENTER), &mut out);

        assert!(!pair.hand(Hand::Left).enabled());
        assert!(!pair.hand(Hand::Right).enabled());
    }

    #[test]
    fn test_local_scope_press_affects_one_hand() {
        let mut pair = pair(false);
        let mut clock = FixedStepClock::from_fps(90.0);
        let mut out = HandPoseFrame::default();

        let frame = clock.tick();
        pair.update(Hand::Right, frame, &hand_frame(0.0, BUTTON_CENTER), &mut out);

        assert!(pair.hand(Hand::Left).enabled());
        assert!(!pair.hand(Hand::Right).enabled());
        assert_eq!(pair.scope(), ToggleScope::Local);
    }

    #[test]
    fn test_press_takes_effect_same_frame() {
        let mut pair = pair(true);
        let mut clock = FixedStepClock::from_fps(90.0);
        let mut out = HandPoseFrame::default();
        let away = Vec3::new(0.0, 1.0, 1.0);

        // Latency mode warms up on pose A
        for _ in 0..60 {
            pair.update(Hand::Left, clock.tick(), &hand_frame(0.0, away), &mut out);
        }

        // Press while the hand moves to pose B: effect turns off, raw B shows now
        let pressed = hand_frame(1.0, BUTTON_CENTER);
        pair.update(Hand::Left, clock.tick(), &pressed, &mut out);
        assert_eq!(out.joint(HandJoint::MiddleTip), pressed.joint(HandJoint::MiddleTip));
    }

    #[test]
    fn test_press_by_right_hand_reaches_left_hand_same_frame() {
        let mut pair = pair(true);
        let mut clock = FixedStepClock::from_fps(90.0);
        let mut out = [HandPoseFrame::default(); 2];
        let away = Vec3::new(0.0, 1.0, 1.0);

        for _ in 0..60 {
            let idle = hand_frame(0.0, away);
            pair.update_frame(clock.tick(), &idle, &idle, &mut out);
        }

        // Left moves while right presses the button in the same frame
        let left = hand_frame(1.0, away);
        let right = hand_frame(0.0, BUTTON_CENTER);
        pair.update_frame(clock.tick(), &left, &right, &mut out);

        assert!(!pair.hand(Hand::Left).enabled());
        assert_eq!(out[0].joint(HandJoint::MiddleTip), left.joint(HandJoint::MiddleTip));
        assert_eq!(out[1].joint(HandJoint::MiddleTip), right.joint(HandJoint::MiddleTip));
    }

    #[test]
    fn test_update_frame_runs_both_toggles_once() {
        let mut pair = pair(true);
        let mut out = [HandPoseFrame::default(); 2];
        let pressed = hand_frame(0.0, BUTTON_CENTER);

        // Both fingertips enter together: two flips on one shared flag
        pair.update_frame(FrameTime::new(0.0, 0.0), &pressed, &pressed, &mut out);
        assert!(pair.hand(Hand::Right).enabled());

        // Staying inside does not flip again
        pair.update_frame(FrameTime::new(0.1, 0.1), &pressed, &pressed, &mut out);
        assert!(pair.hand(Hand::Right).enabled());
    }

    #[test]
    fn test_update_config_reaches_both_hands() {
        let mut pair = pair(true);
        pair.update_config(|c| c.mode = EffectMode::Damping);
        assert_eq!(pair.config().mode, EffectMode::Damping);
        assert_eq!(
            pair.hand(Hand::Right).effect().config().get().mode,
            EffectMode::Damping
        );
    }

    #[test]
    fn test_rebuild_seeds_from_current_pose() {
        let mut pair = pair(true);
        pair.update_config(|c| c.mode = EffectMode::Damping);

        let current = hand_frame(0.5, Vec3::ZERO);
        pair.rebuild(Hand::Left, &current);

        let mut out = HandPoseFrame::default();
        pair.update(Hand::Left, FrameTime::new(0.0, 1.0 / 90.0), &current, &mut out);
        let joint = out.joint(HandJoint::ThumbTip).unwrap();
        assert!(joint.abs_diff_eq(&current.joint(HandJoint::ThumbTip).unwrap(), 1e-5));
    }

    struct Scene;

    impl VolumeLookup for Scene {
        fn find_by_tag(&self, tag: &str) -> Option<Rc<dyn ProximityVolume>> {
            let volume: Rc<dyn ProximityVolume> =
                Rc::new(BoxVolume::axis_aligned(BUTTON_CENTER, Vec3::splat(0.02)));
            (tag == "button-toggle").then_some(volume)
        }
    }

    #[test]
    fn test_activate_resolves_button_by_tag() {
        let mut pair = HandPair::new(EffectConfig::default(), ToggleConfig::default(), true);
        assert!(!pair.hand(Hand::Left).toggle().has_volume());

        pair.activate(Some(&Scene));
        assert!(pair.hand(Hand::Left).toggle().has_volume());
        assert!(pair.hand(Hand::Right).toggle().has_volume());

        let mut out = HandPoseFrame::default();
        pair.update(
            Hand::Right,
            FrameTime::new(0.0, 0.0),
            &hand_frame(0.0, BUTTON_CENTER),
            &mut out,
        );
        assert!(!pair.hand(Hand::Left).enabled());
    }

    #[test]
    fn test_hand_from_index() {
        assert_eq!(Hand::from_index(0), Some(Hand::Left));
        assert_eq!(Hand::from_index(1), Some(Hand::Right));
        assert_eq!(Hand::from_index(2), None);
    }
}
