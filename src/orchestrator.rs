//! Per-frame effect routing
//!
//! `EffectOrchestrator::update` must run once per frame, after the pose
//! source has published this frame's raw poses and after the toggle for the
//! same hand has been evaluated. The host frame loop owns that ordering.

use crate::bone::{BoneId, BonePose, BoneRegistry, PoseSink, PoseSource, RigHierarchy};
use crate::clock::FrameTime;
use crate::config::{ActiveMode, ConfigScope, EffectConfig};
use crate::toggle::EffectFlag;

/// How a managed rig maps onto filter channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigBinding {
    /// One channel per node under `root`; each node is read and written in place
    PerBone {
        root: Option<BoneId>,
        exclude_root: bool,
    },
    /// One channel reading `tracking` and writing `visual_root`
    WholeRig {
        tracking: Option<BoneId>,
        visual_root: Option<BoneId>,
    },
}

impl RigBinding {
    /// Per-bone binding that keeps the root (wrist) realtime
    pub fn per_bone(root: BoneId) -> Self {
        Self::PerBone {
            root: Some(root),
            exclude_root: true,
        }
    }

    pub fn whole_rig(tracking: BoneId, visual_root: BoneId) -> Self {
        Self::WholeRig {
            tracking: Some(tracking),
            visual_root: Some(visual_root),
        }
    }
}

/// One rig under effect control and its filter state
#[derive(Debug, Clone)]
pub struct ManagedRig {
    pub binding: RigBinding,
    registry: BoneRegistry,
}

impl ManagedRig {
    pub fn new(binding: RigBinding) -> Self {
        Self {
            binding,
            registry: BoneRegistry::new(),
        }
    }

    /// Recreate the bone set and all filter state for this rig
    pub fn rebuild<H, S>(&mut self, rig: &H, poses: &S)
    where
        H: RigHierarchy + ?Sized,
        S: PoseSource + ?Sized,
    {
        match self.binding {
            RigBinding::PerBone { root, exclude_root } => {
                self.registry.rebuild(rig, root, exclude_root, poses);
            }
            RigBinding::WholeRig {
                tracking,
                visual_root,
            } => self.registry.rebuild_single(tracking, visual_root, poses),
        }
    }

    pub fn registry(&self) -> &BoneRegistry {
        &self.registry
    }

    /// Run one frame of the resolved mode over every channel
    fn apply<S, K>(
        &mut self,
        mode: ActiveMode,
        config: &EffectConfig,
        frame: FrameTime,
        source: &S,
        sink: &mut K,
    ) where
        S: PoseSource + ?Sized,
        K: PoseSink + ?Sized,
    {
        let latency = config.latency_seconds;
        let strength = config.effective_damp_strength();

        for entry in self.registry.entries_mut() {
            let output = match (mode, source.pose(entry.source)) {
                // Disabled always discards history, tracked or not
                (ActiveMode::Off, None) => {
                    entry.discard_history();
                    continue;
                }
                // Untracked this frame: leave the previous output on screen
                (_, None) => continue,
                (ActiveMode::Off, Some(raw)) => {
                    entry.reset(raw);
                    raw
                }
                (ActiveMode::Damping, Some(raw)) => entry.damp.step(raw, frame.delta, strength),
                (ActiveMode::Latency, Some(raw)) => entry.buffer.step(raw, frame.now, latency),
            };

            sink.write(entry.target, output);
        }
    }
}

/// Drives the impairment filters for a set of rigs.
#[derive(Debug)]
pub struct EffectOrchestrator {
    config: ConfigScope,
    flag: EffectFlag,
    rigs: Vec<ManagedRig>,
    last_mode: Option<ActiveMode>,
}

impl EffectOrchestrator {
    pub fn new(config: ConfigScope, flag: EffectFlag) -> Self {
        Self {
            config,
            flag,
            rigs: Vec::new(),
            last_mode: None,
        }
    }

    /// Local config with its own flag seeded from `config.enabled`
    pub fn standalone(config: EffectConfig) -> Self {
        Self::new(ConfigScope::local(config), EffectFlag::new(config.enabled))
    }

    /// Register a rig and build its bone set immediately
    pub fn add_rig<H, S>(&mut self, binding: RigBinding, rig: &H, poses: &S) -> usize
    where
        H: RigHierarchy + ?Sized,
        S: PoseSource + ?Sized,
    {
        let mut managed = ManagedRig::new(binding);
        managed.rebuild(rig, poses);
        self.rigs.push(managed);
        self.rigs.len() - 1
    }

    /// Manual rebuild trigger: re-scan every rig hierarchy
    pub fn rebuild<H, S>(&mut self, rig: &H, poses: &S)
    where
        H: RigHierarchy + ?Sized,
        S: PoseSource + ?Sized,
    {
        for managed in &mut self.rigs {
            managed.rebuild(rig, poses);
        }
    }

    /// Mode the next update will run
    pub fn active_mode(&self) -> ActiveMode {
        self.config.get().active_mode(self.flag.get())
    }

    /// Advance one frame for every managed rig
    pub fn update<S, K>(&mut self, frame: FrameTime, source: &S, sink: &mut K)
    where
        S: PoseSource + ?Sized,
        K: PoseSink + ?Sized,
    {
        let config = self.config.get();
        let mode = config.active_mode(self.flag.get());

        if self.last_mode != Some(mode) {
            log::debug!("Effect mode: {:?}", mode);
            self.last_mode = Some(mode);
        }

        for managed in &mut self.rigs {
            managed.apply(mode, &config, frame, source, sink);
        }
    }

    pub fn flag(&self) -> &EffectFlag {
        &self.flag
    }

    pub fn config(&self) -> &ConfigScope {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigScope {
        &mut self.config
    }

    pub fn rigs(&self) -> &[ManagedRig] {
        &self.rigs
    }
}
