use super::id::BoneId;
use super::pose::{BonePose, PoseSource};
use crate::filter::{DampState, TemporalBuffer};

/// Rig hierarchy enumerator supplied by the host.
pub trait RigHierarchy {
    /// All nodes under `root`, root included and first, parents before children.
    /// None if the root does not exist.
    fn descendants(&self, root: BoneId) -> Option<Vec<BoneId>>;
}

/// One filtered channel: the raw pose is read from `source` and the filtered
/// pose written to `target`. Per-bone rigs use the same node for both.
#[derive(Debug, Clone)]
pub struct FilteredBone {
    pub source: BoneId,
    pub target: BoneId,
    pub buffer: TemporalBuffer,
    pub damp: DampState,
}

impl FilteredBone {
    /// Fresh filter state seeded with the target's current pose, when known
    pub fn new(source: BoneId, target: BoneId, current: Option<BonePose>) -> Self {
        Self {
            source,
            target,
            buffer: TemporalBuffer::new(),
            damp: current.map(DampState::seeded).unwrap_or_default(),
        }
    }

    /// Drop history and snap the damp state to `raw`
    pub fn reset(&mut self, raw: BonePose) {
        self.buffer.clear();
        self.damp.reset(raw);
    }

    /// Drop history with no pose to snap to; the damp state adopts the next raw pose
    pub fn discard_history(&mut self) {
        self.buffer.clear();
        self.damp = DampState::default();
    }
}

/// The set of bones subject to filtering and their per-bone filter state.
///
/// The set only changes through `rebuild`/`rebuild_single`, which replace it wholesale.
#[derive(Debug, Clone, Default)]
pub struct BoneRegistry {
    bones: Vec<FilteredBone>,
}

impl BoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-scan the rig under `root` and recreate all filter state.
    ///
    /// A missing root yields an empty set rather than an error.
    pub fn rebuild<H, S>(
        &mut self,
        rig: &H,
        root: Option<BoneId>,
        exclude_root: bool,
        poses: &S,
    ) -> Vec<BoneId>
    where
        H: RigHierarchy + ?Sized,
        S: PoseSource + ?Sized,
    {
        let nodes = match root.and_then(|root| rig.descendants(root).map(|nodes| (root, nodes))) {
            Some((root, nodes)) => nodes
                .into_iter()
                .filter(|&bone| !(exclude_root && bone == root))
                .collect::<Vec<_>>(),
            None => {
                log::warn!("Rig root {:?} not found, no bones to filter", root);
                Vec::new()
            }
        };

        self.bones = nodes
            .iter()
            .map(|&bone| FilteredBone::new(bone, bone, poses.pose(bone)))
            .collect();

        log::info!("Bone registry rebuilt: {} bones", self.bones.len());
        nodes
    }

    /// Replace the set with a single whole-rig channel
    pub fn rebuild_single<S>(&mut self, source: Option<BoneId>, target: Option<BoneId>, poses: &S)
    where
        S: PoseSource + ?Sized,
    {
        self.bones = match (source, target) {
            (Some(source), Some(target)) => {
                vec![FilteredBone::new(source, target, poses.pose(target))]
            }
            _ => {
                log::warn!("Whole-rig binding incomplete, no bones to filter");
                Vec::new()
            }
        };
    }

    /// Bone ids written by this registry, in traversal order
    pub fn bones(&self) -> impl Iterator<Item = BoneId> + '_ {
        self.bones.iter().map(|entry| entry.target)
    }

    pub fn entries(&self) -> &[FilteredBone] {
        &self.bones
    }

    pub fn entries_mut(&mut self) -> &mut [FilteredBone] {
        &mut self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
