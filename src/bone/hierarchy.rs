use super::id::{BoneId, HandJoint, HAND_HIERARCHY};
use super::registry::RigHierarchy;

const fn compute_descendant_masks() -> [u32; HandJoint::COUNT] {
    let mut masks = [0u32; HandJoint::COUNT];
    let mut i = 0;
    while i < HandJoint::COUNT {
        // Mask for joint 'i' (the ancestor): itself plus every joint whose
        // parent chain reaches it
        let mut mask: u32 = 1 << i;
        let mut j = 0;

        while j < HandJoint::COUNT {
            let mut curr = j;
            let mut depth = 0;

            // Max depth check to ensure termination relative to hierarchy size
            while depth < HandJoint::COUNT {
                match HAND_HIERARCHY[curr] {
                    Some(parent) => {
                        if parent.index() == i {
                            mask |= 1 << j;
                            break;
                        }
                        curr = parent.index();
                    }
                    None => break,
                }
                depth += 1;
            }
            j += 1;
        }
        masks[i] = mask;
        i += 1;
    }
    masks
}

/// Bit j of entry i is set when joint j is joint i or one of its descendants.
pub const DESCENDANT_MASKS: [u32; HandJoint::COUNT] = compute_descendant_masks();

/// Static hand rig built from `HAND_HIERARCHY`.
///
/// Every `HandJoint` exists, so any hand joint can serve as a rig root.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandSkeleton;

impl HandSkeleton {
    /// Joint ids under `root` (inclusive), parents before children
    pub fn subtree(root: HandJoint) -> impl Iterator<Item = HandJoint> {
        let mask = DESCENDANT_MASKS[root.index()];
        HandJoint::ALL
            .into_iter()
            .filter(move |joint| mask & (1 << joint.index()) != 0)
    }
}

impl RigHierarchy for HandSkeleton {
    fn descendants(&self, root: BoneId) -> Option<Vec<BoneId>> {
        let root = HandJoint::from_bone(root)?;
        Some(Self::subtree(root).map(BoneId::from).collect())
    }
}
