/// Opaque identity of one transformable node in a visual rig.
///
/// Bones carry no data of their own; hosts map their scene nodes to ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(pub u32);

impl BoneId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<HandJoint> for BoneId {
    fn from(joint: HandJoint) -> Self {
        BoneId(joint as u32)
    }
}

/// Joints of a tracked hand, following the XR hand-tracking joint set.
/// Ordered for topological traversal (parents before children), so the
/// wrist comes first and the palm second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandJoint {
    // Root
    Wrist = 0,
    Palm = 1,

    // Thumb chain (no intermediate joint)
    ThumbMetacarpal = 2,
    ThumbProximal = 3,
    ThumbDistal = 4,
    ThumbTip = 5,

    IndexMetacarpal = 6,
    IndexProximal = 7,
    IndexIntermediate = 8,
    IndexDistal = 9,
    IndexTip = 10,

    MiddleMetacarpal = 11,
    MiddleProximal = 12,
    MiddleIntermediate = 13,
    MiddleDistal = 14,
    MiddleTip = 15,

    RingMetacarpal = 16,
    RingProximal = 17,
    RingIntermediate = 18,
    RingDistal = 19,
    RingTip = 20,

    LittleMetacarpal = 21,
    LittleProximal = 22,
    LittleIntermediate = 23,
    LittleDistal = 24,
    LittleTip = 25,
}

impl HandJoint {
    /// Total number of joints per hand
    pub const COUNT: usize = 26;

    /// Convert to array index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a joint by array index
    pub fn from_index(index: usize) -> Option<HandJoint> {
        Self::ALL.get(index).copied()
    }

    /// Look up the joint a bone id refers to, if it is a hand joint
    pub fn from_bone(bone: BoneId) -> Option<HandJoint> {
        Self::from_index(bone.index())
    }

    /// Parent joint (None for the wrist)
    #[inline]
    pub const fn parent(self) -> Option<HandJoint> {
        HAND_HIERARCHY[self.index()]
    }

    /// Get all joints in topological order (parents before children)
    pub const ALL: [HandJoint; Self::COUNT] = [
        HandJoint::Wrist,
        HandJoint::Palm,
        HandJoint::ThumbMetacarpal,
        HandJoint::ThumbProximal,
        HandJoint::ThumbDistal,
        HandJoint::ThumbTip,
        HandJoint::IndexMetacarpal,
        HandJoint::IndexProximal,
        HandJoint::IndexIntermediate,
        HandJoint::IndexDistal,
        HandJoint::IndexTip,
        HandJoint::MiddleMetacarpal,
        HandJoint::MiddleProximal,
        HandJoint::MiddleIntermediate,
        HandJoint::MiddleDistal,
        HandJoint::MiddleTip,
        HandJoint::RingMetacarpal,
        HandJoint::RingProximal,
        HandJoint::RingIntermediate,
        HandJoint::RingDistal,
        HandJoint::RingTip,
        HandJoint::LittleMetacarpal,
        HandJoint::LittleProximal,
        HandJoint::LittleIntermediate,
        HandJoint::LittleDistal,
        HandJoint::LittleTip,
    ];
}

/// Parent of each hand joint, indexed by `HandJoint::index()`.
pub const HAND_HIERARCHY: [Option<HandJoint>; HandJoint::COUNT] = [
    // Wrist - root, no parent
    None,
    Some(HandJoint::Wrist),
    // Thumb
    Some(HandJoint::Wrist),
    Some(HandJoint::ThumbMetacarpal),
    Some(HandJoint::ThumbProximal),
    Some(HandJoint::ThumbDistal),
    // Index
    Some(HandJoint::Wrist),
    Some(HandJoint::IndexMetacarpal),
    Some(HandJoint::IndexProximal),
    Some(HandJoint::IndexIntermediate),
    Some(HandJoint::IndexDistal),
    // Middle
    Some(HandJoint::Wrist),
    Some(HandJoint::MiddleMetacarpal),
    Some(HandJoint::MiddleProximal),
    Some(HandJoint::MiddleIntermediate),
    Some(HandJoint::MiddleDistal),
    // Ring
    Some(HandJoint::Wrist),
    Some(HandJoint::RingMetacarpal),
    Some(HandJoint::RingProximal),
    Some(HandJoint::RingIntermediate),
    Some(HandJoint::RingDistal),
    // Little
    Some(HandJoint::Wrist),
    Some(HandJoint::LittleMetacarpal),
    Some(HandJoint::LittleProximal),
    Some(HandJoint::LittleIntermediate),
    Some(HandJoint::LittleDistal),
];
