//! 人形骨骼槽位

use serde::{Deserialize, Serialize};

macro_rules! human_bones {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// 人形骨骼槽位（封闭枚举，顺序固定）
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum HumanBone {
            $($variant),+
        }

        impl HumanBone {
            /// 全部槽位，按枚举顺序
            pub const ALL: &'static [HumanBone] = &[$(HumanBone::$variant),+];

            /// 槽位数量，决定映射表长度
            pub const COUNT: usize = Self::ALL.len();

            /// 骨骼编译器使用的语义名称
            pub fn human_name(self) -> &'static str {
                match self {
                    $(HumanBone::$variant => $name),+
                }
            }
        }
    };
}

human_bones! {
    Hips => "Hips",
    LeftUpperLeg => "LeftUpperLeg",
    RightUpperLeg => "RightUpperLeg",
    LeftLowerLeg => "LeftLowerLeg",
    RightLowerLeg => "RightLowerLeg",
    LeftFoot => "LeftFoot",
    RightFoot => "RightFoot",
    Spine => "Spine",
    Chest => "Chest",
    Neck => "Neck",
    Head => "Head",
    LeftShoulder => "LeftShoulder",
    RightShoulder => "RightShoulder",
    LeftUpperArm => "LeftUpperArm",
    RightUpperArm => "RightUpperArm",
    LeftLowerArm => "LeftLowerArm",
    RightLowerArm => "RightLowerArm",
    LeftHand => "LeftHand",
    RightHand => "RightHand",
    LeftToes => "LeftToes",
    RightToes => "RightToes",
    LeftEye => "LeftEye",
    RightEye => "RightEye",
    Jaw => "Jaw",
    LeftThumbProximal => "Left Thumb Proximal",
    LeftThumbIntermediate => "Left Thumb Intermediate",
    LeftThumbDistal => "Left Thumb Distal",
    LeftIndexProximal => "Left Index Proximal",
    LeftIndexIntermediate => "Left Index Intermediate",
    LeftIndexDistal => "Left Index Distal",
    LeftMiddleProximal => "Left Middle Proximal",
    LeftMiddleIntermediate => "Left Middle Intermediate",
    LeftMiddleDistal => "Left Middle Distal",
    LeftRingProximal => "Left Ring Proximal",
    LeftRingIntermediate => "Left Ring Intermediate",
    LeftRingDistal => "Left Ring Distal",
    LeftLittleProximal => "Left Little Proximal",
    LeftLittleIntermediate => "Left Little Intermediate",
    LeftLittleDistal => "Left Little Distal",
    RightThumbProximal => "Right Thumb Proximal",
    RightThumbIntermediate => "Right Thumb Intermediate",
    RightThumbDistal => "Right Thumb Distal",
    RightIndexProximal => "Right Index Proximal",
    RightIndexIntermediate => "Right Index Intermediate",
    RightIndexDistal => "Right Index Distal",
    RightMiddleProximal => "Right Middle Proximal",
    RightMiddleIntermediate => "Right Middle Intermediate",
    RightMiddleDistal => "Right Middle Distal",
    RightRingProximal => "Right Ring Proximal",
    RightRingIntermediate => "Right Ring Intermediate",
    RightRingDistal => "Right Ring Distal",
    RightLittleProximal => "Right Little Proximal",
    RightLittleIntermediate => "Right Little Intermediate",
    RightLittleDistal => "Right Little Distal",
    UpperChest => "UpperChest",
}

impl HumanBone {
    /// 编译骨骼资产时必须存在的槽位
    pub const REQUIRED: [HumanBone; 15] = [
        HumanBone::Hips,
        HumanBone::Spine,
        HumanBone::Head,
        HumanBone::LeftUpperLeg,
        HumanBone::LeftLowerLeg,
        HumanBone::LeftFoot,
        HumanBone::RightUpperLeg,
        HumanBone::RightLowerLeg,
        HumanBone::RightFoot,
        HumanBone::LeftUpperArm,
        HumanBone::LeftLowerArm,
        HumanBone::LeftHand,
        HumanBone::RightUpperArm,
        HumanBone::RightLowerArm,
        HumanBone::RightHand,
    ];

    /// 在映射表中的下标
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_human_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|bone| bone.human_name() == name)
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_declaration_order() {
        assert_eq!(HumanBone::COUNT, 55);
        for (i, bone) in HumanBone::ALL.iter().enumerate() {
            assert_eq!(bone.index(), i);
            assert_eq!(HumanBone::from_index(i), Some(*bone));
        }
        assert_eq!(HumanBone::from_index(HumanBone::COUNT), None);
    }

    #[test]
    fn test_human_names() {
        assert_eq!(HumanBone::LeftUpperArm.human_name(), "LeftUpperArm");
        assert_eq!(HumanBone::RightRingDistal.human_name(), "Right Ring Distal");
        assert_eq!(HumanBone::from_human_name("UpperChest"), Some(HumanBone::UpperChest));
        assert_eq!(HumanBone::from_human_name("Tail"), None);
    }

    #[test]
    fn test_required() {
        assert!(HumanBone::Hips.is_required());
        assert!(!HumanBone::Chest.is_required());
    }
}
