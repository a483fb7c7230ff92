//! 人形骨骼描述
//!
//! 交给骨骼编译器的可序列化数据：槽位映射、完整骨架和扭转/拉伸参数。

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::humanoid::HumanBone;

/// 关节限制，默认使用编译器自带的限制
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HumanLimit {
    pub use_default_values: bool,
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub axis_length: f32,
}

impl Default for HumanLimit {
    fn default() -> Self {
        Self {
            use_default_values: true,
            min: Vec3::ZERO,
            max: Vec3::ZERO,
            center: Vec3::ZERO,
            axis_length: 0.0,
        }
    }
}

/// 一个已映射的槽位：场景节点名 → 语义名
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HumanBoneEntry {
    pub bone_name: String,
    pub human_name: String,
    #[serde(default)]
    pub limit: HumanLimit,
}

impl HumanBoneEntry {
    pub fn new(bone_name: impl Into<String>, bone: HumanBone) -> Self {
        Self {
            bone_name: bone_name.into(),
            human_name: bone.human_name().to_string(),
            limit: HumanLimit::default(),
        }
    }

    /// 语义名对应的槽位
    pub fn human_bone(&self) -> Option<HumanBone> {
        HumanBone::from_human_name(&self.human_name)
    }
}

/// 绑定姿态下的骨骼（局部变换）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkeletonBone {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// 扭转与拉伸参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvatarTuning {
    pub upper_arm_twist: f32,
    pub lower_arm_twist: f32,
    pub upper_leg_twist: f32,
    pub lower_leg_twist: f32,
    pub arm_stretch: f32,
    pub leg_stretch: f32,
    pub feet_spacing: f32,
}

impl Default for AvatarTuning {
    fn default() -> Self {
        Self {
            upper_arm_twist: 0.5,
            lower_arm_twist: 0.5,
            upper_leg_twist: 0.5,
            lower_leg_twist: 0.5,
            arm_stretch: 0.05,
            leg_stretch: 0.05,
            feet_spacing: 0.0,
        }
    }
}

/// 人形骨骼描述
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AvatarDescription {
    /// 已映射的槽位，按槽位顺序
    pub human: Vec<HumanBoneEntry>,
    /// 层级中的全部节点，与映射无关
    pub skeleton: Vec<SkeletonBone>,
    #[serde(flatten)]
    pub tuning: AvatarTuning,
}

impl AvatarDescription {
    /// 槽位映射到的节点名
    pub fn bone_name(&self, bone: HumanBone) -> Option<&str> {
        self.human
            .iter()
            .find(|entry| entry.human_name == bone.human_name())
            .map(|entry| entry.bone_name.as_str())
    }

    pub fn skeleton_bone(&self, name: &str) -> Option<&SkeletonBone> {
        self.skeleton.iter().find(|bone| bone.name == name)
    }

    /// 缺少的必需槽位
    pub fn missing_required(&self) -> Vec<HumanBone> {
        HumanBone::REQUIRED
            .iter()
            .copied()
            .filter(|&bone| self.bone_name(bone).is_none())
            .collect()
    }
}
