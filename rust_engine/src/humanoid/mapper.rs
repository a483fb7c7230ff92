//! 人形骨骼映射
//!
//! 维护槽位映射表，支持从已绑定的骨骼资产读取、通过分类器推断，
//! 以及在生成骨骼描述前把手臂校正为 T-Pose。

use glam::{Quat, Vec3};

use crate::skeleton::{NodeId, SceneHierarchy};
use crate::{MocapError, Result};

use super::{BoneSlotTable, HumanBone, SkeletonClassifier};

/// 映射状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingState {
    /// 没有任何槽位
    Empty,
    /// 已有槽位但姿态未校正
    PartiallyMapped,
    /// 已完成 T-Pose 校正
    FullyCorrected,
}

/// 人形骨骼映射器
#[derive(Clone, Debug, Default)]
pub struct BoneMapper {
    table: BoneSlotTable,
    corrected: bool,
}

impl BoneMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &BoneSlotTable {
        &self.table
    }

    pub fn get(&self, bone: HumanBone) -> Option<NodeId> {
        self.table.get(bone)
    }

    /// 手动指定槽位
    pub fn set_bone(&mut self, bone: HumanBone, node: Option<NodeId>) {
        self.table.set(bone, node);
        self.corrected = false;
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.corrected = false;
    }

    pub fn state(&self) -> MappingState {
        if self.table.is_empty() {
            MappingState::Empty
        } else if self.corrected {
            MappingState::FullyCorrected
        } else {
            MappingState::PartiallyMapped
        }
    }

    /// 从层级上已绑定的骨骼资产读取映射
    ///
    /// 先清空映射表，再按骨骼名称在层级中查找。没有绑定资产时结果为空。
    /// 返回映射成功的槽位数量。
    pub fn capture_from_bound_rig(&mut self, hierarchy: &SceneHierarchy) -> usize {
        self.clear();

        let Some(avatar) = hierarchy.animator.as_ref().and_then(|animator| animator.avatar.as_ref()) else {
            log::debug!("层级未绑定骨骼资产");
            return 0;
        };

        for &bone in HumanBone::ALL {
            let Some(name) = avatar.bone_name(bone) else {
                continue;
            };
            match hierarchy.find_by_name(name) {
                Some(node) => {
                    self.table.set(bone, Some(node));
                }
                None => log::warn!("骨骼资产 {} 中的 {} 在层级中不存在", avatar.name(), name),
            }
        }

        let count = self.table.populated_count();
        log::info!("从骨骼资产 {} 读取了 {} 个槽位", avatar.name(), count);
        count
    }

    /// 通过分类器推断映射
    ///
    /// Hips 槽位必须已指定且节点存在，否则不修改映射表直接返回错误。
    /// 分类器返回的槽位会覆盖已有值，返回覆盖的数量。
    pub fn guess_mapping(
        &mut self,
        hierarchy: &SceneHierarchy,
        classifier: &dyn SkeletonClassifier,
    ) -> Result<usize> {
        let Some(hips) = self.table.resolve(HumanBone::Hips, hierarchy) else {
            log::warn!("推断映射前需要先指定 Hips");
            return Err(MocapError::MissingRequiredBone(HumanBone::Hips));
        };

        let descendants = hierarchy.traverse_from(hips);
        let assignments = classifier.classify(hierarchy, hips, &descendants);
        for &(bone, node) in &assignments {
            self.table.set(bone, Some(node));
        }
        self.corrected = false;

        log::info!("推断了 {} 个槽位", assignments.len());
        Ok(assignments.len())
    }

    /// 把手臂校正为 T-Pose
    ///
    /// 旋转上臂，使上臂到前臂的方向朝向世界水平方向：左臂 -X，右臂 +X。
    /// 四个手臂槽位必须都已映射，否则不做任何修改。
    /// 上臂与前臂重合的一侧会被跳过，映射状态保持未校正。
    pub fn ensure_t_pose(&mut self, hierarchy: &mut SceneHierarchy) -> Result<()> {
        let mut arms = Vec::with_capacity(2);
        for (upper, lower, target) in [
            (HumanBone::LeftUpperArm, HumanBone::LeftLowerArm, Vec3::NEG_X),
            (HumanBone::RightUpperArm, HumanBone::RightLowerArm, Vec3::X),
        ] {
            let upper_node = self
                .table
                .resolve(upper, hierarchy)
                .ok_or(MocapError::MissingRequiredBone(upper))?;
            let lower_node = self
                .table
                .resolve(lower, hierarchy)
                .ok_or(MocapError::MissingRequiredBone(lower))?;
            arms.push((upper_node, lower_node, target));
        }

        // 任一侧无法校正时保持未校正状态
        let mut corrected = true;
        for (upper, lower, target) in arms {
            let direction = (hierarchy.position(lower) - hierarchy.position(upper)).normalize_or_zero();
            if direction == Vec3::ZERO {
                log::warn!("上臂与前臂重合，跳过校正: {:?}", hierarchy.name(upper));
                corrected = false;
                continue;
            }
            let correction = Quat::from_rotation_arc(direction, target);
            let rotation = hierarchy.rotation(upper);
            hierarchy.set_rotation(upper, correction * rotation);
        }

        self.corrected = corrected;
        Ok(())
    }
}
