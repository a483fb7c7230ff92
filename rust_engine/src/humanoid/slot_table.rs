//! 骨骼槽位映射表

use crate::skeleton::{NodeId, SceneHierarchy};

use super::HumanBone;

/// 槽位 → 场景节点的映射表
///
/// 长度固定为 `HumanBone::COUNT`，未映射的槽位为 `None`。
/// 只保存节点句柄，不持有节点。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneSlotTable {
    slots: [Option<NodeId>; HumanBone::COUNT],
}

impl BoneSlotTable {
    pub fn new() -> Self {
        Self {
            slots: [None; HumanBone::COUNT],
        }
    }

    pub fn get(&self, bone: HumanBone) -> Option<NodeId> {
        self.slots[bone.index()]
    }

    /// 设置槽位，返回旧值
    pub fn set(&mut self, bone: HumanBone, node: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.slots[bone.index()], node)
    }

    pub fn clear(&mut self) {
        self.slots = [None; HumanBone::COUNT];
    }

    /// 已映射的槽位，按枚举顺序
    pub fn iter(&self) -> impl Iterator<Item = (HumanBone, NodeId)> + '_ {
        HumanBone::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(&bone, slot)| slot.map(|node| (bone, node)))
    }

    pub fn populated_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 槽位已映射且节点仍存在于层级中
    pub fn resolve(&self, bone: HumanBone, hierarchy: &SceneHierarchy) -> Option<NodeId> {
        self.get(bone).filter(|&node| hierarchy.contains(node))
    }
}

impl Default for BoneSlotTable {
    fn default() -> Self {
        Self::new()
    }
}
