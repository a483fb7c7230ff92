//! 骨骼编译器接口
//!
//! 编译器读取工作副本和骨骼描述，产出不透明的人形骨骼资产。

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::humanoid::HumanBone;
use crate::skeleton::SceneHierarchy;

use super::AvatarDescription;

/// 编译完成的人形骨骼资产
pub trait HumanoidAvatar: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// 槽位对应的骨骼名
    fn bone_name(&self, bone: HumanBone) -> Option<&str>;
}

/// 共享的骨骼资产句柄
pub type RigAsset = Arc<dyn HumanoidAvatar>;

/// 骨骼编译器
pub trait RigCompiler {
    /// 编译失败时返回原因
    fn build_humanoid_rig(
        &mut self,
        hierarchy: &SceneHierarchy,
        description: &AvatarDescription,
        name: &str,
    ) -> Result<RigAsset, String>;
}

/// 直接由骨骼描述生成的资产
#[derive(Clone, Debug)]
pub struct DescriptionAvatar {
    name: String,
    bones: BTreeMap<HumanBone, String>,
}

impl HumanoidAvatar for DescriptionAvatar {
    fn name(&self) -> &str {
        &self.name
    }

    fn bone_name(&self, bone: HumanBone) -> Option<&str> {
        self.bones.get(&bone).map(String::as_str)
    }
}

/// 默认编译器
///
/// 检查必需槽位齐全，且映射的节点名都存在于工作副本中。
#[derive(Clone, Copy, Debug, Default)]
pub struct DescriptionRigCompiler;

impl RigCompiler for DescriptionRigCompiler {
    fn build_humanoid_rig(
        &mut self,
        hierarchy: &SceneHierarchy,
        description: &AvatarDescription,
        name: &str,
    ) -> Result<RigAsset, String> {
        let missing = description.missing_required();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|bone| bone.human_name()).collect();
            return Err(format!("缺少必需骨骼: {}", names.join(", ")));
        }

        let mut bones = BTreeMap::new();
        for entry in &description.human {
            let bone = entry
                .human_bone()
                .ok_or_else(|| format!("未知的语义名: {}", entry.human_name))?;
            if hierarchy.find_by_name(&entry.bone_name).is_none() {
                return Err(format!("骨骼 {} 不在层级中", entry.bone_name));
            }
            if bones.insert(bone, entry.bone_name.clone()).is_some() {
                return Err(format!("槽位重复: {}", entry.human_name));
            }
        }

        Ok(Arc::new(DescriptionAvatar {
            name: name.to_string(),
            bones,
        }))
    }
}
