//! 人形骨骼描述生成与资产编译
//!
//! 编译在层级的工作副本上进行，工作副本在任何退出路径上都只销毁一次，
//! 原层级和映射表不会被修改。

use crate::config;
use crate::humanoid::BoneSlotTable;
use crate::skeleton::{SceneHierarchy, SceneHost, ScopedCopy};
use crate::{MocapError, Result};

use super::{AvatarDescription, AvatarTuning, HumanBoneEntry, RigAsset, RigCompiler, SkeletonBone};

/// 使用全局配置中的扭转/拉伸参数生成描述
pub fn create_description(hierarchy: &SceneHierarchy, table: &BoneSlotTable) -> AvatarDescription {
    create_description_with(hierarchy, table, &config::get_config().avatar_tuning)
}

/// 生成骨骼描述
///
/// 每个已映射槽位生成一条语义映射，层级中每个节点生成一条绑定姿态记录。
/// 映射到已销毁节点的槽位会被跳过。
pub fn create_description_with(
    hierarchy: &SceneHierarchy,
    table: &BoneSlotTable,
    tuning: &AvatarTuning,
) -> AvatarDescription {
    let mut human = Vec::with_capacity(table.populated_count());
    for (bone, node) in table.iter() {
        match hierarchy.name(node) {
            Some(name) => human.push(HumanBoneEntry::new(name, bone)),
            None => log::warn!("槽位 {} 指向的节点已不存在", bone.human_name()),
        }
    }

    let skeleton = hierarchy
        .traverse()
        .into_iter()
        .filter_map(|id| {
            let node = hierarchy.node(id)?;
            Some(SkeletonBone {
                name: node.name.clone(),
                position: node.local.translation,
                rotation: node.local.rotation,
                scale: node.local.scale,
            })
        })
        .collect();

    AvatarDescription {
        human,
        skeleton,
        tuning: tuning.clone(),
    }
}

/// 使用全局配置中的扭转/拉伸参数编译人形骨骼资产
pub fn create_avatar<H, C>(
    host: &mut H,
    compiler: &mut C,
    hierarchy: &mut SceneHierarchy,
    table: &BoneSlotTable,
    rig_name: &str,
) -> Result<RigAsset>
where
    H: SceneHost + ?Sized,
    C: RigCompiler + ?Sized,
{
    let tuning = config::get_config().avatar_tuning;
    create_avatar_with(host, compiler, hierarchy, table, rig_name, &tuning)
}

/// 编译人形骨骼资产
///
/// 复制层级 → 生成描述 → 调用编译器。原层级带有动画驱动器时把结果绑定上去。
pub fn create_avatar_with<H, C>(
    host: &mut H,
    compiler: &mut C,
    hierarchy: &mut SceneHierarchy,
    table: &BoneSlotTable,
    rig_name: &str,
    tuning: &AvatarTuning,
) -> Result<RigAsset>
where
    H: SceneHost + ?Sized,
    C: RigCompiler + ?Sized,
{
    let rig = {
        let copy = ScopedCopy::new(host, hierarchy);
        let description = create_description_with(&copy, table, tuning);
        log::debug!(
            "骨骼描述: {} 个槽位, {} 个节点",
            description.human.len(),
            description.skeleton.len()
        );
        compiler
            .build_humanoid_rig(&copy, &description, rig_name)
            .map_err(MocapError::RigCompilationFailed)?
    };

    if let Some(animator) = hierarchy.animator.as_mut() {
        animator.avatar = Some(rig.clone());
        log::debug!("已绑定到动画驱动器: {}", rig_name);
    }

    log::info!("人形骨骼资产编译完成: {}", rig.name());
    Ok(rig)
}
