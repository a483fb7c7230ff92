//! BVH 导入流程
//!
//! 解析 → 构建层级 → 地面归一化 → 烘焙动画片段。
//! 任何一步失败都不会返回部分结果。

mod hierarchy;

pub use hierarchy::{build_hierarchy, normalize_floor};

use std::path::Path;

use crate::animation::{bake, AnimationClip};
use crate::bvh::MotionSet;
use crate::config::{self, ImportConfig};
use crate::skeleton::SceneHierarchy;
use crate::Result;

/// 导入结果
#[derive(Clone, Debug)]
pub struct ImportedMotion {
    /// 场景层级，容器根节点下挂骨架
    pub hierarchy: SceneHierarchy,
    /// 与容器同名的动画片段
    pub clip: AnimationClip,
    /// 实际使用的缩放
    pub to_meter: f32,
}

impl ImportedMotion {
    /// 将动画片段在指定时间的姿态写入层级
    pub fn sample(&mut self, time: f32) {
        self.clip.sample(time, &mut self.hierarchy);
    }
}

/// 从文件导入，容器以文件名（不含扩展名）命名
pub fn import_bvh<P: AsRef<Path>>(path: P) -> Result<ImportedMotion> {
    let path = path.as_ref();
    log::info!("ImportBvh: {}", path.display());

    let motion = MotionSet::load(path)?;
    log::info!("parsed {}", motion);

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    import_motion(&name, &motion)
}

/// 使用全局配置导入已解析的动作数据
pub fn import_motion(name: &str, motion: &MotionSet) -> Result<ImportedMotion> {
    import_motion_with(name, motion, &config::get_config())
}

/// 使用指定配置导入已解析的动作数据
pub fn import_motion_with(name: &str, motion: &MotionSet, config: &ImportConfig) -> Result<ImportedMotion> {
    motion.validate()?;

    let (hierarchy, to_meter) = if config.normalize_floor {
        let mut hierarchy = build_hierarchy(name, motion, 1.0)?;
        let to_meter = normalize_floor(&mut hierarchy, config.degenerate_floor_fallback)?;
        (hierarchy, to_meter)
    } else {
        let hierarchy = build_hierarchy(name, motion, config.unit_scale)?;
        (hierarchy, config.unit_scale)
    };

    let mut clip = bake(motion, to_meter)?;
    clip.name = name.to_string();
    clip.looping = config.loop_clip;

    log::info!(
        "导入完成: {} ({} 个节点, {} 条曲线, toMeter {})",
        name,
        hierarchy.node_count(),
        clip.curve_count(),
        to_meter
    );

    Ok(ImportedMotion {
        hierarchy,
        clip,
        to_meter,
    })
}
