//! 导入与人形骨骼配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

use crate::avatar::AvatarTuning;

/// 导入配置
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    // ========== 缩放 ==========
    /// 是否执行地面归一化，默认 true
    /// 关闭时直接使用 `unit_scale` 作为缩放
    pub normalize_floor: bool,
    /// 单位缩放，默认 1.0（仅在关闭地面归一化时生效）
    pub unit_scale: f32,
    /// 没有任何节点低于原点时是否退回 1.0 缩放，默认 false（拒绝导入）
    pub degenerate_floor_fallback: bool,

    // ========== 动画 ==========
    /// 导入的动画片段是否循环，默认 true
    pub loop_clip: bool,

    // ========== 人形骨骼 ==========
    /// 扭转与拉伸参数
    pub avatar_tuning: AvatarTuning,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            normalize_floor: true,
            unit_scale: 1.0,
            degenerate_floor_fallback: false,
            loop_clip: true,
            avatar_tuning: AvatarTuning::default(),
        }
    }
}

/// 全局配置实例
static IMPORT_CONFIG: Lazy<RwLock<ImportConfig>> = Lazy::new(|| RwLock::new(ImportConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> ImportConfig {
    match IMPORT_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// 手动设置配置
pub fn set_config(config: ImportConfig) {
    match IMPORT_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(ImportConfig::default());
}
