//! 骨架节点

use glam::Vec3;

use super::{ChannelKind, EulerOrder};

/// 骨架节点（静止姿态）
///
/// 父子关系以索引保存在 `MotionSet` 的节点数组中。
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonNode {
    pub name: String,
    /// 相对父节点的偏移
    pub offset: Vec3,
    /// 通道顺序在解析时确定，不会重排
    pub channels: Vec<ChannelKind>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl SkeletonNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: Vec3::ZERO,
            channels: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_channels(mut self, channels: &[ChannelKind]) -> Self {
        self.channels = channels.to_vec();
        self
    }

    pub fn euler_order(&self) -> EulerOrder {
        EulerOrder::from_channels(&self.channels)
    }
}
