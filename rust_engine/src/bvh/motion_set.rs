//! 动作数据集
//!
//! 通道曲线列表按 "节点遍历顺序 → 节点内通道顺序" 展开，
//! 曲线烘焙依赖这一对齐关系，`validate` 会显式检查。

use std::collections::HashSet;
use std::fmt;

use crate::{MocapError, Result};

use super::{ChannelCurve, SkeletonNode};

/// 动作数据集
#[derive(Clone, Debug)]
pub struct MotionSet {
    nodes: Vec<SkeletonNode>,
    root: usize,
    /// 展开的通道曲线
    pub channels: Vec<ChannelCurve>,
    /// 帧数（所有曲线相同）
    pub frame_count: usize,
    /// 每帧时长（秒）
    pub frame_time: f32,
}

impl MotionSet {
    /// 以根节点创建
    pub fn new(mut root: SkeletonNode, frame_time: f32) -> Self {
        root.parent = None;
        root.children.clear();
        Self {
            nodes: vec![root],
            root: 0,
            channels: Vec::new(),
            frame_count: 0,
            frame_time,
        }
    }

    /// 添加子节点，返回新节点索引
    pub fn add_child(&mut self, parent: usize, mut node: SkeletonNode) -> Result<usize> {
        if parent >= self.nodes.len() {
            return Err(MocapError::NodeNotFound(format!("#{}", parent)));
        }
        let index = self.nodes.len();
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent].children.push(index);
        Ok(index)
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, index: usize) -> Option<&SkeletonNode> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut SkeletonNode> {
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> &[SkeletonNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 按名称查找节点
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    /// 深度优先先序遍历（与通道展开顺序一致）
    pub fn traverse(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            order.push(index);
            for &child in self.nodes[index].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// 从根节点开始的场景路径，例如 `Hips/Spine/Head`
    pub fn path(&self, index: usize) -> String {
        let mut names = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            let Some(node) = self.nodes.get(i) else { break };
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    /// 所有节点声明的通道总数
    pub fn declared_channel_count(&self) -> usize {
        self.nodes.iter().map(|node| node.channels.len()).sum()
    }

    /// 动画时长（秒）
    pub fn duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_time
    }

    /// 按遍历顺序创建空的通道曲线
    pub fn ensure_channels(&mut self) {
        if !self.channels.is_empty() {
            return;
        }
        let mut channels = Vec::with_capacity(self.declared_channel_count());
        for index in self.traverse() {
            for &kind in &self.nodes[index].channels {
                channels.push(ChannelCurve::new(index, kind, Vec::with_capacity(self.frame_count)));
            }
        }
        self.channels = channels;
    }

    /// 追加一帧采样，数值顺序与通道展开顺序一致
    pub fn push_frame(&mut self, row: &[f32]) -> Result<()> {
        self.ensure_channels();
        if row.len() != self.channels.len() {
            return Err(MocapError::ChannelAlignment {
                expected: self.channels.len(),
                actual: row.len(),
            });
        }
        for (curve, &value) in self.channels.iter_mut().zip(row) {
            curve.keys.push(value);
        }
        self.frame_count += 1;
        Ok(())
    }

    /// 检查通道曲线与节点声明的对齐关系
    pub fn validate(&self) -> Result<()> {
        let expected = self.declared_channel_count();
        if expected != self.channels.len() {
            return Err(MocapError::ChannelAlignment {
                expected,
                actual: self.channels.len(),
            });
        }

        let mut j = 0;
        for index in self.traverse() {
            let node = &self.nodes[index];
            let mut seen = HashSet::new();
            for &kind in &node.channels {
                if !seen.insert(kind) {
                    return Err(MocapError::DuplicateChannel {
                        node: node.name.clone(),
                        kind,
                    });
                }
                let curve = &self.channels[j];
                if curve.node != index || curve.kind != kind {
                    return Err(MocapError::ChannelMismatch {
                        node: node.name.clone(),
                        expected: kind,
                        found: curve.kind,
                    });
                }
                if curve.keys.len() != self.frame_count {
                    return Err(MocapError::FrameCountMismatch {
                        node: node.name.clone(),
                        expected: self.frame_count,
                        actual: curve.keys.len(),
                    });
                }
                j += 1;
            }
        }
        Ok(())
    }
}

impl fmt::Display for MotionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} channels, {} frames @ {:.4}s",
            self.nodes.len(),
            self.channels.len(),
            self.frame_count,
            self.frame_time
        )
    }
}
