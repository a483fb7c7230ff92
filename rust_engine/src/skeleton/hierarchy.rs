//! 场景层级
//!
//! 节点保存在数组中，父节点以句柄记录，子节点列表决定遍历顺序。
//! 销毁节点只会清空对应槽位，已发出的句柄不会指向别的节点。

use glam::{Mat4, Quat, Vec3};

use crate::{MocapError, Result};

use super::{Animator, NodeId, SceneNode, Transform};

/// 场景层级
#[derive(Clone, Debug)]
pub struct SceneHierarchy {
    nodes: Vec<Option<SceneNode>>,
    root: NodeId,
    /// 动画驱动器（可选）
    pub animator: Option<Animator>,
}

impl SceneHierarchy {
    /// 创建只有根节点的层级
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Some(SceneNode::new(root_name))],
            root: NodeId(0),
            animator: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 创建子节点
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local_position: Vec3,
    ) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(MocapError::NodeNotFound(format!("#{}", parent.index())));
        }
        let id = NodeId(self.nodes.len());
        let mut node = SceneNode::new(name);
        node.parent = Some(parent);
        node.local = Transform::from_translation(local_position);
        self.nodes.push(Some(node));
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        Ok(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// 存活节点数量
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|node| node.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// 修改父节点，局部变换保持不变
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<()> {
        if !self.contains(id) {
            return Err(MocapError::NodeNotFound(format!("#{}", id.index())));
        }
        if !self.contains(parent) {
            return Err(MocapError::NodeNotFound(format!("#{}", parent.index())));
        }
        // 不能挂到自己的子树下
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == id {
                return Err(MocapError::InvalidHierarchy(format!(
                    "{} cannot become a descendant of itself",
                    self.name(id).unwrap_or_default()
                )));
            }
            cursor = self.parent(current);
        }

        if let Some(old_parent) = self.parent(id) {
            if let Some(node) = self.node_mut(old_parent) {
                node.children.retain(|&child| child != id);
            }
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    pub fn local_transform(&self, id: NodeId) -> Transform {
        self.node(id).map(|node| node.local).unwrap_or_default()
    }

    pub fn local_position(&self, id: NodeId) -> Vec3 {
        self.local_transform(id).translation
    }

    pub fn set_local_position(&mut self, id: NodeId, position: Vec3) {
        if let Some(node) = self.node_mut(id) {
            node.local.translation = position;
        }
    }

    pub fn local_rotation(&self, id: NodeId) -> Quat {
        self.local_transform(id).rotation
    }

    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) {
        if let Some(node) = self.node_mut(id) {
            node.local.rotation = rotation;
        }
    }

    /// 全局变换 = 父全局变换 * 局部变换
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.node(id) else {
            return Mat4::IDENTITY;
        };
        let local = node.local.to_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    fn parent_matrix(&self, id: NodeId) -> Mat4 {
        self.parent(id)
            .map(|parent| self.world_matrix(parent))
            .unwrap_or(Mat4::IDENTITY)
    }

    /// 世界坐标位置
    pub fn position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// 设置世界坐标位置（反推局部位置）
    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        let local = self.parent_matrix(id).inverse().transform_point3(position);
        self.set_local_position(id, local);
    }

    /// 世界旋转
    pub fn rotation(&self, id: NodeId) -> Quat {
        let Some(node) = self.node(id) else {
            return Quat::IDENTITY;
        };
        match node.parent {
            Some(parent) => self.rotation(parent) * node.local.rotation,
            None => node.local.rotation,
        }
    }

    /// 设置世界旋转（反推局部旋转）
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        let parent_rotation = self
            .parent(id)
            .map(|parent| self.rotation(parent))
            .unwrap_or(Quat::IDENTITY);
        self.set_local_rotation(id, (parent_rotation.inverse() * rotation).normalize());
    }

    /// 从根节点开始的先序遍历
    pub fn traverse(&self) -> Vec<NodeId> {
        self.traverse_from(self.root)
    }

    /// 从指定节点开始的先序遍历（包含该节点）
    pub fn traverse_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if !self.contains(start) {
            return order;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// 按名称查找（遍历顺序中的第一个）
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|&id| self.name(id) == Some(name))
    }

    /// 按相对根节点的路径查找，例如 `Hips/Spine`
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(self.root);
        }
        path.split('/').try_fold(self.root, |current, segment| {
            self.children(current)
                .iter()
                .copied()
                .find(|&child| self.name(child) == Some(segment))
        })
    }

    /// 相对根节点的路径（根节点本身为空串）
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        if !self.contains(id) {
            return None;
        }
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            names.push(self.name(current)?);
            current = parent;
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// 复制整个层级，句柄在副本中保持一致
    pub fn duplicate(&self) -> SceneHierarchy {
        self.clone()
    }

    /// 销毁节点及其子树
    pub fn destroy(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|&child| child != id);
            }
        }
        for descendant in self.traverse_from(id) {
            self.nodes[descendant.0] = None;
        }
    }
}
