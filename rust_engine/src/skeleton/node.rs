//! 场景节点

use crate::avatar::RigAsset;

use super::Transform;

/// 节点句柄
///
/// 只是索引，不持有节点。节点被销毁后通过句柄访问会得到 `None`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 场景节点
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// 相对父节点的局部变换
    pub local: Transform,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local: Transform::default(),
        }
    }
}

/// 动画驱动器，可绑定一个人形骨骼资产
#[derive(Clone, Debug, Default)]
pub struct Animator {
    pub avatar: Option<RigAsset>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_avatar(avatar: RigAsset) -> Self {
        Self {
            avatar: Some(avatar),
        }
    }
}
