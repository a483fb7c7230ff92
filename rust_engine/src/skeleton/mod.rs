//! 场景层级 - 节点树、变换与宿主接口

mod hierarchy;
mod host;
mod node;

pub use hierarchy::SceneHierarchy;
pub use host::{DestroyMode, LocalSceneHost, SceneHost, ScopedCopy};
pub use node::{Animator, NodeId, SceneNode};

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// 局部变换
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
