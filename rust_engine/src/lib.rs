//! Mocap Humanoid - BVH 动作捕捉导入与人形骨骼重定向
//!
//! - BVH 解析，构建缩放并贴地的场景层级
//! - 按节点旋转顺序把欧拉角通道烘焙为四元数曲线
//! - 人形骨骼槽位映射与 T-Pose 校正
//! - 生成人形骨骼描述并交给骨骼编译器

pub mod animation;
pub mod avatar;
pub mod bvh;
pub mod config;
pub mod humanoid;
pub mod importer;
pub mod skeleton;

pub use animation::{bake, AnimationClip, AnimationCurve};
pub use avatar::{create_avatar, create_description, AvatarDescription, RigAsset, RigCompiler};
pub use bvh::{ChannelKind, MotionSet, SkeletonNode};
pub use humanoid::{BoneMapper, BoneSlotTable, HumanBone};
pub use importer::{import_bvh, import_motion, ImportedMotion};
pub use skeleton::{NodeId, SceneHierarchy, SceneHost};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MocapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("BVH parse error: {0}")]
    BvhParse(String),

    #[error("Unknown channel kind '{kind}' on node {node}")]
    UnknownChannelKind { node: String, kind: String },

    #[error("Duplicate channel {kind} on node {node}")]
    DuplicateChannel { node: String, kind: ChannelKind },

    #[error("Channel alignment error: expected {expected} channels, got {actual}")]
    ChannelAlignment { expected: usize, actual: usize },

    #[error("Channel mismatch on node {node}: expected {expected}, found {found}")]
    ChannelMismatch {
        node: String,
        expected: ChannelKind,
        found: ChannelKind,
    },

    #[error("Frame count mismatch on node {node}: expected {expected}, got {actual}")]
    FrameCountMismatch {
        node: String,
        expected: usize,
        actual: usize,
    },

    #[error("Floor normalization is degenerate: no node below the origin")]
    NormalizationDegenerate,

    #[error("Missing required bone: {0:?}")]
    MissingRequiredBone(HumanBone),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Rig compilation failed: {0}")]
    RigCompilationFailed(String),
}

pub type Result<T> = std::result::Result<T, MocapError>;
