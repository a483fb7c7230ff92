//! 人形骨骼资产 - 骨骼描述、编译器接口与编译流程

mod builder;
mod compiler;
mod description;

pub use builder::{create_avatar, create_avatar_with, create_description, create_description_with};
pub use compiler::{DescriptionAvatar, DescriptionRigCompiler, HumanoidAvatar, RigAsset, RigCompiler};
pub use description::{AvatarDescription, AvatarTuning, HumanBoneEntry, HumanLimit, SkeletonBone};
