//! 人形骨骼 - 槽位、映射表、分类器与 T-Pose 校正

mod bone;
mod classifier;
mod mapper;
mod slot_table;

pub use bone::HumanBone;
pub use classifier::{SkeletonClassifier, TopologyClassifier};
pub use mapper::{BoneMapper, MappingState};
pub use slot_table::BoneSlotTable;
