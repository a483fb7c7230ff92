//! BVH 动作数据
//!
//! 解析器产出的被动数据容器：骨架节点树 + 按遍历顺序展开的通道曲线列表，
//! 以及帧数和固定帧时长。

mod channel;
mod motion_set;
mod node;
mod parser;

pub use channel::{Axis, ChannelCurve, ChannelKind, EulerOrder};
pub use motion_set::MotionSet;
pub use node::SkeletonNode;
