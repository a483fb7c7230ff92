//! 动画系统
//!
//! 提供关键帧曲线、动画片段，以及从 BVH 通道曲线烘焙动画片段。

mod baker;
mod clip;
mod curve;
mod keyframe;

pub use baker::bake;
pub use clip::{AnimationClip, TransformProperty};
pub use curve::AnimationCurve;
pub use keyframe::Keyframe;
