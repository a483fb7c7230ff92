//! 动画关键帧

/// 标量关键帧
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    /// 时间（秒）
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}
