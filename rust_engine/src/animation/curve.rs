//! 关键帧曲线

use super::Keyframe;

/// 按时间排序的标量关键帧曲线
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationCurve {
    keys: Vec<Keyframe>,
}

impl AnimationCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// 添加关键帧，同一时间的关键帧会被替换
    pub fn add_key(&mut self, time: f32, value: f32) {
        let key = Keyframe::new(time, value);
        match self.keys.binary_search_by(|k| k.time.total_cmp(&time)) {
            Ok(i) => self.keys[i] = key,
            Err(i) => self.keys.insert(i, key),
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.keys.iter().map(|k| k.value)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 最后一个关键帧的时间
    pub fn duration(&self) -> f32 {
        self.keys.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// 线性插值求值，超出范围取端点值
    pub fn evaluate(&self, time: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let next_idx = self.keys.partition_point(|k| k.time <= time);
        let prev = &self.keys[next_idx - 1];
        let next = &self.keys[next_idx];
        let t = (time - prev.time) / (next.time - prev.time);
        lerp(prev.value, next.value, t)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
