//! 动画片段
//!
//! 以 (场景路径, 变换属性) 为键保存关键帧曲线，旋转以四元数分量分别存储。

use std::collections::BTreeMap;
use std::fmt;

use glam::Quat;

use crate::skeleton::SceneHierarchy;

use super::AnimationCurve;

/// 可被曲线驱动的变换属性
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransformProperty {
    LocalPositionX,
    LocalPositionY,
    LocalPositionZ,
    LocalRotationX,
    LocalRotationY,
    LocalRotationZ,
    LocalRotationW,
}

impl TransformProperty {
    pub const POSITION: [TransformProperty; 3] = [
        TransformProperty::LocalPositionX,
        TransformProperty::LocalPositionY,
        TransformProperty::LocalPositionZ,
    ];

    pub const ROTATION: [TransformProperty; 4] = [
        TransformProperty::LocalRotationX,
        TransformProperty::LocalRotationY,
        TransformProperty::LocalRotationZ,
        TransformProperty::LocalRotationW,
    ];

    /// 宿主属性名
    pub fn name(self) -> &'static str {
        match self {
            TransformProperty::LocalPositionX => "localPosition.x",
            TransformProperty::LocalPositionY => "localPosition.y",
            TransformProperty::LocalPositionZ => "localPosition.z",
            TransformProperty::LocalRotationX => "localRotation.x",
            TransformProperty::LocalRotationY => "localRotation.y",
            TransformProperty::LocalRotationZ => "localRotation.z",
            TransformProperty::LocalRotationW => "localRotation.w",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::POSITION
            .iter()
            .chain(Self::ROTATION.iter())
            .copied()
            .find(|property| property.name() == name)
    }
}

impl fmt::Display for TransformProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 动画片段
#[derive(Clone, Debug, Default)]
pub struct AnimationClip {
    pub name: String,
    /// 是否循环播放
    pub looping: bool,
    curves: BTreeMap<(String, TransformProperty), AnimationCurve>,
}

/// 采样时同一节点的累积值
#[derive(Default)]
struct SampledNode {
    position: [Option<f32>; 3],
    rotation: [Option<f32>; 4],
}

impl AnimationClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            looping: false,
            curves: BTreeMap::new(),
        }
    }

    /// 设置曲线，同一路径和属性的旧曲线被替换
    pub fn set_curve(&mut self, path: &str, property: TransformProperty, curve: AnimationCurve) {
        self.curves.insert((path.to_string(), property), curve);
    }

    pub fn curve(&self, path: &str, property: TransformProperty) -> Option<&AnimationCurve> {
        self.curves.get(&(path.to_string(), property))
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// 片段时长（秒）
    pub fn duration(&self) -> f32 {
        self.curves
            .values()
            .map(|curve| curve.duration())
            .fold(0.0, f32::max)
    }

    /// 将片段在指定时间的值写入层级
    ///
    /// 找不到路径的曲线会被跳过；旋转只有四个分量都存在时才写入。
    pub fn sample(&self, time: f32, hierarchy: &mut SceneHierarchy) {
        let duration = self.duration();
        let time = if self.looping && duration > 0.0 {
            time.rem_euclid(duration)
        } else {
            time
        };

        let mut sampled: BTreeMap<&str, SampledNode> = BTreeMap::new();
        for ((path, property), curve) in &self.curves {
            let value = curve.evaluate(time);
            let entry = sampled.entry(path.as_str()).or_default();
            match property {
                TransformProperty::LocalPositionX => entry.position[0] = Some(value),
                TransformProperty::LocalPositionY => entry.position[1] = Some(value),
                TransformProperty::LocalPositionZ => entry.position[2] = Some(value),
                TransformProperty::LocalRotationX => entry.rotation[0] = Some(value),
                TransformProperty::LocalRotationY => entry.rotation[1] = Some(value),
                TransformProperty::LocalRotationZ => entry.rotation[2] = Some(value),
                TransformProperty::LocalRotationW => entry.rotation[3] = Some(value),
            }
        }

        for (path, values) in sampled {
            let Some(id) = hierarchy.find_by_path(path) else {
                log::debug!("动画路径不存在，跳过: {}", path);
                continue;
            };

            let mut position = hierarchy.local_position(id);
            for (axis, value) in values.position.iter().enumerate() {
                if let Some(value) = value {
                    position[axis] = *value;
                }
            }
            hierarchy.set_local_position(id, position);

            if let [Some(x), Some(y), Some(z), Some(w)] = values.rotation {
                hierarchy.set_local_rotation(id, Quat::from_xyzw(x, y, z, w).normalize());
            }
        }
    }
}
