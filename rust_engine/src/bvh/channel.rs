//! 通道类型与通道曲线

use std::fmt;

use glam::{Quat, Vec3};

/// 坐标轴
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// 轴的单位向量
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// BVH 通道类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 6] = [
        ChannelKind::PositionX,
        ChannelKind::PositionY,
        ChannelKind::PositionZ,
        ChannelKind::RotationX,
        ChannelKind::RotationY,
        ChannelKind::RotationZ,
    ];

    /// 从 BVH 关键字解析（区分大小写）
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.token() == token)
    }

    /// BVH 文件中的关键字
    pub fn token(self) -> &'static str {
        match self {
            ChannelKind::PositionX => "Xposition",
            ChannelKind::PositionY => "Yposition",
            ChannelKind::PositionZ => "Zposition",
            ChannelKind::RotationX => "Xrotation",
            ChannelKind::RotationY => "Yrotation",
            ChannelKind::RotationZ => "Zrotation",
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            ChannelKind::PositionX | ChannelKind::RotationX => Axis::X,
            ChannelKind::PositionY | ChannelKind::RotationY => Axis::Y,
            ChannelKind::PositionZ | ChannelKind::RotationZ => Axis::Z,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(
            self,
            ChannelKind::RotationX | ChannelKind::RotationY | ChannelKind::RotationZ
        )
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// 欧拉角旋转顺序
///
/// 由节点声明的旋转通道顺序决定，每个节点可能不同。
/// 按声明顺序内旋组合：`q = R(axes[0]) * R(axes[1]) * R(axes[2])`，
/// 未声明的轴不参与旋转。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EulerOrder {
    axes: Vec<Axis>,
}

impl EulerOrder {
    /// 从节点通道列表中提取旋转轴顺序
    pub fn from_channels(channels: &[ChannelKind]) -> Self {
        let axes = channels
            .iter()
            .filter(|kind| kind.is_rotation())
            .map(|kind| kind.axis())
            .collect();
        Self { axes }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// 欧拉角（度）转四元数
    pub fn to_quat(&self, degrees: Vec3) -> Quat {
        self.axes.iter().fold(Quat::IDENTITY, |acc, &axis| {
            acc * Quat::from_axis_angle(axis.unit(), degrees[axis.index()].to_radians())
        })
    }
}

/// 单个通道的逐帧采样
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelCurve {
    /// 所属节点索引
    pub node: usize,
    pub kind: ChannelKind,
    pub keys: Vec<f32>,
}

impl ChannelCurve {
    pub fn new(node: usize, kind: ChannelKind, keys: Vec<f32>) -> Self {
        Self { node, kind, keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_token_round_trip() {
        assert_eq!(ChannelKind::from_token("Zrotation"), Some(ChannelKind::RotationZ));
        assert_eq!(ChannelKind::from_token("zrotation"), None);
        assert_eq!(ChannelKind::from_token("Wrotation"), None);
    }

    #[test]
    fn test_euler_order_follows_declaration() {
        let order = EulerOrder::from_channels(&[
            ChannelKind::PositionX,
            ChannelKind::RotationZ,
            ChannelKind::RotationX,
            ChannelKind::RotationY,
        ]);
        assert_eq!(order.axes(), &[Axis::Z, Axis::X, Axis::Y]);
    }

    #[test]
    fn test_order_changes_result() {
        let degrees = Vec3::new(90.0, 90.0, 0.0);
        let xy = EulerOrder::from_channels(&[ChannelKind::RotationX, ChannelKind::RotationY]);
        let yx = EulerOrder::from_channels(&[ChannelKind::RotationY, ChannelKind::RotationX]);

        let q_xy = xy.to_quat(degrees);
        let q_yx = yx.to_quat(degrees);
        assert!(q_xy.abs_diff_eq(Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(FRAC_PI_2), 1e-6));
        assert!(q_yx.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_2), 1e-6));
        assert!(!q_xy.abs_diff_eq(q_yx, 1e-3));
    }

    #[test]
    fn test_missing_axes_are_identity() {
        let order = EulerOrder::from_channels(&[ChannelKind::RotationY]);
        let q = order.to_quat(Vec3::new(45.0, 90.0, 30.0));
        assert!(q.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-6));
    }
}
