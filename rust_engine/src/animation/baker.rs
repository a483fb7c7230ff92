//! 曲线烘焙
//!
//! 按节点遍历顺序消费展开的通道曲线，逐节点分组后输出：
//! - 位置通道乘以 `to_meter` 直接写入 `localPosition` 分量
//! - 旋转通道按节点自己的欧拉顺序转换为四元数，拆成 x/y/z/w 四条曲线

use glam::{Quat, Vec3};
use once_cell::unsync::OnceCell;

use crate::bvh::{ChannelCurve, ChannelKind, EulerOrder, MotionSet, SkeletonNode};
use crate::Result;

use super::{AnimationClip, AnimationCurve, TransformProperty};

/// 单个节点的通道分组
struct CurveSet<'a> {
    node: &'a SkeletonNode,
    path: String,
    position: [Option<&'a ChannelCurve>; 3],
    rotation: [Option<&'a ChannelCurve>; 3],
    /// 欧拉顺序按需构建，每个节点只构建一次
    euler: OnceCell<EulerOrder>,
}

impl<'a> CurveSet<'a> {
    fn new(node: &'a SkeletonNode, path: String) -> Self {
        Self {
            node,
            path,
            position: [None; 3],
            rotation: [None; 3],
            euler: OnceCell::new(),
        }
    }

    fn assign(&mut self, kind: ChannelKind, curve: &'a ChannelCurve) {
        let axis = kind.axis().index();
        if kind.is_rotation() {
            self.rotation[axis] = Some(curve);
        } else {
            self.position[axis] = Some(curve);
        }
    }

    fn has_rotation(&self) -> bool {
        self.rotation.iter().any(Option::is_some)
    }

    /// 第 `frame` 帧的旋转，缺失的轴按 0 度处理
    fn rotation_at(&self, frame: usize) -> Quat {
        let order = self.euler.get_or_init(|| self.node.euler_order());
        let sample = |curve: Option<&ChannelCurve>| curve.map(|c| c.keys[frame]).unwrap_or(0.0);
        order.to_quat(Vec3::new(
            sample(self.rotation[0]),
            sample(self.rotation[1]),
            sample(self.rotation[2]),
        ))
    }

    fn add_curves(&self, motion: &MotionSet, clip: &mut AnimationClip, to_meter: f32) {
        for (curve, property) in self.position.iter().zip(TransformProperty::POSITION) {
            let Some(curve) = curve else { continue };
            let mut baked = AnimationCurve::with_capacity(motion.frame_count);
            for (i, value) in curve.keys.iter().enumerate() {
                baked.add_key(frame_time(motion, i), value * to_meter);
            }
            clip.set_curve(&self.path, property, baked);
        }

        if !self.has_rotation() {
            return;
        }

        let mut curves: [AnimationCurve; 4] =
            std::array::from_fn(|_| AnimationCurve::with_capacity(motion.frame_count));
        for i in 0..motion.frame_count {
            let time = frame_time(motion, i);
            let q = self.rotation_at(i);
            for (curve, value) in curves.iter_mut().zip([q.x, q.y, q.z, q.w]) {
                curve.add_key(time, value);
            }
        }
        for (curve, property) in curves.into_iter().zip(TransformProperty::ROTATION) {
            clip.set_curve(&self.path, property, curve);
        }
    }
}

fn frame_time(motion: &MotionSet, frame: usize) -> f32 {
    frame as f32 * motion.frame_time
}

/// 烘焙动画片段
///
/// 先校验通道对齐，任何不一致都会中止整个烘焙，不会产生部分结果。
pub fn bake(motion: &MotionSet, to_meter: f32) -> Result<AnimationClip> {
    motion.validate()?;

    let mut clip = AnimationClip::new("");
    if motion.frame_count == 0 || motion.channels.is_empty() {
        log::warn!("动作数据没有可烘焙的曲线: {}", motion);
        return Ok(clip);
    }

    let mut sets = Vec::new();
    let mut channels = motion.channels.iter();
    for index in motion.traverse() {
        let Some(node) = motion.node(index) else { continue };
        let mut set = CurveSet::new(node, motion.path(index));
        // validate 已保证数量和类型一致
        for (&kind, curve) in node.channels.iter().zip(channels.by_ref()) {
            set.assign(kind, curve);
        }
        sets.push(set);
    }

    for set in &sets {
        set.add_curves(motion, &mut clip, to_meter);
    }

    log::info!(
        "烘焙完成: {} 条曲线, {} 帧, 时长 {:.3}s",
        clip.curve_count(),
        motion.frame_count,
        clip.duration()
    );
    Ok(clip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::ChannelKind::*;
    use crate::MocapError;
    use std::f32::consts::FRAC_PI_2;

    /// Hips → Spine → Head，Hips 通道 [posY, rotY]，其余 [rotY]
    fn three_joint_motion() -> MotionSet {
        let hips = SkeletonNode::new("Hips").with_channels(&[PositionY, RotationY]);
        let mut motion = MotionSet::new(hips, 0.5);
        let spine = motion
            .add_child(0, SkeletonNode::new("Spine").with_offset(Vec3::Y).with_channels(&[RotationY]))
            .unwrap();
        motion
            .add_child(spine, SkeletonNode::new("Head").with_offset(Vec3::Y).with_channels(&[RotationY]))
            .unwrap();
        motion.push_frame(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        motion.push_frame(&[1.0, 90.0, 0.0, 0.0]).unwrap();
        motion
    }

    #[test]
    fn test_three_joint_scenario() {
        let motion = three_joint_motion();
        let to_meter = 0.25;
        let clip = bake(&motion, to_meter).unwrap();

        let pos_y = clip.curve("Hips", TransformProperty::LocalPositionY).unwrap();
        let values: Vec<f32> = pos_y.values().collect();
        assert_eq!(values, vec![0.0, 1.0 * to_meter]);
        let times: Vec<f32> = pos_y.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5]);

        assert!(clip.curve("Hips", TransformProperty::LocalPositionX).is_none());

        let expected = Quat::from_rotation_y(FRAC_PI_2);
        let component = |property| clip.curve("Hips", property).unwrap().keys()[1].value;
        let q = Quat::from_xyzw(
            component(TransformProperty::LocalRotationX),
            component(TransformProperty::LocalRotationY),
            component(TransformProperty::LocalRotationZ),
            component(TransformProperty::LocalRotationW),
        );
        assert!(q.abs_diff_eq(expected, 1e-6));

        let head_w = clip.curve("Hips/Spine/Head", TransformProperty::LocalRotationW).unwrap();
        assert!(head_w.values().all(|w| (w - 1.0).abs() < 1e-6));
        // 3 条旋转 × 4 分量 + 1 条位置
        assert_eq!(clip.curve_count(), 13);
    }

    #[test]
    fn test_quaternions_use_node_order() {
        let root = SkeletonNode::new("Root").with_channels(&[RotationZ, RotationX, RotationY]);
        let mut motion = MotionSet::new(root, 1.0);
        motion
            .add_child(0, SkeletonNode::new("Arm").with_channels(&[RotationX, RotationY, RotationZ]))
            .unwrap();
        let samples = [
            [10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            [-35.0, 80.0, 170.0, 5.0, -90.0, 12.0],
        ];
        for row in &samples {
            motion.push_frame(row).unwrap();
        }
        let clip = bake(&motion, 1.0).unwrap();

        let read = |path: &str, frame: usize| {
            let c = |p| clip.curve(path, p).unwrap().keys()[frame].value;
            Quat::from_xyzw(
                c(TransformProperty::LocalRotationX),
                c(TransformProperty::LocalRotationY),
                c(TransformProperty::LocalRotationZ),
                c(TransformProperty::LocalRotationW),
            )
        };

        for (frame, row) in samples.iter().enumerate() {
            let [rz, rx, ry, ax, ay, az] = *row;
            let root_expected = Quat::from_rotation_z(rz.to_radians())
                * Quat::from_rotation_x(rx.to_radians())
                * Quat::from_rotation_y(ry.to_radians());
            let arm_expected = Quat::from_rotation_x(ax.to_radians())
                * Quat::from_rotation_y(ay.to_radians())
                * Quat::from_rotation_z(az.to_radians());

            let root_q = read("Root", frame);
            let arm_q = read("Root/Arm", frame);
            assert!((root_q.length() - 1.0).abs() < 1e-5);
            assert!((arm_q.length() - 1.0).abs() < 1e-5);
            assert!(root_q.abs_diff_eq(root_expected, 1e-5));
            assert!(arm_q.abs_diff_eq(arm_expected, 1e-5));
        }
    }

    #[test]
    fn test_misaligned_channels_abort() {
        let mut motion = three_joint_motion();
        motion.channels.pop();
        assert!(matches!(
            bake(&motion, 1.0),
            Err(MocapError::ChannelAlignment { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_swapped_channels_abort() {
        let mut motion = three_joint_motion();
        motion.channels.swap(1, 2);
        assert!(matches!(bake(&motion, 1.0), Err(MocapError::ChannelMismatch { .. })));
    }

    #[test]
    fn test_empty_motion_yields_empty_clip() {
        let hips = SkeletonNode::new("Hips").with_channels(&[RotationY]);
        let mut motion = MotionSet::new(hips, 0.1);
        motion.ensure_channels();
        let clip = bake(&motion, 1.0).unwrap();
        assert!(clip.is_empty());
    }
}
