//! 层级构建与地面归一化

use glam::Vec3;

use crate::bvh::MotionSet;
use crate::skeleton::{NodeId, SceneHierarchy};
use crate::{MocapError, Result};

/// 按骨架拓扑构建场景层级
///
/// 创建名为 `name` 的容器根节点，骨架根节点作为它的第一个子节点。
/// 每个节点的局部位置 = 静止偏移 × `unit_scale`，不应用旋转。
pub fn build_hierarchy(name: &str, motion: &MotionSet, unit_scale: f32) -> Result<SceneHierarchy> {
    let mut hierarchy = SceneHierarchy::new(name);
    let root = hierarchy.root();
    build_node(&mut hierarchy, root, motion, motion.root(), unit_scale)?;
    log::debug!("构建层级完成: {} 个节点", hierarchy.node_count());
    Ok(hierarchy)
}

fn build_node(
    hierarchy: &mut SceneHierarchy,
    parent: NodeId,
    motion: &MotionSet,
    index: usize,
    unit_scale: f32,
) -> Result<()> {
    let node = motion
        .node(index)
        .ok_or_else(|| MocapError::NodeNotFound(format!("#{}", index)))?;
    let id = hierarchy.add_child(parent, node.name.as_str(), node.offset * unit_scale)?;
    for &child in &node.children {
        build_node(hierarchy, id, motion, child, unit_scale)?;
    }
    Ok(())
}

/// 地面归一化，返回 `to_meter`
///
/// 1. 遍历层级求最低世界坐标 `min_y`（从 0 开始，只会减小）
/// 2. `to_meter = 1 / -min_y`，所有局部位置乘以 `to_meter`
/// 3. 根节点的第一个子节点（通常是 Hips）的世界位置重置为 `(0, -min_y * to_meter, 0)`
///
/// 没有节点低于原点时 `min_y` 为 0，缩放无定义：
/// `allow_fallback` 为 true 时按 1.0 处理，否则返回 `NormalizationDegenerate`，层级保持不变。
pub fn normalize_floor(hierarchy: &mut SceneHierarchy, allow_fallback: bool) -> Result<f32> {
    let nodes = hierarchy.traverse();

    let min_y = nodes
        .iter()
        .map(|&id| hierarchy.position(id).y)
        .fold(0.0f32, f32::min);

    if min_y >= 0.0 || !min_y.is_finite() {
        if allow_fallback {
            log::warn!("没有节点低于地面 (minY: {})，使用 1.0 缩放", min_y);
            return Ok(1.0);
        }
        return Err(MocapError::NormalizationDegenerate);
    }

    let to_meter = 1.0 / -min_y;
    log::info!("minY: {} toMeter: {}", min_y, to_meter);

    for &id in &nodes {
        let position = hierarchy.local_position(id);
        hierarchy.set_local_position(id, position * to_meter);
    }

    // 腰部高度归一到 -min_y * to_meter
    if let Some(hips) = hierarchy.child(hierarchy.root(), 0) {
        hierarchy.set_position(hips, Vec3::new(0.0, -min_y * to_meter, 0.0));
    }

    Ok(to_meter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::SkeletonNode;

    /// Hips 在原点，两条腿向下 10 个单位，脊柱向上
    fn biped() -> MotionSet {
        let mut motion = MotionSet::new(SkeletonNode::new("Hips"), 1.0 / 30.0);
        let spine = motion
            .add_child(0, SkeletonNode::new("Spine").with_offset(Vec3::new(0.0, 6.0, 0.0)))
            .unwrap();
        motion
            .add_child(spine, SkeletonNode::new("Head").with_offset(Vec3::new(0.0, 4.0, 0.0)))
            .unwrap();
        for (name, x) in [("LeftUpLeg", -2.0), ("RightUpLeg", 2.0)] {
            let up = motion
                .add_child(0, SkeletonNode::new(name).with_offset(Vec3::new(x, 0.0, 0.0)))
                .unwrap();
            let knee = motion
                .add_child(up, SkeletonNode::new(format!("{}Knee", name)).with_offset(Vec3::new(0.0, -5.0, 0.0)))
                .unwrap();
            motion
                .add_child(knee, SkeletonNode::new(format!("{}Foot", name)).with_offset(Vec3::new(0.0, -5.0, 0.0)))
                .unwrap();
        }
        motion
    }

    #[test]
    fn test_build_preserves_topology_and_scale() {
        let motion = biped();
        let scene = build_hierarchy("walk", &motion, 2.0).unwrap();
        assert_eq!(scene.node_count(), motion.node_count() + 1);
        assert_eq!(scene.name(scene.root()), Some("walk"));

        let hips = scene.child(scene.root(), 0).unwrap();
        let names: Vec<_> = scene.children(hips).iter().map(|&c| scene.name(c).unwrap()).collect();
        assert_eq!(names, ["Spine", "LeftUpLeg", "RightUpLeg"]);

        let head = scene.find_by_path("Hips/Spine/Head").unwrap();
        assert_eq!(scene.local_position(head), Vec3::new(0.0, 8.0, 0.0));
        assert!(scene.position(head).abs_diff_eq(Vec3::new(0.0, 20.0, 0.0), 1e-5));
    }

    #[test]
    fn test_normalize_floor() {
        let mut scene = build_hierarchy("walk", &biped(), 1.0).unwrap();
        let to_meter = normalize_floor(&mut scene, false).unwrap();
        assert!((to_meter - 0.1).abs() < 1e-6);

        let min_y = scene
            .traverse()
            .into_iter()
            .map(|id| scene.position(id).y)
            .fold(f32::MAX, f32::min);
        assert!(min_y.abs() < 1e-5);

        let hips = scene.child(scene.root(), 0).unwrap();
        assert!((scene.position(hips).y - 1.0).abs() < 1e-6);

        let head = scene.find_by_path("Hips/Spine/Head").unwrap();
        assert!((scene.position(head).y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_floor_rejects_degenerate() {
        let mut motion = MotionSet::new(SkeletonNode::new("Hips"), 0.1);
        motion
            .add_child(0, SkeletonNode::new("Spine").with_offset(Vec3::new(0.0, 3.0, 0.0)))
            .unwrap();
        let mut scene = build_hierarchy("up", &motion, 1.0).unwrap();
        let spine = scene.find_by_path("Hips/Spine").unwrap();

        assert!(matches!(
            normalize_floor(&mut scene, false),
            Err(MocapError::NormalizationDegenerate)
        ));
        assert_eq!(scene.local_position(spine), Vec3::new(0.0, 3.0, 0.0));

        assert_eq!(normalize_floor(&mut scene, true).unwrap(), 1.0);
        assert_eq!(scene.local_position(spine), Vec3::new(0.0, 3.0, 0.0));
    }
}
