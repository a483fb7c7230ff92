//! 骨架分类器
//!
//! 根据 Hips 下的拓扑和静止姿态位置推断人形骨骼槽位。
//! 作为可替换的能力注入 `BoneMapper`。

use std::collections::HashSet;

use crate::skeleton::{NodeId, SceneHierarchy};

use super::HumanBone;

/// 骨架分类器
pub trait SkeletonClassifier {
    /// `descendants` 为以 Hips 为根的先序遍历结果（包含 Hips）
    fn classify(
        &self,
        hierarchy: &SceneHierarchy,
        hips: NodeId,
        descendants: &[NodeId],
    ) -> Vec<(HumanBone, NodeId)>;
}

/// 基于拓扑的默认分类器
///
/// - Hips 下高于 Hips 的子树为脊柱，低于 Hips 的两个子树为腿
/// - 脊柱沿单子节点链向上，直到分叉节点
/// - 分叉节点下最居中的子树为颈部/头部，两侧为手臂
/// - 左侧为 X 负方向
///
/// 手指不做推断。
#[derive(Clone, Copy, Debug, Default)]
pub struct TopologyClassifier;

impl SkeletonClassifier for TopologyClassifier {
    fn classify(
        &self,
        hierarchy: &SceneHierarchy,
        hips: NodeId,
        descendants: &[NodeId],
    ) -> Vec<(HumanBone, NodeId)> {
        let allowed: HashSet<NodeId> = descendants.iter().copied().collect();
        let mut result = vec![(HumanBone::Hips, hips)];

        let hips_pos = hierarchy.position(hips);
        let children: Vec<NodeId> = hierarchy
            .children(hips)
            .iter()
            .copied()
            .filter(|child| allowed.contains(child))
            .collect();

        // 脊柱：子树最高点高于 Hips 且最高的子节点
        let spine = children
            .iter()
            .copied()
            .map(|child| (child, subtree_top(hierarchy, child)))
            .filter(|&(_, top)| top > hips_pos.y)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(child, _)| child);

        // 腿：其余子树中最低点低于 Hips 的
        let legs: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|&child| Some(child) != spine)
            .filter(|&child| subtree_bottom(hierarchy, child) < hips_pos.y)
            .collect();
        let (left_leg, right_leg) = split_sides(hierarchy, &legs, hips_pos.x);
        if let Some(leg) = left_leg {
            assign_chain(
                &mut result,
                &chain(hierarchy, leg),
                &[HumanBone::LeftUpperLeg, HumanBone::LeftLowerLeg, HumanBone::LeftFoot, HumanBone::LeftToes],
                3,
            );
        }
        if let Some(leg) = right_leg {
            assign_chain(
                &mut result,
                &chain(hierarchy, leg),
                &[HumanBone::RightUpperLeg, HumanBone::RightLowerLeg, HumanBone::RightFoot, HumanBone::RightToes],
                3,
            );
        }

        let Some(spine) = spine else {
            return result;
        };
        let spine_chain = chain(hierarchy, spine);
        let Some(&branch) = spine_chain.last() else {
            return result;
        };

        // 链末端下只剩 End Site：没有手臂分叉，末端节点就是头部
        if is_terminal(hierarchy, branch) {
            if let [body @ .., head] = spine_chain.as_slice() {
                push_spine(&mut result, body);
                result.push((HumanBone::Head, *head));
            }
            return result;
        }
        push_spine(&mut result, &spine_chain);

        let branch_pos = hierarchy.position(branch);
        let upper: Vec<NodeId> = hierarchy.children(branch).to_vec();
        if upper.is_empty() {
            return result;
        }

        // 颈部：与分叉节点横向距离最小，且子树向上
        let neck = upper
            .iter()
            .copied()
            .filter(|&child| subtree_top(hierarchy, child) > branch_pos.y)
            .min_by(|&a, &b| {
                let da = (chain_end_x(hierarchy, a) - branch_pos.x).abs();
                let db = (chain_end_x(hierarchy, b) - branch_pos.x).abs();
                da.total_cmp(&db)
            });
        if let Some(neck) = neck {
            let neck_chain = chain(hierarchy, neck);
            match neck_chain.as_slice() {
                [] => {}
                [head] => result.push((HumanBone::Head, *head)),
                [neck, .., head] => {
                    result.push((HumanBone::Neck, *neck));
                    result.push((HumanBone::Head, *head));
                }
            }
        }

        let arms: Vec<NodeId> = upper.into_iter().filter(|&child| Some(child) != neck).collect();
        let (left_arm, right_arm) = split_sides(hierarchy, &arms, branch_pos.x);
        if let Some(arm) = left_arm {
            assign_arm(
                &mut result,
                &chain(hierarchy, arm),
                [HumanBone::LeftShoulder, HumanBone::LeftUpperArm, HumanBone::LeftLowerArm, HumanBone::LeftHand],
            );
        }
        if let Some(arm) = right_arm {
            assign_arm(
                &mut result,
                &chain(hierarchy, arm),
                [HumanBone::RightShoulder, HumanBone::RightUpperArm, HumanBone::RightLowerArm, HumanBone::RightHand],
            );
        }

        result
    }
}

/// 沿单子节点向下的链，去掉末尾的叶子（End Site）
fn chain(hierarchy: &SceneHierarchy, start: NodeId) -> Vec<NodeId> {
    let mut nodes = vec![start];
    let mut current = start;
    while let [only] = hierarchy.children(current) {
        nodes.push(*only);
        current = *only;
    }
    if nodes.len() > 1 && hierarchy.children(current).is_empty() {
        nodes.pop();
    }
    nodes
}

/// 所有子节点都是叶子
fn is_terminal(hierarchy: &SceneHierarchy, node: NodeId) -> bool {
    hierarchy
        .children(node)
        .iter()
        .all(|&child| hierarchy.children(child).is_empty())
}

fn push_spine(result: &mut Vec<(HumanBone, NodeId)>, nodes: &[NodeId]) {
    let bones = [HumanBone::Spine, HumanBone::Chest, HumanBone::UpperChest];
    result.extend(bones.iter().copied().zip(nodes.iter().copied()));
}

fn chain_end_x(hierarchy: &SceneHierarchy, start: NodeId) -> f32 {
    let nodes = chain(hierarchy, start);
    nodes
        .last()
        .map(|&node| hierarchy.position(node).x)
        .unwrap_or_else(|| hierarchy.position(start).x)
}

fn subtree_top(hierarchy: &SceneHierarchy, start: NodeId) -> f32 {
    hierarchy
        .traverse_from(start)
        .into_iter()
        .map(|id| hierarchy.position(id).y)
        .fold(f32::MIN, f32::max)
}

fn subtree_bottom(hierarchy: &SceneHierarchy, start: NodeId) -> f32 {
    hierarchy
        .traverse_from(start)
        .into_iter()
        .map(|id| hierarchy.position(id).y)
        .fold(f32::MAX, f32::min)
}

/// 按横向位置分出左右两侧（左为 X 负方向），每侧取最外侧的一个
fn split_sides(hierarchy: &SceneHierarchy, nodes: &[NodeId], center_x: f32) -> (Option<NodeId>, Option<NodeId>) {
    let lateral = |node: NodeId| chain_end_x(hierarchy, node) - center_x;
    let left = nodes
        .iter()
        .copied()
        .filter(|&node| lateral(node) < 0.0)
        .min_by(|&a, &b| lateral(a).total_cmp(&lateral(b)));
    let right = nodes
        .iter()
        .copied()
        .filter(|&node| lateral(node) > 0.0)
        .max_by(|&a, &b| lateral(a).total_cmp(&lateral(b)));
    (left, right)
}

fn assign_chain(result: &mut Vec<(HumanBone, NodeId)>, nodes: &[NodeId], bones: &[HumanBone], min_len: usize) {
    if nodes.len() < min_len {
        return;
    }
    result.extend(bones.iter().copied().zip(nodes.iter().copied()));
}

/// 手臂链：四节及以上带肩膀，三节不带
fn assign_arm(result: &mut Vec<(HumanBone, NodeId)>, nodes: &[NodeId], bones: [HumanBone; 4]) {
    match nodes.len() {
        0..=2 => {}
        3 => assign_chain(result, nodes, &bones[1..], 3),
        _ => assign_chain(result, nodes, &bones, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// 类 CMU 的骨架：带 End Site、双节脖子、肩膀和手指
    fn cmu_like() -> SceneHierarchy {
        let mut scene = SceneHierarchy::new("Actor");
        let root = scene.root();
        let hips = scene.add_child(root, "Hips", Vec3::new(0.0, 1.0, 0.0)).unwrap();

        for (side, x) in [("Left", -0.1), ("Right", 0.1)] {
            let up = scene.add_child(hips, format!("{}UpLeg", side), Vec3::new(x, 0.0, 0.0)).unwrap();
            let leg = scene.add_child(up, format!("{}Leg", side), Vec3::new(0.0, -0.45, 0.0)).unwrap();
            let foot = scene.add_child(leg, format!("{}Foot", side), Vec3::new(0.0, -0.45, 0.0)).unwrap();
            let toe = scene.add_child(foot, format!("{}ToeBase", side), Vec3::new(0.0, -0.05, 0.1)).unwrap();
            scene.add_child(toe, format!("{}Toe_End", side), Vec3::new(0.0, 0.0, 0.05)).unwrap();
        }

        let spine = scene.add_child(hips, "Spine", Vec3::new(0.0, 0.1, 0.0)).unwrap();
        let spine1 = scene.add_child(spine, "Spine1", Vec3::new(0.0, 0.15, 0.0)).unwrap();
        let neck = scene.add_child(spine1, "Neck", Vec3::new(0.0, 0.2, 0.0)).unwrap();
        let neck1 = scene.add_child(neck, "Neck1", Vec3::new(0.0, 0.05, 0.0)).unwrap();
        let head = scene.add_child(neck1, "Head", Vec3::new(0.0, 0.05, 0.0)).unwrap();
        scene.add_child(head, "Head_End", Vec3::new(0.0, 0.1, 0.0)).unwrap();

        for (side, x) in [("Left", -1.0), ("Right", 1.0)] {
            let shoulder = scene.add_child(spine1, format!("{}Shoulder", side), Vec3::new(0.05 * x, 0.18, 0.0)).unwrap();
            let arm = scene.add_child(shoulder, format!("{}Arm", side), Vec3::new(0.1 * x, 0.0, 0.0)).unwrap();
            // 手臂自然下垂，需要 T-Pose 校正
            let fore = scene.add_child(arm, format!("{}ForeArm", side), Vec3::new(0.0, -0.25, 0.0)).unwrap();
            let hand = scene.add_child(fore, format!("{}Hand", side), Vec3::new(0.0, -0.25, 0.0)).unwrap();
            scene.add_child(hand, format!("{}HandThumb", side), Vec3::new(0.02 * x, -0.05, 0.02)).unwrap();
            scene.add_child(hand, format!("{}HandIndex", side), Vec3::new(0.0, -0.08, 0.0)).unwrap();
        }
        scene
    }

    fn classify(scene: &SceneHierarchy) -> Vec<(HumanBone, String)> {
        let hips = scene.find_by_name("Hips").unwrap();
        let descendants = scene.traverse_from(hips);
        TopologyClassifier
            .classify(scene, hips, &descendants)
            .into_iter()
            .map(|(bone, node)| (bone, scene.name(node).unwrap().to_string()))
            .collect()
    }

    fn lookup<'a>(result: &'a [(HumanBone, String)], bone: HumanBone) -> Option<&'a str> {
        result.iter().find(|(b, _)| *b == bone).map(|(_, name)| name.as_str())
    }

    #[test]
    fn test_classify_cmu_like() {
        let scene = cmu_like();
        let result = classify(&scene);

        let expected = [
            (HumanBone::Hips, "Hips"),
            (HumanBone::Spine, "Spine"),
            (HumanBone::Chest, "Spine1"),
            (HumanBone::Neck, "Neck"),
            (HumanBone::Head, "Head"),
            (HumanBone::LeftUpperLeg, "LeftUpLeg"),
            (HumanBone::LeftLowerLeg, "LeftLeg"),
            (HumanBone::LeftFoot, "LeftFoot"),
            (HumanBone::LeftToes, "LeftToeBase"),
            (HumanBone::RightUpperLeg, "RightUpLeg"),
            (HumanBone::RightFoot, "RightFoot"),
            (HumanBone::LeftShoulder, "LeftShoulder"),
            (HumanBone::LeftUpperArm, "LeftArm"),
            (HumanBone::LeftLowerArm, "LeftForeArm"),
            (HumanBone::LeftHand, "LeftHand"),
            (HumanBone::RightUpperArm, "RightArm"),
            (HumanBone::RightHand, "RightHand"),
        ];
        for (bone, name) in expected {
            assert_eq!(lookup(&result, bone), Some(name), "{:?}", bone);
        }
        assert_eq!(lookup(&result, HumanBone::UpperChest), None);
        assert_eq!(lookup(&result, HumanBone::LeftThumbProximal), None);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let scene = cmu_like();
        assert_eq!(classify(&scene), classify(&scene));
    }

    #[test]
    fn test_classify_three_segment_arm() {
        let mut scene = SceneHierarchy::new("Actor");
        let hips = scene.add_child(scene.root(), "Hips", Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let chest = scene.add_child(hips, "Chest", Vec3::new(0.0, 0.4, 0.0)).unwrap();
        scene.add_child(chest, "Head", Vec3::new(0.0, 0.3, 0.0)).unwrap();
        let upper = scene.add_child(chest, "L_Upper", Vec3::new(-0.2, 0.0, 0.0)).unwrap();
        let lower = scene.add_child(upper, "L_Lower", Vec3::new(-0.3, 0.0, 0.0)).unwrap();
        let hand = scene.add_child(lower, "L_Hand", Vec3::new(-0.3, 0.0, 0.0)).unwrap();
        scene.add_child(hand, "L_Hand_End", Vec3::new(-0.1, 0.0, 0.0)).unwrap();

        let result = classify(&scene);
        assert_eq!(lookup(&result, HumanBone::Spine), Some("Chest"));
        assert_eq!(lookup(&result, HumanBone::Head), Some("Head"));
        assert_eq!(lookup(&result, HumanBone::LeftShoulder), None);
        assert_eq!(lookup(&result, HumanBone::LeftUpperArm), Some("L_Upper"));
        assert_eq!(lookup(&result, HumanBone::LeftHand), Some("L_Hand"));
        assert_eq!(lookup(&result, HumanBone::RightUpperArm), None);
    }

    const NO_ARMS: &str = "HIERARCHY
ROOT Hips
{
    OFFSET 0 0 0
    CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
    JOINT Spine
    {
        OFFSET 0 10 0
        CHANNELS 3 Zrotation Xrotation Yrotation
        JOINT Head
        {
            OFFSET 0 10 0
            CHANNELS 3 Zrotation Xrotation Yrotation
            End Site
            {
                OFFSET 0 5 0
            }
        }
    }
    JOINT LeftUpLeg
    {
        OFFSET -2 0 0
        CHANNELS 3 Zrotation Xrotation Yrotation
        JOINT LeftLeg
        {
            OFFSET 0 -10 0
            CHANNELS 3 Zrotation Xrotation Yrotation
            End Site
            {
                OFFSET 0 -10 0
            }
        }
    }
    JOINT RightUpLeg
    {
        OFFSET 2 0 0
        CHANNELS 3 Zrotation Xrotation Yrotation
        JOINT RightLeg
        {
            OFFSET 0 -10 0
            CHANNELS 3 Zrotation Xrotation Yrotation
            End Site
            {
                OFFSET 0 -10 0
            }
        }
    }
}
MOTION
Frames: 0
Frame Time: 0.033333
";

    #[test]
    fn test_classify_spine_ending_in_end_site() {
        let motion = crate::bvh::MotionSet::parse(NO_ARMS).unwrap();
        let scene = crate::importer::build_hierarchy("no_arms", &motion, 1.0).unwrap();
        let result = classify(&scene);

        assert_eq!(lookup(&result, HumanBone::Spine), Some("Spine"));
        assert_eq!(lookup(&result, HumanBone::Head), Some("Head"));
        assert_eq!(lookup(&result, HumanBone::Chest), None);
        assert!(result.iter().all(|(_, name)| !name.ends_with("_End")));
    }
}
