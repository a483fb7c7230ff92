//! BVH (Biovision Hierarchy) 文本解析
//!
//! 文件分两段：`HIERARCHY` 段描述骨架（名称、偏移、通道），
//! `MOTION` 段给出帧数、帧时长以及每帧一行的采样值。

use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::SplitWhitespace;

use glam::Vec3;

use crate::{MocapError, Result};

use super::{ChannelKind, MotionSet, SkeletonNode};

type Tokens<'a> = Peekable<SplitWhitespace<'a>>;

impl MotionSet {
    /// 从文件加载 BVH
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(MocapError::Io)?;
        Self::parse(&text)
    }

    /// 解析 BVH 文本
    pub fn parse(text: &str) -> Result<Self> {
        let (hierarchy, motion) = split_sections(text)?;

        let mut tokens = hierarchy.split_whitespace().peekable();
        expect(&mut tokens, "HIERARCHY")?;
        expect(&mut tokens, "ROOT")?;
        let root_name = next_token(&mut tokens, "root name")?;

        let mut set = MotionSet::new(SkeletonNode::new(root_name), 0.0);
        let root = set.root();
        Self::parse_joint_body(&mut tokens, &mut set, root)?;

        if let Some(extra) = tokens.next() {
            return Err(MocapError::BvhParse(format!(
                "unexpected token after root joint: {}",
                extra
            )));
        }

        Self::parse_motion(motion, &mut set)?;

        log::debug!("BVH 解析完成: {}", set);
        Ok(set)
    }

    /// 解析 `{ ... }` 关节块
    fn parse_joint_body(tokens: &mut Tokens<'_>, set: &mut MotionSet, index: usize) -> Result<()> {
        expect(tokens, "{")?;

        loop {
            let token = next_token(tokens, "joint body")?;
            match token {
                "OFFSET" => {
                    let offset = parse_vec3(tokens)?;
                    if let Some(node) = set.node_mut(index) {
                        node.offset = offset;
                    }
                }
                "CHANNELS" => {
                    let count: usize = parse_number(tokens, "channel count")?;
                    let mut channels = Vec::with_capacity(count);
                    for _ in 0..count {
                        let kind = next_token(tokens, "channel kind")?;
                        let kind = ChannelKind::from_token(kind).ok_or_else(|| {
                            MocapError::UnknownChannelKind {
                                node: set.node(index).map(|n| n.name.clone()).unwrap_or_default(),
                                kind: kind.to_string(),
                            }
                        })?;
                        if channels.contains(&kind) {
                            return Err(MocapError::DuplicateChannel {
                                node: set.node(index).map(|n| n.name.clone()).unwrap_or_default(),
                                kind,
                            });
                        }
                        channels.push(kind);
                    }
                    if let Some(node) = set.node_mut(index) {
                        node.channels = channels;
                    }
                }
                "JOINT" => {
                    let name = next_token(tokens, "joint name")?;
                    let child = set.add_child(index, SkeletonNode::new(name))?;
                    Self::parse_joint_body(tokens, set, child)?;
                }
                "End" => {
                    expect(tokens, "Site")?;
                    let name = set
                        .node(index)
                        .map(|n| format!("{}_End", n.name))
                        .unwrap_or_default();
                    let child = set.add_child(index, SkeletonNode::new(name))?;
                    Self::parse_end_site(tokens, set, child)?;
                }
                "}" => return Ok(()),
                other => {
                    return Err(MocapError::BvhParse(format!("unexpected token: {}", other)));
                }
            }
        }
    }

    /// End Site 只有偏移，没有通道和子节点
    fn parse_end_site(tokens: &mut Tokens<'_>, set: &mut MotionSet, index: usize) -> Result<()> {
        expect(tokens, "{")?;
        expect(tokens, "OFFSET")?;
        let offset = parse_vec3(tokens)?;
        if let Some(node) = set.node_mut(index) {
            node.offset = offset;
        }
        expect(tokens, "}")
    }

    /// 解析 MOTION 段
    fn parse_motion(text: &str, set: &mut MotionSet) -> Result<()> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

        let frames = lines
            .next()
            .and_then(|line| line.strip_prefix("Frames:"))
            .ok_or_else(|| MocapError::BvhParse("missing Frames:".to_string()))?;
        let frames: usize = frames
            .trim()
            .parse()
            .map_err(|_| MocapError::BvhParse(format!("invalid frame count: {}", frames.trim())))?;

        let frame_time = lines
            .next()
            .and_then(|line| line.strip_prefix("Frame Time:"))
            .ok_or_else(|| MocapError::BvhParse("missing Frame Time:".to_string()))?;
        set.frame_time = frame_time
            .trim()
            .parse()
            .map_err(|_| MocapError::BvhParse(format!("invalid frame time: {}", frame_time.trim())))?;

        set.ensure_channels();
        for (row_index, line) in lines.by_ref().take(frames).enumerate() {
            let row = line
                .split_whitespace()
                .map(|value| value.parse::<f32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| MocapError::BvhParse(format!("frame {}: {}", row_index, e)))?;
            set.push_frame(&row).map_err(|e| match e {
                MocapError::ChannelAlignment { expected, actual } => MocapError::BvhParse(format!(
                    "frame {}: expected {} values, found {}",
                    row_index, expected, actual
                )),
                other => other,
            })?;
        }

        if set.frame_count != frames {
            return Err(MocapError::BvhParse(format!(
                "expected {} frames, found {}",
                frames, set.frame_count
            )));
        }
        if lines.next().is_some() {
            log::warn!("BVH 帧数据多于声明的 {} 帧，多余行已忽略", frames);
        }
        Ok(())
    }
}

/// 以单独一行的 `MOTION` 分割两段
fn split_sections(text: &str) -> Result<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim() == "MOTION" {
            return Ok((&text[..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(MocapError::BvhParse("missing MOTION section".to_string()))
}

fn next_token<'a>(tokens: &mut Tokens<'a>, what: &str) -> Result<&'a str> {
    tokens
        .next()
        .ok_or_else(|| MocapError::BvhParse(format!("unexpected end of input, expected {}", what)))
}

fn expect(tokens: &mut Tokens<'_>, keyword: &str) -> Result<()> {
    let token = next_token(tokens, keyword)?;
    if token == keyword {
        Ok(())
    } else {
        Err(MocapError::BvhParse(format!("expected {}, found {}", keyword, token)))
    }
}

fn parse_number<T: std::str::FromStr>(tokens: &mut Tokens<'_>, what: &str) -> Result<T> {
    let token = next_token(tokens, what)?;
    token
        .parse()
        .map_err(|_| MocapError::BvhParse(format!("invalid {}: {}", what, token)))
}

fn parse_vec3(tokens: &mut Tokens<'_>) -> Result<Vec3> {
    let x = parse_number(tokens, "offset")?;
    let y = parse_number(tokens, "offset")?;
    let z = parse_number(tokens, "offset")?;
    Ok(Vec3::new(x, y, z))
}
