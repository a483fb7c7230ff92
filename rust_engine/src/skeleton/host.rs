//! 宿主场景接口
//!
//! 复制层级与销毁层级由宿主决定：编辑期立即销毁，运行期延迟到帧末销毁。

use std::ops::{Deref, DerefMut};

use super::SceneHierarchy;

/// 销毁方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestroyMode {
    /// 立即销毁（编辑期）
    Immediate,
    /// 延迟销毁（运行期）
    Deferred,
}

/// 宿主场景
pub trait SceneHost {
    /// 复制一份完整层级
    fn instantiate(&mut self, source: &SceneHierarchy) -> SceneHierarchy;

    /// 销毁层级
    fn destroy(&mut self, hierarchy: SceneHierarchy);
}

/// 进程内的默认宿主
#[derive(Debug)]
pub struct LocalSceneHost {
    mode: DestroyMode,
    pending: Vec<SceneHierarchy>,
    destroyed: usize,
}

impl LocalSceneHost {
    pub fn new(mode: DestroyMode) -> Self {
        Self {
            mode,
            pending: Vec::new(),
            destroyed: 0,
        }
    }

    pub fn edit_time() -> Self {
        Self::new(DestroyMode::Immediate)
    }

    pub fn run_time() -> Self {
        Self::new(DestroyMode::Deferred)
    }

    /// 等待销毁的层级数量
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// 已完成销毁的层级数量
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    /// 执行延迟销毁，返回本次销毁数量
    pub fn flush(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        self.destroyed += count;
        count
    }
}

impl Default for LocalSceneHost {
    fn default() -> Self {
        Self::edit_time()
    }
}

impl SceneHost for LocalSceneHost {
    fn instantiate(&mut self, source: &SceneHierarchy) -> SceneHierarchy {
        source.duplicate()
    }

    fn destroy(&mut self, hierarchy: SceneHierarchy) {
        match self.mode {
            DestroyMode::Immediate => {
                drop(hierarchy);
                self.destroyed += 1;
            }
            DestroyMode::Deferred => self.pending.push(hierarchy),
        }
    }
}

/// 作用域内的层级副本
///
/// 离开作用域时（包括错误返回和 panic 展开）交还宿主销毁，且只销毁一次。
pub struct ScopedCopy<'h, H: SceneHost + ?Sized> {
    host: &'h mut H,
    copy: Option<SceneHierarchy>,
}

impl<'h, H: SceneHost + ?Sized> ScopedCopy<'h, H> {
    pub fn new(host: &'h mut H, source: &SceneHierarchy) -> Self {
        let copy = host.instantiate(source);
        Self {
            host,
            copy: Some(copy),
        }
    }
}

impl<H: SceneHost + ?Sized> Deref for ScopedCopy<'_, H> {
    type Target = SceneHierarchy;

    fn deref(&self) -> &SceneHierarchy {
        self.copy.as_ref().expect("working copy is only taken on drop")
    }
}

impl<H: SceneHost + ?Sized> DerefMut for ScopedCopy<'_, H> {
    fn deref_mut(&mut self) -> &mut SceneHierarchy {
        self.copy.as_mut().expect("working copy is only taken on drop")
    }
}

impl<H: SceneHost + ?Sized> Drop for ScopedCopy<'_, H> {
    fn drop(&mut self) {
        if let Some(copy) = self.copy.take() {
            log::debug!("销毁工作副本: {}", copy.name(copy.root()).unwrap_or_default());
            self.host.destroy(copy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_copy_destroys_on_drop() {
        let source = SceneHierarchy::new("Actor");
        let mut host = LocalSceneHost::edit_time();
        {
            let copy = ScopedCopy::new(&mut host, &source);
            assert_eq!(copy.name(copy.root()), Some("Actor"));
        }
        assert_eq!(host.destroyed_count(), 1);
    }

    #[test]
    fn test_deferred_destroy_waits_for_flush() {
        let source = SceneHierarchy::new("Actor");
        let mut host = LocalSceneHost::run_time();
        drop(ScopedCopy::new(&mut host, &source));
        assert_eq!(host.pending_count(), 1);
        assert_eq!(host.destroyed_count(), 0);
        assert_eq!(host.flush(), 1);
        assert_eq!(host.destroyed_count(), 1);
        assert_eq!(host.pending_count(), 0);
    }
}
