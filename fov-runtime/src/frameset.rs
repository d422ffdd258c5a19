//! # FrameSet 模块
//!
//! 命名帧集合注册表：每个集合是一段有序的帧资源序列，
//! 切换集合会替换游标的活动帧数组。
//!
//! ## 设计说明
//!
//! - 集合在关卡加载时由声明式定义填充，关卡切换时整体重建
//! - 帧引用是不透明标识符，实际资源解析由 Host 在执行
//!   `ShowFrame` 时完成
//! - 切换会途经游标并同步发布事件，订阅者可能再次请求切换；
//!   注册表用进行中标志拒绝嵌套调用（记日志后直接返回）

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::events::{EventBus, GameEvent};
use crate::frame::FrameCursor;

/// 命名帧集合
///
/// 加载后不可变，名称在注册表内唯一。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSet {
    /// 集合名称
    pub name: String,
    /// 有序帧资源标识符
    pub frames: Vec<String>,
}

impl FrameSet {
    /// 创建帧集合
    pub fn new(name: impl Into<String>, frames: Vec<String>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }
}

/// 帧集合注册表
#[derive(Debug, Default)]
pub struct FrameSetRegistry {
    /// 名称到集合的映射
    sets: HashMap<String, FrameSet>,
    /// 当前激活的集合名
    current: Option<String>,
    /// 切换进行中标志（重入守卫）
    switching: bool,
}

impl FrameSetRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 重建注册表内容（关卡加载时调用）
    ///
    /// 丢弃上一关的所有集合，当前集合名复位。
    pub fn reload(&mut self, sets: Vec<FrameSet>) {
        self.sets.clear();
        self.current = None;
        for set in sets {
            self.sets.insert(set.name.clone(), set);
        }
    }

    /// 当前激活的集合名
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// 是否存在指定集合
    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    /// 已注册的集合数量
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// 切换到命名集合
    ///
    /// # 参数
    /// - `preserve_index`: 保留游标当前索引（钳入新范围），否则从 0 开始
    ///
    /// # 返回
    /// - 是否完成了切换。集合缺失和嵌套调用都只记日志、不改状态。
    pub fn switch_to(
        &mut self,
        name: &str,
        preserve_index: bool,
        cursor: &mut FrameCursor,
        bus: &mut EventBus,
    ) -> bool {
        if self.switching {
            warn!(name = %name, "帧集合切换进行中，拒绝嵌套切换请求");
            return false;
        }

        let Some(set) = self.sets.get(name) else {
            warn!(name = %name, "帧集合未找到，忽略切换请求");
            return false;
        };

        self.switching = true;

        let start_index = if preserve_index {
            cursor.current_index()
        } else {
            0
        };
        cursor.set_frame_set(set.frames.clone(), start_index, bus);
        self.current = Some(set.name.clone());

        debug!(name = %name, preserve_index, "帧集合已切换");
        bus.publish(GameEvent::FrameSetChanged {
            name: name.to_string(),
        });

        self.switching = false;
        true
    }
}
