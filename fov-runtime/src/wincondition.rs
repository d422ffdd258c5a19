//! # WinCondition 模块
//!
//! 跨关卡的结局标记状态与分支解析。
//!
//! ## 设计说明
//!
//! - 标记状态的生命周期长于任何单个关卡，关卡重载不清空
//! - 分支表是静态配置：按关卡名查绿/红两个后继
//! - **默认绿策略**：没有记录过标记的关卡按胜利分支解析

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// 关卡分支配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBranch {
    /// 关卡名
    pub level: String,
    /// 绿（胜利）后继
    pub next_if_green: String,
    /// 红（失败）后继
    pub next_if_red: String,
}

/// 结局标记追踪器
///
/// `GameRuntime` 的唯一跨关卡可变状态持有者。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WinConditionTracker {
    /// 当前关卡名
    current_level: String,
    /// 关卡名 -> 结局标记
    flags: HashMap<String, bool>,
    /// 分支表
    branches: Vec<LevelBranch>,
}

impl WinConditionTracker {
    /// 创建空追踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 带分支表创建
    pub fn with_branches(branches: Vec<LevelBranch>) -> Self {
        Self {
            branches,
            ..Self::default()
        }
    }

    /// 当前关卡名
    pub fn current_level(&self) -> &str {
        &self.current_level
    }

    /// 记录当前进入的关卡（关卡加载时调用）
    pub fn enter_level(&mut self, name: impl Into<String>) {
        self.current_level = name.into();
    }

    /// 给指定关卡记录结局标记
    pub fn mark_flag(&mut self, level: impl Into<String>, is_green: bool) {
        let level = level.into();
        debug!(level = %level, is_green, "记录结局标记");
        self.flags.insert(level, is_green);
    }

    /// 给当前关卡记录结局标记
    pub fn mark_current(&mut self, is_green: bool) {
        self.mark_flag(self.current_level.clone(), is_green);
    }

    /// 查询标记
    pub fn flag(&self, level: &str) -> Option<bool> {
        self.flags.get(level).copied()
    }

    /// 解析关卡的后继
    ///
    /// 分支表里没有该关卡时返回 None；有分支时按记录的标记取
    /// 绿/红后继，无记录按默认绿策略取绿后继。
    pub fn next_level(&self, level: &str) -> Option<&str> {
        let branch = self.branches.iter().find(|b| b.level == level)?;
        let is_green = self.flags.get(level).copied().unwrap_or(true);
        Some(if is_green {
            &branch.next_if_green
        } else {
            &branch.next_if_red
        })
    }
}
