//! # Input 模块
//!
//! 定义 Host 向 Runtime 传递的输入事件。
//!
//! ## 设计说明
//!
//! - `RuntimeInput` 是 Host 采集用户操作后，传递给 Runtime 的抽象输入
//! - Runtime 不直接处理鼠标/键盘事件，只处理语义化的输入
//! - 拖拽增量在每帧 tick 时传入一次，tick 是拖拽/旁白状态的**唯一变更点**

use serde::{Deserialize, Serialize};

/// Host 向 Runtime 传递的输入
///
/// Runtime 通过 `tick(dt, input)` 接收这些输入。
///
/// # 设计说明
///
/// - `DragDelta`：原始指针位移，驱动 FOV 翻页
/// - `PointerClick`：点击推进旁白（打字中则快进）
/// - `ActivateObject`：UI 层报告某个交互元素被激活。
///   可用状态的逻辑把关在 UI 层完成，Runtime 不再校验
/// - `LoadLevel`：外部请求加载关卡（等价于发布一次关卡过渡事件）
/// - `SceneLoaded`：异步场景加载完成信号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuntimeInput {
    /// 指针拖拽增量（本帧）
    DragDelta { dx: f32, dy: f32 },

    /// 用户点击（推进旁白）
    PointerClick,

    /// 程序化推进旁白（等价于点击）
    AdvanceNarration,

    /// 交互元素被激活
    ActivateObject { id: String },

    /// 请求加载指定关卡
    LoadLevel { name: String },

    /// 场景加载完成
    SceneLoaded { name: String },
}

impl RuntimeInput {
    /// 创建拖拽输入
    pub fn drag(dx: f32, dy: f32) -> Self {
        Self::DragDelta { dx, dy }
    }

    /// 创建点击输入
    pub fn click() -> Self {
        Self::PointerClick
    }

    /// 创建元素激活输入
    pub fn activate(id: impl Into<String>) -> Self {
        Self::ActivateObject { id: id.into() }
    }

    /// 创建关卡加载请求
    pub fn load_level(name: impl Into<String>) -> Self {
        Self::LoadLevel { name: name.into() }
    }
}
