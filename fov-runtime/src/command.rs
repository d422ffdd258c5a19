//! # Command 模块
//!
//! 定义 Runtime 向 Host 发出的所有指令。
//! Command 是 Runtime 与 Host 之间的**唯一通信方式**。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **无副作用**：Command 本身不执行任何操作
//! - **引擎无关**：不包含任何渲染/音频引擎的类型

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;

/// RGBA 颜色
///
/// 用于过渡遮罩着色和旁白文字颜色。分量范围 0.0 - 1.0。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// 不透明黑（默认过渡遮罩色）
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    /// 不透明白
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    /// 胜利分支提示色
    pub const GREEN: Rgba = Rgba::new(0.1, 0.6, 0.2, 1.0);
    /// 失败分支提示色
    pub const RED: Rgba = Rgba::new(0.6, 0.1, 0.1, 1.0);

    /// 创建颜色
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Runtime 向 Host 发出的指令
///
/// Host 接收 Command 后，将其转换为实际的渲染、音频等操作。
/// 所有资源引用都是不透明标识符，由 Host 层解析。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 显示指定帧（FOV 翻页的当前画面）
    ShowFrame {
        /// 帧资源标识符
        frame: String,
    },

    /// 设置交互元素的可用/可见状态
    ///
    /// 只在状态实际发生翻转时发出（边沿触发，不轮询）。
    SetElementEnabled {
        /// 元素标识符
        id: String,
        /// 是否可用
        enabled: bool,
    },

    /// 显示旁白文字面板
    NarrationShow,

    /// 隐藏旁白文字面板
    NarrationHide,

    /// 更新旁白文字内容（打字机逐字显示的部分文本）
    NarrationText {
        /// 当前已显示的文本
        text: String,
        /// 文字颜色（None 使用默认色）
        color: Option<Rgba>,
    },

    /// 单行旁白播放完毕（通知，携带最后显示的整行）
    NarrationLineCompleted {
        /// 该行完整文本
        text: String,
    },

    /// 旁白集合播放完毕（通知，仅在集合模式下发出）
    NarrationSetCompleted,

    /// 播放背景音乐
    ///
    /// 重复播放当前曲目是空操作，Runtime 不会重复发出。
    PlayMusic {
        /// 音乐资源标识符
        id: String,
    },

    /// 播放一次性音效
    PlayOneShot {
        /// 音效资源标识符
        id: String,
    },

    /// 开始循环语音提示音（打字机"说话声"）
    StartVoiceLoop {
        /// 音效资源标识符
        id: String,
    },

    /// 停止循环语音提示音
    StopVoiceLoop,

    /// 触发场景对象的动画
    StartAnimation {
        /// 场景对象名称
        object: String,
    },

    /// 开始淡出（遮罩从透明到不透明）
    FadeOut {
        /// 遮罩颜色
        color: Rgba,
        /// 时长（秒）
        duration: f32,
        /// 缓动曲线
        easing: EasingFunction,
    },

    /// 开始淡入（遮罩从不透明到透明）
    FadeIn {
        /// 时长（秒）
        duration: f32,
        /// 缓动曲线
        easing: EasingFunction,
    },

    /// 请求异步加载场景（跨场景过渡，区别于场景内关卡切换）
    LoadScene {
        /// 场景名称
        name: String,
    },

    /// 关卡加载完成（通知）
    LevelLoaded {
        /// 关卡名称
        name: String,
    },

    /// 自定义关卡事件透出给 Host
    LevelEvent {
        /// 事件标识符
        id: String,
    },

    /// 设置主音量（持久化偏好变更后通知 Host）
    SetMasterVolume {
        /// 音量 0.0 - 1.0
        volume: f32,
    },
}
