//! # Error 模块
//!
//! 定义 fov-runtime 中使用的错误类型。
//!
//! ## 设计说明
//!
//! 按照错误分级（见各组件文档）：配置缺失、资源缺失、守卫冲突一律
//! 降级为日志 + 空操作，不会出现在这里；`Result` 只用于 Host 直接
//! 调用的 API（未知关卡的显式加载请求、未注册场景、定义解析失败）。

use thiserror::Error;

/// 关卡定义解析/校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    /// JSON 解析失败
    #[error("关卡库 JSON 解析失败: {message}")]
    InvalidJson { message: String },

    /// 关卡名重复
    #[error("关卡名 '{name}' 重复定义")]
    DuplicateLevel { name: String },

    /// 初始帧集合未在关卡内声明
    #[error("关卡 '{level}' 的初始帧集合 '{frame_set}' 未声明")]
    InitialFrameSetMissing { level: String, frame_set: String },

    /// 帧集合为空
    #[error("关卡 '{level}' 的帧集合 '{frame_set}' 不包含任何帧")]
    EmptyFrameSet { level: String, frame_set: String },
}

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 关卡未找到
    #[error("关卡 '{name}' 未找到")]
    LevelNotFound { name: String },

    /// 场景未注册
    #[error("场景 '{name}' 未在场景列表中注册")]
    SceneNotRegistered { name: String },

    /// 跨场景过渡功能未启用
    #[error("跨场景过渡功能未启用")]
    SceneTransitionsDisabled,
}

/// fov-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 定义错误
    #[error("定义错误: {0}")]
    Definition(#[from] DefinitionError),

    /// 运行时错误
    #[error("运行时错误: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
