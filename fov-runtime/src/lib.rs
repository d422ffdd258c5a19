//! # FOV Runtime
//!
//! 第一人称翻页（FOV flipbook）点击解谜游戏的核心运行时库。
//!
//! ## 架构概述
//!
//! `fov-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                          Runtime
//!   │                              │
//!   │──── RuntimeInput ──────────►│
//!   │                              │ tick(dt)
//!   │◄─────── Vec<Command> ───────│
//!   │                              │
//! ```
//!
//! Host 每帧调用一次 [`GameRuntime::tick`]，传入帧时长和本帧输入
//! （拖拽位移、点击、对象激活），执行返回的指令序列（显示帧、
//! 播放声音、更新旁白文字、过渡遮罩等）。
//!
//! ## 核心类型
//!
//! - [`GameRuntime`]：所有组件的装配点，Host 的唯一入口
//! - [`Command`]：Runtime 向 Host 发出的指令
//! - [`RuntimeInput`]：Host 向 Runtime 传递的输入
//! - [`LevelLibrary`]：从 JSON 加载的关卡定义库
//! - [`GameEvent`]：进程内事件（Host 可注册观察者）
//!
//! ## 使用示例
//!
//! ```ignore
//! use fov_runtime::{GameRuntime, LevelLibrary, RuntimeInput};
//!
//! let library = LevelLibrary::from_json(&std::fs::read_to_string("levels.json")?)?;
//! let mut runtime = GameRuntime::new(library);
//!
//! // 场景初始化：注册交互元素
//! runtime.register_element(door_element);
//!
//! // 开场
//! for cmd in runtime.start("Chapter1")? {
//!     host.execute(cmd);
//! }
//!
//! // 主循环
//! loop {
//!     let input = host.poll_input();
//!     for cmd in runtime.tick(dt, input) {
//!         host.execute(cmd);
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：Command 定义
//! - [`input`]：RuntimeInput 定义
//! - [`events`]：事件总线
//! - [`frame`]：拖拽帧游标
//! - [`frameset`]：帧集合注册表
//! - [`interaction`]：交互元素注册表
//! - [`level`]：关卡定义与关卡引擎
//! - [`narration`]：旁白打字机状态机
//! - [`transition`]：关卡过渡协调器
//! - [`wincondition`]：结局标记与分支解析
//! - [`easing`]：缓动曲线
//! - [`prefs`]：持久化偏好
//! - [`error`]：错误类型定义
//! - [`runtime`]：装配与事件路由

pub mod command;
pub mod easing;
pub mod error;
pub mod events;
pub mod frame;
pub mod frameset;
pub mod input;
pub mod interaction;
pub mod level;
pub mod narration;
pub mod prefs;
pub mod runtime;
pub mod transition;
pub mod wincondition;

// 重导出核心类型
pub use command::{Command, Rgba};
pub use easing::EasingFunction;
pub use error::{DefinitionError, EngineError, EngineResult, RuntimeError};
pub use events::{EventBus, GameEvent, SubscriberId};
pub use frame::{DragAxis, DragConfig, FrameCursor};
pub use frameset::{FrameSet, FrameSetRegistry};
pub use input::RuntimeInput;
pub use interaction::{FrameRange, InteractionElement, InteractionRegistry};
pub use level::{
    ButtonConfig, EventAction, FlagOutcome, FrameEventTrigger, LevelDefinition, LevelEngine,
    LevelLibrary, LevelState,
};
pub use narration::{
    LineTransition, NarrationEngine, NarrationLine, NarrationSet, TypewriterConfig, VoiceCue,
};
pub use prefs::{MemoryPrefStore, PrefStore};
pub use runtime::GameRuntime;
pub use transition::{OUTCOME_SENTINEL, TransitionConfig, TransitionCoordinator};
pub use wincondition::{LevelBranch, WinConditionTracker};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_surface() {
        // 库入口可从根路径直接使用
        let library = LevelLibrary::new(vec![LevelDefinition::named("entry")]).unwrap();
        let mut runtime = GameRuntime::new(library);
        let commands = runtime.start("entry").unwrap();
        assert!(commands.contains(&Command::LevelLoaded {
            name: "entry".to_string()
        }));
    }
}
