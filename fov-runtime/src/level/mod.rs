//! # Level 模块
//!
//! 关卡的声明式定义（`def`）与运行时引擎（`engine`）。

pub mod def;
pub mod engine;

pub use def::{
    ButtonConfig, EventAction, FlagOutcome, FrameEventTrigger, LevelDefinition, LevelLibrary,
};
pub use engine::{DispatchCtx, LevelEngine, LevelState};
