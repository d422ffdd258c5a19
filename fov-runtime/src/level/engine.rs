//! # 关卡引擎模块
//!
//! 持有激活中的关卡定义，把场景交互元素与定义声明对账，
//! 并把帧触发/按钮交互的结果派发进事件总线。
//!
//! ## 状态转换
//!
//! ```text
//! Unloaded ──LoadLevel──► Loading ──对账完成──► Active
//! ```
//!
//! ## 设计说明
//!
//! - 定义运行期只读；触发器的"已触发"标志存放在引擎侧的
//!   平行数组里，每次加载整体复位
//! - 帧触发事件和按钮交互共享同一张动作派发表
//! - 同一触发器在一轮事件路由里至多触发一次，自切换配置
//!   （触发帧恰好是目标集合起始帧的 SwitchFrameSet）不会在
//!   路由队列里循环
//! - 所有配置缺失（元素找不到、目标集合不存在）都是非致命的：
//!   记日志后降级为空操作

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::command::Command;
use crate::events::{EventBus, GameEvent};
use crate::frame::FrameCursor;
use crate::frameset::FrameSetRegistry;
use crate::interaction::InteractionRegistry;
use crate::level::def::{ButtonConfig, EventAction, FlagOutcome, LevelDefinition};
use crate::narration::NarrationEngine;

/// 动作派发上下文
///
/// 把派发需要触达的协作组件打包成一个借用集合，
/// 由 Runtime 在每次派发时临时构造。
pub struct DispatchCtx<'a> {
    pub cursor: &'a mut FrameCursor,
    pub frame_sets: &'a mut FrameSetRegistry,
    pub interactions: &'a mut InteractionRegistry,
    pub narration: &'a mut NarrationEngine,
    pub bus: &'a mut EventBus,
    pub commands: &'a mut Vec<Command>,
}

/// 关卡引擎状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelState {
    /// 未加载
    #[default]
    Unloaded,
    /// 加载对账中
    Loading,
    /// 激活
    Active,
}

/// 关卡引擎
#[derive(Default)]
pub struct LevelEngine {
    state: LevelState,
    /// 激活中的关卡定义
    definition: Option<LevelDefinition>,
    /// 与 `definition.frame_events` 平行的"已触发"标志
    triggered: Vec<bool>,
    /// 本轮事件路由里已触发的标志（抑制队列内的触发循环）
    fired_this_pass: Vec<bool>,
    /// 本关激活按钮查找表（id -> 配置）
    active_buttons: HashMap<String, ButtonConfig>,
    /// 最近请求播放的音乐（重复播放当前曲目是空操作）
    last_music: Option<String>,
}

impl LevelEngine {
    /// 创建引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前状态
    pub fn state(&self) -> LevelState {
        self.state
    }

    /// 激活中的关卡名
    pub fn active_level(&self) -> Option<&str> {
        self.definition.as_ref().map(|d| d.name.as_str())
    }

    /// 加载关卡
    ///
    /// 加载序列：
    /// 1. 停用上一关作用域（清绑定、清查找表）
    /// 2. 应用拖拽配置（如声明）
    /// 3. 请求背景音乐（重复曲目不重复发）
    /// 4. 重建帧集合注册表并切到初始集合（索引归零 ——
    ///    关卡总是从第 0 帧开始）
    /// 5. 按钮配置对账：绑定、设初始可用状态；缺失元素跳过
    /// 6. 复位全部"已触发"标志
    pub fn load_level(&mut self, def: LevelDefinition, ctx: &mut DispatchCtx<'_>) {
        self.state = LevelState::Loading;
        debug!(name = %def.name, "加载关卡");

        ctx.interactions.clear_bindings();
        self.active_buttons.clear();

        if let Some(drag) = def.drag.clone() {
            ctx.cursor.configure(drag);
        }

        if let Some(music) = &def.background_music {
            if !music.is_empty() && self.last_music.as_deref() != Some(music.as_str()) {
                ctx.commands.push(Command::PlayMusic { id: music.clone() });
                self.last_music = Some(music.clone());
            }
        }

        if !def.frame_sets.is_empty() {
            ctx.frame_sets.reload(def.frame_sets.clone());
            match &def.initial_frame_set {
                Some(initial) => {
                    // preserve_index=false：上一关停在哪无关紧要
                    ctx.frame_sets
                        .switch_to(initial, false, ctx.cursor, ctx.bus);
                }
                None => {
                    warn!(name = %def.name, "关卡声明了帧集合但缺少初始集合名");
                }
            }
        }

        for config in &def.buttons {
            match ctx.interactions.get_mut(&config.id) {
                Some(element) => {
                    element.bind(config.clone());
                    element.set_enabled(config.active_at_start, ctx.commands);
                    self.active_buttons.insert(config.id.clone(), config.clone());
                }
                None => {
                    warn!(id = %config.id, level = %def.name, "按钮配置引用的交互元素不存在，跳过");
                }
            }
        }

        self.triggered = vec![false; def.frame_events.len()];
        self.fired_this_pass = vec![false; def.frame_events.len()];
        ctx.commands.push(Command::LevelLoaded {
            name: def.name.clone(),
        });
        self.definition = Some(def);
        self.state = LevelState::Active;
    }

    /// 开始一轮事件路由（Runtime 每次抽干路由队列前调用）
    ///
    /// 清空"本轮已触发"标志。触发器派发的 SwitchFrameSet 会把新的
    /// `FrameChanged` 排进同一轮队列；若不抑制，起始帧命中自身的
    /// 触发器会无限再入。
    pub fn begin_routing_pass(&mut self) {
        self.fired_this_pass.fill(false);
    }

    /// 帧变化处理（仅 Active 状态有效）
    ///
    /// 同一帧索引可以命中多个触发器，按声明顺序依次派发。
    /// 命中即把"已触发"置位（非 once 触发器置位无害）；
    /// 本轮路由里已触发过的跳过。
    pub fn on_frame_changed(&mut self, index: usize, ctx: &mut DispatchCtx<'_>) {
        if self.state != LevelState::Active {
            return;
        }
        let Some(def) = &self.definition else {
            return;
        };

        let current_set = ctx.frame_sets.current_name().map(str::to_string);
        let mut to_fire = Vec::new();
        for (i, trigger) in def.frame_events.iter().enumerate() {
            if trigger.frame_index != index {
                continue;
            }
            if let Some(required) = &trigger.frame_set {
                if current_set.as_deref() != Some(required.as_str()) {
                    continue;
                }
            }
            if trigger.trigger_once && self.triggered[i] {
                continue;
            }
            if self.fired_this_pass[i] {
                continue;
            }
            to_fire.push((i, trigger.action.clone(), trigger.flag.clone()));
        }

        for (i, action, flag) in to_fire {
            self.triggered[i] = true;
            self.fired_this_pass[i] = true;
            debug!(index, trigger = i, "帧触发事件命中");
            self.dispatch(action, flag, ctx);
        }
    }

    /// 按钮激活处理
    ///
    /// 配置限定了帧集合且与当前集合不符时丢弃
    /// （来自过期帧集合的延迟点击）。
    pub fn on_button_activated(&mut self, config: ButtonConfig, ctx: &mut DispatchCtx<'_>) {
        if self.state != LevelState::Active {
            return;
        }
        if let Some(required) = &config.frame_set {
            if ctx.frame_sets.current_name() != Some(required.as_str()) {
                debug!(id = %config.id, required = %required, "按钮点击来自过期帧集合，丢弃");
                return;
            }
        }
        self.dispatch(config.action, config.flag, ctx);
    }

    /// 动作派发表
    ///
    /// `TransitionToLevel` 自带过渡；其余动作执行后，若附带
    /// 结局标记则补发 `FlagMarked`，配置了后继关卡时再补发一次
    /// 关卡过渡（"标记结果并前进"）。
    fn dispatch(&mut self, action: EventAction, flag: Option<FlagOutcome>, ctx: &mut DispatchCtx<'_>) {
        match action {
            EventAction::PlayNarration { line } => {
                ctx.narration.play_line(line, ctx.commands);
            }
            EventAction::PlayNarrationSet { set } => {
                ctx.narration.play_set(set, ctx.commands);
            }
            EventAction::SwitchFrameSet {
                target,
                preserve_index,
            } => {
                ctx.frame_sets
                    .switch_to(&target, preserve_index, ctx.cursor, ctx.bus);
            }
            EventAction::PlaySound { id } => {
                ctx.commands.push(Command::PlayOneShot { id });
            }
            EventAction::StartAnimation { object } => {
                ctx.commands.push(Command::StartAnimation { object });
            }
            EventAction::SetButtonActive { id, active } => {
                // 先查本关激活表，再退回全场景查找
                if self.active_buttons.contains_key(&id) || ctx.interactions.get(&id).is_some() {
                    if let Some(element) = ctx.interactions.get_mut(&id) {
                        element.set_enabled(active, ctx.commands);
                    }
                } else {
                    warn!(id = %id, "SetButtonActive 目标元素不存在");
                }
            }
            EventAction::TransitionToLevel { target } => {
                // 标记先于过渡发布，协调器解析分支时能看到最新标记
                let resolved = match &flag {
                    Some(outcome) => {
                        ctx.bus.publish(GameEvent::FlagMarked {
                            is_green: outcome.is_green,
                        });
                        outcome.next_level.clone().unwrap_or(target)
                    }
                    None => target,
                };
                if resolved.is_empty() {
                    warn!("TransitionToLevel 缺少目标关卡名");
                } else {
                    ctx.bus.publish(GameEvent::LevelTransition { level: resolved });
                }
                return;
            }
            EventAction::Custom { event_id } => {
                ctx.bus.publish(GameEvent::LevelEvent { id: event_id });
            }
        }

        if let Some(outcome) = flag {
            ctx.bus.publish(GameEvent::FlagMarked {
                is_green: outcome.is_green,
            });
            if let Some(next) = outcome.next_level {
                ctx.bus.publish(GameEvent::LevelTransition { level: next });
            }
        }
    }
}
