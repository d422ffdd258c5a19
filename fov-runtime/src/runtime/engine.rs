//! # GameRuntime 引擎
//!
//! 运行时的装配点和事件路由中枢。
//!
//! ## 数据流
//!
//! ```text
//! Host ──RuntimeInput──► GameRuntime::tick(dt)
//!                          │ 1. 输入分发（拖拽/点击/激活/加载）
//!                          │ 2. 驱动旁白与过渡的计时状态机
//!                          │ 3. 消费事件路由队列（组件间路由）
//!                          ▼
//!                        Vec<Command> ──► Host 执行
//! ```
//!
//! ## 设计说明
//!
//! - 组件之间不互相持有引用；所有跨组件路由都经过这里，
//!   事件在队列里排队而不是内联递归
//! - 路由循环把队列抽干为止，路由过程中新发布的事件
//!   会在同一 tick 内继续被消费

use tracing::{debug, warn};

use crate::command::Command;
use crate::error::{EngineResult, RuntimeError};
use crate::events::{EventBus, GameEvent, SubscriberId};
use crate::frame::FrameCursor;
use crate::frameset::FrameSetRegistry;
use crate::input::RuntimeInput;
use crate::interaction::{InteractionElement, InteractionRegistry};
use crate::level::engine::DispatchCtx;
use crate::level::{LevelEngine, LevelLibrary};
use crate::narration::{NarrationEngine, TypewriterConfig};
use crate::prefs::{self, MemoryPrefStore, PrefStore};
use crate::transition::{TransitionConfig, TransitionCoordinator};
use crate::wincondition::{LevelBranch, WinConditionTracker};

/// 游戏运行时
///
/// 所有组件的唯一拥有者。Host 每帧调用一次 [`GameRuntime::tick`]，
/// 执行返回的指令序列。
pub struct GameRuntime {
    library: LevelLibrary,
    bus: EventBus,
    cursor: FrameCursor,
    frame_sets: FrameSetRegistry,
    interactions: InteractionRegistry,
    level: LevelEngine,
    narration: NarrationEngine,
    transitions: TransitionCoordinator,
    win: WinConditionTracker,
    prefs: Box<dyn PrefStore>,
    /// tick 之间积压的指令（音量变更等非 tick 路径产生）
    pending: Vec<Command>,
}

impl GameRuntime {
    /// 用关卡库创建运行时，其余组件取默认配置
    pub fn new(library: LevelLibrary) -> Self {
        Self {
            library,
            bus: EventBus::new(),
            cursor: FrameCursor::new(),
            frame_sets: FrameSetRegistry::new(),
            interactions: InteractionRegistry::new(),
            level: LevelEngine::new(),
            narration: NarrationEngine::new(TypewriterConfig::default()),
            transitions: TransitionCoordinator::new(TransitionConfig::default()),
            win: WinConditionTracker::new(),
            prefs: Box::new(MemoryPrefStore::new()),
            pending: Vec::new(),
        }
    }

    /// 替换打字机配置
    pub fn with_typewriter_config(mut self, config: TypewriterConfig) -> Self {
        self.narration = NarrationEngine::new(config);
        self
    }

    /// 替换过渡时序配置
    pub fn with_transition_config(mut self, config: TransitionConfig) -> Self {
        self.transitions = TransitionCoordinator::new(config);
        self
    }

    /// 设置结局分支表
    pub fn with_branches(mut self, branches: Vec<LevelBranch>) -> Self {
        self.win = WinConditionTracker::with_branches(branches);
        self
    }

    /// 替换偏好仓库（默认是内存实现）
    pub fn with_pref_store(mut self, store: Box<dyn PrefStore>) -> Self {
        self.prefs = store;
        self
    }

    /// 注册场景交互元素（Host 在场景初始化时调用）
    pub fn register_element(&mut self, element: InteractionElement) {
        self.interactions.register(element);
    }

    /// 注册跨场景过渡的合法场景名
    pub fn register_scene(&mut self, name: impl Into<String>) {
        self.transitions.register_scene(name);
    }

    /// 注册事件观察者（Host 侧诊断/成就等）
    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        self.bus.subscribe(callback)
    }

    /// 退订事件观察者
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// 当前激活的关卡名
    pub fn active_level(&self) -> Option<&str> {
        self.level.active_level()
    }

    /// 当前帧索引
    pub fn current_frame_index(&self) -> usize {
        self.cursor.current_index()
    }

    /// 启动：立即加载指定关卡（无过渡遮罩，开场用）
    pub fn start(&mut self, name: &str) -> EngineResult<Vec<Command>> {
        if self.library.get(name).is_none() {
            return Err(RuntimeError::LevelNotFound {
                name: name.to_string(),
            }
            .into());
        }
        let mut commands = std::mem::take(&mut self.pending);
        self.perform_load(name, &mut commands);
        self.drain_events(&mut commands);
        Ok(commands)
    }

    /// 每帧驱动
    ///
    /// `input` 是本帧的 Host 输入（至多一条）。返回本帧产生的
    /// 全部指令，顺序即产生顺序。
    pub fn tick(&mut self, dt: f32, input: Option<RuntimeInput>) -> Vec<Command> {
        let mut commands = std::mem::take(&mut self.pending);

        if let Some(input) = input {
            self.handle_input(input, dt, &mut commands);
        }

        self.narration.tick(dt, &mut self.bus, &mut commands);

        if let Some(level) = self.transitions.tick(dt, &mut commands) {
            self.perform_load(&level, &mut commands);
        }

        self.drain_events(&mut commands);
        commands
    }

    /// 请求跨场景过渡（配置启用且场景已注册时生效）
    pub fn request_scene(&mut self, name: &str) -> EngineResult<()> {
        let mut commands = std::mem::take(&mut self.pending);
        let result = self.transitions.request_scene(name, &mut commands);
        self.pending = commands;
        result.map_err(Into::into)
    }

    /// 当前主音量
    pub fn master_volume(&self) -> f32 {
        prefs::load_master_volume(self.prefs.as_ref())
    }

    /// 设置主音量（钳制、落库，下一个 tick 通知 Host）
    pub fn set_master_volume(&mut self, volume: f32) -> f32 {
        let clamped = prefs::save_master_volume(self.prefs.as_mut(), volume);
        self.pending.push(Command::SetMasterVolume { volume: clamped });
        clamped
    }

    /// 输入分发
    fn handle_input(&mut self, input: RuntimeInput, dt: f32, commands: &mut Vec<Command>) {
        match input {
            RuntimeInput::DragDelta { dx, dy } => {
                // 过渡期间画面被遮罩覆盖，拖拽静默忽略
                if !self.transitions.is_transitioning() {
                    self.cursor.apply_drag_delta(dx, dy, dt, &mut self.bus);
                }
            }
            RuntimeInput::PointerClick | RuntimeInput::AdvanceNarration => {
                if self.narration.is_active() {
                    self.narration.advance(&mut self.bus, commands);
                }
            }
            RuntimeInput::ActivateObject { id } => {
                if let Some(binding) = self.interactions.activate(&id) {
                    let mut ctx = DispatchCtx {
                        cursor: &mut self.cursor,
                        frame_sets: &mut self.frame_sets,
                        interactions: &mut self.interactions,
                        narration: &mut self.narration,
                        bus: &mut self.bus,
                        commands,
                    };
                    self.level.on_button_activated(binding, &mut ctx);
                }
                // 绑定派发完成后才广播交互事件
                if !id.is_empty() && self.interactions.get(&id).is_some() {
                    self.bus.publish(GameEvent::ObjectInteracted { id });
                }
            }
            RuntimeInput::LoadLevel { name } => {
                // 走统一的过渡路径，协调器负责校验
                self.bus.publish(GameEvent::LevelTransition { level: name });
            }
            RuntimeInput::SceneLoaded { name } => {
                self.transitions.on_scene_loaded(&name, commands);
            }
        }
    }

    /// 实际换关（过渡遮罩全不透明的那一帧执行）
    fn perform_load(&mut self, name: &str, commands: &mut Vec<Command>) {
        let Some(def) = self.library.get(name).cloned() else {
            // begin 已校验过；这里兜底
            warn!(name = %name, "换关时关卡定义消失，跳过");
            return;
        };
        self.win.enter_level(name);
        let mut ctx = DispatchCtx {
            cursor: &mut self.cursor,
            frame_sets: &mut self.frame_sets,
            interactions: &mut self.interactions,
            narration: &mut self.narration,
            bus: &mut self.bus,
            commands,
        };
        self.level.load_level(def, &mut ctx);
    }

    /// 抽干事件路由队列
    ///
    /// 路由中新发布的事件继续排队，循环直到队列为空。
    /// 每轮抽干算一次路由轮次，关卡引擎据此抑制触发循环。
    fn drain_events(&mut self, commands: &mut Vec<Command>) {
        self.level.begin_routing_pass();
        while let Some(event) = self.bus.pop_queued() {
            self.route(event, commands);
        }
    }

    /// 组件间事件路由
    fn route(&mut self, event: GameEvent, commands: &mut Vec<Command>) {
        match event {
            GameEvent::FrameChanged { index } => {
                if let Some(frame) = self.cursor.current_frame() {
                    commands.push(Command::ShowFrame {
                        frame: frame.to_string(),
                    });
                }
                self.interactions.on_frame_changed(index, commands);
                let mut ctx = DispatchCtx {
                    cursor: &mut self.cursor,
                    frame_sets: &mut self.frame_sets,
                    interactions: &mut self.interactions,
                    narration: &mut self.narration,
                    bus: &mut self.bus,
                    commands,
                };
                self.level.on_frame_changed(index, &mut ctx);
            }
            GameEvent::FrameSetChanged { name } => {
                debug!(name = %name, "帧集合已切换");
            }
            GameEvent::ObjectInteracted { id } => {
                debug!(id = %id, "交互元素被激活");
            }
            GameEvent::LevelEvent { id } => {
                commands.push(Command::LevelEvent { id });
            }
            GameEvent::LevelTransition { level } => {
                self.transitions
                    .begin(&level, &self.win, &self.library, commands);
            }
            GameEvent::FlagMarked { is_green } => {
                self.win.mark_current(is_green);
            }
        }
    }
}
