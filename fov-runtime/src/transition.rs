//! # Transition 模块
//!
//! 关卡过渡协调器：遮罩淡出、中段换关、遮罩淡入的三段式时序。
//!
//! ## 阶段转换
//!
//! ```text
//! Idle ──begin──► FadingOut ──计时到──► Settling ──计时到──► FadingIn ──计时到──► Idle
//!                                 │
//!                                 └─► 此刻换关（遮罩全黑，换关不可见）
//! ```
//!
//! ## 设计说明
//!
//! - 进行中守卫：过渡期间的新请求记日志后丢弃，第一个请求胜出
//! - 目标可以是字面关卡名，也可以是结局哨兵 `@outcome`，
//!   后者按当前关卡的结局标记解析成绿/红后继
//! - 目标在淡出**开始前**解析并校验，未知关卡只记错误日志，
//!   守卫不置位，画面不会卡在黑屏
//! - 跨场景过渡是独立路径：发出 `LoadScene` 后挂起，
//!   等 Host 回报场景就绪再淡入

use tracing::{debug, error, warn};

use crate::command::{Command, Rgba};
use crate::easing::EasingFunction;
use crate::level::def::LevelLibrary;
use crate::wincondition::WinConditionTracker;

/// 结局哨兵：过渡目标写这个值时按结局标记解析实际关卡
pub const OUTCOME_SENTINEL: &str = "@outcome";

/// 过渡时序配置
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionConfig {
    /// 淡出时长（秒）
    pub fade_out_duration: f32,
    /// 全黑静置时长（秒），给换关留一帧余量
    pub settle_duration: f32,
    /// 淡入时长（秒）
    pub fade_in_duration: f32,
    /// 缓动曲线
    pub easing: EasingFunction,
    /// 是否允许跨场景过渡
    pub scene_transitions_enabled: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_out_duration: 0.6,
            settle_duration: 0.1,
            fade_in_duration: 0.6,
            easing: EasingFunction::EaseInOut,
            scene_transitions_enabled: false,
        }
    }
}

/// 过渡阶段
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    FadingOut {
        /// 剩余时间
        timer: f32,
        /// 淡出结束后要加载的关卡
        target: String,
    },
    Settling {
        timer: f32,
    },
    FadingIn {
        timer: f32,
    },
    /// 跨场景：等待 Host 回报场景加载完成
    AwaitingScene {
        name: String,
    },
}

/// 过渡协调器
///
/// 只负责时序和遮罩指令；实际换关由 Runtime 在
/// `tick` 返回加载信号的那一刻执行。
pub struct TransitionCoordinator {
    config: TransitionConfig,
    phase: Phase,
    /// 已注册的合法场景名（跨场景校验用）
    scenes: Vec<String>,
}

impl TransitionCoordinator {
    /// 创建协调器
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            scenes: Vec::new(),
        }
    }

    /// 是否有过渡在进行
    pub fn is_transitioning(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// 注册合法场景名
    pub fn register_scene(&mut self, name: impl Into<String>) {
        self.scenes.push(name.into());
    }

    /// 发起关卡过渡
    ///
    /// 解析目标（哨兵走结局分支）、查库校验后开始淡出。
    /// 遮罩颜色取关卡定义的提示色；哨兵解析时退为绿/红结局色；
    /// 其余情况全黑。
    ///
    /// # 返回
    /// - 是否接受了请求。守卫冲突和目标缺失都只记日志。
    pub fn begin(
        &mut self,
        target: &str,
        tracker: &WinConditionTracker,
        library: &LevelLibrary,
        out: &mut Vec<Command>,
    ) -> bool {
        if self.is_transitioning() {
            warn!(target = %target, "过渡进行中，丢弃新的过渡请求");
            return false;
        }

        let via_outcome = target == OUTCOME_SENTINEL;
        let resolved = if via_outcome {
            let current = tracker.current_level();
            match tracker.next_level(current) {
                Some(next) => next.to_string(),
                None => {
                    error!(level = %current, "结局哨兵无法解析：当前关卡没有分支配置");
                    return false;
                }
            }
        } else {
            target.to_string()
        };

        let Some(def) = library.get(&resolved) else {
            error!(target = %resolved, "过渡目标关卡不存在，放弃过渡");
            return false;
        };

        let color = match def.transition_color {
            Some(hint) => hint,
            None if via_outcome => {
                let is_green = tracker.flag(tracker.current_level()).unwrap_or(true);
                if is_green { Rgba::GREEN } else { Rgba::RED }
            }
            None => Rgba::BLACK,
        };

        debug!(target = %resolved, via_outcome, "开始关卡过渡");
        out.push(Command::FadeOut {
            color,
            duration: self.config.fade_out_duration,
            easing: self.config.easing,
        });
        self.phase = Phase::FadingOut {
            timer: self.config.fade_out_duration,
            target: resolved,
        };
        true
    }

    /// 发起跨场景过渡
    ///
    /// 功能未启用或场景未注册时返回错误；否则发出 `LoadScene`
    /// 并挂起，等 `on_scene_loaded` 回报后淡入收尾。
    pub fn request_scene(
        &mut self,
        name: &str,
        out: &mut Vec<Command>,
    ) -> Result<(), crate::error::RuntimeError> {
        use crate::error::RuntimeError;

        if !self.config.scene_transitions_enabled {
            return Err(RuntimeError::SceneTransitionsDisabled);
        }
        if !self.scenes.iter().any(|s| s == name) {
            return Err(RuntimeError::SceneNotRegistered {
                name: name.to_string(),
            });
        }
        if self.is_transitioning() {
            warn!(scene = %name, "过渡进行中，丢弃跨场景请求");
            return Ok(());
        }

        out.push(Command::FadeOut {
            color: Rgba::BLACK,
            duration: self.config.fade_out_duration,
            easing: self.config.easing,
        });
        out.push(Command::LoadScene {
            name: name.to_string(),
        });
        self.phase = Phase::AwaitingScene {
            name: name.to_string(),
        };
        Ok(())
    }

    /// Host 回报场景加载完成
    ///
    /// 名称与挂起请求匹配时淡入收尾；其余情况记日志忽略。
    pub fn on_scene_loaded(&mut self, name: &str, out: &mut Vec<Command>) {
        match &self.phase {
            Phase::AwaitingScene { name: pending } if pending == name => {
                out.push(Command::FadeIn {
                    duration: self.config.fade_in_duration,
                    easing: self.config.easing,
                });
                self.phase = Phase::FadingIn {
                    timer: self.config.fade_in_duration,
                };
            }
            _ => {
                warn!(scene = %name, "收到未预期的场景加载回报，忽略");
            }
        }
    }

    /// 每帧驱动
    ///
    /// # 返回
    /// - `Some(关卡名)` 恰好在淡出结束的那一帧返回一次，
    ///   调用方此刻执行实际换关（遮罩全不透明，换关不可见）
    pub fn tick(&mut self, dt: f32, out: &mut Vec<Command>) -> Option<String> {
        match &mut self.phase {
            Phase::Idle | Phase::AwaitingScene { .. } => None,
            Phase::FadingOut { timer, target } => {
                *timer -= dt;
                if *timer > 0.0 {
                    return None;
                }
                let target = target.clone();
                self.phase = Phase::Settling {
                    timer: self.config.settle_duration,
                };
                Some(target)
            }
            Phase::Settling { timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    out.push(Command::FadeIn {
                        duration: self.config.fade_in_duration,
                        easing: self.config.easing,
                    });
                    self.phase = Phase::FadingIn {
                        timer: self.config.fade_in_duration,
                    };
                }
                None
            }
            Phase::FadingIn { timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    debug!("过渡完成");
                    self.phase = Phase::Idle;
                }
                None
            }
        }
    }
}
