//! # Narration 模块
//!
//! 旁白/对话播放的协作式状态机：逐字显示、自动推进、点击快进。
//!
//! ## 状态转换
//!
//! ```text
//! Idle ──PlayLine/PlaySet──► Typing ──整行显示完──► AwaitingAdvance（手动）
//!                              │                     AutoAdvancing（自动）
//!                              │                          │
//!                              └──Advance(快进)──►────────┴──► 下一行 / Idle
//! ```
//!
//! ## 设计说明
//!
//! - 单线程协作式：所有等待（逐字延迟、自动推进延迟）都是
//!   `tick(dt)` 驱动的显式挂起点，没有真实并发
//! - 任何时刻最多一个集合在播放；新的播放请求无条件取消
//!   进行中的行/集合，被取消者**不发**完成通知
//! - 每字延迟 = 基准 ± 均匀随机抖动，句读字符追加固定停顿，
//!   下限钳制为小正值避免零时长等待

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::{Command, Rgba};
use crate::events::{EventBus, GameEvent};
use crate::level::def::FlagOutcome;

/// 追加停顿的句读字符
const PAUSE_CHARS: [char; 6] = ['.', ',', '!', '?', ';', ':'];

/// 每字延迟的下限（秒）
const MIN_CHAR_DELAY: f32 = 0.005;

/// 语音提示模式
///
/// 循环说话声与离散提示音互斥，由每行的语音标签选择。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum VoiceCue {
    /// 无语音
    #[default]
    Silent,
    /// 整行显示期间循环播放"说话声"
    Loop {
        /// 音效资源标识符
        id: String,
    },
    /// 每显示若干字符播放一次提示音
    Blip {
        /// 音效资源标识符
        id: String,
        /// 间隔字符数
        every_chars: usize,
    },
}

/// 单行旁白
///
/// 内容不可变；行本身可以携带播完即触发的关卡过渡。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationLine {
    /// 文本内容
    pub text: String,
    /// 语音提示
    #[serde(default)]
    pub voice: VoiceCue,
    /// 文字颜色（None 使用默认色）
    #[serde(default)]
    pub color: Option<Rgba>,
    /// 行完成后触发的过渡（可选）
    #[serde(default)]
    pub transition: Option<LineTransition>,
}

impl NarrationLine {
    /// 创建纯文本行
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: VoiceCue::Silent,
            color: None,
            transition: None,
        }
    }
}

/// 行/集合完成后触发的关卡过渡
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTransition {
    /// 目标关卡
    pub target_level: String,
    /// 同时标记的结局（可选）
    #[serde(default)]
    pub flag: Option<FlagOutcome>,
}

/// 有序旁白集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationSet {
    /// 行序列
    pub lines: Vec<NarrationLine>,
    /// 整个集合播完后触发的过渡（可选）
    #[serde(default)]
    pub completion_transition: Option<LineTransition>,
}

/// 打字机配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypewriterConfig {
    /// 每字基准延迟（秒）
    pub base_delay: f32,
    /// 延迟抖动幅度（秒，均匀分布 ±variation）
    pub delay_variation: f32,
    /// 句读字符追加停顿（秒）
    pub punctuation_pause: f32,
    /// 是否自动推进
    pub auto_advance: bool,
    /// 自动推进前的固定等待（秒）
    pub auto_advance_delay: f32,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            base_delay: 0.04,
            delay_variation: 0.015,
            punctuation_pause: 0.18,
            auto_advance: false,
            auto_advance_delay: 1.2,
        }
    }
}

/// 播放阶段
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    /// 空闲
    Idle,
    /// 逐字显示中
    Typing {
        /// 已显示的字符数
        revealed: usize,
        /// 距下一个字符的剩余时间
        timer: f32,
    },
    /// 整行已显示，等待输入推进
    AwaitingAdvance,
    /// 整行已显示，自动推进倒计时
    AutoAdvancing {
        /// 剩余等待时间
        timer: f32,
    },
}

/// 旁白引擎
pub struct NarrationEngine {
    config: TypewriterConfig,
    /// 当前集合（单行播放包装成一行的临时集合）
    set: Option<NarrationSet>,
    /// 集合内当前行索引
    line_index: usize,
    /// 是否真集合模式（决定完成时是否发集合完成通知）
    playing_set: bool,
    phase: Phase,
    /// 循环语音是否在响
    voice_looping: bool,
    rng: StdRng,
}

impl NarrationEngine {
    /// 创建引擎
    pub fn new(config: TypewriterConfig) -> Self {
        Self {
            config,
            set: None,
            line_index: 0,
            playing_set: false,
            phase: Phase::Idle,
            voice_looping: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// 固定随机种子（测试用，保证逐字延迟可复现）
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 是否有旁白在播放
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// 是否正在逐字显示
    pub fn is_typing(&self) -> bool {
        matches!(self.phase, Phase::Typing { .. })
    }

    /// 播放单行
    ///
    /// 无条件取消进行中的播放（不发完成通知），把行包装成
    /// 一行的临时集合后开始逐字显示。
    pub fn play_line(&mut self, line: NarrationLine, out: &mut Vec<Command>) {
        self.cancel_in_flight(out);
        self.set = Some(NarrationSet {
            lines: vec![line],
            completion_transition: None,
        });
        self.line_index = 0;
        self.playing_set = false;
        self.begin_typing(out);
    }

    /// 播放集合
    ///
    /// 空集合是空操作；否则从第一行开始，保持集合模式标记。
    pub fn play_set(&mut self, set: NarrationSet, out: &mut Vec<Command>) {
        if set.lines.is_empty() {
            debug!("旁白集合为空，忽略播放请求");
            return;
        }
        self.cancel_in_flight(out);
        self.set = Some(set);
        self.line_index = 0;
        self.playing_set = true;
        self.begin_typing(out);
    }

    /// 推进旁白（用户点击或程序调用）
    ///
    /// - 打字中：快进到整行，转入等待/触发行过渡
    /// - 行间：推进到下一行，或在集合尽头结束整个播放
    /// - 空闲：视为"结束旁白"，静默忽略
    pub fn advance(&mut self, bus: &mut EventBus, out: &mut Vec<Command>) {
        match self.phase {
            Phase::Idle => {}
            Phase::Typing { .. } => {
                self.finish_line_display(out);
                self.after_line_displayed(true, bus, out);
            }
            Phase::AwaitingAdvance | Phase::AutoAdvancing { .. } => {
                self.step_to_next_line(bus, out);
            }
        }
    }

    /// 每帧驱动
    pub fn tick(&mut self, dt: f32, bus: &mut EventBus, out: &mut Vec<Command>) {
        match &self.phase {
            Phase::Idle | Phase::AwaitingAdvance => {}
            Phase::Typing { .. } => {
                if let Phase::Typing { timer, .. } = &mut self.phase {
                    *timer -= dt;
                }
                while matches!(&self.phase, Phase::Typing { timer, .. } if *timer <= 0.0) {
                    self.reveal_next_char(out);
                }
                if matches!(self.phase, Phase::AwaitingAdvance) {
                    // reveal_next_char 已把整行显示完
                    self.after_line_displayed(false, bus, out);
                }
            }
            Phase::AutoAdvancing { .. } => {
                let expired = if let Phase::AutoAdvancing { timer } = &mut self.phase {
                    *timer -= dt;
                    *timer <= 0.0
                } else {
                    false
                };
                if expired {
                    self.step_to_next_line(bus, out);
                }
            }
        }
    }

    /// 当前行（仅在有集合时有效）
    fn current_line(&self) -> Option<&NarrationLine> {
        self.set.as_ref().and_then(|s| s.lines.get(self.line_index))
    }

    /// 开始当前行的逐字显示
    fn begin_typing(&mut self, out: &mut Vec<Command>) {
        let Some(line) = self.current_line().cloned() else {
            return;
        };

        out.push(Command::NarrationShow);
        out.push(Command::NarrationText {
            text: String::new(),
            color: line.color,
        });
        if let VoiceCue::Loop { id } = &line.voice {
            out.push(Command::StartVoiceLoop { id: id.clone() });
            self.voice_looping = true;
        }

        let first_delay = self.next_char_delay(None);
        self.phase = Phase::Typing {
            revealed: 0,
            timer: first_delay,
        };
    }

    /// 显示下一个字符，更新定时器；到行尾时停掉语音循环
    fn reveal_next_char(&mut self, out: &mut Vec<Command>) {
        let Some(line) = self.current_line().cloned() else {
            self.phase = Phase::Idle;
            return;
        };
        let chars: Vec<char> = line.text.chars().collect();

        let Phase::Typing { revealed, timer } = &mut self.phase else {
            return;
        };

        *revealed += 1;
        let shown = *revealed;
        let partial: String = chars.iter().take(shown).collect();
        let just_revealed = chars.get(shown - 1).copied();

        out.push(Command::NarrationText {
            text: partial,
            color: line.color,
        });

        if let VoiceCue::Blip { id, every_chars } = &line.voice {
            let every = (*every_chars).max(1);
            if shown % every == 0 {
                out.push(Command::PlayOneShot { id: id.clone() });
            }
        }

        if shown >= chars.len() {
            // 整行显示完毕
            if self.voice_looping {
                out.push(Command::StopVoiceLoop);
                self.voice_looping = false;
            }
            self.phase = Phase::AwaitingAdvance; // 占位，调用方随即决定去向
        } else {
            let carry = *timer;
            let delay = self.next_char_delay(just_revealed);
            if let Phase::Typing { timer, .. } = &mut self.phase {
                *timer = carry + delay;
            }
        }
    }

    /// 快进：直接显示整行
    fn finish_line_display(&mut self, out: &mut Vec<Command>) {
        if let Some(line) = self.current_line().cloned() {
            out.push(Command::NarrationText {
                text: line.text.clone(),
                color: line.color,
            });
        }
        if self.voice_looping {
            out.push(Command::StopVoiceLoop);
            self.voice_looping = false;
        }
        self.phase = Phase::AwaitingAdvance;
    }

    /// 整行显示完成后的去向
    ///
    /// 行自带过渡则立即触发并停止；否则按配置进入
    /// 等待输入或自动推进。`fast_forwarded` 表示由快进到达。
    fn after_line_displayed(&mut self, fast_forwarded: bool, bus: &mut EventBus, out: &mut Vec<Command>) {
        let line_transition = self.current_line().and_then(|l| l.transition.clone());

        if let Some(transition) = line_transition {
            self.fire_transition(&transition, bus);
            self.end_playback(bus, out);
            return;
        }

        if self.config.auto_advance {
            self.phase = Phase::AutoAdvancing {
                timer: self.config.auto_advance_delay,
            };
        } else {
            self.phase = Phase::AwaitingAdvance;
            let _ = fast_forwarded;
        }
    }

    /// 推进到集合中的下一行，或结束播放
    fn step_to_next_line(&mut self, bus: &mut EventBus, out: &mut Vec<Command>) {
        let has_next = self
            .set
            .as_ref()
            .is_some_and(|s| self.line_index + 1 < s.lines.len());

        if self.playing_set && has_next {
            self.line_index += 1;
            self.begin_typing(out);
        } else {
            self.end_playback(bus, out);
        }
    }

    /// 结束播放：隐藏面板、发完成通知、触发集合级过渡
    fn end_playback(&mut self, bus: &mut EventBus, out: &mut Vec<Command>) {
        if self.voice_looping {
            out.push(Command::StopVoiceLoop);
            self.voice_looping = false;
        }
        out.push(Command::NarrationHide);

        let last_text = self
            .current_line()
            .map(|l| l.text.clone())
            .unwrap_or_default();
        if self.playing_set {
            out.push(Command::NarrationSetCompleted);
        }
        out.push(Command::NarrationLineCompleted { text: last_text });

        let completion = self
            .set
            .as_ref()
            .and_then(|s| s.completion_transition.clone());
        if let Some(transition) = completion {
            self.fire_transition(&transition, bus);
        }

        self.set = None;
        self.line_index = 0;
        self.playing_set = false;
        self.phase = Phase::Idle;
    }

    /// 取消进行中的播放：清掉挂起的定时器和语音，不发完成通知
    fn cancel_in_flight(&mut self, out: &mut Vec<Command>) {
        if self.voice_looping {
            out.push(Command::StopVoiceLoop);
            self.voice_looping = false;
        }
        self.set = None;
        self.line_index = 0;
        self.playing_set = false;
        self.phase = Phase::Idle;
    }

    /// 触发行/集合过渡
    fn fire_transition(&mut self, transition: &LineTransition, bus: &mut EventBus) {
        if let Some(flag) = &transition.flag {
            bus.publish(GameEvent::FlagMarked {
                is_green: flag.is_green,
            });
        }
        bus.publish(GameEvent::LevelTransition {
            level: transition.target_level.clone(),
        });
    }

    /// 计算下一个字符的延迟
    ///
    /// `prev` 是上一个已显示的字符（句读则追加停顿）。
    fn next_char_delay(&mut self, prev: Option<char>) -> f32 {
        let variation = self.config.delay_variation;
        let jitter = if variation > 0.0 {
            self.rng.gen_range(-variation..=variation)
        } else {
            0.0
        };
        let mut delay = self.config.base_delay + jitter;
        if let Some(c) = prev {
            if PAUSE_CHARS.contains(&c) {
                delay += self.config.punctuation_pause;
            }
        }
        delay.max(MIN_CHAR_DELAY)
    }
}
