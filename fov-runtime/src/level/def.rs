//! # 关卡定义模块
//!
//! 关卡的声明式配置：帧集合、帧触发事件、按钮配置。
//!
//! ## 设计说明
//!
//! - 定义在关卡激活时载入，运行期只读；
//!   触发器的"已触发"标志是运行时状态，存放在 LevelEngine 一侧
//! - 动作是携带负载的枚举（而不是类型标签加字段袋），
//!   帧触发事件和按钮交互共享同一张动作表
//! - 关卡库从 JSON 加载并做结构校验

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::command::Rgba;
use crate::error::DefinitionError;
use crate::frame::DragConfig;
use crate::frameset::FrameSet;
use crate::narration::{NarrationLine, NarrationSet};

/// 结局标记
///
/// 任何动作都可以附带一个结局标记："标记结果并前进"。
/// 配置了 `next_level` 时，主动作执行完毕后会补发一次关卡过渡。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagOutcome {
    /// true = 绿（胜利），false = 红（失败）
    pub is_green: bool,
    /// 标记后跳转的关卡（可选）
    #[serde(default)]
    pub next_level: Option<String>,
}

/// 动作表
///
/// 帧触发事件和按钮交互共用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventAction {
    /// 播放单行旁白
    PlayNarration {
        /// 行内容
        line: NarrationLine,
    },

    /// 播放旁白集合
    PlayNarrationSet {
        /// 集合内容
        set: NarrationSet,
    },

    /// 切换帧集合
    SwitchFrameSet {
        /// 目标集合名
        target: String,
        /// 是否保留当前索引（默认保留）
        #[serde(default = "default_preserve_index")]
        preserve_index: bool,
    },

    /// 播放一次性音效
    PlaySound {
        /// 音效资源标识符
        id: String,
    },

    /// 触发场景对象动画
    StartAnimation {
        /// 场景对象名称
        object: String,
    },

    /// 设置交互元素的可用状态
    SetButtonActive {
        /// 元素标识符
        id: String,
        /// 目标状态
        active: bool,
    },

    /// 过渡到指定关卡
    TransitionToLevel {
        /// 目标关卡名
        target: String,
    },

    /// 发布自定义关卡事件
    Custom {
        /// 事件标识符
        event_id: String,
    },
}

fn default_preserve_index() -> bool {
    true
}

/// 帧触发事件
///
/// 帧索引命中（且帧集合过滤通过）时按声明顺序触发。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEventTrigger {
    /// 限定帧集合（None 表示任意集合）
    #[serde(default)]
    pub frame_set: Option<String>,
    /// 触发帧索引
    pub frame_index: usize,
    /// 动作
    pub action: EventAction,
    /// 每次关卡加载至多触发一次
    #[serde(default)]
    pub trigger_once: bool,
    /// 附带的结局标记（可选）
    #[serde(default)]
    pub flag: Option<FlagOutcome>,
}

/// 按钮配置
///
/// `id` 必须匹配场景中某个交互元素的标识符（关卡内唯一）。
/// 加载时绑定到元素（旧绑定被替换），引用缺失元素的配置
/// 记日志后跳过。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    /// 元素标识符
    pub id: String,
    /// 限定帧集合（None 表示任意集合；
    /// 来自过期帧集合的延迟点击会被丢弃）
    #[serde(default)]
    pub frame_set: Option<String>,
    /// 动作
    pub action: EventAction,
    /// 加载时的初始可用状态
    #[serde(default = "default_active_at_start")]
    pub active_at_start: bool,
    /// 附带的结局标记（可选）
    #[serde(default)]
    pub flag: Option<FlagOutcome>,
}

fn default_active_at_start() -> bool {
    true
}

/// 关卡定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// 关卡名（库内唯一）
    pub name: String,
    /// 初始帧集合名（声明了帧集合时必填）
    #[serde(default)]
    pub initial_frame_set: Option<String>,
    /// 帧集合声明
    #[serde(default)]
    pub frame_sets: Vec<FrameSet>,
    /// 帧触发事件
    #[serde(default)]
    pub frame_events: Vec<FrameEventTrigger>,
    /// 按钮配置
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
    /// 背景音乐标识符（空表示不播放）
    #[serde(default)]
    pub background_music: Option<String>,
    /// 过渡遮罩颜色提示
    #[serde(default)]
    pub transition_color: Option<Rgba>,
    /// 拖拽/FOV 配置（可选，加载时应用）
    #[serde(default)]
    pub drag: Option<DragConfig>,
}

impl LevelDefinition {
    /// 创建最小定义（测试和程序化构造用）
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_frame_set: None,
            frame_sets: Vec::new(),
            frame_events: Vec::new(),
            buttons: Vec::new(),
            background_music: None,
            transition_color: None,
            drag: None,
        }
    }

    /// 结构校验
    fn validate(&self) -> Result<(), DefinitionError> {
        for set in &self.frame_sets {
            if set.frames.is_empty() {
                return Err(DefinitionError::EmptyFrameSet {
                    level: self.name.clone(),
                    frame_set: set.name.clone(),
                });
            }
        }
        if let Some(initial) = &self.initial_frame_set {
            if !self.frame_sets.iter().any(|s| &s.name == initial) {
                return Err(DefinitionError::InitialFrameSetMissing {
                    level: self.name.clone(),
                    frame_set: initial.clone(),
                });
            }
        }
        Ok(())
    }
}

/// 关卡库
///
/// 名称到定义的映射，过渡协调器从这里解析目标关卡。
#[derive(Debug, Clone, Default)]
pub struct LevelLibrary {
    levels: HashMap<String, LevelDefinition>,
    /// 声明顺序（遍历/诊断用）
    order: Vec<String>,
}

impl LevelLibrary {
    /// 从定义列表构建，校验每个定义且拒绝重名
    pub fn new(definitions: Vec<LevelDefinition>) -> Result<Self, DefinitionError> {
        let mut library = Self::default();
        for def in definitions {
            def.validate()?;
            if library.levels.contains_key(&def.name) {
                return Err(DefinitionError::DuplicateLevel { name: def.name });
            }
            library.order.push(def.name.clone());
            library.levels.insert(def.name.clone(), def);
        }
        Ok(library)
    }

    /// 从 JSON 文本加载（顶层是定义数组）
    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        let definitions: Vec<LevelDefinition> =
            serde_json::from_str(text).map_err(|e| DefinitionError::InvalidJson {
                message: e.to_string(),
            })?;
        Self::new(definitions)
    }

    /// 按名称查找定义
    pub fn get(&self, name: &str) -> Option<&LevelDefinition> {
        self.levels.get(name)
    }

    /// 声明顺序的关卡名列表
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// 关卡数量
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"[
        {
            "name": "entry",
            "initial_frame_set": "hallway",
            "frame_sets": [
                { "name": "hallway", "frames": ["h0", "h1", "h2"] }
            ],
            "frame_events": [
                {
                    "frame_index": 2,
                    "action": { "TransitionToLevel": { "target": "cellar" } },
                    "trigger_once": true
                }
            ],
            "buttons": [
                {
                    "id": "door1",
                    "action": { "SwitchFrameSet": { "target": "hallway" } }
                }
            ],
            "background_music": "bgm_entry"
        },
        { "name": "cellar" }
    ]"#;

    #[test]
    fn test_library_from_json() {
        let library = LevelLibrary::from_json(SAMPLE_JSON).unwrap();
        assert_eq!(library.len(), 2);

        let entry = library.get("entry").unwrap();
        assert_eq!(entry.initial_frame_set.as_deref(), Some("hallway"));
        assert_eq!(entry.frame_sets[0].frames.len(), 3);
        assert!(entry.frame_events[0].trigger_once);
        // serde 默认值
        assert!(entry.buttons[0].active_at_start);
        assert!(matches!(
            &entry.buttons[0].action,
            EventAction::SwitchFrameSet { preserve_index: true, .. }
        ));

        insta::assert_yaml_snapshot!(library.names(), @r###"
        ---
        - entry
        - cellar
        "###);
    }

    #[test]
    fn test_invalid_json_reports_error() {
        let err = LevelLibrary::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidJson { .. }));
    }

    #[test]
    fn test_duplicate_level_rejected() {
        let err = LevelLibrary::new(vec![
            LevelDefinition::named("A"),
            LevelDefinition::named("A"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateLevel {
                name: "A".to_string()
            }
        );
    }

    #[test]
    fn test_initial_frame_set_must_be_declared() {
        let mut def = LevelDefinition::named("A");
        def.initial_frame_set = Some("missing".to_string());
        let err = LevelLibrary::new(vec![def]).unwrap_err();
        assert!(matches!(err, DefinitionError::InitialFrameSetMissing { .. }));
    }

    #[test]
    fn test_empty_frame_set_rejected() {
        let mut def = LevelDefinition::named("A");
        def.frame_sets.push(FrameSet::new("empty", vec![]));
        let err = LevelLibrary::new(vec![def]).unwrap_err();
        assert!(matches!(err, DefinitionError::EmptyFrameSet { .. }));
    }

    #[test]
    fn test_definition_roundtrip() {
        let library = LevelLibrary::from_json(SAMPLE_JSON).unwrap();
        let def = library.get("entry").unwrap();
        let json = serde_json::to_string(def).unwrap();
        let back: LevelDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(*def, back);
    }
}
