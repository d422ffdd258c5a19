//! # Interaction 模块
//!
//! 场景交互元素（"按钮"）注册表。
//!
//! ## 设计说明
//!
//! - 元素由稳定的对象标识符索引，可用状态是当前帧索引对
//!   配置活动区间的函数；只在**边沿穿越**时翻转，不逐帧轮询
//! - 绑定是单槽位的：关卡加载时用新配置**替换**旧绑定，
//!   这是同一批物理 UI 元素跨关卡复用的机制
//! - `activate` 不校验可用状态 —— 可用性把关是 UI 层的职责，
//!   领域对象只负责交出绑定；交互事件由 Runtime 在派发后广播
//! - 区间列表为空的元素不参与帧驱动的状态重算，
//!   完全由关卡脚本（`active_at_start` / `SetButtonActive`）控制

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::command::Command;
use crate::level::def::ButtonConfig;

/// 帧索引活动区间（两端含）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: usize,
    pub end: usize,
}

impl FrameRange {
    /// 创建区间
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 索引是否落在区间内
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

/// 交互元素
#[derive(Debug)]
pub struct InteractionElement {
    /// 对象标识符（当前关卡作用域内唯一）
    id: String,
    /// 活动区间列表（空 => 不参与帧驱动重算）
    ranges: Vec<FrameRange>,
    /// 当前可用状态
    enabled: bool,
    /// 单槽位绑定（关卡加载时替换）
    binding: Option<ButtonConfig>,
}

impl InteractionElement {
    /// 创建元素，初始不可用、无绑定
    pub fn new(id: impl Into<String>, ranges: Vec<FrameRange>) -> Self {
        Self {
            id: id.into(),
            ranges,
            enabled: false,
            binding: None,
        }
    }

    /// 对象标识符
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 当前可用状态
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// 当前绑定
    pub fn binding(&self) -> Option<&ButtonConfig> {
        self.binding.as_ref()
    }

    /// 绑定配置（替换旧绑定，不追加）
    pub fn bind(&mut self, config: ButtonConfig) {
        self.binding = Some(config);
    }

    /// 清除绑定
    pub fn clear_binding(&mut self) {
        self.binding = None;
    }

    /// 直接设置可用状态，实际翻转时发出指令
    pub fn set_enabled(&mut self, enabled: bool, out: &mut Vec<Command>) {
        if self.enabled != enabled {
            self.enabled = enabled;
            out.push(Command::SetElementEnabled {
                id: self.id.clone(),
                enabled,
            });
        }
    }

    /// 帧变化重算
    ///
    /// 仅在新索引使"是否在任一区间内"发生翻转时改变状态。
    fn on_frame_changed(&mut self, index: usize, out: &mut Vec<Command>) {
        if self.ranges.is_empty() {
            return;
        }
        let desired = self.ranges.iter().any(|r| r.contains(index));
        self.set_enabled(desired, out);
    }
}

/// 交互元素注册表
///
/// 整个场景一张表；关卡通过重新绑定复用同一批元素。
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    /// 注册顺序保存（指令发出顺序确定性）
    elements: Vec<InteractionElement>,
}

impl InteractionRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册元素；同名元素被替换（记日志）
    pub fn register(&mut self, element: InteractionElement) {
        if let Some(existing) = self.elements.iter_mut().find(|e| e.id == element.id) {
            warn!(id = %element.id, "交互元素重复注册，替换旧元素");
            *existing = element;
        } else {
            self.elements.push(element);
        }
    }

    /// 按标识符查找
    pub fn get(&self, id: &str) -> Option<&InteractionElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// 按标识符查找（可变）
    pub fn get_mut(&mut self, id: &str) -> Option<&mut InteractionElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// 元素数量
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// 清除所有绑定（关卡切换时停用上一关的作用域）
    pub fn clear_bindings(&mut self) {
        for element in &mut self.elements {
            element.clear_binding();
        }
    }

    /// 帧变化：重算所有元素的可用状态
    pub fn on_frame_changed(&mut self, index: usize, out: &mut Vec<Command>) {
        for element in &mut self.elements {
            element.on_frame_changed(index, out);
        }
    }

    /// 激活元素
    ///
    /// 返回当前绑定（供关卡引擎派发动作）。不校验可用状态。
    /// `ObjectInteracted` 由 Runtime 在绑定派发完成之后广播，
    /// 观察者因此在动作产生的事件之后才看到交互事件。
    pub fn activate(&self, id: &str) -> Option<ButtonConfig> {
        let Some(element) = self.elements.iter().find(|e| e.id == id) else {
            warn!(id = %id, "激活了未注册的交互元素");
            return None;
        };
        element.binding.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::def::EventAction;

    fn config(id: &str) -> ButtonConfig {
        ButtonConfig {
            id: id.to_string(),
            frame_set: None,
            action: EventAction::Custom {
                event_id: "test".to_string(),
            },
            active_at_start: true,
            flag: None,
        }
    }

    #[test]
    fn test_range_containment_inclusive() {
        let range = FrameRange::new(2, 5);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(5));
        assert!(!range.contains(6));
    }

    #[test]
    fn test_edge_triggered_enable_disable() {
        let mut element = InteractionElement::new(
            "door1",
            vec![FrameRange::new(0, 3), FrameRange::new(10, 12)],
        );
        let mut out = Vec::new();

        // 进入 [0,3]
        element.on_frame_changed(0, &mut out);
        assert_eq!(out.len(), 1);
        assert!(element.enabled());

        // 区间内部移动不再发指令
        element.on_frame_changed(2, &mut out);
        element.on_frame_changed(3, &mut out);
        assert_eq!(out.len(), 1);

        // 3 -> 4 穿出，恰好一次翻转
        element.on_frame_changed(4, &mut out);
        assert_eq!(out.len(), 2);
        assert!(!element.enabled());

        // 9 -> 10 穿入第二个区间
        element.on_frame_changed(9, &mut out);
        assert_eq!(out.len(), 2);
        element.on_frame_changed(10, &mut out);
        assert_eq!(out.len(), 3);
        assert!(element.enabled());
    }

    #[test]
    fn test_empty_ranges_never_frame_enabled() {
        let mut element = InteractionElement::new("lamp", vec![]);
        let mut out = Vec::new();

        for index in 0..20 {
            element.on_frame_changed(index, &mut out);
        }
        assert!(!element.enabled());
        assert!(out.is_empty());

        // 但脚本可以直接控制
        element.set_enabled(true, &mut out);
        assert!(element.enabled());
        element.on_frame_changed(5, &mut out);
        assert!(element.enabled()); // 帧驱动重算不碰无区间元素
    }

    #[test]
    fn test_bind_replaces_previous_binding() {
        let mut element = InteractionElement::new("door1", vec![]);
        element.bind(config("door1"));
        let second = ButtonConfig {
            action: EventAction::PlaySound {
                id: "creak".to_string(),
            },
            ..config("door1")
        };
        element.bind(second.clone());

        assert_eq!(element.binding(), Some(&second));
    }

    #[test]
    fn test_activate_returns_binding_regardless_of_enabled() {
        let mut registry = InteractionRegistry::new();
        let mut element = InteractionElement::new("door1", vec![FrameRange::new(5, 9)]);
        element.bind(config("door1"));
        registry.register(element);

        // 元素当前不可用，激活仍然生效（逻辑把关在 UI 层）
        assert!(!registry.get("door1").unwrap().enabled());
        assert!(registry.activate("door1").is_some());
    }

    #[test]
    fn test_activate_unknown_element() {
        let registry = InteractionRegistry::new();
        assert!(registry.activate("ghost").is_none());
    }

    #[test]
    fn test_clear_bindings() {
        let mut registry = InteractionRegistry::new();
        let mut element = InteractionElement::new("door1", vec![]);
        element.bind(config("door1"));
        registry.register(element);

        registry.clear_bindings();
        assert!(registry.get("door1").unwrap().binding().is_none());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = InteractionRegistry::new();
        registry.register(InteractionElement::new("a", vec![FrameRange::new(0, 1)]));
        registry.register(InteractionElement::new("a", vec![]));
        assert_eq!(registry.len(), 1);
    }
}
