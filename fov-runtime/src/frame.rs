//! # Frame 模块
//!
//! FOV 翻页的帧游标：把连续的拖拽输入量化为离散帧索引。
//!
//! ## 设计说明
//!
//! - 拖拽量先投影到配置的轴向，再按灵敏度和固定比例缩放
//! - 每 tick 的增量被钳制到 `max_frames_per_second * distance_per_frame * dt`，
//!   拖拽**速度**（而不是单纯的距离）决定翻页速率
//! - 累积量达到一帧距离时才消费，方向中途反转不会跳帧
//! - 索引越界按配置回绕或钳制；`set_frame_index` 越界请求静默忽略

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{EventBus, GameEvent};

/// 原始像素位移到内部距离单位的固定比例
const DRAG_SCALE: f32 = 0.01;

/// 拖拽轴向
///
/// 投影方向决定"向哪边拖是前进"。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragAxis {
    /// 向右拖为前进
    #[default]
    XPositive,
    /// 向左拖为前进
    XNegative,
    /// 向下拖为前进
    YPositive,
    /// 向上拖为前进
    YNegative,
}

impl DragAxis {
    /// 把二维位移投影到轴向，得到带符号的一维量
    fn project(&self, dx: f32, dy: f32) -> f32 {
        match self {
            DragAxis::XPositive => dx,
            DragAxis::XNegative => -dx,
            DragAxis::YPositive => dy,
            DragAxis::YNegative => -dy,
        }
    }
}

/// 拖拽配置
///
/// 关卡定义可以携带一份，在加载时应用到游标。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// 拖拽轴向
    #[serde(default)]
    pub axis: DragAxis,
    /// 翻一帧需要的内部距离
    #[serde(default = "default_distance_per_frame")]
    pub distance_per_frame: f32,
    /// 是否回绕（否则钳制在两端）
    #[serde(default = "default_wrap")]
    pub wrap: bool,
    /// 灵敏度倍率
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// 每秒最多翻多少帧（速率上限）
    #[serde(default = "default_max_fps")]
    pub max_frames_per_second: f32,
}

fn default_distance_per_frame() -> f32 {
    0.25
}

fn default_wrap() -> bool {
    true
}

fn default_sensitivity() -> f32 {
    1.0
}

fn default_max_fps() -> f32 {
    30.0
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            axis: DragAxis::default(),
            distance_per_frame: default_distance_per_frame(),
            wrap: default_wrap(),
            sensitivity: default_sensitivity(),
            max_frames_per_second: default_max_fps(),
        }
    }
}

/// 帧游标
///
/// 持有当前帧数组和离散索引，是拖拽状态的唯一变更点。
#[derive(Debug, Default)]
pub struct FrameCursor {
    /// 当前帧资源数组（由帧集合切换时替换）
    frames: Vec<String>,
    /// 当前帧索引，始终在 `[0, frames.len())` 内
    current_index: usize,
    /// 未消费的拖拽累积量
    accumulated: f32,
    /// 拖拽配置
    config: DragConfig,
}

impl FrameCursor {
    /// 创建空游标
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用拖拽配置（关卡加载时调用）
    pub fn configure(&mut self, config: DragConfig) {
        self.config = config;
    }

    /// 当前帧索引
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 总帧数
    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    /// 当前帧资源标识符
    pub fn current_frame(&self) -> Option<&str> {
        self.frames.get(self.current_index).map(String::as_str)
    }

    /// 当前未消费的累积量（测试用）
    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    /// 应用一次拖拽增量
    ///
    /// # 参数
    /// - `dx`/`dy`: 本帧原始指针位移
    /// - `dt`: 本帧时长（秒），用于速率钳制
    ///
    /// 累积量达到一帧距离时消费整数帧数，索引实际变化才发出
    /// `FrameChanged`。
    pub fn apply_drag_delta(&mut self, dx: f32, dy: f32, dt: f32, bus: &mut EventBus) {
        if self.frames.is_empty() {
            return;
        }

        let projected = self.config.axis.project(dx, dy);
        let scaled = projected * self.config.sensitivity * DRAG_SCALE;

        // 速率上限：单 tick 最多消费 max_fps * dt 帧的距离
        let max_delta = self.config.max_frames_per_second * self.config.distance_per_frame * dt;
        let clamped = scaled.clamp(-max_delta, max_delta);

        self.accumulated += clamped;

        if self.accumulated.abs() < self.config.distance_per_frame {
            return;
        }

        let frame_change = (self.accumulated / self.config.distance_per_frame).floor() as i64;
        self.accumulated -= frame_change as f32 * self.config.distance_per_frame;

        let new_index = self.resolve_index(self.current_index as i64 + frame_change);
        if new_index != self.current_index {
            self.current_index = new_index;
            bus.publish(GameEvent::FrameChanged { index: new_index });
        }
    }

    /// 替换帧数组并定位到起始索引
    ///
    /// `start_index` 越界时钳入范围。拖拽累积量**保留**，
    /// 帧数组变化无论索引是否变化都会发出 `FrameChanged`。
    pub fn set_frame_set(&mut self, frames: Vec<String>, start_index: usize, bus: &mut EventBus) {
        self.frames = frames;
        self.current_index = if self.frames.is_empty() {
            0
        } else {
            start_index.min(self.frames.len() - 1)
        };
        debug!(index = self.current_index, total = self.frames.len(), "帧数组已替换");
        bus.publish(GameEvent::FrameChanged {
            index: self.current_index,
        });
    }

    /// 显式设置帧索引
    ///
    /// 越界请求静默忽略：不发事件、不改状态。
    pub fn set_frame_index(&mut self, index: usize, bus: &mut EventBus) {
        if index >= self.frames.len() || index == self.current_index {
            return;
        }
        self.current_index = index;
        bus.publish(GameEvent::FrameChanged { index });
    }

    /// 把带符号索引映射回合法范围（回绕或钳制）
    fn resolve_index(&self, index: i64) -> usize {
        let total = self.frames.len() as i64;
        if self.config.wrap {
            (((index % total) + total) % total) as usize
        } else {
            index.clamp(0, total - 1) as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("frame_{i:03}")).collect()
    }

    fn cursor_with(n: usize, wrap: bool) -> FrameCursor {
        let mut cursor = FrameCursor::new();
        cursor.configure(DragConfig {
            distance_per_frame: 0.25,
            wrap,
            sensitivity: 1.0,
            max_frames_per_second: 1000.0, // 测试中不触发速率钳制
            ..DragConfig::default()
        });
        let mut bus = EventBus::new();
        cursor.set_frame_set(frames(n), 0, &mut bus);
        cursor
    }

    #[test]
    fn test_drag_accumulates_until_threshold() {
        let mut cursor = cursor_with(10, true);
        let mut bus = EventBus::new();

        // 0.1 内部单位 = 10 像素 * 0.01，不足一帧距离
        cursor.apply_drag_delta(10.0, 0.0, 0.016, &mut bus);
        assert_eq!(cursor.current_index(), 0);
        assert_eq!(bus.queued_len(), 0); // 阈值之下不发事件

        // 再来 20 像素，累积 0.3 >= 0.25，翻一帧
        cursor.apply_drag_delta(20.0, 0.0, 0.016, &mut bus);
        assert_eq!(cursor.current_index(), 1);
        assert_eq!(bus.pop_queued(), Some(GameEvent::FrameChanged { index: 1 }));
        // 剩余累积量 0.05
        assert!((cursor.accumulated() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_backward_from_zero() {
        let mut cursor = cursor_with(10, true);
        let mut bus = EventBus::new();

        // 反向拖一帧距离：0 回绕到 9
        cursor.apply_drag_delta(-25.0, 0.0, 0.016, &mut bus);
        assert_eq!(cursor.current_index(), 9);
    }

    #[test]
    fn test_clamp_mode_stops_at_edges() {
        let mut cursor = cursor_with(5, false);
        let mut bus = EventBus::new();

        cursor.apply_drag_delta(-100.0, 0.0, 0.016, &mut bus);
        assert_eq!(cursor.current_index(), 0);

        // 正向拖超出末尾，停在 total-1
        cursor.apply_drag_delta(10_000.0, 0.0, 1.0, &mut bus);
        assert_eq!(cursor.current_index(), 4);
    }

    #[test]
    fn test_rate_limit_caps_per_tick_consumption() {
        let mut cursor = FrameCursor::new();
        cursor.configure(DragConfig {
            distance_per_frame: 0.25,
            wrap: true,
            max_frames_per_second: 10.0,
            ..DragConfig::default()
        });
        let mut bus = EventBus::new();
        cursor.set_frame_set(frames(100), 0, &mut bus);
        bus.pop_queued();

        // 单 tick 猛拖：最多消费 10 帧/秒 * 0.1 秒 = 1 帧
        cursor.apply_drag_delta(100_000.0, 0.0, 0.1, &mut bus);
        assert_eq!(cursor.current_index(), 1);
    }

    #[test]
    fn test_vertical_axis_projection() {
        let mut cursor = FrameCursor::new();
        cursor.configure(DragConfig {
            axis: DragAxis::YNegative,
            distance_per_frame: 0.25,
            max_frames_per_second: 1000.0,
            ..DragConfig::default()
        });
        let mut bus = EventBus::new();
        cursor.set_frame_set(frames(10), 0, &mut bus);
        bus.pop_queued();

        // YNegative：向上拖（dy < 0）为前进，水平分量被忽略
        cursor.apply_drag_delta(500.0, -25.0, 0.016, &mut bus);
        assert_eq!(cursor.current_index(), 1);
    }

    #[test]
    fn test_direction_reversal_does_not_skip() {
        let mut cursor = cursor_with(10, true);
        let mut bus = EventBus::new();

        // 正向 0.2，反向 0.2：净累积约 0，不应翻帧
        cursor.apply_drag_delta(20.0, 0.0, 0.016, &mut bus);
        cursor.apply_drag_delta(-20.0, 0.0, 0.016, &mut bus);
        assert_eq!(cursor.current_index(), 0);
        assert_eq!(bus.queued_len(), 0);
    }

    #[test]
    fn test_set_frame_set_keeps_accumulator() {
        // 决议：切换帧集合不清空拖拽累积量（以测试固定该行为）
        let mut cursor = cursor_with(10, true);
        let mut bus = EventBus::new();

        cursor.apply_drag_delta(20.0, 0.0, 0.016, &mut bus);
        let before = cursor.accumulated();
        assert!(before > 0.0);

        cursor.set_frame_set(frames(6), 2, &mut bus);
        assert_eq!(cursor.accumulated(), before);
        assert_eq!(cursor.current_index(), 2);
        // 替换帧数组无条件发出 FrameChanged
        assert_eq!(bus.pop_queued(), Some(GameEvent::FrameChanged { index: 2 }));
    }

    #[test]
    fn test_set_frame_set_clamps_start_index() {
        let mut cursor = cursor_with(10, true);
        let mut bus = EventBus::new();

        cursor.set_frame_set(frames(4), 99, &mut bus);
        assert_eq!(cursor.current_index(), 3);
    }

    #[test]
    fn test_set_frame_index_out_of_range_ignored() {
        let mut cursor = cursor_with(5, true);
        let mut bus = EventBus::new();

        cursor.set_frame_index(7, &mut bus);
        assert_eq!(cursor.current_index(), 0);
        assert_eq!(bus.queued_len(), 0);

        cursor.set_frame_index(3, &mut bus);
        assert_eq!(cursor.current_index(), 3);
        assert_eq!(bus.pop_queued(), Some(GameEvent::FrameChanged { index: 3 }));
    }

    #[test]
    fn test_index_always_in_range_under_random_drags() {
        let mut cursor = cursor_with(7, true);
        let mut bus = EventBus::new();

        let deltas = [35.0, -90.0, 12.0, -300.0, 777.0, -5.0, 250.0, -250.0];
        for (i, d) in deltas.iter().cycle().take(200).enumerate() {
            cursor.apply_drag_delta(*d * ((i % 3) as f32 + 0.5), 0.0, 0.016, &mut bus);
            assert!(cursor.current_index() < 7);
        }
    }

    #[test]
    fn test_current_frame_lookup() {
        let cursor = cursor_with(3, true);
        assert_eq!(cursor.current_frame(), Some("frame_000"));

        let empty = FrameCursor::new();
        assert_eq!(empty.current_frame(), None);
    }
}
