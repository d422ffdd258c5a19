//! # Easing 模块
//!
//! 缓动函数，用于过渡遮罩的时间插值。
//! 曲线本身由 Host 在渲染时求值，Runtime 只在配置中携带曲线类型，
//! `apply` 供测试和无渲染 Host 使用。

use serde::{Deserialize, Serialize};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 二次缓入（先慢后快）
    EaseIn,
    /// 二次缓出（先快后慢）
    EaseOut,
    /// 三次缓入缓出（两头慢中间快）
    #[default]
    EaseInOut,
}

impl EasingFunction {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => t * t,
            EasingFunction::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn test_clamping() {
        assert_eq!(EasingFunction::Linear.apply(-1.0), 0.0);
        assert_eq!(EasingFunction::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_ease_in_slower_at_start() {
        assert!(EasingFunction::EaseIn.apply(0.25) < 0.25);
        assert!(EasingFunction::EaseOut.apply(0.25) > 0.25);
    }
}
