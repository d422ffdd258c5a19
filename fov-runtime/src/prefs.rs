//! # Prefs 模块
//!
//! 持久化偏好：核心只有一项 —— 固定键名的主音量。
//!
//! ## 设计说明
//!
//! - 通过通用键值偏好仓库接口读写，仓库的实际存储由 Host 提供
//!   （文件、浏览器存储等），核心自带一个内存实现供测试和无盘 Host
//! - 音量钳制在 [0.0, 1.0]

use std::collections::HashMap;

/// 主音量的固定键名
pub const MASTER_VOLUME_KEY: &str = "master_volume";

/// 默认主音量
pub const DEFAULT_MASTER_VOLUME: f32 = 1.0;

/// 通用键值偏好仓库
pub trait PrefStore {
    /// 读取浮点偏好
    fn get_f32(&self, key: &str) -> Option<f32>;
    /// 写入浮点偏好
    fn set_f32(&mut self, key: &str, value: f32);
}

/// 内存偏好仓库
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefStore {
    values: HashMap<String, f32>,
}

impl MemoryPrefStore {
    /// 创建空仓库
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefStore {
    fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set_f32(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }
}

/// 从仓库读取主音量（缺省 1.0，越界值钳入范围）
pub fn load_master_volume(store: &dyn PrefStore) -> f32 {
    store
        .get_f32(MASTER_VOLUME_KEY)
        .unwrap_or(DEFAULT_MASTER_VOLUME)
        .clamp(0.0, 1.0)
}

/// 写入主音量（钳制后落库），返回实际写入的值
pub fn save_master_volume(store: &mut dyn PrefStore, volume: f32) -> f32 {
    let clamped = volume.clamp(0.0, 1.0);
    store.set_f32(MASTER_VOLUME_KEY, clamped);
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_volume() {
        let store = MemoryPrefStore::new();
        assert_eq!(load_master_volume(&store), 1.0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut store = MemoryPrefStore::new();
        assert_eq!(save_master_volume(&mut store, 0.35), 0.35);
        assert_eq!(load_master_volume(&store), 0.35);
    }

    #[test]
    fn test_volume_clamped() {
        let mut store = MemoryPrefStore::new();
        assert_eq!(save_master_volume(&mut store, 1.7), 1.0);
        assert_eq!(save_master_volume(&mut store, -0.2), 0.0);

        // 仓库里被污染的越界值在读取时也钳制
        store.set_f32(MASTER_VOLUME_KEY, 9.0);
        assert_eq!(load_master_volume(&store), 1.0);
    }
}
