//! # Events 模块
//!
//! 进程内类型化事件总线。
//!
//! ## 设计说明
//!
//! - 总线是 `GameRuntime` **拥有的实例**，不是全局静态量，
//!   通过引用传递给需要发布事件的组件
//! - 订阅者按注册顺序（FIFO）同步收到事件，派发发生在调用线程上
//! - 派发过程中新增的订阅者不会收到正在派发的事件
//! - `publish` 同时把事件追加到内部路由队列；组件之间的事件路由
//!   由 Runtime 在派发结束后统一消费该队列完成。处理器因此不会
//!   在自己的处理过程中被重入 —— 重新发布永远是"排队"而非"内联"
//!
//! ```text
//! 组件 ──publish──► EventBus ──同步──► 订阅者（Host/测试观察者）
//!                      │
//!                      └──排队──► Runtime 路由循环 ──► 各组件处理
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// 订阅者句柄，用于退订
pub type SubscriberId = u64;

/// 总线事件
///
/// 每种事件携带固定形状的负载。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// 当前帧索引发生变化
    FrameChanged { index: usize },

    /// 激活的帧集合发生切换
    FrameSetChanged { name: String },

    /// 交互元素被激活
    ObjectInteracted { id: String },

    /// 自定义关卡事件
    LevelEvent { id: String },

    /// 请求关卡过渡
    LevelTransition { level: String },

    /// 标记关卡结局（绿/红）
    FlagMarked { is_green: bool },
}

/// 事件总线
///
/// 同步、按注册顺序派发；无队列送达保证之外的语义
/// （没有订阅者时发布即为空操作，只进路由队列）。
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Box<dyn FnMut(&GameEvent)>)>,
    queue: VecDeque<GameEvent>,
    next_id: SubscriberId,
}

impl EventBus {
    /// 创建空总线
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册订阅者，返回退订句柄
    pub fn subscribe(&mut self, callback: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// 退订。返回是否确实移除了订阅者
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// 发布事件
    ///
    /// 同步通知当前所有订阅者（按注册顺序），随后把事件追加到
    /// 路由队列。派发中注册的订阅者不会收到本事件。
    pub fn publish(&mut self, event: GameEvent) {
        // 只遍历发布时刻已存在的订阅者
        let count = self.subscribers.len();
        for i in 0..count {
            (self.subscribers[i].1)(&event);
        }
        self.queue.push_back(event);
    }

    /// 取出路由队列中最早的事件
    pub fn pop_queued(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    /// 路由队列中待处理的事件数
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let mut bus = EventBus::new();
        bus.publish(GameEvent::FrameChanged { index: 3 });
        // 没有订阅者也不报错，事件仍然进入路由队列
        assert_eq!(bus.queued_len(), 1);
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        bus.subscribe(move |_| o1.borrow_mut().push(1));
        let o2 = Rc::clone(&order);
        bus.subscribe(move |_| o2.borrow_mut().push(2));
        let o3 = Rc::clone(&order);
        bus.subscribe(move |_| o3.borrow_mut().push(3));

        bus.publish(GameEvent::FrameSetChanged {
            name: "interior".to_string(),
        });

        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));

        let h = Rc::clone(&hits);
        let id = bus.subscribe(move |_| *h.borrow_mut() += 1);

        bus.publish(GameEvent::FlagMarked { is_green: true });
        assert_eq!(*hits.borrow(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id)); // 重复退订返回 false

        bus.publish(GameEvent::FlagMarked { is_green: false });
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut bus = EventBus::new();
        bus.publish(GameEvent::FrameChanged { index: 1 });
        bus.publish(GameEvent::FrameChanged { index: 2 });

        assert_eq!(bus.pop_queued(), Some(GameEvent::FrameChanged { index: 1 }));
        assert_eq!(bus.pop_queued(), Some(GameEvent::FrameChanged { index: 2 }));
        assert_eq!(bus.pop_queued(), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::LevelTransition {
            level: "Chapter2".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }
}
