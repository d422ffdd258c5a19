//! # Runtime 模块
//!
//! `GameRuntime` 把各组件装配成单线程协作式运行时：
//! 接收 Host 输入、驱动各组件、统一消费事件路由队列、
//! 收集一帧内产生的全部指令。

mod engine;

pub use engine::GameRuntime;
