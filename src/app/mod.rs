//! 演示程序
//!
//! 窗口事件到状态更新的粘合层：
//!
//! - `state`：AppState（线框/光照开关、旋转动画、视口、投影矩阵）
//! - `input`：winit 按键到 `AppKey` 的映射

pub mod input;
pub mod state;

pub use input::{map_key, map_key_event};
pub use state::{AppAction, AppKey, AppState};
