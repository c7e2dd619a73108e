//! wgpu 图形后端实现
//!
//! wgpu 是跨平台的图形 API，可以运行在 Vulkan、Metal、DirectX 12、OpenGL 等后端上。
//!
//! # 模块结构
//!
//! - `context` - WgpuContext 结构（窗口、设备和交换链）
//! - `renderer` - Renderer 结构（每帧把立即模式批次上传并绘制）

mod context;
mod renderer;

pub use context::WgpuContext;
pub use renderer::Renderer;
