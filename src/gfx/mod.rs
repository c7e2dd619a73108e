//! 图形后端模块
//!
//! 封装窗口和 GPU 相关的代码。网格到绘制命令的转换在 `renderer` 模块中完成，
//! 与这里的具体图形 API 无关。

pub mod wgpu;

pub use self::wgpu::Renderer;
