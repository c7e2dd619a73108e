//! flat_obj_viewer - 平面着色 OBJ 查看器
//!
//! 读取只包含 `v` / `f` 行的 Wavefront OBJ 文件，并以每面一条法线的
//! 平面着色方式绘制。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（数学、日志、配置、错误处理）
//! - `geometry`: 网格数据、面法线计算和 OBJ 加载器
//! - `renderer`: 立即模式绘制接口和 `draw_mesh`
//! - `app`: 演示程序状态（旋转动画、按键处理、相机）
//! - `gfx`: wgpu 图形后端
//!
//! # 使用示例
//!
//! ```no_run
//! use flat_obj_viewer::geometry::loaders::{load_mesh_with, LoaderOptions};
//! use flat_obj_viewer::renderer::{draw_mesh, CommandRecorder, DrawOptions};
//!
//! let path = std::path::Path::new("data/cube.obj");
//! let (mesh, _report) = load_mesh_with(path, &LoaderOptions::default()).unwrap();
//!
//! let mut recorder = CommandRecorder::new();
//! let stats = draw_mesh(&mesh, &mut recorder, &DrawOptions::default());
//! println!("{} triangles", stats.triangles);
//! ```

pub mod app;
pub mod core;
pub mod geometry;
pub mod gfx;
pub mod renderer;
