//! 几何体加载和处理模块
//!
//! # 模块结构
//!
//! - `mesh`: 点、面和网格数据结构，以及面数据校验
//! - `math_utils`: 面法线计算
//! - `loaders`: OBJ 加载器
//!
//! # 架构设计
//!
//! ```text
//! OBJ 文件
//!     ↓
//! ObjLoader（逐行切分，v → Point，f → Face）
//!     ↓
//! Mesh（CPU 侧，只读）
//!     ↓
//! renderer::draw_mesh（逐面计算法线并提交三角形）
//! ```

pub mod mesh;
pub mod math_utils;
pub mod loaders;

// 重新导出常用类型
pub use mesh::{Face, FaceDefect, Mesh, Point};
