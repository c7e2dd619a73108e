//! 模型加载器模块
//!
//! 提供统一的模型加载接口。目前只支持三角化后的 Wavefront OBJ。
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use flat_obj_viewer::geometry::loaders::load_mesh;
//! use std::path::Path;
//!
//! let mesh = load_mesh(Path::new("data/cube.obj"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use crate::core::error::{MeshLoadError, Result};
use crate::geometry::mesh::Mesh;
use std::path::Path;

pub mod obj_loader;

// 重新导出加载器
pub use obj_loader::{LoadReport, LoaderOptions, NumberPolicy, ObjLoader};

/// 网格加载器 trait
///
/// 加载器是无状态的（使用关联函数），只返回 CPU 侧的 `Mesh`。
pub trait MeshLoader {
    /// 从文件路径加载网格
    ///
    /// # 错误
    ///
    /// - 文件无法打开或读取
    /// - 严格模式下数值无法解析
    fn load_from_file(path: &Path) -> Result<Mesh>;

    /// 从内存数据加载网格
    fn load_from_memory(data: &[u8]) -> Result<Mesh>;

    /// 支持的文件扩展名列表（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 根据文件扩展名选择合适的加载器
pub fn load_mesh(path: &Path) -> Result<Mesh> {
    load_mesh_with(path, &LoaderOptions::default()).map(|(mesh, _)| mesh)
}

/// 根据文件扩展名选择加载器，并使用指定选项
pub fn load_mesh_with(path: &Path, options: &LoaderOptions) -> Result<(Mesh, LoadReport)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| {
            MeshLoadError::UnsupportedFormat(format!(
                "cannot determine file extension of {}",
                path.display()
            ))
        })?;

    if ObjLoader::supported_extensions().contains(&extension.as_str()) {
        ObjLoader::load_from_file_with(path, options)
    } else {
        Err(MeshLoadError::UnsupportedFormat(format!(".{}", extension)).into())
    }
}
