//! 错误处理模块
//!
//! 定义了查看器中使用的统一错误类型。
//!
//! # 设计原则
//!
//! - 每个子系统一个错误枚举（配置、图形、网格加载）
//! - 为每种错误类型提供清晰的上下文信息
//! - 支持错误链（error source）
//! - 易于模式匹配和错误处理

use std::fmt;
use std::path::PathBuf;

use crate::geometry::mesh::FaceDefect;

/// 统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, ViewerError>;

/// 查看器的错误类型
#[derive(Debug)]
pub enum ViewerError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// 网格加载错误
    MeshLoading(MeshLoadError),

    /// IO 错误
    Io(std::io::Error),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 窗口、表面或设备创建失败
    DeviceCreation(String),

    /// 交换链错误
    SwapchainError(String),
}

/// 网格加载相关的错误
#[derive(Debug)]
pub enum MeshLoadError {
    /// 文件无法打开
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// 读取过程中的 IO 错误
    Read { line: usize, source: std::io::Error },

    /// 不支持的文件格式
    UnsupportedFormat(String),

    /// 严格模式下无法解析的数值
    Parse { line: usize, token: String },

    /// 面数据验证失败
    Validation(FaceDefect),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::Config(e) => write!(f, "Configuration error: {}", e),
            ViewerError::Graphics(e) => write!(f, "Graphics error: {}", e),
            ViewerError::MeshLoading(e) => write!(f, "Mesh loading error: {}", e),
            ViewerError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::SwapchainError(msg) => write!(f, "Swapchain error: {}", msg),
        }
    }
}

impl fmt::Display for MeshLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLoadError::Open { path, source } => {
                write!(f, "Unable to open the file {}: {}", path.display(), source)
            }
            MeshLoadError::Read { line, source } => {
                write!(f, "Failed to read line {}: {}", line, source)
            }
            MeshLoadError::UnsupportedFormat(msg) => write!(f, "Unsupported mesh format: {}", msg),
            MeshLoadError::Parse { line, token } => {
                write!(f, "Invalid number '{}' on line {}", token, line)
            }
            MeshLoadError::Validation(defect) => write!(f, "Mesh validation failed: {}", defect),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Io(e) => Some(e),
            ViewerError::MeshLoading(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}

impl std::error::Error for MeshLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshLoadError::Open { source, .. } | MeshLoadError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        ViewerError::Io(err)
    }
}

impl From<ConfigError> for ViewerError {
    fn from(err: ConfigError) -> Self {
        ViewerError::Config(err)
    }
}

impl From<GraphicsError> for ViewerError {
    fn from(err: GraphicsError) -> Self {
        ViewerError::Graphics(err)
    }
}

impl From<MeshLoadError> for ViewerError {
    fn from(err: MeshLoadError) -> Self {
        ViewerError::MeshLoading(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_mentions_path() {
        let err: ViewerError = MeshLoadError::Open {
            path: PathBuf::from("data/missing.obj"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        }
        .into();

        let message = err.to_string();
        assert!(message.contains("Unable to open the file"));
        assert!(message.contains("missing.obj"));
    }

    #[test]
    fn test_open_error_has_source() {
        use std::error::Error;

        let err = MeshLoadError::Open {
            path: PathBuf::from("x.obj"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
