//! 配置管理模块
//!
//! 提供查看器配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 640
//! height = 480
//! title = "Obj Model Loader Example: Press W to toggle wireframe"
//!
//! [graphics]
//! vsync = true
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//!
//! [scene]
//! model_path = "data/cube.obj"
//! camera_distance = 5.0
//!
//! [loader]
//! strict_numbers = false
//! validate_faces = false
//! legacy_normals = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 查看器配置
///
/// 包含了程序运行所需的所有配置项。
/// 可以从配置文件加载，也可以通过代码构建。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 场景配置（相机、光照、动画）
    #[serde(default)]
    pub scene: SceneConfig,

    /// 加载器与绘制选项
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 是否可调整大小
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// 场景配置
///
/// 对应演示程序里的相机、光照和动画参数。颜色均为线性 RGB，范围 0.0-1.0。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// OBJ 模型路径
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// 垂直视野角度（度）
    #[serde(default = "default_fov")]
    pub fov: f32,

    /// 相机到原点的距离
    #[serde(default = "default_camera_distance")]
    pub camera_distance: f32,

    /// 近裁剪面
    #[serde(default = "default_near_clip")]
    pub near_clip: f32,

    /// 远裁剪面
    #[serde(default = "default_far_clip")]
    pub far_clip: f32,

    /// 背景颜色
    #[serde(default = "default_background")]
    pub background: [f32; 3],

    /// 模型颜色
    #[serde(default = "default_model_color")]
    pub model_color: [f32; 3],

    /// 更新间隔（毫秒）
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// 每次更新的旋转角度（度）
    #[serde(default = "default_rotation_step")]
    pub rotation_step: f32,

    /// 光照参数
    #[serde(default)]
    pub lighting: LightingConfig,
}

/// 光照配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingConfig {
    /// 启动时是否启用光照
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 是否启用镜面高光
    #[serde(default)]
    pub specular: bool,

    /// 高光指数（0-128）
    #[serde(default = "default_shininess")]
    pub shininess: f32,

    /// 环境光颜色
    #[serde(default = "default_ambient")]
    pub ambient: [f32; 3],

    /// 漫反射光颜色
    #[serde(default = "default_diffuse")]
    pub diffuse: [f32; 3],

    /// 镜面光颜色
    #[serde(default = "default_specular_color")]
    pub specular_color: [f32; 3],

    /// 平行光方向（指向光源）
    #[serde(default = "default_light_direction")]
    pub direction: [f32; 3],
}

/// 加载器与绘制选项
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// 无法解析的数值是否直接报错（否则按 0 处理）
    #[serde(default)]
    pub strict_numbers: bool,

    /// 加载后是否校验面的顶点数和索引范围
    #[serde(default)]
    pub validate_faces: bool,

    /// 按旧版 (x, z, z) 分量顺序提交法线
    #[serde(default)]
    pub legacy_normals: bool,
}

// 默认值函数
fn default_width() -> u32 { 640 }
fn default_height() -> u32 { 480 }
fn default_title() -> String { "Obj Model Loader Example: Press W to toggle wireframe".to_string() }
fn default_resizable() -> bool { true }
fn default_vsync() -> bool { true }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "flat_obj_viewer.log".to_string() }
fn default_model_path() -> String { "data/cube.obj".to_string() }
fn default_fov() -> f32 { 60.0 }
fn default_camera_distance() -> f32 { 5.0 }
fn default_near_clip() -> f32 { 1.0 }
fn default_far_clip() -> f32 { 200.0 }
fn default_background() -> [f32; 3] { [0.0, 0.0, 0.0] }
fn default_model_color() -> [f32; 3] { [0.6, 0.6, 0.6] }
fn default_frame_interval_ms() -> u64 { 25 }
fn default_rotation_step() -> f32 { 0.5 }
fn default_true() -> bool { true }
fn default_shininess() -> f32 { 50.0 }
fn default_ambient() -> [f32; 3] { [0.1, 0.1, 0.1] }
fn default_diffuse() -> [f32; 3] { [0.75, 0.75, 0.75] }
fn default_specular_color() -> [f32; 3] { [1.0, 1.0, 1.0] }
fn default_light_direction() -> [f32; 3] { [0.0, 1.0, 1.0] }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: default_vsync(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            fov: default_fov(),
            camera_distance: default_camera_distance(),
            near_clip: default_near_clip(),
            far_clip: default_far_clip(),
            background: default_background(),
            model_color: default_model_color(),
            frame_interval_ms: default_frame_interval_ms(),
            rotation_step: default_rotation_step(),
            lighting: LightingConfig::default(),
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            specular: false,
            shininess: default_shininess(),
            ambient: default_ambient(),
            diffuse: default_diffuse(),
            specular_color: default_specular_color(),
            direction: default_light_direction(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Config` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 第一个参数视为程序名并被跳过。
    ///
    /// 支持的参数：
    /// - `<path>`: 模型文件路径（第一个非选项参数）
    /// - `--width <value>` / `--height <value>`: 窗口尺寸
    /// - `--strict`: 无法解析的数值直接报错
    /// - `--validate`: 加载后校验面数据
    /// - `--legacy-normals`: 使用旧版法线分量顺序
    ///
    /// 其他以 `--` 开头的参数（如 `--dump`）由调用方处理，这里忽略。
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        let mut model_path: Option<String> = None;
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--width" => {
                    if let Some(width) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                        self.window.width = width;
                    }
                    i += 1;
                }
                "--height" => {
                    if let Some(height) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                        self.window.height = height;
                    }
                    i += 1;
                }
                "--strict" => self.loader.strict_numbers = true,
                "--validate" => self.loader.validate_faces = true,
                "--legacy-normals" => self.loader.legacy_normals = true,
                other if !other.starts_with("--") => {
                    if model_path.is_none() {
                        model_path = Some(other.to_string());
                    }
                }
                _ => {}
            }
            i += 1;
        }

        if let Some(path) = model_path {
            self.scene.model_path = path;
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window.width/height", "Window dimensions must be greater than 0"));
        }

        let scene = &self.scene;
        if !(scene.fov > 0.0 && scene.fov < 180.0) {
            return Err(invalid("scene.fov", "Field of view must be between 0 and 180 degrees"));
        }

        if !(scene.near_clip > 0.0 && scene.far_clip > scene.near_clip) {
            return Err(invalid("scene.near_clip/far_clip", "Clip planes must satisfy 0 < near < far"));
        }

        if scene.frame_interval_ms == 0 {
            return Err(invalid("scene.frame_interval_ms", "Frame interval must be greater than 0"));
        }

        if !(0.0..=128.0).contains(&scene.lighting.shininess) {
            return Err(invalid("scene.lighting.shininess", "Shininess must be in 0..=128"));
        }

        if scene.model_path.is_empty() {
            return Err(invalid("scene.model_path", "Model path must not be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> super::error::ViewerError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
