//! 演示程序状态
//!
//! AppState 保存窗口、光照开关和旋转动画的状态，由事件循环显式传入
//! 更新和绘制回调，与具体的图形后端无关。

use std::time::Duration;

use crate::core::math::{matrix, Matrix4};
use crate::core::{Config, SceneConfig};

/// 旋转角度超出 ±360 度时归零
const ROTATION_LIMIT: f32 = 360.0;

/// 与后端无关的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKey {
    Escape,
    Char(char),
    Other,
}

/// 按键处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// 无变化
    None,
    /// 状态已改变，需要重绘
    Redraw,
    /// 退出程序
    Exit,
}

/// 演示程序状态
#[derive(Debug, Clone)]
pub struct AppState {
    /// 线框模式
    pub wireframe: bool,
    /// 光照
    pub lighting: bool,
    /// 镜面高光
    pub specular: bool,
    /// 绕 Y 轴的旋转角度（度）
    pub rotation_deg: f32,
    /// 视口尺寸（像素）
    pub viewport: (u32, u32),

    scene: SceneConfig,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            wireframe: false,
            lighting: config.scene.lighting.enabled,
            specular: config.scene.lighting.specular,
            rotation_deg: 0.0,
            viewport: (config.window.width, config.window.height),
            scene: config.scene.clone(),
        }
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    /// 动画更新间隔
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.scene.frame_interval_ms)
    }

    /// 推进一次动画
    pub fn tick(&mut self) {
        self.rotation_deg += self.scene.rotation_step;

        if self.rotation_deg > ROTATION_LIMIT || self.rotation_deg < -ROTATION_LIMIT {
            self.rotation_deg = 0.0;
        }
    }

    /// 处理按键
    ///
    /// - `Escape`：退出
    /// - `w`：同时切换线框模式和光照
    pub fn handle_key(&mut self, key: AppKey) -> AppAction {
        match key {
            AppKey::Escape => AppAction::Exit,
            AppKey::Char('w') => {
                self.wireframe = !self.wireframe;
                self.lighting = !self.lighting;
                tracing::debug!(wireframe = self.wireframe, lighting = self.lighting, "Toggled wireframe");
                AppAction::Redraw
            }
            _ => AppAction::None,
        }
    }

    /// 窗口尺寸改变；0 尺寸（最小化）被忽略
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = (width, height);
        }
    }

    pub fn aspect(&self) -> f32 {
        let (width, height) = self.viewport;
        width as f32 / height.max(1) as f32
    }

    /// 透视投影（OpenGL 深度范围）
    pub fn projection(&self) -> Matrix4 {
        matrix::perspective(
            self.scene.fov,
            self.aspect(),
            self.scene.near_clip,
            self.scene.far_clip,
        )
    }

    /// 相机沿 -Z 后退 `camera_distance`
    pub fn view(&self) -> Matrix4 {
        matrix::translation(0.0, 0.0, -self.scene.camera_distance)
    }

    /// 模型绕 Y 轴旋转
    pub fn model(&self) -> Matrix4 {
        matrix::rotation_y_deg(self.rotation_deg)
    }
}
