//! 数学类型
//!
//! 基于 `nalgebra` 的类型别名和少量矩阵辅助函数。

pub use nalgebra::{Matrix4 as Mat4, Vector3 as Vec3};

pub type Vector3 = Vec3<f32>;
pub type Matrix4 = Mat4<f32>;

/// 数学常量
pub mod constants {
    /// 角度转弧度的系数
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;
}

/// 矩阵辅助函数
pub mod matrix {
    use super::*;

    /// 创建平移矩阵
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// 创建绕 Y 轴旋转的矩阵（角度）
    pub fn rotation_y_deg(degrees: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::y_axis(), degrees * constants::DEG_TO_RAD)
    }

    /// 创建透视投影矩阵（右手系，OpenGL 深度范围 -1..1）
    pub fn perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
        Matrix4::new_perspective(aspect, fov_y_deg * constants::DEG_TO_RAD, near, far)
    }

    /// OpenGL 深度范围 (-1..1) 到 wgpu 深度范围 (0..1) 的修正矩阵
    #[rustfmt::skip]
    pub fn opengl_to_wgpu() -> Matrix4 {
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.5,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
