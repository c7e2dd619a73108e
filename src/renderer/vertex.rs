//! 顶点数据定义
//!
//! `GpuVertex` 是上传到 GPU 的顶点格式；`ImmediateBatch` 把立即模式调用
//! 收集成顶点数组，供 gfx 后端每帧写入顶点缓冲。
//!
//! # 设计说明
//!
//! - 使用 `#[repr(C)]` 确保内存布局与着色器一致
//! - 实现 `Pod` 和 `Zeroable` trait 以支持零拷贝传输到 GPU

use bytemuck::{Pod, Zeroable};

use super::{ImmediateContext, Primitive};
use crate::core::math::Vector3;

/// GPU 顶点
///
/// # 内存布局
///
/// - `position`：前 12 字节（3 个 f32）
/// - `normal`：后 12 字节（3 个 f32）
///
/// 总大小：24 字节
#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl GpuVertex {
    #[inline]
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// 收集立即模式调用的顶点批次
///
/// 每个顶点带上提交时的当前法线。`begin`/`end` 之外提交的顶点被丢弃。
#[derive(Debug, Default)]
pub struct ImmediateBatch {
    vertices: Vec<GpuVertex>,
    current_normal: [f32; 3],
    open: bool,
}

impl ImmediateBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空顶点，准备下一帧
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.open = false;
    }

    /// 三角形列表顶点
    pub fn vertices(&self) -> &[GpuVertex] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// 线框模式使用的线段列表：每个三角形三条边
    pub fn line_list(&self) -> Vec<GpuVertex> {
        let mut lines = Vec::with_capacity(self.triangle_count() * 6);

        for triangle in self.vertices.chunks_exact(3) {
            let (a, b, c) = (triangle[0], triangle[1], triangle[2]);
            lines.extend_from_slice(&[a, b, b, c, c, a]);
        }

        lines
    }
}

impl ImmediateContext for ImmediateBatch {
    fn begin(&mut self, primitive: Primitive) {
        match primitive {
            Primitive::Triangles => self.open = true,
        }
    }

    fn normal(&mut self, normal: Vector3) {
        self.current_normal = normal.into();
    }

    fn vertex(&mut self, position: Vector3) {
        if self.open {
            self.vertices.push(GpuVertex::new(position.into(), self.current_normal));
        }
    }

    fn end(&mut self) {
        // 不完整的三角形丢弃
        let complete = self.vertices.len() - self.vertices.len() % 3;
        self.vertices.truncate(complete);
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::mesh::{Face, Mesh, Point};
    use crate::renderer::{draw_mesh, DrawOptions};
    use std::mem::size_of;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        mesh.faces = vec![Face::new(vec![0, 1, 2]), Face::new(vec![0, 2, 3])];
        mesh
    }

    #[test]
    fn test_vertex_size() {
        // 3*4 + 3*4 = 24 bytes
        assert_eq!(size_of::<GpuVertex>(), 24);
        assert_eq!(std::mem::align_of::<GpuVertex>(), 4);
    }

    #[test]
    fn test_batch_collects_flat_normals() {
        let mut batch = ImmediateBatch::new();
        draw_mesh(&quad(), &mut batch, &DrawOptions::default());

        assert_eq!(batch.triangle_count(), 2);
        assert!(batch.vertices().iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert_eq!(batch.vertices()[3].position, [0.0, 0.0, 0.0]);
        assert_eq!(batch.vertices()[5].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_line_list_has_three_edges_per_triangle() {
        let mut batch = ImmediateBatch::new();
        draw_mesh(&quad(), &mut batch, &DrawOptions::default());

        let lines = batch.line_list();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(lines[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(lines[5].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_clear_between_frames() {
        let mut batch = ImmediateBatch::new();
        draw_mesh(&quad(), &mut batch, &DrawOptions::default());
        batch.clear();
        draw_mesh(&quad(), &mut batch, &DrawOptions::default());

        assert_eq!(batch.triangle_count(), 2);
    }

    #[test]
    fn test_vertices_outside_batch_ignored() {
        let mut batch = ImmediateBatch::new();
        batch.vertex(Vector3::new(1.0, 2.0, 3.0));
        assert!(batch.vertices().is_empty());

        batch.begin(Primitive::Triangles);
        batch.vertex(Vector3::zeros());
        batch.end();
        assert!(batch.vertices().is_empty());
    }
}
