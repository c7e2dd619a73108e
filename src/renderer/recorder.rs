//! 命令记录上下文
//!
//! 把立即模式调用原样记录下来，便于检查绘制顺序。

use super::{ImmediateContext, Primitive};
use crate::core::math::Vector3;

/// 一条立即模式命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Begin(Primitive),
    Normal([f32; 3]),
    Vertex([f32; 3]),
    End,
}

/// 由命令流重新组装出的三角形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedTriangle {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

/// 记录所有命令的 `ImmediateContext`
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// 按 `Triangles` 批次把顶点每三个组成一个三角形
    ///
    /// 每个三角形取其第一个顶点提交时的当前法线。
    pub fn triangles(&self) -> Vec<RecordedTriangle> {
        let mut triangles = Vec::new();
        let mut normal = [0.0; 3];
        let mut pending: Vec<([f32; 3], [f32; 3])> = Vec::with_capacity(3);

        for command in &self.commands {
            match *command {
                DrawCommand::Begin(Primitive::Triangles) | DrawCommand::End => pending.clear(),
                DrawCommand::Normal(n) => normal = n,
                DrawCommand::Vertex(v) => {
                    pending.push((normal, v));
                    if pending.len() == 3 {
                        triangles.push(RecordedTriangle {
                            normal: pending[0].0,
                            vertices: [pending[0].1, pending[1].1, pending[2].1],
                        });
                        pending.clear();
                    }
                }
            }
        }

        triangles
    }
}

impl ImmediateContext for CommandRecorder {
    fn begin(&mut self, primitive: Primitive) {
        self.commands.push(DrawCommand::Begin(primitive));
    }

    fn normal(&mut self, normal: Vector3) {
        self.commands.push(DrawCommand::Normal(normal.into()));
    }

    fn vertex(&mut self, position: Vector3) {
        self.commands.push(DrawCommand::Vertex(position.into()));
    }

    fn end(&mut self) {
        self.commands.push(DrawCommand::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangles_regroup_vertices() {
        let mut recorder = CommandRecorder::new();
        recorder.begin(Primitive::Triangles);
        recorder.normal(Vector3::new(0.0, 1.0, 0.0));
        for i in 0..6 {
            recorder.vertex(Vector3::new(i as f32, 0.0, 0.0));
        }
        recorder.end();

        let triangles = recorder.triangles();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1].vertices[0], [3.0, 0.0, 0.0]);
        assert_eq!(triangles[1].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_incomplete_triangle_dropped_at_end() {
        let mut recorder = CommandRecorder::new();
        recorder.begin(Primitive::Triangles);
        recorder.vertex(Vector3::zeros());
        recorder.vertex(Vector3::zeros());
        recorder.end();

        assert!(recorder.triangles().is_empty());

        recorder.clear();
        assert!(recorder.commands().is_empty());
    }
}
