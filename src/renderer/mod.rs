//! 渲染器模块
//!
//! 把 `Mesh` 转换为立即模式绘制命令：每个面计算一条平面法线，
//! 然后按 (p1, p2, p3) 的顺序提交一个三角形。
//!
//! # 架构设计
//!
//! - `ImmediateContext`：立即模式图形上下文（begin / normal / vertex / end）
//! - `draw_mesh`：逐面绘制，每次调用都完整重新计算，不做缓存
//! - `CommandRecorder`：记录命令的上下文，用于测试和 `--dump`
//! - `ImmediateBatch`：在 CPU 侧收集顶点，由 gfx 后端每帧上传

use tracing::trace;

use crate::core::config::LoaderConfig;
use crate::core::math::Vector3;
use crate::geometry::math_utils::flat_normal;
use crate::geometry::mesh::{FaceDefect, Mesh};

pub mod recorder;
pub mod vertex;

pub use recorder::{CommandRecorder, DrawCommand, RecordedTriangle};
pub use vertex::{GpuVertex, ImmediateBatch};

/// 图元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
}

/// 立即模式图形上下文
///
/// 调用方假设矩阵和视口已经由窗口层配置好。
pub trait ImmediateContext {
    /// 开始一批图元
    fn begin(&mut self, primitive: Primitive);

    /// 设置当前法线，之后的顶点都使用它
    fn normal(&mut self, normal: Vector3);

    /// 提交一个顶点
    fn vertex(&mut self, position: Vector3);

    /// 结束当前批次
    fn end(&mut self);
}

/// 法线分量顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalSwizzle {
    /// (x, y, z)
    #[default]
    Xyz,
    /// (x, z, z)，与旧版演示程序的画面保持一致
    LegacyXzz,
}

impl NormalSwizzle {
    pub fn apply(self, n: Vector3) -> Vector3 {
        match self {
            NormalSwizzle::Xyz => n,
            NormalSwizzle::LegacyXzz => Vector3::new(n.x, n.z, n.z),
        }
    }
}

/// 绘制选项
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawOptions {
    pub normal_swizzle: NormalSwizzle,
}

impl DrawOptions {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            normal_swizzle: if config.legacy_normals {
                NormalSwizzle::LegacyXzz
            } else {
                NormalSwizzle::Xyz
            },
        }
    }
}

/// 一次 `draw_mesh` 调用的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// 提交的三角形数
    pub triangles: usize,
    /// 顶点不足 3 个、没有提交的面
    pub skipped_short: usize,
    /// 索引越界、被跳过的面
    pub skipped_out_of_range: usize,
    /// 超过 3 个顶点、只用了前三个的面
    pub truncated: usize,
    /// 退化、使用了后备法线的面
    pub degenerate: usize,
}

impl DrawStats {
    /// 是否有任何面没有按三角形原样绘制
    pub fn has_defects(&self) -> bool {
        self.skipped_short + self.skipped_out_of_range + self.truncated + self.degenerate > 0
    }
}

/// 绘制网格
///
/// 对每个面：
/// 1. 取前三个索引对应的点 p1, p2, p3
/// 2. `n = normalize((p1 - p2) × (p1 - p3))`，退化时使用 `FALLBACK_NORMAL`
/// 3. 提交 `normal(n)`，然后依次提交 p1, p2, p3
///
/// 顶点不足 3 个的面不提交任何内容；超过 3 个时只用前三个；
/// 索引越界的面被跳过并计入统计，不会中断绘制。
pub fn draw_mesh<C>(mesh: &Mesh, ctx: &mut C, options: &DrawOptions) -> DrawStats
where
    C: ImmediateContext + ?Sized,
{
    let mut stats = DrawStats::default();

    ctx.begin(Primitive::Triangles);

    for (index, face) in mesh.faces.iter().enumerate() {
        let [p1, p2, p3] = match mesh.triangle(index) {
            Ok(points) => points,
            Err(FaceDefect::Arity { .. }) => {
                stats.skipped_short += 1;
                continue;
            }
            Err(defect) => {
                trace!(%defect, "Skipping face");
                stats.skipped_out_of_range += 1;
                continue;
            }
        };

        if face.arity() > 3 {
            stats.truncated += 1;
        }

        let (normal, degenerate) = flat_normal(p1, p2, p3);
        if degenerate {
            stats.degenerate += 1;
        }

        ctx.normal(options.normal_swizzle.apply(normal));
        ctx.vertex(p1.to_vector());
        ctx.vertex(p2.to_vector());
        ctx.vertex(p3.to_vector());
        stats.triangles += 1;
    }

    ctx.end();

    stats
}
