//! 网格数据结构模块
//!
//! 定义 CPU 侧的网格数据容器，存储从 OBJ 文件加载的点和面。
//! 加载完成后网格只读，所有数据随 `Mesh` 一起释放。

use std::fmt;

use crate::core::error::{MeshLoadError, Result};
use crate::core::math::Vector3;

/// 三维点 (x, y, z)
///
/// 每个 `v` 行生成一个点，创建后不再修改。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 从坐标序列创建点
    ///
    /// 不足三个分量时缺失部分补 0.0，多余的分量被忽略。
    pub fn from_coords(coords: &[f32]) -> Self {
        let at = |i: usize| coords.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2))
    }

    #[inline]
    pub fn to_vector(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// 面
///
/// 每个 `f` 行生成一个面，索引已从 OBJ 的 1 起始转换为 0 起始。
/// 加载时不检查顶点数量和索引范围，见 [`Mesh::defects`]。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    pub indices: Vec<i32>,
}

impl Face {
    pub fn new(indices: Vec<i32>) -> Self {
        Self { indices }
    }

    /// 面的顶点数量
    #[inline]
    pub fn arity(&self) -> usize {
        self.indices.len()
    }
}

/// 面数据缺陷
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceDefect {
    /// 面的顶点数不是 3
    Arity { face: usize, arity: usize },

    /// 索引超出点列表范围
    IndexOutOfRange {
        face: usize,
        slot: usize,
        index: i32,
        point_count: usize,
    },
}

impl fmt::Display for FaceDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceDefect::Arity { face, arity } => {
                write!(f, "face {} has {} indices, expected 3", face, arity)
            }
            FaceDefect::IndexOutOfRange { face, slot, index, point_count } => write!(
                f,
                "face {} index #{} is {}, outside 0..{}",
                face, slot, index, point_count
            ),
        }
    }
}

/// 从一个 OBJ 文件加载的网格
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// 网格名称（通常是文件名）
    pub name: Option<String>,

    /// 按文件顺序排列的点
    pub points: Vec<Point>,

    /// 按文件顺序排列的面
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.faces.is_empty()
    }

    /// 按有符号索引取点，越界（包括负数）返回 `None`
    pub fn point(&self, index: i32) -> Option<Point> {
        usize::try_from(index).ok().and_then(|i| self.points.get(i).copied())
    }

    /// 解析第 `face` 个面的前三个点
    ///
    /// 顶点数不足三个返回 `Arity`，前三个索引中有越界的返回 `IndexOutOfRange`。
    /// 超过三个的索引不参与。
    pub fn triangle(&self, face: usize) -> std::result::Result<[Point; 3], FaceDefect> {
        let indices = self
            .faces
            .get(face)
            .map(|f| f.indices.as_slice())
            .unwrap_or(&[]);

        let [a, b, c] = match indices {
            [a, b, c, ..] => [*a, *b, *c],
            _ => {
                return Err(FaceDefect::Arity {
                    face,
                    arity: indices.len(),
                })
            }
        };

        let resolve = |slot: usize, index: i32| {
            self.point(index).ok_or(FaceDefect::IndexOutOfRange {
                face,
                slot,
                index,
                point_count: self.points.len(),
            })
        };

        Ok([resolve(0, a)?, resolve(1, b)?, resolve(2, c)?])
    }

    /// 列出所有面缺陷
    ///
    /// 检查：
    /// - 每个面恰好 3 个索引
    /// - 所有索引都在 `0..point_count` 内
    pub fn defects(&self) -> Vec<FaceDefect> {
        let point_count = self.points.len();
        let mut defects = Vec::new();

        for (face, f) in self.faces.iter().enumerate() {
            if f.arity() != 3 {
                defects.push(FaceDefect::Arity { face, arity: f.arity() });
            }

            for (slot, &index) in f.indices.iter().enumerate() {
                if self.point(index).is_none() {
                    defects.push(FaceDefect::IndexOutOfRange {
                        face,
                        slot,
                        index,
                        point_count,
                    });
                }
            }
        }

        defects
    }

    /// 验证网格，返回遇到的第一个缺陷
    pub fn validate(&self) -> Result<()> {
        match self.defects().into_iter().next() {
            Some(defect) => Err(MeshLoadError::Validation(defect).into()),
            None => Ok(()),
        }
    }

    /// 轴对齐包围盒 (min, max)，没有点时返回 `None`
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.points.first()?;

        Some(self.points.iter().fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Point::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        let mut mesh = Mesh::with_name("tri");
        mesh.points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        mesh.faces = vec![Face::new(vec![0, 1, 2])];
        mesh
    }

    #[test]
    fn test_point_from_short_coords() {
        assert_eq!(Point::from_coords(&[1.0, 2.0]), Point::new(1.0, 2.0, 0.0));
        assert_eq!(Point::from_coords(&[1.0, 2.0, 3.0, 4.0]), Point::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_triangle_resolves_points() {
        let mesh = unit_triangle();
        let [p1, p2, p3] = mesh.triangle(0).unwrap();

        assert_eq!(p1, Point::new(0.0, 0.0, 0.0));
        assert_eq!(p2, Point::new(1.0, 0.0, 0.0));
        assert_eq!(p3, Point::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_triangle_short_face() {
        let mut mesh = unit_triangle();
        mesh.faces.push(Face::new(vec![0, 1]));

        assert_eq!(mesh.triangle(1), Err(FaceDefect::Arity { face: 1, arity: 2 }));
    }

    #[test]
    fn test_triangle_ignores_extra_indices() {
        let mut mesh = unit_triangle();
        mesh.faces.push(Face::new(vec![2, 1, 0, 99]));

        assert!(mesh.triangle(1).is_ok());
    }

    #[test]
    fn test_negative_index_is_out_of_range() {
        let mut mesh = unit_triangle();
        mesh.faces.push(Face::new(vec![-1, 0, 1]));

        assert_eq!(
            mesh.triangle(1),
            Err(FaceDefect::IndexOutOfRange {
                face: 1,
                slot: 0,
                index: -1,
                point_count: 3,
            })
        );
    }

    #[test]
    fn test_defects_lists_everything() {
        let mut mesh = unit_triangle();
        mesh.faces.push(Face::new(vec![0, 1, 2, 3]));
        mesh.faces.push(Face::new(vec![0, 5, 1]));

        let defects = mesh.defects();
        assert_eq!(defects.len(), 3);
        assert_eq!(defects[0], FaceDefect::Arity { face: 1, arity: 4 });
        assert!(matches!(defects[1], FaceDefect::IndexOutOfRange { face: 1, slot: 3, index: 3, .. }));
        assert!(matches!(defects[2], FaceDefect::IndexOutOfRange { face: 2, slot: 1, index: 5, .. }));
    }

    #[test]
    fn test_validate_reports_first_defect() {
        let mut mesh = unit_triangle();
        mesh.faces.push(Face::new(vec![0, 1, 7]));

        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("face 1 index #2 is 7"));
    }

    #[test]
    fn test_bounds() {
        let mut mesh = unit_triangle();
        mesh.points.push(Point::new(-2.0, 0.5, 3.0));

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point::new(-2.0, 0.0, 0.0));
        assert_eq!(max, Point::new(1.0, 1.0, 3.0));
    }
}
