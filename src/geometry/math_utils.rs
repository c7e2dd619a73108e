//! 几何数学工具模块
//!
//! 面法线计算。边向量取 `p1 - p2` 和 `p1 - p3`，
//! 而不是更常见的 `p2 - p1` 和 `p3 - p1`。两种写法的叉积相同
//! （两个边向量同时取反），因此逆时针三角形的法线朝向观察者。

use crate::core::math::{Vec3, Vector3};
use super::mesh::Point;

/// 叉积长度不超过此值的三角形视为退化（共线或重合）
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// 退化三角形使用的法线
pub const FALLBACK_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// 在 f64 中计算 `(p1 - p2) × (p1 - p3)`
///
/// 有限的 f32 坐标在 f64 中做叉积不会溢出。
fn cross_f64(p1: Point, p2: Point, p3: Point) -> Vec3<f64> {
    let wide = |p: Point| Vec3::new(p.x as f64, p.y as f64, p.z as f64);
    let p1 = wide(p1);
    let va = p1 - wide(p2);
    let vb = p1 - wide(p3);

    va.cross(&vb)
}

/// 未归一化的面法线 `(p1 - p2) × (p1 - p3)`
///
/// 其长度等于三角形面积的两倍。坐标极大时结果可能超出 f32 范围。
pub fn face_cross(p1: Point, p2: Point, p3: Point) -> Vector3 {
    let c = cross_f64(p1, p2, p3);
    Vector3::new(c.x as f32, c.y as f32, c.z as f32)
}

/// 三角形是否退化
///
/// 叉积过短，或者坐标本身不是有限值（inf、NaN）时都算退化。
pub fn is_degenerate(p1: Point, p2: Point, p3: Point) -> bool {
    face_normal(p1, p2, p3).is_none()
}

/// 单位面法线，退化三角形返回 `None`
///
/// 返回的法线各分量一定是有限值。
///
/// # 示例
///
/// ```rust
/// use flat_obj_viewer::geometry::math_utils::face_normal;
/// use flat_obj_viewer::geometry::Point;
///
/// let n = face_normal(
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
/// )
/// .unwrap();
/// assert!((n.z - 1.0).abs() < 1e-6);
/// ```
pub fn face_normal(p1: Point, p2: Point, p3: Point) -> Option<Vector3> {
    let cross = cross_f64(p1, p2, p3);
    let norm = cross.norm();
    if !norm.is_finite() || norm <= DEGENERATE_EPSILON {
        return None;
    }

    let n = cross / norm;
    let n = Vector3::new(n.x as f32, n.y as f32, n.z as f32);
    n.iter().all(|c| c.is_finite()).then_some(n)
}

/// 平面着色使用的法线
///
/// 返回 `(法线, 是否退化)`；退化时法线为 [`FALLBACK_NORMAL`]。
pub fn flat_normal(p1: Point, p2: Point, p3: Point) -> (Vector3, bool) {
    match face_normal(p1, p2, p3) {
        Some(n) => (n, false),
        None => (Vector3::from(FALLBACK_NORMAL), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32, z: f32) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn test_unit_triangle_normal() {
        let n = face_normal(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)).unwrap();

        assert!((n.norm() - 1.0).abs() < 1e-6);
        assert!(n.x.abs() < 1e-6);
        assert!(n.y.abs() < 1e-6);
        assert!((n.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cross_uses_p1_relative_edges() {
        // va = p1 - p2 = (-1, 0, 0), vb = p1 - p3 = (0, -1, 0), va × vb = (0, 0, 1)
        let cross = face_cross(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0));
        assert_eq!(cross, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_winding_flips_normal() {
        let n = face_normal(p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0)).unwrap();
        assert!((n.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normal_is_perpendicular() {
        let (a, b, c) = (p(1.0, 2.0, 3.0), p(-4.0, 0.5, 2.0), p(0.0, -1.0, 5.0));
        let n = face_normal(a, b, c).unwrap();

        let e1 = b.to_vector() - a.to_vector();
        let e2 = c.to_vector() - a.to_vector();
        assert!(n.dot(&e1).abs() < 1e-5);
        assert!(n.dot(&e2).abs() < 1e-5);
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(2.0, 2.0, 2.0));

        assert_eq!(face_cross(a, b, c).norm(), 0.0);
        assert!(is_degenerate(a, b, c));
        assert!(face_normal(a, b, c).is_none());
    }

    #[test]
    fn test_coincident_points_use_fallback() {
        let a = p(3.0, 3.0, 3.0);
        let (n, degenerate) = flat_normal(a, a, a);

        assert!(degenerate);
        assert!(n.iter().all(|c| c.is_finite()));
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_huge_coordinates_keep_finite_normal() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(1e20, 0.0, 0.0), p(0.0, 1e20, 0.0));
        let (n, degenerate) = flat_normal(a, b, c);

        assert!(!degenerate);
        assert!(n.iter().all(|c| c.is_finite()));
        assert!((n.z - 1.0).abs() < 1e-6);

        let (a, b, c) = (p(-3e38, 0.0, 0.0), p(3e38, 0.0, 0.0), p(0.0, 3e38, 0.0));
        let n = face_normal(a, b, c).unwrap();
        assert!(n.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_non_finite_coordinates_are_degenerate() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(f32::INFINITY, 0.0, 0.0), p(0.0, 1.0, 0.0));
        assert!(is_degenerate(a, b, c));

        let (n, degenerate) = flat_normal(a, b, c);
        assert!(degenerate);
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));

        assert!(face_normal(p(f32::NAN, 0.0, 0.0), b, c).is_none());
    }
}
