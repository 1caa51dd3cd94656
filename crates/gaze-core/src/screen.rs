// ─────────────────────────────────────────────────────────────────────
// Gaze Analysis Kernel — Screen Mapper (ray/plane projection)
// ─────────────────────────────────────────────────────────────────────
//! Projects 3D gaze onto a calibrated planar screen.
//!
//! The screen is given by three corners in tracker space: top-left,
//! top-right and bottom-left. The gaze ray origin→point is intersected with
//! the screen plane and the hit is expressed in the corner basis, so that
//! (0,0) is the top-left and (1,1) the bottom-right corner. Hits off the
//! screen yield coordinates outside [0,1].

use gaze_types::{Vec2, Vec3};

/// Relative tolerance for collinear calibration and parallel rays.
const DEGENERACY_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Basis {
    top_left: Vec3,
    e1: Vec3,
    e2: Vec3,
    normal: Vec3,
    // Gram matrix entries and determinant for solving the (u, v) system
    // on non-orthogonal bases.
    g11: f64,
    g12: f64,
    g22: f64,
    det: f64,
}

/// Calibrated screen plane. A degenerate calibration is kept so the
/// configuration can be inspected, but every projection reports
/// unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapper {
    top_left: Vec3,
    top_right: Vec3,
    bottom_left: Vec3,
    basis: Option<Basis>,
}

impl ScreenMapper {
    pub fn new(top_left: Vec3, top_right: Vec3, bottom_left: Vec3) -> Self {
        let e1 = top_right - top_left;
        let e2 = bottom_left - top_left;
        let normal = e1.cross(e2);
        let scale = e1.norm() * e2.norm();

        let valid = [top_left, top_right, bottom_left].iter().all(|p| p.is_finite())
            && scale > 0.0
            && normal.norm() > DEGENERACY_EPS * scale;

        let basis = if valid {
            let (g11, g12, g22) = (e1.dot(e1), e1.dot(e2), e2.dot(e2));
            Some(Basis {
                top_left,
                e1,
                e2,
                normal,
                g11,
                g12,
                g22,
                det: g11 * g22 - g12 * g12,
            })
        } else {
            log::warn!(
                "degenerate screen calibration ({top_left:?}, {top_right:?}, {bottom_left:?}): \
                 screen coordinates unavailable"
            );
            None
        };

        Self {
            top_left,
            top_right,
            bottom_left,
            basis,
        }
    }

    /// Build from nine scalars: top-left, top-right, bottom-left (x, y, z each).
    pub fn from_scalars(v: [f64; 9]) -> Self {
        Self::new(
            Vec3::new(v[0], v[1], v[2]),
            Vec3::new(v[3], v[4], v[5]),
            Vec3::new(v[6], v[7], v[8]),
        )
    }

    pub fn is_degenerate(&self) -> bool {
        self.basis.is_none()
    }

    pub fn corners(&self) -> (Vec3, Vec3, Vec3) {
        (self.top_left, self.top_right, self.bottom_left)
    }

    /// Normalized screen coordinate of the gaze ray `origin → point`.
    ///
    /// `None` when the calibration is degenerate, the gaze vector is zero,
    /// the ray runs parallel to the screen or points away from it.
    pub fn project(&self, origin: Vec3, point: Vec3) -> Option<Vec2> {
        let b = self.basis.as_ref()?;
        let dir = point - origin;
        let denom = b.normal.dot(dir);
        if denom.abs() <= DEGENERACY_EPS * b.normal.norm() * dir.norm() || dir.norm() == 0.0 {
            return None;
        }
        let t = b.normal.dot(b.top_left - origin) / denom;
        if t < 0.0 {
            return None;
        }
        let hit = origin + dir * t;

        let d = hit - b.top_left;
        let (d1, d2) = (d.dot(b.e1), d.dot(b.e2));
        let u = (b.g22 * d1 - b.g12 * d2) / b.det;
        let v = (b.g11 * d2 - b.g12 * d1) / b.det;
        Some(Vec2::new(u, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 500 × 300 screen in the plane z = 600, top-left at (-250, 300).
    fn screen() -> ScreenMapper {
        ScreenMapper::new(
            Vec3::new(-250.0, 300.0, 600.0),
            Vec3::new(250.0, 300.0, 600.0),
            Vec3::new(-250.0, 0.0, 600.0),
        )
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_center_projection() {
        let s = screen();
        let p = s
            .project(Vec3::new(0.0, 150.0, 0.0), Vec3::new(0.0, 150.0, 300.0))
            .unwrap();
        assert!(approx(p, Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn test_corners() {
        let s = screen();
        let o = Vec3::ZERO;
        assert!(approx(
            s.project(o, Vec3::new(-250.0, 300.0, 600.0)).unwrap(),
            Vec2::new(0.0, 0.0)
        ));
        assert!(approx(
            s.project(o, Vec3::new(250.0, 0.0, 600.0)).unwrap(),
            Vec2::new(1.0, 1.0)
        ));
    }

    #[test]
    fn test_point_before_plane_extends_ray() {
        let s = screen();
        // point halfway to the screen, ray continues to (250, 300, 600)
        let p = s
            .project(Vec3::ZERO, Vec3::new(125.0, 150.0, 300.0))
            .unwrap();
        assert!(approx(p, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_off_screen_outside_unit_square() {
        let p = screen()
            .project(Vec3::ZERO, Vec3::new(500.0, 150.0, 600.0))
            .unwrap();
        assert!(p.x > 1.0);
    }

    #[test]
    fn test_collinear_calibration_unavailable() {
        let s = ScreenMapper::from_scalars([0.0, 0.0, 600.0, 1.0, 1.0, 600.0, 2.0, 2.0, 600.0]);
        assert!(s.is_degenerate());
        assert!(s.project(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_coincident_calibration_unavailable() {
        let c = Vec3::new(1.0, 1.0, 1.0);
        assert!(ScreenMapper::new(c, c, c).is_degenerate());
    }

    #[test]
    fn test_parallel_ray_unavailable() {
        assert!(screen()
            .project(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_ray_away_from_screen_unavailable() {
        let s = screen();
        assert!(s.project(Vec3::ZERO, Vec3::new(0.0, 150.0, -600.0)).is_none());
        // origin beyond the plane, looking further away
        let behind = Vec3::new(0.0, 150.0, 700.0);
        assert!(s.project(behind, Vec3::new(0.0, 150.0, 800.0)).is_none());
    }

    #[test]
    fn test_zero_gaze_vector_unavailable() {
        let o = Vec3::new(0.0, 0.0, 10.0);
        assert!(screen().project(o, o).is_none());
    }

    #[test]
    fn test_skewed_basis() {
        // parallelogram screen: bottom-left shifted right by 100
        let s = ScreenMapper::new(
            Vec3::new(0.0, 100.0, 10.0),
            Vec3::new(200.0, 100.0, 10.0),
            Vec3::new(100.0, 0.0, 10.0),
        );
        let p = s
            .project(Vec3::new(150.0, 50.0, 0.0), Vec3::new(150.0, 50.0, 10.0))
            .unwrap();
        assert!(approx(p, Vec2::new(0.5, 0.5)));
    }
}
