//! Planar primitives. Every coordinate lives in [`WorldSpace`], the coordinate system of
//! the vector field and of its domain; the origin is wherever the caller's data puts it.

use euclid::{Point2D, Vector2D, Box2D};

pub mod matrix;
pub mod polynomial;
pub mod ellipse;
pub mod contact;
pub mod polyline;

pub use {
  matrix::M2,
  ellipse::{Ellipse, Conic, intersect},
  contact::{contact, contact_mt, contact_mt_exact, contact_distance},
  polyline::Polyline
};

/// Field coordinate basis
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldSpace;

pub type P2 = Point2D<f64, WorldSpace>;
pub type V2 = Vector2D<f64, WorldSpace>;

pub trait BoundingBox<T, S> {
  fn bounding_box(&self) -> Box2D<T, S>;
}

/// Unit vector at angle `theta` from the x axis.
#[inline]
pub fn unit(theta: f64) -> V2 {
  let (s, c) = theta.sin_cos();
  V2::new(c, s)
}

#[inline]
pub fn rotate(v: V2, theta: f64) -> V2 {
  let (s, c) = theta.sin_cos();
  V2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// `v` turned a quarter counter-clockwise.
#[inline]
pub fn left_normal(v: V2) -> V2 {
  V2::new(-v.y, v.x)
}

#[inline]
pub fn angle(v: V2) -> f64 {
  v.y.atan2(v.x)
}

/// Distance from `p` to the segment `ab`.
pub fn segment_distance(p: P2, a: P2, b: P2) -> f64 {
  let ab = b - a;
  let len2 = ab.square_length();
  let t = if len2 > 0.0 { ((p - a).dot(ab) / len2).clamp(0.0, 1.0) } else { 0.0 };
  (p - a.lerp(b, t)).length()
}

/// Signed curvature of the circle through `a`, `b`, `c`; positive when the points turn
/// counter-clockwise. `None` when two of the points coincide.
pub fn circumcurvature(a: P2, b: P2, c: P2) -> Option<f64> {
  let (ab, bc, ca) = (b - a, c - b, a - c);
  let denom = ab.length() * bc.length() * ca.length();
  if !(denom > 0.0) || !denom.is_finite() {
    return None;
  }
  Some(2.0 * ab.cross(bc) / denom)
}
