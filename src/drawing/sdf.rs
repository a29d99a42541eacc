use {
  crate::geometry::{BoundingBox, Ellipse, P2, V2, WorldSpace, rotate, segment_distance},
  euclid::{Box2D, Point2D},
  num_traits::Float
};

/// Signed distance function
pub trait SDF<T> {
  fn sdf(&self, pixel: Point2D<T, WorldSpace>) -> T;
}

/// First order estimate from the implicit form, exact for circles and accurate near the
/// outline, which is all antialiasing needs.
impl SDF<f64> for Ellipse {
  fn sdf(&self, pixel: P2) -> f64 {
    let local = rotate(pixel - self.centre, -self.theta);
    if !(self.minor > 0.0) {
      let tip = V2::new(self.major, 0.0);
      return segment_distance(local.to_point(), (-tip).to_point(), tip.to_point());
    }
    let (a, b) = (self.major, self.minor);
    let k = V2::new(local.x / a, local.y / b).length();
    if k == 0.0 {
      return -b;
    }
    let gradient = V2::new(local.x / (a * a), local.y / (b * b)).length() / k;
    (k - 1.0) / gradient
  }
}

/// Open polyline of a given half-width.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
  pub points: Vec<P2>,
  pub radius: f64
}

impl Stroke {
  pub fn new(points: Vec<P2>, radius: f64) -> Self {
    Self { points, radius }
  }

  pub fn segment(a: P2, b: P2, radius: f64) -> Self {
    Self::new(vec![a, b], radius)
  }
}

impl SDF<f64> for Stroke {
  fn sdf(&self, pixel: P2) -> f64 {
    let distance = match self.points.as_slice() {
      [] => f64::INFINITY,
      [p] => (pixel - *p).length(),
      points => points.windows(2)
        .map(|w| segment_distance(pixel, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
    };
    distance - self.radius
  }
}

impl BoundingBox<f64, WorldSpace> for Stroke {
  fn bounding_box(&self) -> Box2D<f64, WorldSpace> {
    Box2D::from_points(&self.points).inflate(self.radius, self.radius)
  }
}

/// Union of two SDFs.
#[derive(Clone, Copy, Debug)]
pub struct Union<S1, S2> {
  pub s1: S1,
  pub s2: S2,
}

impl<T, S1, S2> SDF<T> for Union<S1, S2>
  where T: Float,
        S1: SDF<T>,
        S2: SDF<T> {
  fn sdf(&self, pixel: Point2D<T, WorldSpace>) -> T {
    self.s1.sdf(pixel).min(self.s2.sdf(pixel))
  }
}

impl<S1, S2> BoundingBox<f64, WorldSpace> for Union<S1, S2>
  where S1: BoundingBox<f64, WorldSpace>,
        S2: BoundingBox<f64, WorldSpace> {
  fn bounding_box(&self) -> Box2D<f64, WorldSpace> {
    self.s1.bounding_box().union(&self.s2.bounding_box())
  }
}
