//! Scalar and tensor fields over the plane, and the vector field being plotted.

use {
  crate::geometry::P2,
  std::fmt::{Debug, Formatter}
};

pub mod bilinear;
pub mod metric;
pub mod curvature;
#[cfg(test)] mod tests;

pub use {
  bilinear::Bilinear,
  metric::MetricTensorField
};

type ValueFn = dyn Fn(P2) -> Option<(f64, f64)> + Send + Sync;
type CurvatureFn = dyn Fn(P2) -> Option<f64> + Send + Sync;

/// The vector field: direction angle and magnitude at a point, `None` where there is no
/// data. Curvature, positive when the streamlines turn left, comes from an optional
/// callback, or is estimated by tracing streamlines.
pub struct Field {
  value: Box<ValueFn>,
  curvature: Option<Box<CurvatureFn>>
}

impl Field {
  pub fn new(value: impl Fn(P2) -> Option<(f64, f64)> + Send + Sync + 'static) -> Self {
    Self { value: Box::new(value), curvature: None }
  }

  /// Same direction and magnitude everywhere.
  pub fn uniform(angle: f64, magnitude: f64) -> Self {
    Self::new(move |_| Some((angle, magnitude)))
      .with_curvature(|_| Some(0.0))
  }

  pub fn with_curvature(mut self, curvature: impl Fn(P2) -> Option<f64> + Send + Sync + 'static) -> Self {
    self.curvature = Some(Box::new(curvature));
    self
  }

  /// `(angle, magnitude)` at `p`.
  pub fn value(&self, p: P2) -> Option<(f64, f64)> {
    (self.value)(p)
      .filter(|(angle, magnitude)| angle.is_finite() && magnitude.is_finite())
  }

  /// Signed curvature at `p`; `step` is the trace length used when no callback is set.
  pub fn curvature(&self, p: P2, step: f64) -> Option<f64> {
    match &self.curvature {
      Some(k) => k(p),
      None => curvature::estimate(self, p, step)
    }
  }

  pub fn has_curvature(&self) -> bool {
    self.curvature.is_some()
  }
}

impl Debug for Field {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Field")
      .field("curvature", &if self.curvature.is_some() { "callback" } else { "estimated" })
      .finish()
  }
}
