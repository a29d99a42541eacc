//! Streamline curvature by numerical tracing.

use {
  super::Field,
  crate::geometry::{P2, V2, unit, circumcurvature}
};

const SUBSTEPS: usize = 4;

fn direction(field: &Field, p: P2) -> Option<V2> {
  field.value(p).map(|(angle, _)| unit(angle))
}

/// Follow the streamline through `p` for arc length `h` (negative to go backwards) with
/// classical Runge–Kutta.
fn trace(field: &Field, mut p: P2, h: f64) -> Option<P2> {
  let h = h / SUBSTEPS as f64;
  for _ in 0..SUBSTEPS {
    let k1 = direction(field, p)?;
    let k2 = direction(field, p + k1 * (0.5 * h))?;
    let k3 = direction(field, p + k2 * (0.5 * h))?;
    let k4 = direction(field, p + k3 * h)?;
    p += (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0);
  }
  Some(p)
}

/// Signed curvature of the streamline through `p`, positive when it turns left: the
/// curvature of the circle through the points reached by tracing `step` forwards and
/// backwards. `None` when the trace leaves the field.
pub fn estimate(field: &Field, p: P2, step: f64) -> Option<f64> {
  if !(step > 0.0) {
    return None;
  }
  let ahead = trace(field, p, step)?;
  let behind = trace(field, p, -step)?;
  circumcurvature(behind, p, ahead)
}
