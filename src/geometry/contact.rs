//! Perram–Wertheim contact function.
//!
//! For ellipses with shape tensors `A`, `B` and centres separated by `r`,
//! ```text
//! F(t) = t (1 - t) rᵀ ((1 - t) A + t B)⁻¹ r,    t ∈ [0, 1]
//! ```
//! is concave, and its maximum is the square of the factor by which both ellipses must be
//! scaled about their centres to just touch: below one they overlap, at one they are
//! tangent, above one they are disjoint.

use super::{Ellipse, M2, V2};

const MAX_ITERATIONS: usize = 20;
/// Newton with halving steps towards the ends converges well within this.
const EXACT_ITERATIONS: usize = 64;
const T_EPSILON: f64 = 1e-10;

/// Maximum of the contact function, by Newton–Raphson from `t = ½`. Iteration stops as
/// soon as a value above one is seen, so for disjoint pairs the result is only a lower
/// bound greater than one. `None` on numerical failure: a singular pencil or non-finite
/// state.
pub fn contact_mt(r: V2, a: &M2, b: &M2) -> Option<f64> {
  maximise(r, a, b, MAX_ITERATIONS, true)
}

/// As [`contact_mt`], without the early exit: the full maximum also for disjoint pairs.
pub fn contact_mt_exact(r: V2, a: &M2, b: &M2) -> Option<f64> {
  maximise(r, a, b, EXACT_ITERATIONS, false)
}

fn maximise(r: V2, a: &M2, b: &M2, iterations: usize, early_exit: bool) -> Option<f64> {
  if !(r.x.is_finite() && r.y.is_finite() && a.is_finite() && b.is_finite()) {
    return None;
  }
  let dm = *b - *a;
  let mut t = 0.5;
  let mut f: f64 = 0.0;

  for _ in 0..iterations {
    let d = (*a * (1.0 - t) + *b * t).inverse()?;
    let s = d * r;
    let g = r.dot(s);
    if g == 0.0 {
      // concentric
      return Some(0.0);
    }
    let u = dm * s;
    let g1 = -s.dot(u);
    let g2 = 2.0 * u.dot(d * u);

    let w = t * (1.0 - t);
    let value = w * g;
    if !value.is_finite() || value < 0.0 {
      return None;
    }
    f = f.max(value);
    if early_exit && f > 1.0 {
      return Some(f);
    }

    let f1 = (1.0 - 2.0 * t) * g + w * g1;
    let f2 = -2.0 * g + 2.0 * (1.0 - 2.0 * t) * g1 + w * g2;
    // a segment makes F linear near the end it degenerates at; walk uphill instead
    let mut t1 = if f2 < 0.0 { t - f1 / f2 } else if f1 > 0.0 { 2.0 } else { -1.0 };
    if t1 < 0.0 {
      t1 = 0.5 * t;
    } else if t1 > 1.0 {
      t1 = 0.5 * (t + 1.0);
    }
    if (t1 - t).abs() < T_EPSILON {
      break;
    }
    t = t1;
  }
  Some(f)
}

/// Early-exit contact of two ellipses, see [`contact_mt`].
pub fn contact(e1: &Ellipse, e2: &Ellipse) -> Option<f64> {
  contact_mt(e2.centre - e1.centre, &e1.metric_tensor(), &e2.metric_tensor())
}

/// Square root of the full maximum: the scale about both centres at which the two
/// ellipses just touch.
pub fn contact_distance(e1: &Ellipse, e2: &Ellipse) -> Option<f64> {
  contact_mt_exact(e2.centre - e1.centre, &e1.metric_tensor(), &e2.metric_tensor()).map(f64::sqrt)
}
