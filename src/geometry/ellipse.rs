use {
  super::{P2, V2, M2, WorldSpace, BoundingBox, polynomial, rotate},
  crate::error::{Error, Result},
  euclid::Box2D
};

/// Ellipse with semi-axes `major ≥ minor ≥ 0`, the major axis at angle `theta` from the
/// x axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ellipse {
  pub major: f64,
  pub minor: f64,
  pub theta: f64,
  pub centre: P2
}

/// General conic `a x² + b xy + c y² + d x + e y + f = 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Conic {
  pub a: f64,
  pub b: f64,
  pub c: f64,
  pub d: f64,
  pub e: f64,
  pub f: f64
}

impl Ellipse {
  /// Axes are taken by magnitude and swapped (with a quarter turn) if given out of order.
  pub fn new(major: f64, minor: f64, theta: f64, centre: P2) -> Self {
    let (major, minor) = (major.abs(), minor.abs());
    if minor > major {
      Self { major: minor, minor: major, theta: theta + std::f64::consts::FRAC_PI_2, centre }
    } else {
      Self { major, minor, theta, centre }
    }
  }

  pub fn circle(radius: f64, centre: P2) -> Self {
    Self::new(radius, radius, 0.0, centre)
  }

  pub fn area(&self) -> f64 {
    std::f64::consts::PI * self.major * self.minor
  }

  /// Shape tensor `R(θ) diag(major², minor²) R(θ)ᵀ`; the ellipse is the set
  /// `{ c + M^½ u : |u| ≤ 1 }`.
  pub fn metric_tensor(&self) -> M2 {
    M2::from_eigen(self.major * self.major, self.minor * self.minor, self.theta)
  }

  pub fn from_metric_tensor(m: M2, centre: P2) -> Result<Self> {
    let (l1, l2, theta) = m.sym_eigen();
    if !(l1 > 0.0) || !l1.is_finite() || !l2.is_finite() {
      return Err(Error::Numerical(format!("metric tensor {m:?} is not positive-definite")));
    }
    // rounding may leave a segment with a marginally negative eigenvalue
    if l2 < -1e-12 * l1 {
      return Err(Error::Numerical(format!("metric tensor {m:?} is indefinite")));
    }
    Ok(Self { major: l1.sqrt(), minor: l2.max(0.0).sqrt(), theta, centre })
  }

  pub fn translate(self, offset: V2) -> Self {
    Self { centre: self.centre + offset, ..self }
  }

  /// Conic form, scaled by `major² minor²` so that segments stay finite.
  pub fn conic(&self) -> Conic {
    self.conic_about(P2::origin())
  }

  /// Conic form in coordinates relative to `origin`.
  fn conic_about(&self, origin: P2) -> Conic {
    let (s, c) = self.theta.sin_cos();
    let (a2, b2) = (self.major * self.major, self.minor * self.minor);
    let (cx, cy) = (self.centre.x - origin.x, self.centre.y - origin.y);
    let qa = b2 * c * c + a2 * s * s;
    let qb = 2.0 * c * s * (b2 - a2);
    let qc = b2 * s * s + a2 * c * c;
    Conic {
      a: qa,
      b: qb,
      c: qc,
      d: -2.0 * qa * cx - qb * cy,
      e: -2.0 * qc * cy - qb * cx,
      f: qa * cx * cx + qb * cx * cy + qc * cy * cy - a2 * b2
    }
  }

  /// Strict interior test; a segment has no interior.
  pub fn contains(&self, p: P2) -> bool {
    if !(self.minor > 0.0) {
      return false;
    }
    let u = rotate(p - self.centre, -self.theta);
    (u.x / self.major).powi(2) + (u.y / self.minor).powi(2) < 1.0
  }

  /// Point on the boundary at eccentric anomaly `s`.
  pub fn point(&self, s: f64) -> P2 {
    self.centre + rotate(V2::new(self.major * s.cos(), self.minor * s.sin()), self.theta)
  }

  /// The two boundary points where the tangent runs at angle `psi`.
  pub fn tangent_points(&self, psi: f64) -> [P2; 2] {
    let (s, c) = (psi - self.theta).sin_cos();
    let t = (-self.minor * c).atan2(self.major * s);
    let p = self.point(t);
    [p, self.centre + (self.centre - p)]
  }

  /// Distance from the centre to the tangent line with unit normal `n`.
  pub fn support(&self, n: V2) -> f64 {
    self.metric_tensor().quadratic(n).max(0.0).sqrt()
  }
}

impl BoundingBox<f64, WorldSpace> for Ellipse {
  fn bounding_box(&self) -> Box2D<f64, WorldSpace> {
    let m = self.metric_tensor();
    let half = V2::new(m.a.max(0.0).sqrt(), m.d.max(0.0).sqrt());
    Box2D::new(self.centre - half, self.centre + half)
  }
}

impl Conic {
  pub fn eval(&self, p: P2) -> f64 {
    let (x, y) = (p.x, p.y);
    self.a * x * x + self.b * x * y + self.c * y * y + self.d * x + self.e * y + self.f
  }

  fn normalized(self) -> Self {
    let k = [self.a, self.b, self.c, self.d, self.e, self.f].iter()
      .fold(0.0f64, |m, v| m.max(v.abs()));
    if k > 0.0 && k.is_finite() {
      Self {
        a: self.a / k, b: self.b / k, c: self.c / k,
        d: self.d / k, e: self.e / k, f: self.f / k
      }
    } else { self }
  }

  /// The same conic with the roles of x and y exchanged.
  fn transposed(self) -> Self {
    Self { a: self.c, c: self.a, d: self.e, e: self.d, ..self }
  }
}

/// Bezout resultant of two conics, eliminating `y`: a polynomial in `x` of degree at
/// most four whose roots are the abscissae of the common points.
fn resultant(p: &Conic, q: &Conic) -> Vec<f64> {
  // each conic as p₂ y² + p₁(x) y + p₀(x)
  let (p0, p1, p2) = ([p.f, p.d, p.a], [p.e, p.b], p.c);
  let (q0, q1, q2) = ([q.f, q.d, q.a], [q.e, q.b], q.c);

  let u: Vec<f64> = (0..3).map(|i| p2 * q0[i] - q2 * p0[i]).collect();
  let v: Vec<f64> = (0..2).map(|i| p2 * q1[i] - q2 * p1[i]).collect();
  let w: Vec<f64> = polynomial::product(&p1, &q0).iter()
    .zip(polynomial::product(&q1, &p0))
    .map(|(a, b)| a - b)
    .collect();

  polynomial::product(&u, &u).iter()
    .zip(polynomial::product(&v, &w))
    .map(|(a, b)| a - b)
    .collect()
}

/// Whether `r`, with its leading coefficient made positive, dips below zero at one of its
/// local minima.
fn dips_negative(r: &[f64]) -> bool {
  let r = polynomial::trim(r, 1e-10);
  let n = r.len();
  if n < 2 {
    return r.first().map_or(false, |&c| c < 0.0);
  }
  let sign = if r[n - 1] < 0.0 { -1.0 } else { 1.0 };
  let r: Vec<f64> = r.iter().map(|c| sign * c).collect();
  let r1 = polynomial::derivative(&r);
  let r2 = polynomial::derivative(&r1);

  let critical = match r1.len() {
    4 => polynomial::cubic_roots([r1[0], r1[1], r1[2], r1[3]]).to_vec(),
    3 => polynomial::quadratic_roots([r1[0], r1[1], r1[2]]).to_vec(),
    2 => polynomial::quadratic_roots([r1[0], r1[1], 0.0]).to_vec(),
    _ => vec![]
  };
  critical.into_iter()
    .any(|x| polynomial::eval(&r2, x) >= 0.0 && polynomial::eval(&r, x) < 0.0)
}

/// Whether two ellipses overlap: one centre lies inside the other ellipse, or the
/// boundaries cross. Tangency is not an intersection. Symmetric in its arguments.
pub fn intersect(e1: &Ellipse, e2: &Ellipse) -> bool {
  if !(e1.minor > 0.0) {
    return segment_enters(e1, e2);
  }
  if !(e2.minor > 0.0) {
    return segment_enters(e2, e1);
  }
  if e1.contains(e2.centre) || e2.contains(e1.centre) {
    return true;
  }
  let origin = e1.centre.lerp(e2.centre, 0.5);
  let (p, q) = (
    e1.conic_about(origin).normalized(),
    e2.conic_about(origin).normalized()
  );
  // crossings sharing an abscissa are double roots in x, but not in y
  dips_negative(&resultant(&p, &q))
    || dips_negative(&resultant(&p.transposed(), &q.transposed()))
}

/// End points of a segment ellipse.
fn ends(s: &Ellipse) -> (P2, P2) {
  let half = rotate(V2::new(s.major, 0.0), s.theta);
  (s.centre - half, s.centre + half)
}

/// Whether the segment `s` reaches into the interior of `e`. Along the segment,
/// `c + t h` for `t ∈ [-1, 1]`, the implicit form of `e` is a quadratic in `t`; the
/// segment enters `e` iff its minimum over the interval is negative.
fn segment_enters(s: &Ellipse, e: &Ellipse) -> bool {
  if !(e.minor > 0.0) {
    return segments_cross(s, e);
  }
  let Some(inverse) = e.metric_tensor().inverse() else {
    return false;
  };
  let h = rotate(V2::new(s.major, 0.0), s.theta);
  let d = s.centre - e.centre;
  let md = inverse * d;
  let (a, b, c) = (h.dot(inverse * h), 2.0 * h.dot(md), d.dot(md) - 1.0);
  let t = if a > 0.0 { (-0.5 * b / a).clamp(-1.0, 1.0) } else { 0.0 };
  (a * t + b) * t + c < 0.0
}

/// Proper crossing of two segments; touching or collinear ones do not cross.
fn segments_cross(s1: &Ellipse, s2: &Ellipse) -> bool {
  let ((a, b), (c, d)) = (ends(s1), ends(s2));
  let side = |p: P2, q: P2, r: P2| (q - p).cross(r - p);
  side(a, b, c) * side(a, b, d) < 0.0 && side(c, d, a) * side(c, d, b) < 0.0
}
