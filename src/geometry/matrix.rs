use {
  super::{V2, WorldSpace},
  std::ops::{Add, Sub, Mul, Neg},
  euclid::Vector2D
};

/// 2×2 matrix, row major:
/// ```text
/// | a  b |
/// | c  d |
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct M2 {
  pub a: f64,
  pub b: f64,
  pub c: f64,
  pub d: f64
}

impl M2 {
  pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
    Self { a, b, c, d }
  }

  pub const fn identity() -> Self {
    Self::new(1.0, 0.0, 0.0, 1.0)
  }

  pub const fn diagonal(x: f64, y: f64) -> Self {
    Self::new(x, 0.0, 0.0, y)
  }

  /// Symmetric matrix from its three independent entries.
  pub const fn symmetric(m11: f64, m12: f64, m22: f64) -> Self {
    Self::new(m11, m12, m12, m22)
  }

  /// Counter-clockwise rotation by `theta`.
  pub fn rotation(theta: f64) -> Self {
    let (s, c) = theta.sin_cos();
    Self::new(c, -s, s, c)
  }

  pub fn det(&self) -> f64 {
    self.a * self.d - self.b * self.c
  }

  pub fn trace(&self) -> f64 {
    self.a + self.d
  }

  pub fn transpose(&self) -> Self {
    Self::new(self.a, self.c, self.b, self.d)
  }

  /// `None` for a singular (or non-finite) matrix.
  pub fn inverse(&self) -> Option<Self> {
    let det = self.det();
    if det == 0.0 || !det.is_finite() {
      return None;
    }
    Some(Self::new(self.d, -self.b, -self.c, self.a) * (1.0 / det))
  }

  /// `vᵀ M v`
  pub fn quadratic(&self, v: V2) -> f64 {
    v.dot(*self * v)
  }

  pub fn is_finite(&self) -> bool {
    self.a.is_finite() && self.b.is_finite() && self.c.is_finite() && self.d.is_finite()
  }

  /// Eigenvalues `(λ₁, λ₂)`, `λ₁ ≥ λ₂`, of a symmetric matrix, and the angle of the
  /// eigenvector belonging to `λ₁`.
  pub fn sym_eigen(&self) -> (f64, f64, f64) {
    let (m11, m12, m22) = (self.a, 0.5 * (self.b + self.c), self.d);
    let mean = 0.5 * (m11 + m22);
    let half_diff = 0.5 * (m11 - m22);
    let r = half_diff.hypot(m12);
    // the major eigenvector makes angle θ with 2θ = atan2(2 m12, m11 - m22)
    let theta = 0.5 * m12.atan2(half_diff);
    (mean + r, mean - r, theta)
  }

  /// `R(θ) diag(λ₁, λ₂) R(θ)ᵀ`
  pub fn from_eigen(l1: f64, l2: f64, theta: f64) -> Self {
    let r = Self::rotation(theta);
    r * Self::diagonal(l1, l2) * r.transpose()
  }
}

impl Add for M2 {
  type Output = Self;
  fn add(self, m: Self) -> Self {
    Self::new(self.a + m.a, self.b + m.b, self.c + m.c, self.d + m.d)
  }
}

impl Sub for M2 {
  type Output = Self;
  fn sub(self, m: Self) -> Self {
    Self::new(self.a - m.a, self.b - m.b, self.c - m.c, self.d - m.d)
  }
}

impl Neg for M2 {
  type Output = Self;
  fn neg(self) -> Self {
    Self::new(-self.a, -self.b, -self.c, -self.d)
  }
}

impl Mul<f64> for M2 {
  type Output = Self;
  fn mul(self, k: f64) -> Self {
    Self::new(self.a * k, self.b * k, self.c * k, self.d * k)
  }
}

impl Mul for M2 {
  type Output = Self;
  fn mul(self, m: Self) -> Self {
    Self::new(
      self.a * m.a + self.b * m.c, self.a * m.b + self.b * m.d,
      self.c * m.a + self.d * m.c, self.c * m.b + self.d * m.d
    )
  }
}

impl Mul<Vector2D<f64, WorldSpace>> for M2 {
  type Output = V2;
  fn mul(self, v: V2) -> V2 {
    V2::new(self.a * v.x + self.b * v.y, self.c * v.x + self.d * v.y)
  }
}
