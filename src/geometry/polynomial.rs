//! Dense polynomials with coefficients in ascending order, `p[0] + p[1] x + p[2] x² + …`,
//! and closed-form real roots up to degree three.

use num_traits::Float;

/// Real roots of a polynomial of degree ≤ 3, distinct and ascending.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Roots<F> {
  n: usize,
  x: [F; 3]
}

impl<F: Float> Roots<F> {
  fn new() -> Self {
    Self { n: 0, x: [F::zero(); 3] }
  }

  fn push(&mut self, x: F) {
    if !x.is_finite() {
      return;
    }
    let tol = F::from(1e-7).unwrap() * (F::one() + x.abs());
    if self.as_slice().iter().any(|&y| (y - x).abs() <= tol) {
      return;
    }
    self.x[self.n] = x;
    self.n += 1;
  }

  fn sorted(mut self) -> Self {
    let n = self.n;
    self.x[..n].sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    self
  }

  pub fn as_slice(&self) -> &[F] {
    &self.x[..self.n]
  }

  pub fn len(&self) -> usize {
    self.n
  }

  pub fn is_empty(&self) -> bool {
    self.n == 0
  }
}

impl<F: Float> std::ops::Deref for Roots<F> {
  type Target = [F];
  fn deref(&self) -> &[F] {
    self.as_slice()
  }
}

/// Horner evaluation.
pub fn eval<F: Float>(p: &[F], x: F) -> F {
  p.iter().rev().fold(F::zero(), |acc, &c| acc * x + c)
}

/// Coefficients of `p′`.
pub fn derivative<F: Float>(p: &[F]) -> Vec<F> {
  p.iter().enumerate().skip(1)
    .map(|(i, &c)| c * F::from(i).unwrap())
    .collect()
}

/// Coefficients of `p q`.
pub fn product<F: Float>(p: &[F], q: &[F]) -> Vec<F> {
  if p.is_empty() || q.is_empty() {
    return vec![];
  }
  let mut r = vec![F::zero(); p.len() + q.len() - 1];
  for (i, &a) in p.iter().enumerate() {
    for (j, &b) in q.iter().enumerate() {
      r[i + j] = r[i + j] + a * b;
    }
  }
  r
}

/// Drop leading coefficients which are negligible against the largest one.
pub fn trim<F: Float>(p: &[F], rel: F) -> &[F] {
  let max = p.iter().fold(F::zero(), |m, c| m.max(c.abs()));
  let mut n = p.len();
  while n > 0 && p[n - 1].abs() <= rel * max {
    n -= 1;
  }
  &p[..n]
}

/// Real roots of `p[0] + p[1] x + p[2] x² + p[3] x³` by Cardano's method. Vanishing
/// leading coefficients degrade the problem to a quadratic or linear one; repeated
/// roots are reported once.
pub fn cubic_roots<F: Float>(p: [F; 4]) -> Roots<F> {
  let [c0, c1, c2, c3] = p;
  if c3 == F::zero() {
    return quadratic_roots([c0, c1, c2]);
  }
  let (two, three) = (F::from(2).unwrap(), F::from(3).unwrap());
  let (nine, third) = (F::from(9).unwrap(), F::one() / three);
  let (a, b, c) = (c2 / c3, c1 / c3, c0 / c3);

  let q = (a * a - three * b) / nine;
  let r = (two * a * a * a - nine * a * b + F::from(27).unwrap() * c) / F::from(54).unwrap();
  let (r2, q3) = (r * r, q * q * q);
  let shift = a * third;
  let mut roots = Roots::new();
  // discriminants within rounding of zero are a double root, not three close ones
  let snap = F::from(1e-12).unwrap() * (r2.abs() + q3.abs());

  if r2 - q3 < -snap {
    let sq = q.sqrt();
    let ratio = (r / (q3.sqrt())).max(-F::one()).min(F::one());
    let theta = ratio.acos();
    let tau = two * F::from(std::f64::consts::PI).unwrap();
    roots.push(-two * sq * (theta * third).cos() - shift);
    roots.push(-two * sq * ((theta + tau) * third).cos() - shift);
    roots.push(-two * sq * ((theta - tau) * third).cos() - shift);
  } else {
    let sign = if r < F::zero() { -F::one() } else { F::one() };
    let big_a = -sign * (r.abs() + (r2 - q3).max(F::zero()).sqrt()).cbrt();
    let big_b = if big_a == F::zero() { F::zero() } else { q / big_a };
    roots.push(big_a + big_b - shift);
    // the complex pair collapses onto a real double root
    let tol = F::from(1e-7).unwrap() * (F::one() + big_a.abs());
    if (big_a - big_b).abs() <= tol {
      roots.push(-(big_a + big_b) / two - shift);
    }
  }
  roots.sorted()
}

/// Real roots of `p[0] + p[1] x + p[2] x²`.
pub fn quadratic_roots<F: Float>(p: [F; 3]) -> Roots<F> {
  let [c, b, a] = p;
  let mut roots = Roots::new();
  if a == F::zero() {
    if b != F::zero() {
      roots.push(-c / b);
    }
    return roots;
  }
  let two = F::from(2).unwrap();
  let disc = b * b - F::from(4).unwrap() * a * c;
  if disc < F::zero() {
    return roots;
  }
  // avoid cancellation in the root of smaller magnitude
  let sign = if b < F::zero() { -F::one() } else { F::one() };
  let t = -(b + sign * disc.sqrt()) / two;
  if t != F::zero() {
    roots.push(t / a);
    roots.push(c / t);
  } else {
    roots.push(F::zero());
  }
  roots.sorted()
}
