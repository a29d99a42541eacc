//! Short range repulsion between glyphs, as a function of their contact distance.

/// Truncated and shifted Lennard-Jones potential
/// `4ε((σ/x)¹² − (σ/x)⁶) + ε` for `x < 2^⅙ σ`, zero beyond.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Potential {
  /// `48 ε σ¹²`
  a: f64,
  /// `24 ε σ⁶`
  b: f64,
  epsilon: f64,
  cutoff: f64
}

impl Default for Potential {
  /// Repulsion vanishing exactly at tangency.
  fn default() -> Self {
    Self::lennard_jones(1.0, 2f64.powf(-1.0 / 6.0))
  }
}

impl Potential {
  pub fn lennard_jones(epsilon: f64, sigma: f64) -> Self {
    let s6 = sigma.powi(6);
    Self {
      a: 48.0 * epsilon * s6 * s6,
      b: 24.0 * epsilon * s6,
      epsilon,
      cutoff: 2f64.powf(1.0 / 6.0) * sigma
    }
  }

  /// Distance beyond which there is no interaction.
  pub fn cutoff(&self) -> f64 {
    self.cutoff
  }

  /// `−dV/dx`, positive (repulsive) below the cutoff.
  pub fn force(&self, x: f64) -> f64 {
    if !(x < self.cutoff) {
      return 0.0;
    }
    let x6 = x.powi(6);
    (self.a / x6 - self.b) / (x6 * x)
  }

  pub fn energy(&self, x: f64) -> f64 {
    if !(x < self.cutoff) {
      return 0.0;
    }
    let x6 = x.powi(6);
    (self.a / 12.0 / x6 - self.b / 6.0) / x6 + self.epsilon
  }
}
