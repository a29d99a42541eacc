use crate::geometry::{Ellipse, M2, P2, V2};

/// A glyph under relaxation. Fixed particles come from the boundary and never move.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Particle {
  pub position: P2,
  pub velocity: V2,
  pub force: V2,
  pub mass: f64,
  pub charge: f64,
  pub major: f64,
  pub minor: f64,
  pub theta: f64,
  pub mt: M2,
  pub fixed: bool,
  /// Removed at the next compaction.
  pub stale: bool
}

impl Particle {
  pub fn fixed(ellipse: &Ellipse) -> Self {
    let mut p = Self::interior(*ellipse);
    p.mass = 1.0;
    p.charge = 1.0;
    p.fixed = true;
    p
  }

  /// Uncharged, at rest, with mass inversely proportional to the glyph size.
  pub fn interior(ellipse: Ellipse) -> Self {
    let mut p = Self {
      position: ellipse.centre,
      velocity: V2::zero(),
      force: V2::zero(),
      mass: 1.0,
      charge: 0.0,
      major: 0.0,
      minor: 0.0,
      theta: 0.0,
      mt: M2::identity(),
      fixed: false,
      stale: false
    };
    p.reshape(&ellipse);
    p
  }

  /// Take the shape of `ellipse`, keeping the position.
  pub fn reshape(&mut self, ellipse: &Ellipse) {
    self.major = ellipse.major;
    self.minor = ellipse.minor;
    self.theta = ellipse.theta;
    self.mt = ellipse.metric_tensor();
    if !self.fixed {
      let size = (self.major * self.minor).sqrt();
      self.mass = if size > 0.0 { 1.0 / size } else { 1.0 };
    }
  }

  pub fn ellipse(&self) -> Ellipse {
    Ellipse::new(self.major, self.minor, self.theta, self.position)
  }

  pub fn kinetic_energy(&self) -> f64 {
    0.5 * self.mass * self.velocity.square_length()
  }

  /// Symplectic Euler step with viscous damping.
  pub fn step(&mut self, dt: f64, damping: f64) {
    self.velocity += (self.force / self.mass - self.velocity * damping) * dt;
    self.position += self.velocity * dt;
  }
}

#[cfg(test)] mod tests {
  use super::*;

  #[test] fn mass_follows_size() {
    let p = Particle::interior(Ellipse::new(4.0, 1.0, 0.3, P2::new(1.0, 2.0)));
    assert_eq!(p.mass, 0.5);
    assert_eq!(p.charge, 0.0);
    assert_eq!(p.ellipse(), Ellipse::new(4.0, 1.0, 0.3, P2::new(1.0, 2.0)));
    let q = Particle::fixed(&Ellipse::circle(3.0, P2::origin()));
    assert_eq!((q.mass, q.charge, q.fixed), (1.0, 1.0, true));
  }

  #[test] fn damped_step() {
    let mut p = Particle::interior(Ellipse::circle(1.0, P2::origin()));
    p.force = V2::new(2.0, 0.0);
    p.step(0.5, 1.0);
    assert_eq!(p.velocity, V2::new(1.0, 0.0));
    assert_eq!(p.position, P2::new(0.5, 0.0));
    p.force = V2::zero();
    p.step(0.5, 1.0);
    assert_eq!(p.velocity, V2::new(0.5, 0.0));
    assert_eq!(p.kinetic_energy(), 0.125);
  }
}
