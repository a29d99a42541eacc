//! Annealing: simulation parameters as functions of the run's progress `T ∈ [0, 1]`.

use std::f64::consts::PI;

/// Progress interval over which a parameter ramps.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Phase {
  pub start: f64,
  pub end: f64
}

impl Phase {
  pub const fn new(start: f64, end: f64) -> Self {
    Self { start, end }
  }

  /// Cosine eased ramp, 0 before the phase and 1 after.
  pub fn ramp(&self, t: f64) -> f64 {
    if t <= self.start {
      return 0.0;
    }
    if t >= self.end {
      return 1.0;
    }
    let s = (t - self.start) / (self.end - self.start);
    0.5 * (1.0 - (PI * s).cos())
  }

  pub fn midpoint(&self) -> f64 {
    0.5 * (self.start + self.end)
  }

  pub fn is_valid(&self) -> bool {
    0.0 <= self.start && self.start <= self.end && self.end <= 1.0
  }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Schedule {
  /// Interior glyphs carry no charge and pass through each other.
  pub superposition: Phase,
  /// Interior charge rises from 0 to 1.
  pub charge: Phase,
  /// Deletion radius and per-cycle deletion cap rise to their maxima.
  pub clean: Phase,
  /// Truncation radius falls from `truncate_start` to `truncate_end`.
  pub detruncate: Phase,
  pub deletion_radius: f64,
  /// Largest fraction of interior glyphs deleted in one cycle.
  pub deletion_cap: f64,
  pub truncate_start: f64,
  pub truncate_end: f64
}

impl Default for Schedule {
  fn default() -> Self {
    Self {
      superposition: Phase::new(0.0, 0.1),
      charge: Phase::new(0.1, 0.4),
      clean: Phase::new(0.5, 0.8),
      detruncate: Phase::new(0.7, 1.0),
      deletion_radius: 0.75,
      deletion_cap: 0.05,
      truncate_start: 0.95,
      truncate_end: 0.8
    }
  }
}

impl Schedule {
  pub fn with_charge(self, charge: Phase) -> Self { Self { charge, ..self } }
  pub fn with_clean(self, clean: Phase, deletion_radius: f64, deletion_cap: f64) -> Self {
    Self { clean, deletion_radius, deletion_cap, ..self }
  }
  pub fn with_detruncate(self, detruncate: Phase, start: f64, end: f64) -> Self {
    Self { detruncate, truncate_start: start, truncate_end: end, ..self }
  }

  pub fn charge(&self, t: f64) -> f64 {
    if t < self.superposition.end { 0.0 } else { self.charge.ramp(t) }
  }

  pub fn deletion_radius(&self, t: f64) -> f64 {
    self.deletion_radius * self.clean.ramp(t)
  }

  pub fn deletion_cap(&self, t: f64) -> f64 {
    self.deletion_cap * self.clean.ramp(t)
  }

  /// Contact distance below which the potential is held constant.
  pub fn truncation(&self, t: f64) -> f64 {
    let s = self.detruncate.ramp(t);
    self.truncate_start + s * (self.truncate_end - self.truncate_start)
  }

  pub(crate) fn validate(&self) -> Result<(), String> {
    let phases = [
      ("superposition", self.superposition),
      ("charge", self.charge),
      ("clean", self.clean),
      ("detruncate", self.detruncate)
    ];
    if let Some((name, phase)) = phases.iter().find(|(_, phase)| !phase.is_valid()) {
      return Err(format!("{name} phase {:?}..{:?} is not within [0, 1]", phase.start, phase.end));
    }
    if !(self.deletion_radius >= 0.0 && self.deletion_radius < 1.0) {
      return Err(format!("deletion radius {} is not in [0, 1)", self.deletion_radius));
    }
    if !(0.0..=1.0).contains(&self.deletion_cap) {
      return Err(format!("deletion cap {} is not a fraction", self.deletion_cap));
    }
    if !(self.truncate_end > 0.0 && self.truncate_end <= self.truncate_start && self.truncate_start <= 1.0) {
      return Err(format!(
        "truncation {} → {} is not decreasing within (0, 1]",
        self.truncate_start, self.truncate_end
      ));
    }
    Ok(())
  }
}

#[cfg(test)] mod tests {
  use super::*;

  #[test] fn eased_ramps() {
    let phase = Phase::new(0.2, 0.6);
    assert_eq!(phase.ramp(0.0), 0.0);
    assert_eq!(phase.ramp(0.2), 0.0);
    assert!((phase.ramp(0.4) - 0.5).abs() < 1e-12);
    assert_eq!(phase.ramp(0.6), 1.0);
    assert_eq!(phase.ramp(1.0), 1.0);
    let xs = (0..=100).map(|i| phase.ramp(i as f64 / 100.0)).collect::<Vec<_>>();
    assert!(xs.windows(2).all(|w| w[0] <= w[1]));
  }

  #[test] fn default_schedule() {
    let s = Schedule::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.charge(0.05), 0.0);
    assert_eq!(s.charge(0.5), 1.0);
    assert_eq!(s.deletion_radius(0.4), 0.0);
    assert_eq!(s.deletion_radius(0.9), 0.75);
    assert_eq!(s.deletion_cap(0.9), 0.05);
    assert_eq!(s.truncation(0.5), 0.95);
    assert!((s.truncation(1.0) - 0.8).abs() < 1e-12);
  }

  #[test] fn rejects_bad_schedules() {
    let s = Schedule::default();
    assert!(s.with_charge(Phase::new(0.5, 0.2)).validate().is_err());
    assert!(s.with_clean(Phase::new(0.5, 0.8), 1.5, 0.05).validate().is_err());
    assert!(s.with_detruncate(Phase::new(0.7, 1.0), 0.8, 0.95).validate().is_err());
  }
}
