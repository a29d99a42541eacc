//! Glyphs and the evaluation function which turns a point of the field into one.

use {
  crate::{
    field::Field,
    geometry::{Ellipse, P2, unit, left_normal}
  },
  std::f64::consts::PI
};

/// Below this subtended angle an arc is drawn straight.
const STRAIGHT_ANGLE: f64 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Bend {
  Left,
  Right
}

/// A glyph: a shaft of `length` and `width`, centred at `centre` and heading `theta`,
/// bent along a circular arc of curvature `curv` towards `bend`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Arrow {
  pub centre: P2,
  pub theta: f64,
  pub length: f64,
  pub width: f64,
  pub curv: f64,
  pub bend: Bend
}

/// Clearance kept around each glyph, proportional to its width.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Margin {
  pub min: f64,
  pub max: f64,
  pub rate: f64
}

impl Default for Margin {
  fn default() -> Self {
    Self { min: 0.0, max: f64::INFINITY, rate: 0.5 }
  }
}

impl Margin {
  pub fn new(min: f64, max: f64, rate: f64) -> Self {
    Self { min, max, rate }
  }

  pub fn of(&self, width: f64) -> f64 {
    (self.rate * width).max(self.min).min(self.max)
  }
}

impl Arrow {
  pub fn straight(centre: P2, theta: f64, length: f64, width: f64) -> Self {
    Self { centre, theta, length, width, curv: 0.0, bend: Bend::Left }
  }

  /// From a signed curvature, positive when bending left.
  pub fn with_signed_curvature(mut self, k: f64) -> Self {
    self.curv = k.abs();
    self.bend = if k < 0.0 { Bend::Right } else { Bend::Left };
    self
  }

  pub fn signed_curvature(&self) -> f64 {
    match self.bend {
      Bend::Left => self.curv,
      Bend::Right => -self.curv
    }
  }

  /// Angle subtended by the shaft.
  pub fn bend_angle(&self) -> f64 {
    self.length * self.curv
  }

  /// Bounding ellipse of the shaft grown by the margin. A curved shaft is bounded by its
  /// chord and sagitta, the ellipse moved half a sagitta towards the concave side.
  pub fn ellipse(&self, margin: &Margin) -> Ellipse {
    let m = margin.of(self.width);
    let half_width = 0.5 * self.width;
    let phi = self.bend_angle();
    if !(phi > STRAIGHT_ANGLE) {
      return Ellipse::new(0.5 * self.length + m, half_width + m, self.theta, self.centre);
    }
    let r = 1.0 / self.curv;
    let half = 0.5 * phi.min(2.0 * PI);
    // past a semicircle the arc is wider than its chord
    let chord = 2.0 * r * if half > 0.5 * PI { 1.0 } else { half.sin() };
    let sagitta = r * (1.0 - half.cos());
    let concave = match self.bend {
      Bend::Left => left_normal(unit(self.theta)),
      Bend::Right => -left_normal(unit(self.theta))
    };
    Ellipse::new(
      0.5 * chord + half_width + m,
      0.5 * sagitta + half_width + m,
      self.theta,
      self.centre + concave * (0.5 * sagitta)
    )
  }
}

/// How field values scale into glyphs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EvalOptions {
  /// Shaft length per unit magnitude.
  pub scale: f64,
  /// Length to width ratio.
  pub aspect: f64,
  pub margin: Margin,
  /// Largest angle a shaft may subtend; longer arcs are shortened.
  pub max_bend: f64,
  /// Trace length for curvature estimates; half the shaft length when unset.
  pub curvature_step: Option<f64>
}

impl Default for EvalOptions {
  fn default() -> Self {
    Self {
      scale: 1.0,
      aspect: 8.0,
      margin: Margin::default(),
      max_bend: PI,
      curvature_step: None
    }
  }
}

impl EvalOptions {
  pub fn with_scale(self, scale: f64) -> Self { Self { scale, ..self } }
  pub fn with_aspect(self, aspect: f64) -> Self { Self { aspect, ..self } }
  pub fn with_margin(self, margin: Margin) -> Self { Self { margin, ..self } }
  pub fn with_max_bend(self, max_bend: f64) -> Self { Self { max_bend, ..self } }
  pub fn with_curvature_step(self, step: f64) -> Self { Self { curvature_step: Some(step), ..self } }
}

/// Point → glyph.
#[derive(Debug, Copy, Clone)]
pub struct Evaluator<'a> {
  pub field: &'a Field,
  pub options: EvalOptions
}

impl<'a> Evaluator<'a> {
  pub fn new(field: &'a Field, options: EvalOptions) -> Self {
    Self { field, options }
  }

  /// The glyph at `p`; `None` where the field has no data or vanishes.
  pub fn arrow(&self, p: P2) -> Option<Arrow> {
    let (angle, magnitude) = self.field.value(p)?;
    let length = self.options.scale * magnitude;
    if !(length > 0.0) {
      return None;
    }
    let width = length / self.options.aspect;
    let step = self.options.curvature_step.unwrap_or(0.5 * length);
    let k = self.field.curvature(p, step).unwrap_or_else(|| {
      tracing::trace!(?p, "no curvature, drawn straight");
      0.0
    });
    let mut arrow = Arrow::straight(p, angle, length, width)
      .with_signed_curvature(if k.is_finite() { k } else { 0.0 });
    if arrow.bend_angle() > self.options.max_bend {
      arrow.length = self.options.max_bend / arrow.curv;
    }
    Some(arrow)
  }

  pub fn ellipse(&self, p: P2) -> Option<Ellipse> {
    self.arrow(p).map(|a| a.ellipse(&self.options.margin))
  }
}

#[cfg(test)] mod tests {
  use {super::*, std::f64::consts::FRAC_PI_2};

  #[test] fn margin_clamps() {
    let margin = Margin::new(0.1, 0.3, 0.5);
    assert_eq!(margin.of(0.1), 0.1);
    assert_eq!(margin.of(0.4), 0.2);
    assert_eq!(margin.of(2.0), 0.3);
  }

  #[test] fn straight_ellipse() {
    let arrow = Arrow::straight(P2::new(1.0, 2.0), 0.5, 4.0, 1.0);
    let e = arrow.ellipse(&Margin::new(0.0, 1.0, 0.5));
    assert_eq!((e.major, e.minor, e.theta), (2.5, 1.0, 0.5));
    assert_eq!(e.centre, arrow.centre);
  }

  #[test] fn curved_ellipse() {
    let quarter = Arrow::straight(P2::origin(), 0.0, FRAC_PI_2, 0.0)
      .with_signed_curvature(1.0);
    let e = quarter.ellipse(&Margin::new(0.0, 0.0, 0.0));
    let h = std::f64::consts::FRAC_PI_4;
    assert!((e.major - h.sin()).abs() < 1e-12);
    assert!((e.minor - 0.5 * (1.0 - h.cos())).abs() < 1e-12);
    assert!(e.centre.x.abs() < 1e-12);
    assert!((e.centre.y - 0.5 * (1.0 - h.cos())).abs() < 1e-12);

    let right = quarter.with_signed_curvature(-1.0);
    assert_eq!(right.bend, Bend::Right);
    assert_eq!(right.signed_curvature(), -1.0);
    assert!((right.ellipse(&Margin::new(0.0, 0.0, 0.0)).centre.y + e.centre.y).abs() < 1e-12);
  }

  #[test] fn evaluator_scales() {
    let field = Field::uniform(0.25, 3.0);
    let evaluator = Evaluator::new(&field, EvalOptions::default()
      .with_scale(2.0)
      .with_aspect(4.0));
    let arrow = evaluator.arrow(P2::new(1.0, 1.0)).unwrap();
    assert_eq!((arrow.theta, arrow.length, arrow.width, arrow.curv), (0.25, 6.0, 1.5, 0.0));
    let e = evaluator.ellipse(P2::new(1.0, 1.0)).unwrap();
    assert_eq!((e.major, e.minor), (3.75, 1.5));
  }

  #[test] fn evaluator_shortens_tight_arcs() {
    let field = Field::new(|_| Some((0.0, 4.0))).with_curvature(|_| Some(-2.0));
    let evaluator = Evaluator::new(&field, EvalOptions::default().with_max_bend(PI));
    let arrow = evaluator.arrow(P2::origin()).unwrap();
    assert_eq!(arrow.bend, Bend::Right);
    assert!((arrow.length - FRAC_PI_2).abs() < 1e-12);
    assert_eq!(arrow.width, 0.5);
  }

  #[test] fn evaluator_no_data() {
    let field = Field::new(|p| (p.x > 0.0).then_some((0.0, p.x)));
    let evaluator = Evaluator::new(&field, EvalOptions::default());
    assert!(evaluator.arrow(P2::new(-1.0, 0.0)).is_none());
    assert!(evaluator.arrow(P2::new(0.0, 0.0)).is_none());
    assert!(evaluator.arrow(P2::new(1.0, 0.0)).is_some());
  }
}
