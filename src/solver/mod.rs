//! Placement: boundary glyphs, then the relaxed interior (or a plain grid of glyphs).

use {
  crate::{
    arrow::{Arrow, EvalOptions, Evaluator},
    domain::Domain,
    error::{Error, Result},
    field::{Field, MetricTensorField},
    geometry::BoundingBox,
    io::Vgs
  }
};

pub mod boundary;
pub mod dim2;
pub mod hedgehog;
pub mod potential;
pub mod quadtree;

pub use {
  dim2::{Breakout, Decay, Dim2Options, Dim2Stats, Phase, Schedule, Stop, mesh::MeshOptions},
  potential::Potential
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Strategy {
  /// Boundary glyphs, then relaxation of the interior.
  #[default]
  Adaptive,
  /// One glyph per grid cell.
  Hedgehog { nx: usize, ny: usize }
}

#[derive(Debug, Clone)]
pub struct Options {
  pub eval: EvalOptions,
  /// Nodes of the metric tensor grid along x and y.
  pub metric_grid: (usize, usize),
  /// Boundary edges whose corner glyphs are closer than this are left empty.
  pub edge_min_contact: f64,
  pub strategy: Strategy,
  pub dim2: Dim2Options
}

impl Default for Options {
  fn default() -> Self {
    Self {
      eval: EvalOptions::default(),
      metric_grid: (64, 64),
      edge_min_contact: 2.0,
      strategy: Strategy::Adaptive,
      dim2: Dim2Options::default()
    }
  }
}

impl Options {
  pub fn with_eval(self, eval: EvalOptions) -> Self { Self { eval, ..self } }
  pub fn with_metric_grid(self, nx: usize, ny: usize) -> Self { Self { metric_grid: (nx, ny), ..self } }
  pub fn with_edge_min_contact(self, edge_min_contact: f64) -> Self { Self { edge_min_contact, ..self } }
  pub fn with_strategy(self, strategy: Strategy) -> Self { Self { strategy, ..self } }
  pub fn with_dim2(self, dim2: Dim2Options) -> Self { Self { dim2, ..self } }

  /// Reject inconsistent options with [`Error::Config`].
  pub fn validate(&self) -> Result<()> {
    let eval = &self.eval;
    let checks = [
      (eval.scale > 0.0 && eval.scale.is_finite(), "glyph scale must be positive"),
      (eval.aspect > 0.0 && eval.aspect.is_finite(), "glyph aspect must be positive"),
      (eval.max_bend > 0.0, "maximal bend must be positive"),
      (eval.curvature_step.map_or(true, |s| s > 0.0), "curvature step must be positive"),
      (
        eval.margin.min >= 0.0 && eval.margin.min <= eval.margin.max && eval.margin.rate >= 0.0,
        "margin needs 0 ≤ min ≤ max and a non-negative rate"
      ),
      (self.metric_grid.0 >= 2 && self.metric_grid.1 >= 2, "metric grid needs 2 nodes per axis"),
      (self.edge_min_contact >= 0.0 && self.edge_min_contact.is_finite(), "edge threshold must be non-negative"),
      (
        !matches!(self.strategy, Strategy::Hedgehog { nx, ny } if nx == 0 || ny == 0),
        "hedgehog grid is empty"
      )
    ];
    if let Some((_, msg)) = checks.iter().find(|(ok, _)| !ok) {
      return Err(Error::Config(msg.to_string()));
    }
    self.dim2.validate().map_err(Error::Config)
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Stats {
  pub corners: usize,
  pub edge_glyphs: usize,
  pub dim2: Dim2Stats
}

#[derive(Debug, Clone, Default)]
pub struct Placement {
  /// The boundary glyphs first.
  pub arrows: Vec<Arrow>,
  /// Neighbour mesh over `arrows`.
  pub edges: Vec<(usize, usize)>,
  /// Number of boundary glyphs.
  pub fixed: usize,
  pub stats: Stats
}

impl Placement {
  pub fn to_vgs(&self) -> Vgs {
    Vgs::new(self.arrows.clone(), self.edges.clone())
  }
}

/// The glyph shape over the domain, sampled on an `nx × ny` grid. Nodes within a cell
/// diagonal outside the boundary are sampled too, so that interpolation reaches the
/// boundary itself.
pub fn metric_field(evaluator: &Evaluator, domain: &Domain, (nx, ny): (usize, usize)) -> Result<MetricTensorField> {
  let bbox = domain.bounding_box();
  let (dx, dy) = (
    bbox.width() / nx.saturating_sub(1).max(1) as f64,
    bbox.height() / ny.saturating_sub(1).max(1) as f64
  );
  let reach = dx.hypot(dy);
  MetricTensorField::new(nx, ny, bbox, |p| {
    (domain.inside(p) || domain.boundary_distance(p) < reach)
      .then(|| evaluator.ellipse(p))
      .flatten()
  })
}

/// Place glyphs for `field` over `domain`.
pub fn place(field: &Field, domain: &Domain, options: &Options) -> Result<Placement> {
  options.validate()?;
  domain.check()?;
  if domain.is_empty() {
    return Err(Error::BadTopology("empty domain".into()));
  }
  let mut domain = domain.clone();
  domain.orient();
  let evaluator = Evaluator::new(field, options.eval);

  if let Strategy::Hedgehog { nx, ny } = options.strategy {
    let arrows = hedgehog::place(&evaluator, &domain, nx, ny);
    return Ok(Placement { arrows, ..Placement::default() });
  }

  let boundary = boundary::place(&evaluator, &domain, options.edge_min_contact);
  let metric = metric_field(&evaluator, &domain, options.metric_grid)?;
  let context = dim2::Context { evaluator: &evaluator, metric: &metric, domain: &domain };
  let relaxed = dim2::relax(&boundary.arrows, &context, &options.dim2)?;
  tracing::info!(
    glyphs = relaxed.arrows.len(), fixed = boundary.arrows.len(), edges = relaxed.edges.len(),
    "placement done"
  );
  Ok(Placement {
    arrows: relaxed.arrows,
    edges: relaxed.edges,
    fixed: boundary.arrows.len(),
    stats: Stats {
      corners: boundary.corners,
      edge_glyphs: boundary.edge_glyphs,
      dim2: relaxed.stats
    }
  })
}
