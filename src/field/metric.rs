use {
  super::Bilinear,
  crate::{
    error::Result,
    geometry::{Ellipse, M2, P2, WorldSpace}
  },
  euclid::Box2D,
  rayon::prelude::*
};

/// Glyph shape tensors sampled over a grid: one masked bilinear grid per independent
/// tensor entry, plus the glyph area.
#[derive(Debug, Clone)]
pub struct MetricTensorField {
  m11: Bilinear,
  m12: Bilinear,
  m22: Bilinear,
  area: Bilinear
}

impl MetricTensorField {
  /// Evaluate `f` at every node, in parallel. Nodes where `f` gives nothing stay unset.
  pub fn new(
    nx: usize, ny: usize,
    bbox: Box2D<f64, WorldSpace>,
    f: impl Fn(P2) -> Option<Ellipse> + Sync
  ) -> Result<Self> {
    let grid = Bilinear::new(nx, ny, bbox)?;
    let nodes = (0..nx * ny)
      .into_par_iter()
      .map(|k| f(grid.node_position(k % nx, k / nx)))
      .collect::<Vec<_>>();

    let component = |g: fn(&Ellipse) -> f64| {
      let mut grid = grid.clone();
      grid.fill(nodes.iter().map(|e| e.as_ref().map(g)).collect());
      grid
    };
    let field = Self {
      m11: component(|e| e.metric_tensor().a),
      m12: component(|e| e.metric_tensor().b),
      m22: component(|e| e.metric_tensor().d),
      area: component(Ellipse::area)
    };
    tracing::debug!(
      nodes = nx * ny,
      defined = field.area.defined_nodes(),
      "metric tensor field sampled"
    );
    Ok(field)
  }

  pub fn eval(&self, p: P2) -> Option<M2> {
    Some(M2::symmetric(self.m11.eval(p)?, self.m12.eval(p)?, self.m22.eval(p)?))
  }

  /// The ellipse centred at `p` with the interpolated tensor.
  pub fn ellipse(&self, p: P2) -> Option<Ellipse> {
    Ellipse::from_metric_tensor(self.eval(p)?, p).ok()
  }

  pub fn area(&self, p: P2) -> Option<f64> {
    self.area.eval(p)
  }

  /// Mean glyph area over the region where the field is defined.
  pub fn mean_area(&self) -> Option<f64> {
    let defined = self.area.defined_area();
    (defined > 0.0).then(|| self.area.integrate() / defined)
  }

  pub fn bbox(&self) -> Box2D<f64, WorldSpace> {
    self.area.bbox()
  }

  /// Node spacing of the underlying grids.
  pub fn spacing(&self) -> (f64, f64) {
    self.area.spacing()
  }
}
