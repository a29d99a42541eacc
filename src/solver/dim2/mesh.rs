//! Neighbour mesh: the pairs of glyphs which interact.

use {
  crate::{
    geometry::P2,
    solver::quadtree::PointTree
  },
  rayon::prelude::*
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshOptions {
  /// Initial query radius, in multiples of the glyph's major semi-axis.
  pub radius: f64,
  pub growth: f64,
  pub retries: usize,
  /// Neighbours wanted before the radius stops growing.
  pub min: usize,
  /// Nearest neighbours kept.
  pub max: usize
}

impl Default for MeshOptions {
  fn default() -> Self {
    Self { radius: 3.0, growth: 1.5, retries: 3, min: 6, max: 12 }
  }
}

impl MeshOptions {
  pub fn with_radius(self, radius: f64) -> Self { Self { radius, ..self } }
  pub fn with_neighbours(self, min: usize, max: usize) -> Self { Self { min, max, ..self } }
  pub fn with_growth(self, growth: f64, retries: usize) -> Self { Self { growth, retries, ..self } }
}

/// Edges `(i, j)`, `i < j`, sorted and without duplicates, between each of the glyphs
/// after the first `fixed` and its nearest neighbours.
pub fn build(positions: &[P2], majors: &[f64], fixed: usize, options: &MeshOptions) -> Vec<(usize, usize)> {
  let tree = PointTree::build(positions.iter().copied().enumerate());
  let mut edges = (fixed..positions.len())
    .into_par_iter()
    .flat_map_iter(|i| {
      let mut radius = options.radius * majors[i];
      let mut attempt = 0;
      let mut found = loop {
        let mut found = tree.within(positions[i], radius);
        found.retain(|&(j, _)| j != i);
        if found.len() >= options.min || attempt >= options.retries {
          break found;
        }
        radius *= options.growth;
        attempt += 1;
      };
      found.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
      found.truncate(options.max);
      found.into_iter().map(move |(j, _)| (i.min(j), i.max(j)))
    })
    .collect::<Vec<_>>();
  edges.sort_unstable();
  edges.dedup();
  edges
}
