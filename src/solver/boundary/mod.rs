//! Glyphs along the domain boundary: first at the polygon corners (dimension 0), then
//! along the edges between them (dimension 1). Both are single constructive passes.

use crate::{
  arrow::{Arrow, Evaluator},
  domain::Domain,
  geometry::{Ellipse, P2}
};

pub mod corner;
pub mod edge;
#[cfg(test)] mod tests;

pub use corner::Corner;

/// The glyph evaluated at `centre`, moved so that its bounding ellipse is centred there.
pub(crate) fn centred(evaluator: &Evaluator, centre: P2) -> Option<(Arrow, Ellipse)> {
  let arrow = evaluator.arrow(centre)?;
  let ellipse = arrow.ellipse(&evaluator.options.margin);
  let shift = centre - ellipse.centre;
  Some((Arrow { centre: arrow.centre + shift, ..arrow }, ellipse.translate(shift)))
}

#[derive(Debug, Clone, Default)]
pub struct Boundary {
  /// Per polygon, each corner glyph followed by the glyphs of the edge leaving it.
  pub arrows: Vec<Arrow>,
  pub corners: usize,
  pub edge_glyphs: usize
}

/// Corner then edge placement over an oriented `domain`.
pub fn place(evaluator: &Evaluator, domain: &Domain, edge_min_contact: f64) -> Boundary {
  let corners = corner::place(evaluator, domain);
  let edges = edge::place(evaluator, domain, &corners, edge_min_contact);
  let mut boundary = Boundary::default();
  for (corners, edges) in corners.iter().zip(&edges) {
    for (corner, edge) in corners.iter().zip(edges) {
      if let Some(corner) = corner {
        boundary.arrows.push(corner.arrow);
        boundary.corners += 1;
      }
      boundary.arrows.extend(edge.iter().map(|(arrow, _)| *arrow));
      boundary.edge_glyphs += edge.len();
    }
  }
  boundary
}
