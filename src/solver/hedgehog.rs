//! Glyphs at the cell centres of a regular grid, with no attempt to avoid overlap.

use {
  crate::{
    arrow::{Arrow, Evaluator},
    domain::Domain,
    geometry::{BoundingBox, P2}
  },
  rayon::prelude::*
};

/// One glyph per cell of an `nx × ny` grid over the domain's bounding box, for the cells
/// whose centre is inside the domain and has data. Row by row from the bottom.
pub fn place(evaluator: &Evaluator, domain: &Domain, nx: usize, ny: usize) -> Vec<Arrow> {
  let bbox = domain.bounding_box();
  let (dx, dy) = (bbox.width() / nx as f64, bbox.height() / ny as f64);
  let arrows = (0..nx * ny)
    .into_par_iter()
    .map(|k| P2::new(
      bbox.min.x + ((k % nx) as f64 + 0.5) * dx,
      bbox.min.y + ((k / nx) as f64 + 0.5) * dy
    ))
    .filter(|&p| domain.inside(p))
    .filter_map(|p| evaluator.arrow(p))
    .collect::<Vec<_>>();
  tracing::info!(cells = nx * ny, glyphs = arrows.len(), "hedgehog");
  arrows
}

#[cfg(test)] mod tests {
  use {
    super::*,
    crate::{arrow::EvalOptions, field::Field, geometry::Polyline}
  };

  #[test] fn cell_centres_inside() {
    let field = Field::new(|p| (p.x < 3.0).then_some((0.0, 0.5)));
    let evaluator = Evaluator::new(&field, EvalOptions::default());
    let mut domain = Domain::rect(P2::origin(), P2::new(4.0, 2.0));
    domain.insert(Polyline::rect(P2::new(0.1, 0.1), P2::new(0.9, 0.9))).unwrap();
    let arrows = place(&evaluator, &domain, 4, 2);
    let centres = arrows.iter().map(|a| (a.centre.x, a.centre.y)).collect::<Vec<_>>();
    assert_eq!(centres, vec![(1.5, 0.5), (2.5, 0.5), (0.5, 1.5), (1.5, 1.5), (2.5, 1.5)]);
    assert!(arrows.iter().all(|a| a.length == 0.5));
  }
}
