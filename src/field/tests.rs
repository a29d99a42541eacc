use {
  super::*,
  crate::geometry::{Ellipse, WorldSpace},
  anyhow::Result,
  euclid::Box2D,
  rand::prelude::*,
  std::f64::consts::{FRAC_PI_2, PI}
};

fn unit_box() -> Box2D<f64, WorldSpace> {
  Box2D::new(P2::new(0.0, 0.0), P2::new(1.0, 1.0))
}

fn affine(p: P2) -> f64 {
  2.0 * p.x - 3.0 * p.y + 1.0
}

#[test] fn affine_exact() -> Result<()> {
  let mut grid = Bilinear::new(11, 7, Box2D::new(P2::new(-1.0, 0.0), P2::new(2.0, 1.0)))?;
  grid.sample(|p| Some(affine(p)));
  let mut rng = rand_pcg::Pcg64::seed_from_u64(0);
  for _ in 0..1000 {
    let p = P2::new(rng.gen_range(-1.0..2.0), rng.gen_range(0.0..1.0));
    let z = grid.eval(p).unwrap();
    assert!((z - affine(p)).abs() < 1e-12, "{p:?}: {z} vs {}", affine(p));
  }
  assert_eq!(grid.eval(P2::new(2.5, 0.5)), None);
  Ok(())
}

#[test] fn two_corners_no_data() -> Result<()> {
  let mut grid = Bilinear::new(2, 2, unit_box())?;
  grid.set(0, 0, Some(1.0));
  grid.set(1, 1, Some(2.0));
  for p in [P2::new(0.1, 0.1), P2::new(0.5, 0.5), P2::new(0.9, 0.9), P2::new(0.2, 0.7)] {
    assert_eq!(grid.eval(p), None);
  }
  assert_eq!(grid.defined_area(), 0.0);
  Ok(())
}

#[test] fn triangle_halves() -> Result<()> {
  let nodes = [(0, 0), (1, 0), (0, 1), (1, 1)];
  // (missing node, point in the defined half, point in the other half)
  let cases = [
    ((1, 1), P2::new(0.25, 0.25), P2::new(0.75, 0.75)),
    ((0, 0), P2::new(0.75, 0.75), P2::new(0.1, 0.1)),
    ((1, 0), P2::new(0.2, 0.8), P2::new(0.8, 0.2)),
    ((0, 1), P2::new(0.8, 0.2), P2::new(0.2, 0.8))
  ];
  for (missing, inside, outside) in cases {
    let mut grid = Bilinear::new(2, 2, unit_box())?;
    for (i, j) in nodes {
      let value = ((i, j) != missing).then(|| affine(grid.node_position(i, j)));
      grid.set(i, j, value);
    }
    assert_eq!(grid.cell_mask(0, 0).count_ones(), 3);
    let z = grid.eval(inside).unwrap();
    assert!((z - affine(inside)).abs() < 1e-12);
    assert_eq!(grid.eval(outside), None, "missing {missing:?}");
    assert!((grid.defined_area() - 0.5).abs() < 1e-15);
  }
  Ok(())
}

#[test] fn unset_node_clears_mask() -> Result<()> {
  let mut grid = Bilinear::new(3, 3, unit_box())?;
  grid.sample(|_| Some(1.0));
  assert_eq!(grid.defined_area(), 1.0);
  grid.set(1, 1, None);
  // the centre node is a corner of all four cells
  (0..2).for_each(|j| (0..2).for_each(|i| assert_eq!(grid.cell_mask(i, j).count_ones(), 3)));
  assert!((grid.defined_area() - 0.5).abs() < 1e-12);
  Ok(())
}

#[test] fn integrals() -> Result<()> {
  let mut grid = Bilinear::new(200, 200, Box2D::new(P2::new(-1.0, -1.0), P2::new(1.0, 1.0)))?;
  grid.sample(|p| Some(p.x * p.x + p.y * p.y));
  assert!((grid.integrate() - 8.0 / 3.0).abs() < 1e-3);
  assert!((grid.integrate_box(unit_box()) - 2.0 / 3.0).abs() < 1e-3);
  assert!((grid.defined_area() - 4.0).abs() < 1e-9);
  println!("{grid:?}");
  Ok(())
}

#[test] fn rejects_degenerate_grid() {
  assert!(Bilinear::new(1, 5, unit_box()).is_err());
  assert!(Bilinear::new(5, 5, Box2D::new(P2::new(0.0, 0.0), P2::new(0.0, 1.0))).is_err());
}

#[test] fn metric_field_uniform() -> Result<()> {
  let glyph = |p: P2| Some(Ellipse::new(0.2, 0.05, 0.3, p));
  let field = MetricTensorField::new(16, 16, unit_box(), glyph)?;
  let p = P2::new(0.37, 0.61);
  let m = field.eval(p).unwrap();
  let expected = glyph(p).unwrap().metric_tensor();
  assert!((m.a - expected.a).abs() < 1e-12);
  assert!((m.b - expected.b).abs() < 1e-12);
  assert!((m.d - expected.d).abs() < 1e-12);
  let e = field.ellipse(p).unwrap();
  assert!((e.major - 0.2).abs() < 1e-9 && (e.minor - 0.05).abs() < 1e-9);
  assert!((field.mean_area().unwrap() - PI * 0.2 * 0.05).abs() < 1e-9);
  Ok(())
}

#[test] fn metric_field_no_data() -> Result<()> {
  let field = MetricTensorField::new(9, 9, unit_box(), |p| {
    (p.x < 0.5).then(|| Ellipse::circle(0.1, p))
  })?;
  assert!(field.eval(P2::new(0.2, 0.5)).is_some());
  assert!(field.eval(P2::new(0.8, 0.5)).is_none());
  assert!((field.mean_area().unwrap() - PI * 0.01).abs() < 1e-9);
  Ok(())
}

#[test] fn circular_streamlines() {
  // counter-clockwise rotation about the origin
  let field = Field::new(|p| Some((p.y.atan2(p.x) + FRAC_PI_2, 1.0)));
  let k = field.curvature(P2::new(2.0, 0.0), 0.2).unwrap();
  assert!((k - 0.5).abs() < 1e-4, "{k}");
  let field = Field::new(|p| Some((p.y.atan2(p.x) - FRAC_PI_2, 1.0)));
  let k = field.curvature(P2::new(0.0, 4.0), 0.2).unwrap();
  assert!((k + 0.25).abs() < 1e-4, "{k}");
}

#[test] fn curvature_callback_wins() {
  let field = Field::uniform(0.3, 2.0);
  assert_eq!(field.curvature(P2::origin(), 1.0), Some(0.0));
  assert_eq!(field.value(P2::new(5.0, 5.0)), Some((0.3, 2.0)));
  let bounded = Field::new(|p| (p.x < 1.0).then_some((0.0, 1.0)));
  assert_eq!(bounded.curvature(P2::new(0.95, 0.0), 0.2), None);
}
