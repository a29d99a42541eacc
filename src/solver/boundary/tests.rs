use {
  super::{*, corner::Kind},
  crate::{
    arrow::{EvalOptions, Margin},
    field::Field,
    geometry::{contact_distance, intersect, left_normal, Polyline}
  },
  anyhow::Result
};

fn rect(w: f64, h: f64) -> Domain {
  let mut domain = Domain::rect(P2::origin(), P2::new(w, h));
  domain.orient();
  domain
}

/// Signed distance of `p` from the line through `a` and `b`, positive to the left.
fn line_distance(p: P2, a: P2, b: P2) -> f64 {
  (p - a).dot(left_normal((b - a).normalize()))
}

#[test] fn corner_kinds() {
  let o = P2::origin();
  assert_eq!(corner::kind(P2::new(-1.0, 0.0), o, P2::new(0.0, -1.0)), Some(Kind::Reflex));
  assert_eq!(corner::kind(P2::new(0.0, 1.0), o, P2::new(1.0, 0.0)), Some(Kind::Acute));
  assert_eq!(corner::kind(P2::new(-1.0, 0.0), o, P2::new(1.0, 1.0)), Some(Kind::Obtuse));
  assert_eq!(corner::kind(P2::new(-1.0, 0.0), o, P2::new(1.0, 0.0)), Some(Kind::Obtuse));
  assert_eq!(corner::kind(o, o, P2::new(1.0, 0.0)), None);
}

#[test] fn right_angles_are_tucked_in() {
  let field = Field::uniform(0.0, 1.0);
  let evaluator = Evaluator::new(&field, EvalOptions::default());
  let corners = corner::place(&evaluator, &rect(10.0, 5.0));
  let expected = [(0.5625, 0.125), (9.4375, 0.125), (9.4375, 4.875), (0.5625, 4.875)];
  assert_eq!(corners.len(), 1);
  for (corner, (x, y)) in corners[0].iter().zip(expected) {
    let corner = corner.as_ref().unwrap();
    assert!((corner.ellipse.centre - P2::new(x, y)).length() < 1e-12, "{corner:?}");
    assert_eq!(corner.arrow.centre, corner.ellipse.centre);
  }
}

#[test] fn obtuse_corners_follow_the_bisector() {
  // circles of radius 1 in a regular hexagon
  let field = Field::uniform(0.3, 1.0);
  let evaluator = Evaluator::new(&field, EvalOptions::default().with_aspect(1.0));
  let hexagon = Polyline::new((0..6)
    .map(|k| {
      let a = k as f64 * std::f64::consts::PI / 3.0;
      P2::new(5.0 * a.cos(), 5.0 * a.sin())
    })
    .collect());
  let mut domain = Domain::new();
  domain.insert(hexagon.clone()).unwrap();
  domain.orient();
  let corners = corner::place(&evaluator, &domain);
  let v = &hexagon.vertices;
  for (k, corner) in corners[0].iter().enumerate() {
    let corner = corner.as_ref().unwrap();
    assert!((corner.ellipse.major - 1.0).abs() < 1e-12);
    let c = corner.ellipse.centre;
    assert!((line_distance(c, v[(k + 5) % 6], v[k]) - 1.0).abs() < 1e-9);
    assert!((line_distance(c, v[k], v[(k + 1) % 6]) - 1.0).abs() < 1e-9);
  }
}

#[test] fn overlapping_corners_are_dropped() {
  let field = Field::uniform(0.0, 1.0);
  let evaluator = Evaluator::new(&field, EvalOptions::default());
  let mut domain = Domain::new();
  domain.insert(Polyline::new(vec![P2::new(0.0, 0.0), P2::new(1.0, 0.0), P2::new(0.5, 0.3)])).unwrap();
  domain.orient();
  let corners = corner::place(&evaluator, &domain);
  let kept = corners[0].iter().flatten().collect::<Vec<_>>();
  assert!(!kept.is_empty() && kept.len() < 3);
  assert!(corners[0][0].is_some());
  for (i, a) in kept.iter().enumerate() {
    for b in &kept[i + 1..] {
      assert!(!intersect(&a.ellipse, &b.ellipse));
    }
  }
}

#[test] fn edges_are_filled_evenly() -> Result<()> {
  let field = Field::uniform(0.0, 1.0);
  let evaluator = Evaluator::new(&field, EvalOptions::default());
  let domain = rect(10.0, 5.0);
  let corners = corner::place(&evaluator, &domain);
  let edges = edge::place(&evaluator, &domain, &corners, 2.0);

  let bottom = &edges[0][0];
  assert_eq!(bottom.len(), 6);
  let mut row = vec![corners[0][0].unwrap().ellipse];
  row.extend(bottom.iter().map(|(_, e)| *e));
  row.push(corners[0][1].unwrap().ellipse);
  for pair in row.windows(2) {
    assert!(contact_distance(&pair[0], &pair[1]).unwrap() >= 1.0 - 1e-9);
  }
  let gaps = row.windows(2).map(|p| p[1].centre.x - p[0].centre.x).collect::<Vec<_>>();
  assert!(gaps.iter().all(|g| (g - gaps[0]).abs() < 1e-6), "{gaps:?}");
  assert!(bottom.iter().all(|(_, e)| (e.centre.y - 0.125).abs() < 1e-12));

  // the interior side of the right edge
  assert!(edges[0][1].iter().all(|(_, e)| (e.centre.x - 9.4375).abs() < 1e-12));
  assert!(!edges[0][1].is_empty());
  Ok(())
}

#[test] fn short_edges_are_skipped() {
  let field = Field::uniform(0.0, 1.0);
  let evaluator = Evaluator::new(&field, EvalOptions::default());
  let domain = rect(2.4, 1.0);
  let boundary = place(&evaluator, &domain, 2.0);
  let corners = corner::place(&evaluator, &domain);
  let edges = edge::place(&evaluator, &domain, &corners, 2.0);
  // corner glyphs 1.275 apart along their major axes
  assert!(edges[0][0].is_empty() && edges[0][2].is_empty());
  assert_eq!(boundary.corners, 4);
  assert_eq!(boundary.edge_glyphs, edges[0].iter().map(Vec::len).sum::<usize>());
  assert_eq!(boundary.arrows.len(), 4 + boundary.edge_glyphs);
  assert_eq!(boundary.arrows[0], corners[0][0].unwrap().arrow);
}

#[test] fn centred_on_curved_glyphs() {
  let field = Field::new(|_| Some((0.0, 2.0))).with_curvature(|_| Some(0.5));
  let evaluator = Evaluator::new(&field, EvalOptions::default());
  let c = P2::new(3.0, -1.0);
  let (arrow, ellipse) = centred(&evaluator, c).unwrap();
  assert!((ellipse.centre - c).length() < 1e-12);
  assert!(arrow.centre.y < c.y);
  assert!((arrow.ellipse(&evaluator.options.margin).centre - c).length() < 1e-12);
}

#[test] fn corners_of_unequal_size() {
  // edge glyphs are circles of radius 0.1
  let field = Field::uniform(0.0, 0.2);
  let options = EvalOptions::default().with_aspect(1.0).with_margin(Margin::new(0.0, 0.0, 0.0));
  let evaluator = Evaluator::new(&field, options);
  let domain = rect(3.6, 4.0);
  let glyph = |vertex, r: f64, centre: P2| Some(corner::Corner {
    vertex,
    arrow: Arrow::straight(centre, 0.0, r, r),
    ellipse: Ellipse::circle(r, centre)
  });
  let corners = vec![vec![
    glyph(0, 1.0, P2::new(1.0, 1.0)),
    glyph(1, 0.01, P2::new(3.5, 0.1)),
    None,
    None
  ]];
  let (big, small) = (corners[0][0].unwrap().ellipse, corners[0][1].unwrap().ellipse);
  // the early-exit estimate stops below the threshold
  assert!(crate::geometry::contact(&big, &small).unwrap().sqrt() < 2.0);
  assert!(contact_distance(&big, &small).unwrap() > 2.0);

  let edges = edge::place(&evaluator, &domain, &corners, 2.0);
  let bottom = &edges[0][0];
  assert_eq!(bottom.len(), 9);
  let mut row = vec![big];
  row.extend(bottom.iter().map(|(_, e)| *e));
  row.push(small);
  for pair in row.windows(2) {
    assert!(contact_distance(&pair[0], &pair[1]).unwrap() >= 1.0 - 1e-9, "{pair:?}");
  }
  assert!(bottom.iter().all(|(_, e)| (e.major - 0.1).abs() < 1e-12 && (e.centre.y - 0.1).abs() < 1e-12));
  assert!(edges[0][1..].iter().all(Vec::is_empty));
}
