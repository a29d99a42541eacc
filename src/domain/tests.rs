use {
  super::*,
  anyhow::Result
};

fn square(min: f64, max: f64) -> Polyline {
  Polyline::rect(P2::new(min, min), P2::new(max, max))
}

/// Outer square with a hole holding an island, inserted innermost first.
fn nested() -> Result<Domain> {
  let mut domain = Domain::new();
  domain.insert(square(4.0, 6.0))?;
  domain.insert(square(0.0, 10.0))?;
  domain.insert(square(2.0, 8.0))?;
  Ok(domain)
}

#[test] fn nesting() -> Result<()> {
  let domain = nested()?;
  domain.check()?;
  assert_eq!((domain.depth(1), domain.depth(2), domain.depth(0)), (0, 1, 2));
  assert_eq!(domain.node(2).parent, Some(1));
  assert_eq!(domain.node(0).parent, Some(2));
  let depths = domain.iter().map(|(depth, _)| depth).collect::<Vec<_>>();
  assert_eq!(depths, [0, 1, 2]);
  Ok(())
}

#[test] fn inside_with_holes() -> Result<()> {
  let domain = nested()?;
  assert!(domain.inside(P2::new(1.0, 1.0)));
  assert!(!domain.inside(P2::new(3.0, 3.0)));
  assert!(domain.inside(P2::new(5.0, 5.0)));
  assert!(!domain.inside(P2::new(11.0, 1.0)));
  assert!((domain.area() - (100.0 - 36.0 + 4.0)).abs() < 1e-12);
  Ok(())
}

#[test] fn siblings_stay_apart() -> Result<()> {
  let mut domain = Domain::new();
  domain.insert(square(0.0, 1.0))?;
  domain.insert(square(2.0, 3.0))?;
  domain.insert(square(-1.0, 4.0))?;
  domain.check()?;
  assert_eq!(domain.node(0).parent, Some(2));
  assert_eq!(domain.node(1).parent, Some(2));
  assert!(!domain.inside(P2::new(0.5, 0.5)));
  assert!(domain.inside(P2::new(1.5, 1.5)));
  assert!(domain.insert(Polyline::new(vec![P2::origin(), P2::new(1.0, 1.0)])).is_err());
  Ok(())
}

#[test] fn orientation() -> Result<()> {
  let mut domain = nested()?;
  domain.orient();
  let ccw = domain.polylines().map(Polyline::is_ccw).collect::<Vec<_>>();
  assert_eq!(ccw, [true, false, true]);
  domain.check()?;
  Ok(())
}

#[test] fn boundary_distance() {
  let domain = Domain::rect(P2::new(0.0, 0.0), P2::new(2.0, 1.0));
  assert!((domain.boundary_distance(P2::new(1.0, 0.25)) - 0.25).abs() < 1e-15);
  assert!((domain.boundary_distance(P2::new(3.0, 2.0)) - 2f64.sqrt()).abs() < 1e-15);
  let bbox = domain.bounding_box();
  assert_eq!((bbox.min, bbox.max), (P2::new(0.0, 0.0), P2::new(2.0, 1.0)));
}

#[test] fn round_trip() -> Result<()> {
  let mut domain = nested()?;
  domain.insert(Polyline::new(vec![
    P2::new(20.0, 0.1), P2::new(21.3, 0.7), P2::new(20.2, 1.0 / 3.0)
  ]))?;
  let mut buffer = vec![];
  domain.write(&mut buffer)?;
  let reread = Domain::read(buffer.as_slice())?;
  let original = domain.iter().map(|(d, n)| (d, n.polyline.clone())).collect::<Vec<_>>();
  let copy = reread.iter().map(|(d, n)| (d, n.polyline.clone())).collect::<Vec<_>>();
  assert_eq!(original, copy);
  Ok(())
}

#[test] fn file_round_trip() -> Result<()> {
  let dir = tempfile::tempdir()?;
  let path = dir.path().join("domain.txt");
  let domain = nested()?;
  domain.save(&path)?;
  assert_eq!(Domain::load(&path)?.area(), domain.area());
  Ok(())
}

#[test] fn gzipped_file() -> Result<()> {
  use {flate2::{write::GzEncoder, Compression}, std::io::Write};
  let domain = nested()?;
  let mut text = vec![];
  domain.write(&mut text)?;
  let mut encoder = GzEncoder::new(vec![], Compression::default());
  encoder.write_all(&text)?;

  let dir = tempfile::tempdir()?;
  let path = dir.path().join("domain.txt.gz");
  std::fs::write(&path, encoder.finish()?)?;
  let reread = Domain::load(&path)?;
  assert_eq!(reread.len(), domain.len());
  assert_eq!(reread.area(), domain.area());
  Ok(())
}

#[test] fn parse_errors() {
  let text = "# outer\n0 0\n1 0\n1 x\n";
  match Domain::read(text.as_bytes()) {
    Err(Error::Parse { line, .. }) => assert_eq!(line, 4),
    other => panic!("unexpected {other:?}")
  }
  let text = "0 0\n1 0\n\n2 2\n";
  assert!(matches!(Domain::read(text.as_bytes()), Err(Error::Parse { line: 1, .. })));
}
