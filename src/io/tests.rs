use {
  super::*,
  crate::{
    arrow::{Arrow, Bend},
    geometry::P2
  },
  anyhow::Result,
  euclid::Box2D,
  flate2::{write::GzEncoder, Compression},
  std::io::{Cursor, Write}
};

fn sample_vgs() -> Vgs {
  let arrows = vec![
    Arrow::straight(P2::new(0.5, 0.25), 0.1, 0.3, 0.05),
    Arrow::straight(P2::new(1.0 / 3.0, 2.0), -2.5, 0.2, 0.025).with_signed_curvature(1.5),
    Arrow::straight(P2::new(-1e-3, 7.0), 3.0, 1.0, 0.125).with_signed_curvature(-0.75)
  ];
  Vgs::new(arrows, vec![(0, 1), (1, 2)])
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
  let mut encoder = GzEncoder::new(vec![], Compression::default());
  encoder.write_all(bytes)?;
  Ok(encoder.finish()?)
}

#[test] fn vgs_round_trip() -> Result<()> {
  let vgs = sample_vgs();
  let mut buffer = vec![];
  vgs.write(&mut buffer)?;
  assert!(buffer.starts_with(b"# vgs 1.0\n3\n"));
  let reread = Vgs::read(buffer.as_slice())?;
  assert_eq!(reread, vgs);
  assert_eq!(reread.arrows[2].bend, Bend::Right);
  Ok(())
}

#[test] fn vgs_gzip() -> Result<()> {
  let vgs = sample_vgs();
  let mut buffer = vec![];
  vgs.write(&mut buffer)?;
  let compressed = gzip(&buffer)?;
  assert_eq!(Vgs::read(decompressing(Cursor::new(compressed.clone()))?)?, vgs);

  let dir = tempfile::tempdir()?;
  let path = dir.path().join("state.vgs.gz");
  std::fs::write(&path, compressed)?;
  assert_eq!(Vgs::load(&path)?, vgs);
  let path = dir.path().join("state.vgs");
  vgs.save(&path)?;
  assert_eq!(Vgs::load(&path)?, vgs);
  Ok(())
}

#[test] fn vgs_comments() -> Result<()> {
  let text = "# vgs 1.3\n# two glyphs\n2\n0 0 0 1 0.1 0\n\n1 1 0 1 0.1 -2\n# no mesh\n0\n";
  let vgs = Vgs::read(text.as_bytes())?;
  assert_eq!(vgs.arrows.len(), 2);
  assert_eq!(vgs.arrows[1].signed_curvature(), -2.0);
  assert!(vgs.edges.is_empty());
  Ok(())
}

#[test] fn vgs_rejects() {
  let cases = [
    ("# vgs 2.0\n0\n0\n", 1),
    ("# vgx 1.0\n0\n", 1),
    ("# vgs 1.0\n2\n0 0 0 1 0.1 0\n", 3),
    ("# vgs 1.0\n1\n0 0 0 1 0.1 0\n1\n0 1 0 0 1 1\n", 5),
    ("# vgs 1.0\n1\n0 0 0 1 0.1\n0\n", 3)
  ];
  for (text, expected) in cases {
    match Vgs::read(text.as_bytes()) {
      Err(Error::Parse { line, .. }) => assert_eq!(line, expected, "{text:?}"),
      other => panic!("{text:?}: unexpected {other:?}")
    }
  }
}

#[test] fn vgs_dangling_edge() {
  let mut vgs = sample_vgs();
  vgs.edges.push((2, 3));
  let mut buffer = vec![];
  assert!(matches!(vgs.write(&mut buffer), Err(Error::Config(_))));
  assert!(buffer.is_empty());
}

fn sample_sag() -> Result<SagGrid> {
  let bbox = Box2D::new(P2::new(-1.0, 0.0), P2::new(1.0, 0.6));
  let mut grid = SagGrid::new(5, 4, bbox, 0.25)?;
  grid.sample(|p| (p.x < 0.6).then(|| (p.y + 1.0, -p.x)));
  Ok(grid)
}

#[test] fn sag_round_trip() -> Result<()> {
  let grid = sample_sag()?;
  let mut buffer = vec![];
  grid.write(&mut buffer)?;
  let reread = SagGrid::read(buffer.as_slice())?;
  for (i, j) in itertools::iproduct!(0..5, 0..4) {
    assert_eq!(reread.get(i, j), grid.get(i, j), "node ({i}, {j})");
  }
  assert_eq!(reread.get(4, 0), None);
  assert_eq!(reread.tolerance, 0.25);
  Ok(())
}

#[test] fn sag_snapping() -> Result<()> {
  // nodes every 0.5 in x and 0.2 in y
  let text = "#sag 1 2 2 5 4 -1 0 1 0.6 0.25\n\
    -0.95 0.01 1 0\n\
    -0.35 0.2 2 0\n\
    0.5 0.58 0 3\n";
  let grid = SagGrid::read(text.as_bytes())?;
  assert_eq!(grid.get(0, 0), Some((1.0, 0.0)));
  assert_eq!(grid.get(1, 1), None);
  assert_eq!(grid.get(3, 3), Some((0.0, 3.0)));
  assert_eq!(grid.snap(P2::new(-0.35, 0.2)), None);
  assert!(SagGrid::read("#sag 1 3 2 5 4 -1 0 1 0.6 0.25\n".as_bytes()).is_err());
  Ok(())
}

#[test] fn sag_field() -> Result<()> {
  let field = sample_sag()?.field();
  let (angle, magnitude) = field.value(P2::new(0.0, 0.4)).unwrap();
  assert!((magnitude - 1.4).abs() < 1e-12);
  assert!(angle.abs() < 1e-12);
  assert!(field.value(P2::new(0.9, 0.3)).is_none());
  Ok(())
}
