use {
  super::*,
  crate::{
    arrow::EvalOptions,
    field::Field,
    solver::metric_field
  },
  anyhow::Result
};

fn rect() -> Domain {
  let mut domain = Domain::rect(P2::origin(), P2::new(6.0, 3.0));
  domain.orient();
  domain
}

fn relax_in(field: &Field, domain: &Domain, options: &Dim2Options) -> crate::error::Result<Relaxed> {
  let evaluator = Evaluator::new(field, EvalOptions::default());
  let metric = metric_field(&evaluator, domain, (25, 13))?;
  let context = Context { evaluator: &evaluator, metric: &metric, domain };
  relax(&[], &context, options)
}

fn quick() -> Dim2Options {
  Dim2Options::default().with_cycles(20, 2).with_threads(1)
}

#[test] fn grid_density() -> Result<()> {
  let field = Field::uniform(0.0, 1.0);
  let relaxed = relax_in(&field, &rect(), &quick().with_breakout(Breakout::Grid))?;
  let stats = relaxed.stats;
  // π/(2√3) × 18 / (π × 0.5625 × 0.125) ≈ 74 wanted, on a 13 × 7 grid
  assert_eq!(stats.seeded, 91);
  assert_eq!((stats.cycles, stats.stop), (0, Stop::Breakout));
  assert!(stats.removed > 0);
  assert_eq!(relaxed.arrows.len(), stats.seeded - stats.removed);
  Ok(())
}

#[test] fn superposition_breakout() -> Result<()> {
  let field = Field::uniform(0.0, 1.0);
  let relaxed = relax_in(&field, &rect(), &quick().with_breakout(Breakout::Superposition))?;
  assert_eq!((relaxed.stats.cycles, relaxed.stats.stop), (2, Stop::Breakout));
  Ok(())
}

#[test] fn cancelled_after_one_cycle() -> Result<()> {
  let field = Field::uniform(0.0, 1.0);
  let cancel = Arc::new(AtomicBool::new(true));
  let relaxed = relax_in(&field, &rect(), &quick().with_cancel(cancel))?;
  assert_eq!((relaxed.stats.cycles, relaxed.stats.stop), (1, Stop::Cancelled));
  assert!(!relaxed.arrows.is_empty());
  Ok(())
}

#[test] fn no_data_is_bad_topology() {
  let field = Field::new(|_| None);
  match relax_in(&field, &rect(), &quick()) {
    Err(Error::BadTopology(_)) => {}
    other => panic!("unexpected {other:?}")
  }
}

#[test] fn output_mesh_spans_the_glyphs() -> Result<()> {
  let field = Field::uniform(0.5, 1.0);
  let relaxed = relax_in(&field, &rect(), &quick())?;
  assert!(matches!(relaxed.stats.stop, Stop::Budget | Stop::Converged));
  assert!(relaxed.stats.cycles <= 20);
  let n = relaxed.arrows.len();
  assert!(relaxed.edges.iter().all(|&(i, j)| i < j && j < n));
  let touched = relaxed.edges.iter().flat_map(|&(i, j)| [i, j]).unique().count();
  assert!(n < 2 || touched == n);
  Ok(())
}

#[test] fn curved_glyphs_are_emitted_where_they_were_relaxed() -> Result<()> {
  let field = Field::new(|_| Some((0.0, 1.0))).with_curvature(|_| Some(1.5));
  let evaluator = Evaluator::new(&field, EvalOptions::default());
  let domain = rect();
  let metric = metric_field(&evaluator, &domain, (25, 13))?;
  let context = Context { evaluator: &evaluator, metric: &metric, domain: &domain };
  let options = quick();
  let positions = [P2::new(1.5, 1.5), P2::new(4.5, 1.5)];
  let particles = positions.iter()
    .map(|&p| metric.ellipse(p).map(Particle::interior))
    .collect::<Option<Vec<_>>>()
    .unwrap();
  let run = Relaxation {
    context: &context,
    options: &options,
    particles,
    fixed: 0,
    edges: Arc::default(),
    stats: Dim2Stats::default()
  };

  let relaxed = run.emit(&[]);
  assert_eq!(relaxed.arrows.len(), 2);
  let margin = evaluator.options.margin;
  for (arrow, p) in relaxed.arrows.iter().zip(positions) {
    assert!((arrow.ellipse(&margin).centre - p).length() < 1e-12, "{arrow:?}");
    // the shaft sits on the convex side of its bounding ellipse
    assert!(arrow.centre.y < p.y - 1e-3, "{arrow:?}");
  }
  Ok(())
}

#[test] fn options_validate() {
  assert!(Dim2Options::default().validate().is_ok());
  assert!(quick().with_contact_min(0.0).validate().is_err());
  assert!(quick().with_dt(-0.1).validate().is_err());
  assert!(quick().with_mesh(MeshOptions::default().with_growth(0.5, 3)).validate().is_err());
  assert!(quick().with_decay(Decay { fraction: 1.5, db: 30.0 }).validate().is_err());
}
