//! Dimension 2: interior glyphs as particles, relaxed under short range repulsion.
//!
//! Boundary glyphs become fixed particles and the interior is seeded on a jittered grid.
//! Every outer cycle rebuilds the neighbour mesh and runs a number of damped Euler
//! steps whose parameters follow the [`Schedule`]: charge comes on after a phase of
//! superposition, overclose glyphs are deleted during cleaning, and the potential's
//! truncation is lowered at the end so that survivors are pushed into firm contact.

use {
  self::{
    mesh::MeshOptions,
    particle::Particle,
    pool::{Body, EdgeResult, Params, Pool}
  },
  crate::{
    arrow::{Arrow, Evaluator},
    domain::Domain,
    error::{Error, Result},
    field::MetricTensorField,
    geometry::{contact_distance, BoundingBox, P2},
    solver::{boundary::centred, potential::Potential, quadtree::PointTree}
  },
  std::{
    f64::consts::PI,
    num::NonZeroUsize,
    sync::{atomic::{AtomicBool, Ordering}, Arc}
  },
  rand::prelude::*,
  itertools::Itertools
};

pub mod mesh;
pub mod particle;
pub mod pool;
pub mod schedule;
#[cfg(test)] mod tests;

pub use schedule::{Phase, Schedule};

/// Stop once the smoothed kinetic energy, past `fraction` of the run, has fallen `db`
/// below its value there.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Decay {
  pub fraction: f64,
  pub db: f64
}

impl Default for Decay {
  fn default() -> Self {
    Self { fraction: 0.8, db: 30.0 }
  }
}

/// Early exit points, mostly for inspecting the intermediate states.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Breakout {
  #[default]
  None,
  /// Right after seeding.
  Grid,
  /// At the end of the superposition phase.
  Superposition,
  /// Halfway through cleaning.
  MidClean,
  /// After cleaning, once a cycle finds nothing overclose.
  PostClean
}

/// Why the relaxation ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Stop {
  /// Ran all the cycles.
  #[default]
  Budget,
  /// Kinetic energy decayed.
  Converged,
  Breakout,
  Cancelled
}

#[derive(Debug, Clone)]
pub struct Dim2Options {
  pub cycles: usize,
  /// Euler steps per cycle.
  pub steps: usize,
  pub dt: f64,
  pub damping: f64,
  /// Seeded glyphs relative to an optimal packing.
  pub overfill: f64,
  pub force_scale: f64,
  pub threads: usize,
  pub seed: u64,
  pub mesh: MeshOptions,
  pub schedule: Schedule,
  pub potential: Potential,
  pub decay: Decay,
  pub breakout: Breakout,
  /// Checked once per cycle; when set the run ends with what it has.
  pub cancel: Option<Arc<AtomicBool>>,
  /// Emitted interior glyphs are at least this contact distance from any other.
  pub contact_min: f64
}

impl Default for Dim2Options {
  fn default() -> Self {
    Self {
      cycles: 100,
      steps: 10,
      dt: 0.1,
      damping: 1.0,
      overfill: 1.0,
      force_scale: 0.005,
      threads: std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
      seed: 0,
      mesh: MeshOptions::default(),
      schedule: Schedule::default(),
      potential: Potential::default(),
      decay: Decay::default(),
      breakout: Breakout::None,
      cancel: None,
      contact_min: 1.0
    }
  }
}

impl Dim2Options {
  pub fn with_cycles(self, cycles: usize, steps: usize) -> Self { Self { cycles, steps, ..self } }
  pub fn with_dt(self, dt: f64) -> Self { Self { dt, ..self } }
  pub fn with_damping(self, damping: f64) -> Self { Self { damping, ..self } }
  pub fn with_overfill(self, overfill: f64) -> Self { Self { overfill, ..self } }
  pub fn with_force_scale(self, force_scale: f64) -> Self { Self { force_scale, ..self } }
  pub fn with_threads(self, threads: usize) -> Self { Self { threads, ..self } }
  pub fn with_seed(self, seed: u64) -> Self { Self { seed, ..self } }
  pub fn with_mesh(self, mesh: MeshOptions) -> Self { Self { mesh, ..self } }
  pub fn with_schedule(self, schedule: Schedule) -> Self { Self { schedule, ..self } }
  pub fn with_potential(self, potential: Potential) -> Self { Self { potential, ..self } }
  pub fn with_decay(self, decay: Decay) -> Self { Self { decay, ..self } }
  pub fn with_breakout(self, breakout: Breakout) -> Self { Self { breakout, ..self } }
  pub fn with_cancel(self, cancel: Arc<AtomicBool>) -> Self { Self { cancel: Some(cancel), ..self } }
  pub fn with_contact_min(self, contact_min: f64) -> Self { Self { contact_min, ..self } }

  pub(crate) fn validate(&self) -> std::result::Result<(), String> {
    let positive = [
      ("dt", self.dt),
      ("overfill", self.overfill),
      ("force scale", self.force_scale),
      ("mesh radius", self.mesh.radius)
    ];
    if let Some((name, value)) = positive.iter().find(|(_, v)| !(*v > 0.0 && v.is_finite())) {
      return Err(format!("{name} must be positive, got {value}"));
    }
    if !(self.damping >= 0.0 && self.damping.is_finite()) {
      return Err(format!("damping must be non-negative, got {}", self.damping));
    }
    if !(self.mesh.growth >= 1.0) {
      return Err(format!("mesh growth {} shrinks the query radius", self.mesh.growth));
    }
    if self.mesh.max == 0 {
      return Err("mesh keeps no neighbours".into());
    }
    if !(self.contact_min > 0.0 && self.contact_min <= 1.0) {
      return Err(format!("minimum contact distance {} is not in (0, 1]", self.contact_min));
    }
    if !(0.0..=1.0).contains(&self.decay.fraction) || !(self.decay.db > 0.0) {
      return Err(format!("bad energy decay {:?}", self.decay));
    }
    self.schedule.validate()
  }

  fn cancelled(&self) -> bool {
    self.cancel.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Dim2Stats {
  pub seeded: usize,
  /// Outer cycles run.
  pub cycles: usize,
  /// Glyphs deleted while relaxing.
  pub deleted: usize,
  /// Glyphs removed from the output for overlapping.
  pub removed: usize,
  pub stop: Stop
}

#[derive(Debug, Clone, Default)]
pub struct Relaxed {
  /// The fixed glyphs first, then the interior.
  pub arrows: Vec<Arrow>,
  pub edges: Vec<(usize, usize)>,
  pub stats: Dim2Stats
}

/// Everything the relaxation reads.
pub struct Context<'a> {
  pub evaluator: &'a Evaluator<'a>,
  pub metric: &'a MetricTensorField,
  pub domain: &'a Domain
}

struct Relaxation<'a> {
  context: &'a Context<'a>,
  options: &'a Dim2Options,
  particles: Vec<Particle>,
  fixed: usize,
  edges: Arc<Vec<(usize, usize)>>,
  stats: Dim2Stats
}

/// Relax interior glyphs around the fixed `boundary` glyphs.
pub fn relax(boundary: &[Arrow], context: &Context, options: &Dim2Options) -> Result<Relaxed> {
  let margin = context.evaluator.options.margin;
  let particles = boundary.iter()
    .map(|arrow| Particle::fixed(&arrow.ellipse(&margin)))
    .collect::<Vec<_>>();
  let mut run = Relaxation {
    context,
    options,
    fixed: particles.len(),
    particles,
    edges: Arc::default(),
    stats: Dim2Stats::default()
  };
  run.seed()?;
  if options.breakout == Breakout::Grid {
    run.stats.stop = Stop::Breakout;
  } else {
    run.run()?;
  }
  Ok(run.emit(boundary))
}

impl Relaxation<'_> {
  fn interior(&self) -> usize {
    self.particles.len() - self.fixed
  }

  /// Jittered grid, as dense as an optimal circle packing of the mean glyph times the
  /// overfill.
  fn seed(&mut self) -> Result<()> {
    let Context { metric, domain, .. } = self.context;
    let mean_area = metric.mean_area()
      .filter(|a| *a > 0.0)
      .ok_or_else(|| Error::BadTopology("no glyph can be evaluated in the domain".into()))?;
    let target = self.options.overfill * PI / (2.0 * 3f64.sqrt()) * domain.area() / mean_area;
    let bbox = domain.bounding_box();
    let spacing = (domain.area() / target).sqrt();
    let nx = ((bbox.width() / spacing).ceil() as usize).max(1);
    let ny = ((bbox.height() / spacing).ceil() as usize).max(1);
    let (dx, dy) = (bbox.width() / nx as f64, bbox.height() / ny as f64);

    let mut rng = rand_pcg::Pcg64::seed_from_u64(self.options.seed);
    for (j, i) in itertools::iproduct!(0..ny, 0..nx) {
      let jitter = (rng.gen_range(-0.25..0.25), rng.gen_range(-0.25..0.25));
      let p = P2::new(
        bbox.min.x + (i as f64 + 0.5 + jitter.0) * dx,
        bbox.min.y + (j as f64 + 0.5 + jitter.1) * dy
      );
      if !domain.inside(p) {
        continue;
      }
      if let Some(ellipse) = metric.ellipse(p) {
        self.particles.push(Particle::interior(ellipse));
      }
    }
    self.stats.seeded = self.interior();
    tracing::info!(
      wanted = target.round(), seeded = self.stats.seeded, fixed = self.fixed, nx, ny,
      "interior seeded"
    );
    if self.interior() == 0 {
      return Err(Error::BadTopology("no interior glyph could be seeded".into()));
    }
    self.rebuild_mesh();
    Ok(())
  }

  fn rebuild_mesh(&mut self) {
    let (positions, majors): (Vec<_>, Vec<_>) = self.particles.iter()
      .map(|p| (p.position, p.major))
      .unzip();
    self.edges = Arc::new(mesh::build(&positions, &majors, self.fixed, &self.options.mesh));
  }

  fn run(&mut self) -> Result<()> {
    let options = self.options;
    let pool = Pool::new(options.threads)?;
    let total = (options.cycles * options.steps).max(1) as f64;
    let (mut smoothed, mut checkpoint) = (None::<f64>, None::<f64>);

    for cycle in 0..options.cycles {
      let mut results = vec![];
      let mut energy = 0.0;
      let mut t = cycle as f64 / options.cycles as f64;
      for step in 0..options.steps {
        t = (cycle * options.steps + step + 1) as f64 / total;
        results = self.step(&pool, t)?;
        energy = self.particles[self.fixed..].iter().map(Particle::kinetic_energy).sum::<f64>();
      }
      let overclose = self.clean(&results, t)?;
      self.stats.cycles = cycle + 1;

      let db = 10.0 * energy.max(f64::MIN_POSITIVE).log10();
      let smooth = smoothed.map_or(db, |s| 0.9 * s + 0.1 * db);
      smoothed = Some(smooth);
      tracing::debug!(
        cycle, t, interior = self.interior(), edges = self.edges.len(), overclose,
        energy = smooth, "cycle"
      );

      let schedule = &options.schedule;
      let breakout = match options.breakout {
        Breakout::Superposition => t >= schedule.superposition.end,
        Breakout::MidClean => t >= schedule.clean.midpoint(),
        Breakout::PostClean => t >= schedule.clean.end && overclose == 0,
        Breakout::None | Breakout::Grid => false
      };
      if breakout {
        self.stats.stop = Stop::Breakout;
        break;
      }
      if t >= options.decay.fraction {
        let reference = *checkpoint.get_or_insert(smooth);
        if smooth < reference - options.decay.db {
          self.stats.stop = Stop::Converged;
          break;
        }
      }
      if options.cancelled() {
        tracing::info!(cycle, "relaxation cancelled");
        self.stats.stop = Stop::Cancelled;
        break;
      }
    }
    tracing::info!(
      cycles = self.stats.cycles, interior = self.interior(), deleted = self.stats.deleted,
      stop = ?self.stats.stop, threads = pool.threads(), "relaxation done"
    );
    Ok(())
  }

  /// One Euler step at progress `t`; returns the per-edge results.
  fn step(&mut self, pool: &Pool, t: f64) -> Result<Vec<EdgeResult>> {
    let schedule = &self.options.schedule;
    let charge = schedule.charge(t);
    let deletion = schedule.deletion_radius(t);
    for p in &mut self.particles[self.fixed..] {
      p.charge = charge;
    }
    let params = Params {
      potential: self.options.potential,
      truncation: schedule.truncation(t),
      force_scale: self.options.force_scale
    };
    let bodies = self.particles.iter().map(Body::from).collect::<Vec<_>>();
    let results = pool.forces(bodies, self.edges.clone(), params)?;

    for p in &mut self.particles {
      p.force = Default::default();
    }
    for (&(i, j), result) in self.edges.iter().zip(&results) {
      let Some(d) = result.distance else {
        let (a, b) = (&self.particles[i], &self.particles[j]);
        tracing::warn!(
          i, j, pi = ?a.position, pj = ?b.position, mi = ?a.mt, mj = ?b.mt,
          "contact distance failed, pair skipped"
        );
        continue;
      };
      let (fixed_i, fixed_j) = (self.particles[i].fixed, self.particles[j].fixed);
      if !fixed_i {
        self.particles[i].force += result.force;
      }
      if !fixed_j {
        self.particles[j].force -= result.force;
      }
      if fixed_i != fixed_j && d < deletion {
        self.particles[if fixed_i { j } else { i }].stale = true;
      }
    }
    let (dt, damping) = (self.options.dt, self.options.damping);
    for p in &mut self.particles[self.fixed..] {
      p.step(dt, damping);
    }
    Ok(results)
  }

  /// Post-cycle maintenance: delete the worst overclose glyphs, reshape the rest from
  /// the metric field, compact and rebuild the mesh. Returns the overclose count.
  fn clean(&mut self, results: &[EdgeResult], t: f64) -> Result<usize> {
    let schedule = &self.options.schedule;
    let radius = schedule.deletion_radius(t);

    // closest contact, charged to the lower index of each edge only
    let mut closest = vec![f64::INFINITY; self.particles.len()];
    for (&(i, _), result) in self.edges.iter().zip(results) {
      if let Some(d) = result.distance {
        closest[i] = closest[i].min(d);
      }
    }
    let overclose = (self.fixed..self.particles.len())
      .filter(|&i| closest[i] < radius)
      .sorted_by(|&a, &b| closest[a].total_cmp(&closest[b]).then(a.cmp(&b)))
      .collect::<Vec<_>>();
    let cap = (schedule.deletion_cap(t) * self.interior() as f64).ceil() as usize;
    for &i in overclose.iter().take(cap) {
      self.particles[i].stale = true;
    }

    let Context { metric, domain, .. } = self.context;
    for p in self.particles[self.fixed..].iter_mut().filter(|p| !p.stale) {
      match domain.inside(p.position).then(|| metric.ellipse(p.position)).flatten() {
        Some(ellipse) => p.reshape(&ellipse),
        None => p.stale = true
      }
    }

    let before = self.particles.len();
    self.particles.retain(|p| !p.stale);
    self.stats.deleted += before - self.particles.len();
    if self.interior() == 0 {
      return Err(Error::BadTopology("every interior glyph was deleted".into()));
    }
    self.rebuild_mesh();
    Ok(overclose.len())
  }

  /// Glyphs at the final positions, with those still too close to a neighbour removed,
  /// worst first.
  fn emit(self, boundary: &[Arrow]) -> Relaxed {
    let evaluator = self.context.evaluator;
    let margin = evaluator.options.margin;
    let mut arrows = boundary.to_vec();
    arrows.extend(self.particles[self.fixed..].iter()
      .filter_map(|p| centred(evaluator, p.position))
      .map(|(arrow, _)| arrow));
    let ellipses = arrows.iter().map(|a| a.ellipse(&margin)).collect::<Vec<_>>();
    let fixed = boundary.len();

    let tree = PointTree::build(ellipses.iter().map(|e| e.centre).enumerate());
    let reach = ellipses.iter().map(|e| e.major).fold(0.0, f64::max);
    let mut violations = (fixed..ellipses.len())
      .flat_map(|i| {
        let e = &ellipses[i];
        tree.within(e.centre, e.major + reach).into_iter()
          .filter(move |&(j, _)| j != i)
          .map(move |(j, _)| (i.min(j), i.max(j)))
      })
      .unique()
      .filter_map(|(a, b)| {
        let d = contact_distance(&ellipses[a], &ellipses[b]).unwrap_or(0.0);
        (d < self.options.contact_min).then_some((d, a, b))
      })
      .collect::<Vec<_>>();
    violations.sort_by(|x, y| x.0.total_cmp(&y.0).then((x.1, x.2).cmp(&(y.1, y.2))));

    let mut worst = vec![f64::INFINITY; ellipses.len()];
    for &(d, a, b) in &violations {
      worst[a] = worst[a].min(d);
      worst[b] = worst[b].min(d);
    }
    let mut removed = vec![false; ellipses.len()];
    for &(_, a, b) in &violations {
      if removed[a] || removed[b] {
        continue;
      }
      let victim = if a < fixed {
        b
      } else if worst[a] < worst[b] {
        a
      } else {
        b
      };
      removed[victim] = true;
    }

    let kept = (0..arrows.len()).filter(|&i| !removed[i]).collect::<Vec<_>>();
    let mut stats = self.stats;
    stats.removed = arrows.len() - kept.len();
    let arrows = kept.iter().map(|&i| arrows[i]).collect::<Vec<_>>();
    let (positions, majors): (Vec<_>, Vec<_>) = kept.iter()
      .map(|&i| (ellipses[i].centre, ellipses[i].major))
      .unzip();
    let edges = mesh::build(&positions, &majors, fixed, &self.options.mesh);
    if stats.removed > 0 {
      tracing::info!(removed = stats.removed, "overlapping glyphs removed from the output");
    }
    Relaxed { arrows, edges, stats }
  }
}
