//! The force pass, spread over a fixed set of worker threads.
//!
//! Each pass publishes a [`Job`] under the state mutex and bumps the generation; workers
//! wake on the condvar, compute the per-edge results of their own contiguous range of
//! edges into their own slot, and meet the main thread at the barrier. Results are
//! concatenated in range order, so they do not depend on the number of workers.

use {
  super::particle::Particle,
  crate::{
    error::{Error, Result},
    geometry::{contact_mt, M2, P2, V2},
    solver::potential::Potential
  },
  std::{
    ops::Range,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Barrier, Condvar, Mutex, OnceLock, PoisonError},
    thread::{self, JoinHandle}
  }
};

/// What the force kernel reads of a particle.
#[derive(Debug, Copy, Clone)]
pub struct Body {
  pub position: P2,
  pub mt: M2,
  pub charge: f64
}

impl From<&Particle> for Body {
  fn from(p: &Particle) -> Self {
    Self { position: p.position, mt: p.mt, charge: p.charge }
  }
}

#[derive(Debug, Copy, Clone)]
pub struct Params {
  pub potential: Potential,
  pub truncation: f64,
  pub force_scale: f64
}

/// Outcome for edge `(i, j)`: the force on `i` (`j` takes the opposite), and the contact
/// distance, `None` when it could not be computed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeResult {
  pub force: V2,
  pub distance: Option<f64>
}

pub fn kernel(bodies: &[Body], (i, j): (usize, usize), params: &Params) -> EdgeResult {
  let (a, b) = (&bodies[i], &bodies[j]);
  let r = b.position - a.position;
  let Some(f) = contact_mt(r, &a.mt, &b.mt) else {
    return EdgeResult { force: V2::zero(), distance: None };
  };
  let d = f.sqrt();
  let length = r.length();
  let force = if d < 1.0 && length > 0.0 {
    let magnitude = params.potential.force(d.max(params.truncation))
      * a.charge * b.charge * params.force_scale;
    -r * (magnitude / length)
  } else {
    V2::zero()
  };
  EdgeResult { force, distance: Some(d) }
}

pub struct Job {
  bodies: Vec<Body>,
  edges: Arc<Vec<(usize, usize)>>,
  params: Params,
  slots: Vec<OnceLock<Vec<EdgeResult>>>
}

impl Job {
  pub fn new(bodies: Vec<Body>, edges: Arc<Vec<(usize, usize)>>, params: Params, workers: usize) -> Self {
    let slots = (0..workers.max(1)).map(|_| OnceLock::new()).collect();
    Self { bodies, edges, params, slots }
  }

  /// Contiguous, near-equal share of the edges for worker `k`.
  fn range(&self, k: usize) -> Range<usize> {
    let n = self.slots.len();
    let (base, extra) = (self.edges.len() / n, self.edges.len() % n);
    let start = k * base + k.min(extra);
    start..start + base + usize::from(k < extra)
  }

  fn run(&self, k: usize) {
    let results = self.edges[self.range(k)].iter()
      .map(|&edge| kernel(&self.bodies, edge, &self.params))
      .collect::<Vec<_>>();
    // a slot is only ever filled by its own worker
    let _ = self.slots[k].set(results);
  }

  fn collect(&self) -> Result<Vec<EdgeResult>> {
    let mut results = Vec::with_capacity(self.edges.len());
    for (k, slot) in self.slots.iter().enumerate() {
      let part = slot.get()
        .ok_or_else(|| Error::Concurrency(format!("worker {k} produced no forces")))?;
      results.extend_from_slice(part);
    }
    Ok(results)
  }
}

struct State {
  generation: u64,
  terminate: bool,
  job: Option<Arc<Job>>
}

struct Shared {
  state: Mutex<State>,
  ready: Condvar,
  done: Barrier
}

pub struct Pool {
  shared: Arc<Shared>,
  workers: Vec<JoinHandle<()>>,
  threads: usize
}

impl Pool {
  /// Start `threads` workers; with one thread or fewer the pass runs inline.
  pub fn new(threads: usize) -> Result<Self> {
    let threads = if threads > 1 { threads } else { 0 };
    let shared = Arc::new(Shared {
      state: Mutex::new(State { generation: 0, terminate: false, job: None }),
      ready: Condvar::new(),
      done: Barrier::new(threads + 1)
    });
    let mut pool = Self { shared, workers: Vec::with_capacity(threads), threads };
    for k in 0..threads {
      let shared = pool.shared.clone();
      let worker = thread::Builder::new()
        .name(format!("glyph-forces-{k}"))
        .spawn(move || work(&shared, k))
        .map_err(|e| Error::Concurrency(format!("cannot start worker {k}: {e}")))?;
      pool.workers.push(worker);
    }
    tracing::debug!(threads, "force pool started");
    Ok(pool)
  }

  pub fn threads(&self) -> usize {
    self.threads.max(1)
  }

  /// Per-edge results over all of `edges`, in edge order.
  pub fn forces(&self, bodies: Vec<Body>, edges: Arc<Vec<(usize, usize)>>, params: Params) -> Result<Vec<EdgeResult>> {
    if self.workers.is_empty() {
      return Ok(edges.iter().map(|&edge| kernel(&bodies, edge, &params)).collect());
    }
    let job = Arc::new(Job::new(bodies, edges, params, self.workers.len()));
    {
      let mut state = self.shared.state.lock()?;
      state.generation += 1;
      state.job = Some(job.clone());
    }
    self.shared.ready.notify_all();
    self.shared.done.wait();
    self.shared.state.lock()?.job = None;
    job.collect()
  }
}

fn work(shared: &Shared, k: usize) {
  let mut seen = 0;
  loop {
    let job = {
      let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
      while state.generation == seen && !state.terminate {
        state = shared.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
      }
      if state.terminate {
        return;
      }
      seen = state.generation;
      state.job.clone()
    };
    if let Some(job) = job {
      // the empty slot reports the failure to the main thread
      if panic::catch_unwind(AssertUnwindSafe(|| job.run(k))).is_err() {
        tracing::error!(worker = k, "force pass panicked");
      }
    }
    shared.done.wait();
  }
}

impl Drop for Pool {
  fn drop(&mut self) {
    self.shared.state.lock().unwrap_or_else(PoisonError::into_inner).terminate = true;
    self.shared.ready.notify_all();
    for worker in self.workers.drain(..) {
      if worker.join().is_err() {
        tracing::error!("force worker panicked on shutdown");
      }
    }
  }
}
