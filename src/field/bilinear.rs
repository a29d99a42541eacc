use {
  crate::{
    error::{Error, Result},
    geometry::{P2, WorldSpace}
  },
  std::fmt::{Debug, Formatter},
  euclid::Box2D,
  humansize::{FileSize, file_size_opts as options},
  rayon::prelude::*
};

/// Corner bits of a cell mask.
const SW: u8 = 1;
const SE: u8 = 2;
const NW: u8 = 4;
const NE: u8 = 8;
const FULL: u8 = SW | SE | NW | NE;

/// Sub-samples per axis when integrating a clipped triangular cell.
const TRIANGLE_SUBSAMPLES: usize = 16;

/// Scalar samples on a regular `nx × ny` grid spanning `bbox`, any of which may be missing.
///
/// Node `(i, j)` sits at `(x0 + i dx, y0 + j dy)`. Each of the `(nx - 1) × (ny - 1)` cells
/// keeps a 4-bit mask of its defined corners: bit 0 for `(i, j)`, bit 1 for `(i + 1, j)`,
/// bit 2 for `(i, j + 1)`, bit 3 for `(i + 1, j + 1)`. A cell with all four corners
/// interpolates bilinearly; with three, linearly over the triangle they span, and not at
/// all in the other half; with fewer, not at all.
#[derive(Clone)]
pub struct Bilinear {
  nx: usize,
  ny: usize,
  bbox: Box2D<f64, WorldSpace>,
  values: Vec<Option<f64>>,
  mask: Vec<u8>
}

/// Position of a query within its cell.
struct Local {
  i: usize,
  j: usize,
  s: f64,
  t: f64
}

impl Bilinear {
  pub fn new(nx: usize, ny: usize, bbox: Box2D<f64, WorldSpace>) -> Result<Self> {
    if nx < 2 || ny < 2 {
      return Err(Error::Config(format!("bilinear grid needs at least 2 × 2 nodes, got {nx} × {ny}")));
    }
    if !(bbox.width() > 0.0 && bbox.height() > 0.0) {
      return Err(Error::Config(format!("bilinear grid over an empty box {bbox:?}")));
    }
    Ok(Self {
      nx, ny, bbox,
      values: vec![None; nx * ny],
      mask: vec![0; (nx - 1) * (ny - 1)]
    })
  }

  pub fn nx(&self) -> usize { self.nx }
  pub fn ny(&self) -> usize { self.ny }
  pub fn bbox(&self) -> Box2D<f64, WorldSpace> { self.bbox }

  /// Node spacing `(dx, dy)`.
  pub fn spacing(&self) -> (f64, f64) {
    (
      self.bbox.width() / (self.nx - 1) as f64,
      self.bbox.height() / (self.ny - 1) as f64
    )
  }

  pub fn node_position(&self, i: usize, j: usize) -> P2 {
    let (dx, dy) = self.spacing();
    P2::new(self.bbox.min.x + i as f64 * dx, self.bbox.min.y + j as f64 * dy)
  }

  pub fn get(&self, i: usize, j: usize) -> Option<f64> {
    self.values[j * self.nx + i]
  }

  pub fn set(&mut self, i: usize, j: usize, value: Option<f64>) {
    assert!(i < self.nx && j < self.ny, "node ({i}, {j}) outside {} × {} grid", self.nx, self.ny);
    self.values[j * self.nx + i] = value.filter(|v| v.is_finite());
    let cells = self.nx - 1;
    // the node is a corner of up to four cells
    for (ci, cj, bit) in [
      (i, j, SW),
      (i.wrapping_sub(1), j, SE),
      (i, j.wrapping_sub(1), NW),
      (i.wrapping_sub(1), j.wrapping_sub(1), NE)
    ] {
      if ci < cells && cj < self.ny - 1 {
        let m = &mut self.mask[cj * cells + ci];
        if self.values[j * self.nx + i].is_some() { *m |= bit } else { *m &= !bit }
      }
    }
  }

  /// Fill every node from `f`, evaluated in parallel.
  pub fn sample(&mut self, f: impl Fn(P2) -> Option<f64> + Sync) {
    let nx = self.nx;
    let values = (0..self.nx * self.ny)
      .into_par_iter()
      .map(|k| f(self.node_position(k % nx, k / nx)))
      .collect::<Vec<_>>();
    self.fill(values);
  }

  /// Replace all node values at once, row by row.
  pub(crate) fn fill(&mut self, values: Vec<Option<f64>>) {
    assert_eq!(values.len(), self.values.len());
    self.values = values.into_iter()
      .map(|v| v.filter(|v| v.is_finite()))
      .collect();
    let cells = self.nx - 1;
    for cj in 0..self.ny - 1 {
      for ci in 0..cells {
        let bit = |i: usize, j: usize, b: u8| if self.values[j * self.nx + i].is_some() { b } else { 0 };
        self.mask[cj * cells + ci] = bit(ci, cj, SW) | bit(ci + 1, cj, SE)
          | bit(ci, cj + 1, NW) | bit(ci + 1, cj + 1, NE);
      }
    }
  }

  pub fn cell_mask(&self, i: usize, j: usize) -> u8 {
    self.mask[j * (self.nx - 1) + i]
  }

  fn locate(&self, p: P2) -> Option<Local> {
    let (dx, dy) = self.spacing();
    let u = (p.x - self.bbox.min.x) / dx;
    let v = (p.y - self.bbox.min.y) / dy;
    let (umax, vmax) = ((self.nx - 1) as f64, (self.ny - 1) as f64);
    // tolerate rounding on the far edges
    let eps = 1e-9;
    if !(u >= -eps && v >= -eps && u <= umax + eps && v <= vmax + eps) {
      return None;
    }
    let i = (u.floor().max(0.0) as usize).min(self.nx - 2);
    let j = (v.floor().max(0.0) as usize).min(self.ny - 2);
    Some(Local {
      i, j,
      s: (u - i as f64).clamp(0.0, 1.0),
      t: (v - j as f64).clamp(0.0, 1.0)
    })
  }

  /// Value of cell `(i, j)` at local coordinates `(s, t) ∈ [0, 1]²`.
  fn cell_eval(&self, i: usize, j: usize, s: f64, t: f64) -> Option<f64> {
    let z = |di: usize, dj: usize| self.values[(j + dj) * self.nx + i + di].unwrap_or(0.0);
    let (z00, z10, z01, z11) = (z(0, 0), z(1, 0), z(0, 1), z(1, 1));
    match self.cell_mask(i, j) {
      FULL => Some(
        z00 * (1.0 - s) * (1.0 - t) + z10 * s * (1.0 - t)
          + z01 * (1.0 - s) * t + z11 * s * t
      ),
      m if m == FULL & !NE => (s + t <= 1.0)
        .then(|| z00 + s * (z10 - z00) + t * (z01 - z00)),
      m if m == FULL & !SW => (s + t >= 1.0)
        .then(|| z11 + (1.0 - s) * (z01 - z11) + (1.0 - t) * (z10 - z11)),
      m if m == FULL & !SE => (t >= s)
        .then(|| z00 + t * (z01 - z00) + s * (z11 - z01)),
      m if m == FULL & !NW => (s >= t)
        .then(|| z00 + s * (z10 - z00) + t * (z11 - z10)),
      _ => None
    }
  }

  /// Interpolated value; `None` outside the grid or where the enclosing cell lacks data.
  pub fn eval(&self, p: P2) -> Option<f64> {
    let Local { i, j, s, t } = self.locate(p)?;
    self.cell_eval(i, j, s, t)
  }

  /// Integral of the interpolant over the whole grid.
  pub fn integrate(&self) -> f64 {
    self.integrate_box(self.bbox)
  }

  /// Integral of the interpolant over the part of `region` inside the grid.
  pub fn integrate_box(&self, region: Box2D<f64, WorldSpace>) -> f64 {
    self.clipped_cells(region)
      .map(|(i, j, s, t)| self.cell_integral(i, j, s, t, |x| x))
      .sum::<f64>()
  }

  /// Area over which the interpolant is defined.
  pub fn defined_area(&self) -> f64 {
    self.clipped_cells(self.bbox)
      .map(|(i, j, s, t)| self.cell_integral(i, j, s, t, |_| 1.0))
      .sum::<f64>()
  }

  /// Cells meeting `region`, with the local extent `[s0, s1] × [t0, t1]` of the overlap.
  fn clipped_cells(&self, region: Box2D<f64, WorldSpace>)
    -> impl Iterator<Item = (usize, usize, (f64, f64), (f64, f64))> + '_
  {
    let (dx, dy) = self.spacing();
    let to_local = |x: f64, origin: f64, d: f64| (x - origin) / d;
    let (u0, u1) = (
      to_local(region.min.x, self.bbox.min.x, dx).max(0.0),
      to_local(region.max.x, self.bbox.min.x, dx).min((self.nx - 1) as f64)
    );
    let (v0, v1) = (
      to_local(region.min.y, self.bbox.min.y, dy).max(0.0),
      to_local(region.max.y, self.bbox.min.y, dy).min((self.ny - 1) as f64)
    );
    let range = |a: f64, b: f64, n: usize| if b > a {
      (a.floor() as usize).min(n - 2)..(b.ceil() as usize).min(n - 1)
    } else { 0..0 };
    itertools::iproduct!(range(v0, v1, self.ny), range(u0, u1, self.nx))
      .filter_map(move |(j, i)| {
        let s = ((u0 - i as f64).max(0.0), (u1 - i as f64).min(1.0));
        let t = ((v0 - j as f64).max(0.0), (v1 - j as f64).min(1.0));
        (s.1 > s.0 && t.1 > t.0).then_some((i, j, s, t))
      })
  }

  /// Integral over the local rectangle `s × t` of cell `(i, j)`, of `g` applied to the
  /// interpolant (`g` is the identity or a constant).
  fn cell_integral(
    &self, i: usize, j: usize,
    (s0, s1): (f64, f64), (t0, t1): (f64, f64),
    g: impl Fn(f64) -> f64
  ) -> f64 {
    let (dx, dy) = self.spacing();
    let mask = self.cell_mask(i, j);
    if mask == FULL {
      // separable: ∫(1 - s) ds, ∫ s ds
      let a1 = 0.5 * (s1 * s1 - s0 * s0);
      let a0 = (s1 - s0) - a1;
      let b1 = 0.5 * (t1 * t1 - t0 * t0);
      let b0 = (t1 - t0) - b1;
      let z = |di: usize, dj: usize| g(self.values[(j + dj) * self.nx + i + di].unwrap_or(0.0));
      let (z00, z10, z01, z11) = (z(0, 0), z(1, 0), z(0, 1), z(1, 1));
      return (z00 * a0 * b0 + z10 * a1 * b0 + z01 * a0 * b1 + z11 * a1 * b1) * dx * dy;
    }
    if mask.count_ones() != 3 {
      return 0.0;
    }
    if (s0, s1, t0, t1) == (0.0, 1.0, 0.0, 1.0) {
      // linear over a half cell: area times the mean of the corners
      let corners = [(0, 0, SW), (1, 0, SE), (0, 1, NW), (1, 1, NE)];
      let sum = corners.iter()
        .filter(|&&(_, _, bit)| mask & bit != 0)
        .map(|&(di, dj, _)| g(self.values[(j + dj) * self.nx + i + di].unwrap_or(0.0)))
        .sum::<f64>();
      return 0.5 * sum / 3.0 * dx * dy;
    }
    // clipped triangle: midpoint rule
    let n = TRIANGLE_SUBSAMPLES;
    let (ds, dt) = ((s1 - s0) / n as f64, (t1 - t0) / n as f64);
    itertools::iproduct!(0..n, 0..n)
      .filter_map(|(a, b)| self.cell_eval(
        i, j,
        s0 + (a as f64 + 0.5) * ds,
        t0 + (b as f64 + 0.5) * dt
      ))
      .map(&g)
      .sum::<f64>() * ds * dt * dx * dy
  }

  /// Number of nodes holding a value.
  pub fn defined_nodes(&self) -> usize {
    self.values.iter().filter(|v| v.is_some()).count()
  }

  fn memory_size(&self) -> usize {
    std::mem::size_of::<Self>()
      + self.values.len() * std::mem::size_of::<Option<f64>>()
      + self.mask.len()
  }
}

impl Debug for Bilinear {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Bilinear")
      .field("size", &format_args!("{} × {}", self.nx, self.ny))
      .field("bbox", &self.bbox)
      .field("defined", &format_args!("{}/{}", self.defined_nodes(), self.values.len()))
      .field("memory", &self.memory_size().file_size(options::BINARY).unwrap_or_default())
      .finish()
  }
}
