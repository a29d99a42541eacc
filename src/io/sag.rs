//! Simple grid exchange: a header
//! ```text
//! #sag <version> <grid dim> <vector dim> <nx> <ny> <xmin> <ymin> <xmax> <ymax> <tolerance>
//! ```
//! then one `x y u v` line per sample. Only two dimensional grids of two component
//! vectors are handled. Samples further than `tolerance` node spacings from any node are
//! skipped; nodes left without a sample have no data.

use {
  super::{Lines, fields},
  crate::{
    error::{Error, Result},
    field::{Bilinear, Field},
    geometry::{P2, WorldSpace}
  },
  std::{
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::Path
  },
  euclid::Box2D
};

pub const VERSION: u32 = 1;

/// Two component vector samples on a regular grid.
#[derive(Debug, Clone)]
pub struct SagGrid {
  pub u: Bilinear,
  pub v: Bilinear,
  /// Snapping tolerance as a fraction of the node spacing.
  pub tolerance: f64
}

impl SagGrid {
  pub fn new(nx: usize, ny: usize, bbox: Box2D<f64, WorldSpace>, tolerance: f64) -> Result<Self> {
    let grid = Bilinear::new(nx, ny, bbox)?;
    Ok(Self { u: grid.clone(), v: grid, tolerance })
  }

  /// Sample `f`, giving vector components, at every node.
  pub fn sample(&mut self, f: impl Fn(P2) -> Option<(f64, f64)> + Sync) {
    self.u.sample(|p| f(p).map(|(u, _)| u));
    self.v.sample(|p| f(p).map(|(_, v)| v));
  }

  pub fn set(&mut self, i: usize, j: usize, value: Option<(f64, f64)>) {
    self.u.set(i, j, value.map(|(u, _)| u));
    self.v.set(i, j, value.map(|(_, v)| v));
  }

  pub fn get(&self, i: usize, j: usize) -> Option<(f64, f64)> {
    Some((self.u.get(i, j)?, self.v.get(i, j)?))
  }

  /// The node within tolerance of `p`.
  pub fn snap(&self, p: P2) -> Option<(usize, usize)> {
    let (dx, dy) = self.u.spacing();
    let min = self.u.bbox().min;
    let (a, b) = ((p.x - min.x) / dx, (p.y - min.y) / dy);
    let (i, j) = (a.round(), b.round());
    let inside = i >= 0.0 && j >= 0.0
      && i < self.u.nx() as f64 && j < self.u.ny() as f64;
    (inside && (a - i).abs() <= self.tolerance && (b - j).abs() <= self.tolerance)
      .then_some((i as usize, j as usize))
  }

  /// The vector field of the samples, interpolated.
  pub fn field(self) -> Field {
    let Self { u, v, .. } = self;
    Field::new(move |p| {
      let (u, v) = (u.eval(p)?, v.eval(p)?);
      Some((v.atan2(u), u.hypot(v)))
    })
  }

  pub fn read(reader: impl BufRead) -> Result<Self> {
    let mut lines = Lines::new(reader);
    let (n, header) = lines.next_line(false)?
      .ok_or_else(|| Error::parse(0, "empty sag input"))?;
    let rest = header.strip_prefix("#sag")
      .ok_or_else(|| Error::parse(n, format!("not a sag header: `{header}`")))?;
    let [version, grid_dim, vector_dim, nx, ny, xmin, ymin, xmax, ymax, tolerance] =
      fields::<f64, 10>(n, rest)?;
    if version != VERSION as f64 {
      return Err(Error::parse(n, format!("unsupported sag version {version}")));
    }
    if (grid_dim, vector_dim) != (2.0, 2.0) {
      return Err(Error::parse(n, format!("{grid_dim}-d grid of {vector_dim}-vectors, expected 2-d of 2-vectors")));
    }
    if nx.fract() != 0.0 || ny.fract() != 0.0 || nx < 2.0 || ny < 2.0 {
      return Err(Error::parse(n, format!("bad grid size {nx} × {ny}")));
    }
    let bbox = Box2D::new(P2::new(xmin, ymin), P2::new(xmax, ymax));
    let mut grid = Self::new(nx as usize, ny as usize, bbox, tolerance)
      .map_err(|e| Error::parse(n, e.to_string()))?;

    let mut skipped = 0;
    while let Some((n, line)) = lines.next_line(true)? {
      let [x, y, u, v] = fields::<f64, 4>(n, &line)?;
      match grid.snap(P2::new(x, y)) {
        Some((i, j)) => grid.set(i, j, Some((u, v))),
        None => {
          tracing::trace!(line = n, x, y, "sample off the grid");
          skipped += 1;
        }
      }
    }
    if skipped > 0 {
      tracing::warn!(skipped, "sag samples further than the tolerance from any node");
    }
    Ok(grid)
  }

  /// Write defined nodes, row by row.
  pub fn write(&self, mut writer: impl Write) -> Result<()> {
    let bbox = self.u.bbox();
    writeln!(
      writer, "#sag {VERSION} 2 2 {} {} {} {} {} {} {}",
      self.u.nx(), self.u.ny(),
      bbox.min.x, bbox.min.y, bbox.max.x, bbox.max.y,
      self.tolerance
    )?;
    for (j, i) in itertools::iproduct!(0..self.u.ny(), 0..self.u.nx()) {
      if let Some((u, v)) = self.get(i, j) {
        let p = self.u.node_position(i, j);
        writeln!(writer, "{} {} {u} {v}", p.x, p.y)?;
      }
    }
    writer.flush()?;
    Ok(())
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    Self::read(super::open(path.as_ref())?)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    self.write(BufWriter::new(File::create(path)?))
  }
}
