//! Glyph state:
//! ```text
//! # vgs 1.0
//! <glyph count>
//! x y theta length width curvature      (curvature signed, positive bending left)
//! …
//! <edge count>
//! i j xi yi xj yj
//! …
//! ```
//! `#` lines after the header are comments.

use {
  super::{Lines, fields},
  crate::{
    arrow::Arrow,
    error::{Error, Result},
    geometry::P2
  },
  std::{
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::Path
  }
};

pub const MAJOR: u32 = 1;
pub const MINOR: u32 = 0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vgs {
  pub arrows: Vec<Arrow>,
  /// Neighbour pairs, indices into `arrows`.
  pub edges: Vec<(usize, usize)>
}

impl Vgs {
  pub fn new(arrows: Vec<Arrow>, edges: Vec<(usize, usize)>) -> Self {
    Self { arrows, edges }
  }

  pub fn read(reader: impl BufRead) -> Result<Self> {
    let mut lines = Lines::new(reader);
    let (n, header) = lines.next_line(false)?
      .ok_or_else(|| Error::parse(0, "empty vgs input"))?;
    let version = header.strip_prefix('#')
      .and_then(|rest| rest.trim_start().strip_prefix("vgs"))
      .map(str::trim)
      .ok_or_else(|| Error::parse(n, format!("not a vgs header: `{header}`")))?;
    let (major, minor) = version.split_once('.')
      .and_then(|(a, b)| Some((a.parse::<u32>().ok()?, b.parse::<u32>().ok()?)))
      .ok_or_else(|| Error::parse(n, format!("bad vgs version `{version}`")))?;
    if major != MAJOR {
      return Err(Error::parse(n, format!("unsupported vgs version {major}.{minor}")));
    }

    let (n, count) = lines.expect_line("glyph count")?;
    let [count] = fields::<usize, 1>(n, &count)?;
    let arrows = (0..count)
      .map(|_| {
        let (n, line) = lines.expect_line("glyph")?;
        let [x, y, theta, length, width, curv] = fields::<f64, 6>(n, &line)?;
        Ok(Arrow::straight(P2::new(x, y), theta, length, width).with_signed_curvature(curv))
      })
      .collect::<Result<Vec<_>>>()?;

    let edges = match lines.next_line(true)? {
      None => vec![],
      Some((n, count)) => {
        let [count] = fields::<usize, 1>(n, &count)?;
        (0..count)
          .map(|_| {
            let (n, line) = lines.expect_line("edge")?;
            let [i, j, xi, yi, xj, yj] = fields::<String, 6>(n, &line)?;
            let index = |s: &str| s.parse::<usize>()
              .map_err(|_| Error::parse(n, format!("bad glyph index `{s}`")));
            let (i, j) = (index(&i)?, index(&j)?);
            fields::<f64, 4>(n, &[xi, yi, xj, yj].join(" "))?;
            if i >= arrows.len() || j >= arrows.len() {
              return Err(Error::parse(n, format!("edge ({i}, {j}) refers past {} glyphs", arrows.len())));
            }
            Ok((i, j))
          })
          .collect::<Result<Vec<_>>>()?
      }
    };
    if let Some((n, line)) = lines.next_line(true)? {
      return Err(Error::parse(n, format!("trailing input `{line}`")));
    }
    tracing::debug!(glyphs = arrows.len(), edges = edges.len(), "vgs read");
    Ok(Self { arrows, edges })
  }

  /// Fails with [`Error::Config`], before writing anything, on an edge naming a missing
  /// glyph.
  pub fn write(&self, mut writer: impl Write) -> Result<()> {
    let n = self.arrows.len();
    if let Some(&(i, j)) = self.edges.iter().find(|&&(i, j)| i >= n || j >= n) {
      return Err(Error::Config(format!("edge ({i}, {j}) out of range for {n} glyphs")));
    }
    writeln!(writer, "# vgs {MAJOR}.{MINOR}")?;
    writeln!(writer, "{}", self.arrows.len())?;
    for a in &self.arrows {
      writeln!(
        writer, "{} {} {} {} {} {}",
        a.centre.x, a.centre.y, a.theta, a.length, a.width, a.signed_curvature()
      )?;
    }
    writeln!(writer, "{}", self.edges.len())?;
    for &(i, j) in &self.edges {
      let (a, b) = (self.arrows[i].centre, self.arrows[j].centre);
      writeln!(writer, "{i} {j} {} {} {} {}", a.x, a.y, b.x, b.y)?;
    }
    writer.flush()?;
    Ok(())
  }

  /// Read a file, plain or gzipped.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    Self::read(super::open(path.as_ref())?)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    self.write(BufWriter::new(File::create(path)?))
  }
}
