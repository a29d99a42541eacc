//! Dimension 1: glyphs lined up along each edge between its two corner glyphs.

use {
  super::{centred, corner::Corner},
  crate::{
    arrow::{Arrow, Evaluator},
    domain::Domain,
    geometry::{contact_distance, left_normal, Ellipse, P2, V2}
  }
};

const BISECTIONS: usize = 30;
/// Passes lifting a glyph off the edge line by its support distance.
const OFFSET_ITERATIONS: usize = 2;
const EXPANSIONS: usize = 40;

/// Whether the two glyphs are at least tangent; failed contacts count as overlap.
fn clear(a: &Ellipse, b: &Ellipse) -> bool {
  contact_distance(a, b).map_or(false, |d| d >= 1.0)
}

struct Line<'a> {
  evaluator: &'a Evaluator<'a>,
  from: P2,
  direction: V2,
  inward: V2,
  length: f64
}

impl Line<'_> {
  /// Glyph touching the edge from inside at `lambda` along it.
  fn glyph(&self, lambda: f64) -> Option<(Arrow, Ellipse)> {
    let foot = self.from + self.direction * lambda;
    let (mut arrow, mut ellipse) = centred(self.evaluator, foot)?;
    for _ in 0..OFFSET_ITERATIONS {
      (arrow, ellipse) = centred(self.evaluator, foot + self.inward * ellipse.support(self.inward))?;
    }
    Some((arrow, ellipse))
  }

  /// The first position past `lambda` where a glyph is tangent to `prev`.
  fn next(&self, prev: &Ellipse, lambda: f64) -> Option<(f64, Arrow, Ellipse)> {
    let mut step = prev.support(self.direction).max(1e-9 * self.length);
    let (mut lo, mut hi) = (lambda, lambda + step);
    let mut found = None;
    for _ in 0..EXPANSIONS {
      if hi > self.length {
        return None;
      }
      let (arrow, ellipse) = self.glyph(hi)?;
      if clear(prev, &ellipse) {
        found = Some((arrow, ellipse));
        break;
      }
      step *= 2.0;
      (lo, hi) = (hi, hi + step);
    }
    let (mut arrow, mut ellipse) = found?;
    for _ in 0..BISECTIONS {
      let mid = 0.5 * (lo + hi);
      let (a, e) = self.glyph(mid)?;
      if clear(prev, &e) {
        (hi, arrow, ellipse) = (mid, a, e);
      } else {
        lo = mid;
      }
    }
    Some((hi, arrow, ellipse))
  }

  /// Tangent glyphs from `start` until the next would hit `end`, then spread over the
  /// remaining slack.
  fn fill(&self, start: &Ellipse, end: &Ellipse) -> Vec<(Arrow, Ellipse)> {
    let mut placed: Vec<(f64, Arrow, Ellipse)> = vec![];
    let mut lambda = (start.centre - self.from).dot(self.direction);
    let mut prev = *start;
    while let Some((next, arrow, ellipse)) = self.next(&prev, lambda) {
      if next - lambda < 1e-9 * self.length || !clear(&ellipse, end) {
        break;
      }
      placed.push((next, arrow, ellipse));
      (lambda, prev) = (next, ellipse);
    }
    let Some(&(last, ..)) = placed.last() else {
      return vec![];
    };

    let fits = |delta: f64| self.glyph(last + delta).map_or(false, |(_, e)| clear(&e, end));
    let (mut lo, mut hi) = (0.0, (self.length - last).max(0.0));
    let slack = if fits(hi) {
      hi
    } else {
      for _ in 0..BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if fits(mid) { lo = mid } else { hi = mid }
      }
      lo
    };

    let n = placed.len();
    placed.into_iter()
      .enumerate()
      .map(|(k, (lambda, arrow, ellipse))| {
        let shift = (k + 1) as f64 * slack / (n + 1) as f64;
        self.glyph(lambda + shift).unwrap_or((arrow, ellipse))
      })
      .collect()
  }
}

/// Edge glyphs of every polygon of `domain`, indexed by the vertex the edge leaves.
/// `corners` are the corner glyphs of the same polygons; edges whose corner glyphs are
/// closer than `min_contact` are left empty.
pub fn place(
  evaluator: &Evaluator,
  domain: &Domain,
  corners: &[Vec<Option<Corner>>],
  min_contact: f64
) -> Vec<Vec<Vec<(Arrow, Ellipse)>>> {
  let (mut filled, mut short, mut glyphs) = (0, 0, 0);
  let edges = domain.polylines()
    .zip(corners)
    .map(|(polyline, corners)| {
      let n = polyline.len();
      polyline.edges()
        .enumerate()
        .map(|(k, (a, b))| {
          let (Some(start), Some(end)) = (&corners[k], &corners[(k + 1) % n]) else {
            return vec![];
          };
          match contact_distance(&start.ellipse, &end.ellipse) {
            Some(d) if d >= min_contact => {}
            Some(_) => {
              short += 1;
              return vec![];
            }
            None => {
              tracing::warn!(
                start = ?start.ellipse, end = ?end.ellipse,
                "contact between corner glyphs failed, edge skipped"
              );
              return vec![];
            }
          }
          let length = (b - a).length();
          let direction = (b - a) / length;
          let line = Line { evaluator, from: a, direction, inward: left_normal(direction), length };
          let fill = line.fill(&start.ellipse, &end.ellipse);
          filled += 1;
          glyphs += fill.len();
          fill
        })
        .collect::<Vec<_>>()
    })
    .collect::<Vec<_>>();
  tracing::info!(filled, short, glyphs, "edge glyphs");
  edges
}
