//! Dimension 0: one glyph at each polygon vertex, tucked into the corner.

use {
  super::centred,
  crate::{
    arrow::{Arrow, Evaluator},
    domain::Domain,
    geometry::{intersect, left_normal, Ellipse, M2, P2, V2}
  },
  std::f64::consts::FRAC_PI_2
};

/// Re-evaluations of the glyph shape at its new centre.
const ITERATIONS: usize = 4;
const RIGHT_ANGLE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Corner {
  /// Index of the vertex in its polygon.
  pub vertex: usize,
  pub arrow: Arrow,
  pub ellipse: Ellipse
}

/// Corners up to a right angle are filled tangent to both edges; wider ones along the
/// bisector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
  Acute,
  Obtuse,
  Reflex
}

/// A vertex with its incident edges, the interior to the left of both.
#[derive(Debug, Copy, Clone)]
struct Vertex {
  at: P2,
  /// Unit direction of the edge arriving at the vertex, and of the one leaving it.
  incoming: V2,
  outgoing: V2,
  incoming_length: f64,
  outgoing_length: f64,
  bisector: V2,
  kind: Kind
}

impl Vertex {
  fn new(prev: P2, at: P2, next: P2) -> Option<Self> {
    let (e1, e2) = (at - prev, next - at);
    let (l1, l2) = (e1.length(), e2.length());
    if !(l1 > 0.0 && l2 > 0.0) {
      return None;
    }
    let (incoming, outgoing) = (e1 / l1, e2 / l2);
    let turn = incoming.cross(outgoing).atan2(incoming.dot(outgoing));
    let interior = std::f64::consts::PI - turn;
    let kind = if interior <= FRAC_PI_2 + RIGHT_ANGLE_TOLERANCE {
      Kind::Acute
    } else if turn >= 0.0 {
      Kind::Obtuse
    } else {
      Kind::Reflex
    };
    let sum = left_normal(incoming) + left_normal(outgoing);
    let norm = sum.length();
    if !(norm > 1e-12) {
      return None;
    }
    Some(Self {
      at, incoming, outgoing,
      incoming_length: l1,
      outgoing_length: l2,
      bisector: sum / norm,
      kind
    })
  }

  /// Inward normals of the two edges.
  fn normals(&self) -> (V2, V2) {
    (left_normal(self.incoming), left_normal(self.outgoing))
  }

  /// Centre of `e` tangent to both edge lines.
  fn tangent_centre(&self, e: &Ellipse) -> Option<P2> {
    let (n1, n2) = self.normals();
    let offset = M2::new(n1.x, n1.y, n2.x, n2.y).inverse()?
      * V2::new(e.support(n1), e.support(n2));
    Some(self.at + offset)
  }

  /// Centre of `e` on the bisector, nearest the vertex while clear of the vertex and of
  /// those edge lines that bound it.
  fn bisector_centre(&self, e: &Ellipse) -> P2 {
    let m = e.metric_tensor();
    let b = self.bisector;
    // radius of the ellipse towards the vertex
    let mut s = m.inverse().map_or(0.0, |inv| 1.0 / inv.quadratic(b).sqrt());
    let (n1, n2) = self.normals();
    let edges = [
      (n1, -self.incoming, self.incoming_length),
      (n2, self.outgoing, self.outgoing_length)
    ];
    for (n, along, length) in edges {
      let cos = n.dot(b);
      if !(cos > 0.0) {
        continue;
      }
      let h = e.support(n);
      let distance = h / cos;
      if self.kind == Kind::Reflex {
        // only the segment itself bounds a reflex corner
        let touch = b * distance - (m * n) / h;
        if !(0.0..=length).contains(&touch.dot(along)) {
          continue;
        }
      }
      s = s.max(distance);
    }
    self.at + b * s
  }

  fn place(&self, evaluator: &Evaluator) -> Option<(Arrow, Ellipse)> {
    let (mut arrow, mut ellipse) = centred(evaluator, self.at)?;
    for _ in 0..ITERATIONS {
      let centre = match self.kind {
        Kind::Acute => self.tangent_centre(&ellipse)?,
        Kind::Obtuse | Kind::Reflex => self.bisector_centre(&ellipse)
      };
      if !(centre.x.is_finite() && centre.y.is_finite()) {
        return None;
      }
      (arrow, ellipse) = centred(evaluator, centre)?;
    }
    Some((arrow, ellipse))
  }
}

/// Corner glyphs of every polygon of `domain` (oriented), indexed by vertex. Vertices
/// without data, degenerate vertices and glyphs hitting an earlier corner of the same
/// polygon are left empty.
pub fn place(evaluator: &Evaluator, domain: &Domain) -> Vec<Vec<Option<Corner>>> {
  let (mut placed, mut skipped) = (0, 0);
  let corners = domain.polylines()
    .map(|polyline| {
      let v = &polyline.vertices;
      let n = v.len();
      let mut kept: Vec<Ellipse> = vec![];
      (0..n)
        .map(|k| {
          let corner = Vertex::new(v[(k + n - 1) % n], v[k], v[(k + 1) % n])
            .and_then(|vertex| vertex.place(evaluator))
            .filter(|(_, ellipse)| !kept.iter().any(|earlier| intersect(ellipse, earlier)))
            .map(|(arrow, ellipse)| {
              kept.push(ellipse);
              Corner { vertex: k, arrow, ellipse }
            });
          match corner {
            Some(_) => placed += 1,
            None => {
              tracing::trace!(vertex = ?v[k], "no corner glyph");
              skipped += 1;
            }
          }
          corner
        })
        .collect::<Vec<_>>()
    })
    .collect::<Vec<_>>();
  tracing::info!(placed, skipped, "corner glyphs");
  corners
}

#[cfg(test)]
pub(super) fn kind(prev: P2, at: P2, next: P2) -> Option<Kind> {
  Vertex::new(prev, at, next).map(|v| v.kind)
}
