use {
  super::{P2, WorldSpace, BoundingBox},
  euclid::Box2D
};

/// Closed polygon; the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
  pub vertices: Vec<P2>
}

impl Polyline {
  pub fn new(vertices: Vec<P2>) -> Self {
    Self { vertices }
  }

  /// Axis-aligned rectangle, counter-clockwise.
  pub fn rect(min: P2, max: P2) -> Self {
    Self::new(vec![
      min,
      P2::new(max.x, min.y),
      max,
      P2::new(min.x, max.y)
    ])
  }

  pub fn len(&self) -> usize {
    self.vertices.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Directed edges `(vᵢ, vᵢ₊₁)`, including the closing one.
  pub fn edges(&self) -> impl Iterator<Item = (P2, P2)> + '_ {
    let n = self.vertices.len();
    (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
  }

  /// Shoelace area, positive for counter-clockwise orientation.
  pub fn signed_area(&self) -> f64 {
    0.5 * self.edges()
      .map(|(a, b)| a.x * b.y - b.x * a.y)
      .sum::<f64>()
  }

  pub fn is_ccw(&self) -> bool {
    self.signed_area() > 0.0
  }

  pub fn reverse(&mut self) {
    self.vertices.reverse()
  }

  pub fn perimeter(&self) -> f64 {
    self.edges().map(|(a, b)| (b - a).length()).sum()
  }

  pub fn centroid(&self) -> Option<P2> {
    let area = self.signed_area();
    if area == 0.0 {
      return None;
    }
    let (cx, cy) = self.edges().fold((0.0, 0.0), |(cx, cy), (a, b)| {
      let k = a.x * b.y - b.x * a.y;
      (cx + (a.x + b.x) * k, cy + (a.y + b.y) * k)
    });
    Some(P2::new(cx / (6.0 * area), cy / (6.0 * area)))
  }

  /// Ray-crossing test, orientation independent.
  pub fn contains(&self, p: P2) -> bool {
    self.edges().fold(false, |inside, (a, b)| {
      if (a.y > p.y) != (b.y > p.y)
        && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
        !inside
      } else { inside }
    })
  }

  /// Whether every vertex of `other` is inside.
  pub fn contains_polyline(&self, other: &Polyline) -> bool {
    other.vertices.iter().all(|&v| self.contains(v))
  }
}

impl BoundingBox<f64, WorldSpace> for Polyline {
  fn bounding_box(&self) -> Box2D<f64, WorldSpace> {
    Box2D::from_points(self.vertices.iter().copied())
  }
}
