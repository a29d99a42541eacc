//! Point quadtree, used to find the particles near a point.

use {
  crate::geometry::{P2, V2, WorldSpace},
  std::fmt::{Debug, Formatter},
  euclid::{Rect, Size2D},
  humansize::{FileSize, file_size_opts as options}
};

/// Points per leaf before it splits.
const BUCKET: usize = 8;
const MAX_DEPTH: u8 = 16;

#[derive(Clone)]
pub struct Quadtree<Data> {
  pub rect: Rect<f64, WorldSpace>,
  pub children: Option<Box<[Quadtree<Data>; 4]>>,
  pub depth: u8,
  pub max_depth: u8,
  pub data: Data
}

/// Leaf buckets of `(index, position)`.
pub type PointTree = Quadtree<Vec<(usize, P2)>>;

#[repr(u8)]
#[derive(Debug, Copy, Clone)]
/// 4 sections of a rectangle
pub enum Quadtrant {
  TL = 0,
  TR = 1,
  BL = 2,
  BR = 3
}

impl Quadtrant {
  /// The section of `rect` containing `pt`; the lower halves own the midlines.
  pub fn get(rect: Rect<f64, WorldSpace>, pt: P2) -> Self {
    use Quadtrant::*;
    let c = rect.center();
    match (pt.x >= c.x, pt.y >= c.y) {
      (false, false) => TL,
      (true, false) => TR,
      (false, true) => BL,
      (true, true) => BR
    }
  }

  fn origin(self, rect: Rect<f64, WorldSpace>) -> P2 {
    let half = rect.size / 2.0;
    let offset = match self {
      Quadtrant::TL => V2::zero(),
      Quadtrant::TR => V2::new(half.width, 0.0),
      Quadtrant::BL => V2::new(0.0, half.height),
      Quadtrant::BR => V2::new(half.width, half.height)
    };
    rect.origin + offset
  }
}

#[derive(PartialEq)]
pub enum TraverseCommand {
  Ok,
  Skip
}

impl<Data: Default> Quadtree<Data> {
  pub fn new(rect: Rect<f64, WorldSpace>, max_depth: u8) -> Self {
    Quadtree { rect, children: None, depth: 0, max_depth, data: Data::default() }
  }

  pub fn subdivide(&mut self) -> &mut Option<Box<[Quadtree<Data>; 4]>> {
    if self.depth < self.max_depth && self.children.is_none() {
      let (rect, depth, max_depth) = (self.rect, self.depth, self.max_depth);
      let children = [Quadtrant::TL, Quadtrant::TR, Quadtrant::BL, Quadtrant::BR]
        .map(|quad| Quadtree {
          rect: Rect::new(quad.origin(rect), rect.size / 2.0),
          children: None,
          depth: depth + 1,
          max_depth,
          data: Data::default()
        });
      self.children = Some(Box::new(children));
    }
    &mut self.children
  }
}

impl<Data> Quadtree<Data> {
  /// Apply `f` to nodes top down; `Skip` prunes the subtree.
  pub fn traverse(&self, f: &mut impl FnMut(&Self) -> TraverseCommand) {
    if f(self) == TraverseCommand::Ok {
      if let Some(children) = self.children.as_deref() {
        for child in children.iter() {
          child.traverse(f);
        }
      }
    }
  }

  pub fn node_count(&self) -> usize {
    let mut n = 0;
    self.traverse(&mut |_| { n += 1; TraverseCommand::Ok });
    n
  }
}

impl PointTree {
  /// Index `points`, bounded by a square around all of them.
  pub fn build(points: impl IntoIterator<Item = (usize, P2)>) -> Self {
    let points = points.into_iter().collect::<Vec<_>>();
    let (min, max) = points.iter().fold(
      (P2::splat(f64::INFINITY), P2::splat(f64::NEG_INFINITY)),
      |(min, max), &(_, p)| (min.min(p), max.max(p))
    );
    let side = (max - min).x.max((max - min).y);
    let side = if side > 0.0 && side.is_finite() { side * (1.0 + 1e-9) } else { 1.0 };
    let origin = if min.x.is_finite() { min } else { P2::origin() };
    let mut tree = Self::new(Rect::new(origin, Size2D::splat(side)), MAX_DEPTH);
    for (i, p) in points {
      tree.insert(i, p);
    }
    tree
  }

  pub fn insert(&mut self, index: usize, p: P2) {
    let quad = Quadtrant::get(self.rect, p) as usize;
    if let Some(children) = self.children.as_deref_mut() {
      return children[quad].insert(index, p);
    }
    self.data.push((index, p));
    if self.data.len() > BUCKET && self.depth < self.max_depth {
      let data = std::mem::take(&mut self.data);
      self.subdivide();
      for (i, q) in data {
        self.insert(i, q);
      }
    }
  }

  /// Points within `radius` of `centre`, with their distance, in tree order.
  pub fn within(&self, centre: P2, radius: f64) -> Vec<(usize, f64)> {
    let mut found = vec![];
    self.traverse(&mut |node| {
      let r = node.rect;
      let nearest = P2::new(
        centre.x.clamp(r.min_x(), r.max_x()),
        centre.y.clamp(r.min_y(), r.max_y())
      );
      if (nearest - centre).length() > radius {
        return TraverseCommand::Skip;
      }
      found.extend(node.data.iter()
        .map(|&(i, p)| (i, (p - centre).length()))
        .filter(|&(_, d)| d <= radius));
      TraverseCommand::Ok
    });
    found
  }

  pub fn len(&self) -> usize {
    let mut n = 0;
    self.traverse(&mut |node| { n += node.data.len(); TraverseCommand::Ok });
    n
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<Data: Debug> Debug for Quadtree<Data> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let nodes = self.node_count();
    f.debug_struct("Quadtree")
      .field("rect", &self.rect)
      .field("children", &if self.children.is_some() { "Some(...)" } else { "None" })
      .field("depth", &self.depth)
      .field("nodes", &nodes)
      .field("memory", &(std::mem::size_of::<Self>() * nodes)
        .file_size(options::BINARY).unwrap_or_default())
      .finish()
  }
}

#[cfg(test)] mod tests {
  use {super::*, rand::prelude::*};

  #[test] fn within_matches_brute_force() {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(3);
    let points = (0..500)
      .map(|i| (i, P2::new(rng.gen_range(-2.0..3.0), rng.gen_range(0.0..1.0))))
      .collect::<Vec<_>>();
    let tree = PointTree::build(points.iter().copied());
    assert_eq!(tree.len(), 500);
    assert!(tree.children.is_some());
    for _ in 0..50 {
      let centre = P2::new(rng.gen_range(-2.0..3.0), rng.gen_range(0.0..1.0));
      let radius = rng.gen_range(0.0..0.5);
      let mut found = tree.within(centre, radius).into_iter().map(|(i, _)| i).collect::<Vec<_>>();
      found.sort_unstable();
      let expected = points.iter()
        .filter(|(_, p)| (*p - centre).length() <= radius)
        .map(|&(i, _)| i)
        .collect::<Vec<_>>();
      assert_eq!(found, expected);
    }
  }

  #[test] fn coincident_points() {
    let tree = PointTree::build((0..40).map(|i| (i, P2::new(1.0, 1.0))));
    assert_eq!(tree.within(P2::new(1.0, 1.0), 0.0).len(), 40);
    println!("{tree:?}");
  }
}
