//! The region glyphs are placed in: nested polygons, with holes at odd depth.
//!
//! Polygons are kept in an arena, linked by index to their parent, first child and next
//! sibling. Every polygon lies inside its parent; siblings are disjoint.

use {
  crate::{
    error::{Error, Result},
    geometry::{P2, WorldSpace, BoundingBox, Polyline, segment_distance}
  },
  std::{
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::Path
  },
  euclid::Box2D
};

#[cfg(test)] mod tests;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
  pub polyline: Polyline,
  pub parent: Option<usize>,
  pub child: Option<usize>,
  pub peer: Option<usize>
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
  nodes: Vec<Node>,
  /// First top-level polygon; the others follow through `peer`.
  root: Option<usize>
}

impl Domain {
  pub fn new() -> Self {
    Self::default()
  }

  /// Single axis-aligned rectangle.
  pub fn rect(min: P2, max: P2) -> Self {
    let mut domain = Self::new();
    // a lone polygon cannot fail to nest
    domain.nodes.push(Node { polyline: Polyline::rect(min, max), parent: None, child: None, peer: None });
    domain.root = Some(0);
    domain
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn node(&self, index: usize) -> &Node {
    &self.nodes[index]
  }

  /// Indices of `first` and its later siblings.
  fn siblings(&self, first: Option<usize>) -> impl Iterator<Item = usize> + '_ {
    std::iter::successors(first, move |&i| self.nodes[i].peer)
  }

  fn first_child(&self, parent: Option<usize>) -> Option<usize> {
    match parent {
      Some(p) => self.nodes[p].child,
      None => self.root
    }
  }

  fn set_first_child(&mut self, parent: Option<usize>, first: Option<usize>) {
    match parent {
      Some(p) => self.nodes[p].child = first,
      None => self.root = first
    }
  }

  pub fn depth(&self, index: usize) -> usize {
    std::iter::successors(self.nodes[index].parent, |&i| self.nodes[i].parent).count()
  }

  /// Insert a polygon below the smallest polygon enclosing it; polygons it encloses are
  /// moved below it. Returns its index.
  pub fn insert(&mut self, polyline: Polyline) -> Result<usize> {
    if polyline.len() < 3 {
      return Err(Error::BadTopology(format!("polygon with {} vertices", polyline.len())));
    }
    if polyline.signed_area() == 0.0 {
      return Err(Error::BadTopology("polygon with zero area".into()));
    }

    // descend while some sibling encloses the new polygon
    let mut parent = None;
    while let Some(enclosing) = self.siblings(self.first_child(parent))
      .find(|&i| self.nodes[i].polyline.contains_polyline(&polyline))
    {
      parent = Some(enclosing);
    }

    let index = self.nodes.len();
    let (enclosed, kept): (Vec<usize>, Vec<usize>) = self.siblings(self.first_child(parent))
      .partition(|&i| polyline.contains_polyline(&self.nodes[i].polyline));

    self.nodes.push(Node { polyline, parent, child: None, peer: None });
    self.relink(parent, kept.into_iter().chain(std::iter::once(index)));
    for &i in &enclosed {
      self.nodes[i].parent = Some(index);
    }
    self.relink(Some(index), enclosed.into_iter());
    Ok(index)
  }

  /// Make `children`, in order, the complete child list of `parent`.
  fn relink(&mut self, parent: Option<usize>, children: impl Iterator<Item = usize>) {
    let children = children.collect::<Vec<_>>();
    self.set_first_child(parent, children.first().copied());
    for pair in children.windows(2) {
      self.nodes[pair[0]].peer = Some(pair[1]);
    }
    if let Some(&last) = children.last() {
      self.nodes[last].peer = None;
    }
  }

  /// Nodes in depth-first order, parents before children, with their depth.
  pub fn iter(&self) -> impl Iterator<Item = (usize, &Node)> + '_ {
    let mut stack: Vec<(usize, usize)> = self.siblings(self.root)
      .map(|i| (i, 0))
      .collect::<Vec<_>>();
    stack.reverse();
    std::iter::from_fn(move || {
      let (i, depth) = stack.pop()?;
      let mut children = self.siblings(self.nodes[i].child)
        .map(|c| (c, depth + 1))
        .collect::<Vec<_>>();
      children.reverse();
      stack.extend(children);
      Some((depth, &self.nodes[i]))
    })
  }

  pub fn polylines(&self) -> impl Iterator<Item = &Polyline> + '_ {
    self.iter().map(|(_, node)| &node.polyline)
  }

  /// Whether `p` is in the interior: the deepest polygon containing it has even depth.
  pub fn inside(&self, p: P2) -> bool {
    let mut level = self.root;
    let mut depth = None;
    while let Some(i) = self.siblings(level).find(|&i| self.nodes[i].polyline.contains(p)) {
      depth = Some(depth.map_or(0, |d| d + 1));
      level = self.nodes[i].child;
    }
    depth.map_or(false, |d| d % 2 == 0)
  }

  /// Orient outer boundaries counter-clockwise and holes clockwise, so the interior is
  /// always to the left.
  pub fn orient(&mut self) {
    let depths = (0..self.nodes.len()).map(|i| self.depth(i)).collect::<Vec<_>>();
    for (node, depth) in self.nodes.iter_mut().zip(depths) {
      if node.polyline.is_ccw() != (depth % 2 == 0) {
        node.polyline.reverse();
      }
    }
  }

  /// Interior area: outer boundaries less their holes.
  pub fn area(&self) -> f64 {
    self.iter()
      .map(|(depth, node)| {
        let a = node.polyline.signed_area().abs();
        if depth % 2 == 0 { a } else { -a }
      })
      .sum()
  }

  /// Distance from `p` to the nearest boundary edge.
  pub fn boundary_distance(&self, p: P2) -> f64 {
    self.polylines()
      .flat_map(|polyline| polyline.edges())
      .map(|(a, b)| segment_distance(p, a, b))
      .fold(f64::INFINITY, f64::min)
  }

  /// Verify the nesting invariants.
  pub fn check(&self) -> Result<()> {
    for (i, node) in self.nodes.iter().enumerate() {
      if node.polyline.len() < 3 {
        return Err(Error::BadTopology(format!("polygon {i} has {} vertices", node.polyline.len())));
      }
      if let Some(p) = node.parent {
        if !self.nodes[p].polyline.contains_polyline(&node.polyline) {
          return Err(Error::BadTopology(format!("polygon {i} escapes its parent {p}")));
        }
      }
      let siblings = self.siblings(self.first_child(node.parent)).collect::<Vec<_>>();
      if !siblings.contains(&i) {
        return Err(Error::BadTopology(format!("polygon {i} is unreachable")));
      }
      if let Some(&j) = siblings.iter()
        .find(|&&j| j != i && self.nodes[j].polyline.contains_polyline(&node.polyline))
      {
        return Err(Error::BadTopology(format!("polygon {i} lies inside its sibling {j}")));
      }
    }
    Ok(())
  }

  /// Read polygons, `x y` per line, separated by blank or `#` lines.
  pub fn read(reader: impl BufRead) -> Result<Self> {
    let mut domain = Self::new();
    let mut current = vec![];
    let mut start = 1;
    let flush = |vertices: &mut Vec<P2>, domain: &mut Self, line: usize| -> Result<()> {
      if vertices.is_empty() {
        return Ok(());
      }
      domain.insert(Polyline::new(std::mem::take(vertices)))
        .map_err(|e| Error::parse(line, format!("polygon: {e}")))?;
      Ok(())
    };

    for (n, line) in reader.lines().enumerate() {
      let (n, line) = (n + 1, line?);
      let line = line.trim();
      if line.is_empty() || line.starts_with('#') {
        flush(&mut current, &mut domain, start)?;
        continue;
      }
      if current.is_empty() {
        start = n;
      }
      let mut fields = line.split_whitespace().map(str::parse::<f64>);
      match (fields.next(), fields.next(), fields.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() =>
          current.push(P2::new(x, y)),
        _ => return Err(Error::parse(n, format!("expected `x y`, got `{line}`")))
      }
    }
    flush(&mut current, &mut domain, start)?;
    tracing::debug!(polygons = domain.len(), "domain read");
    Ok(domain)
  }

  /// Write in the format accepted by [`Domain::read`], parents first.
  pub fn write(&self, mut writer: impl Write) -> Result<()> {
    for (depth, node) in self.iter() {
      writeln!(writer, "# depth {depth}")?;
      for v in &node.polyline.vertices {
        writeln!(writer, "{} {}", v.x, v.y)?;
      }
    }
    writer.flush()?;
    Ok(())
  }

  /// Read a file, plain or gzipped.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    Self::read(crate::io::open(path.as_ref())?)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    self.write(BufWriter::new(File::create(path)?))
  }
}

impl BoundingBox<f64, WorldSpace> for Domain {
  fn bounding_box(&self) -> Box2D<f64, WorldSpace> {
    self.siblings(self.root)
      .map(|i| self.nodes[i].polyline.bounding_box())
      .reduce(|a, b| a.union(&b))
      .unwrap_or_else(Box2D::zero)
  }
}
