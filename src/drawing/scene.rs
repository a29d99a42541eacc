use {
  super::{draw_parallel, DrawSync, PixelSpace, Shape, Stroke, Union},
  crate::{
    arrow::{Arrow, Margin},
    domain::Domain,
    error::{Error, Result},
    geometry::{BoundingBox, Ellipse, P2, WorldSpace, left_normal, unit},
    solver::Placement
  },
  euclid::{Box2D, Size2D},
  image::{Rgba, RgbaImage},
  std::{num::NonZeroUsize, sync::Arc}
};

/// Polyline vertices per radian of a curved shaft.
const ARC_DENSITY: f64 = 8.0;

/// Colours and raster settings for rendering a placement.
#[derive(Debug, Clone)]
pub struct Scene {
  pub resolution: Size2D<u32, PixelSpace>,
  /// World region shown, the domain's bounding box by default.
  pub window: Option<Box2D<f64, WorldSpace>>,
  pub background: Rgba<u8>,
  /// Ellipse fill of boundary glyphs.
  pub fixed: Rgba<u8>,
  /// Ellipse fill of interior glyphs.
  pub interior: Rgba<u8>,
  pub arrow: Rgba<u8>,
  /// Neighbour mesh, not drawn when unset.
  pub mesh: Option<Rgba<u8>>,
  pub boundary: Rgba<u8>,
  /// Half-width of lines, in pixels.
  pub stroke: f64,
  pub threads: usize
}

impl Default for Scene {
  fn default() -> Self {
    Self {
      resolution: Size2D::new(1024, 1024),
      window: None,
      background: Rgba([255, 255, 255, 255]),
      fixed: Rgba([240, 128, 64, 96]),
      interior: Rgba([64, 128, 240, 96]),
      arrow: Rgba([16, 16, 16, 255]),
      mesh: None,
      boundary: Rgba([0, 0, 0, 255]),
      stroke: 0.5,
      threads: std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }
  }
}

/// World to normalised coordinates: the window's longer side becomes the unit interval,
/// centred, y pointing down.
#[derive(Debug, Copy, Clone)]
struct Frame {
  origin: P2,
  side: f64
}

impl Frame {
  fn new(window: Box2D<f64, WorldSpace>) -> Option<Self> {
    let side = window.width().max(window.height());
    (side > 0.0 && side.is_finite()).then(|| Self {
      origin: window.center() - euclid::Vector2D::splat(0.5 * side),
      side
    })
  }

  fn point(&self, p: P2) -> P2 {
    P2::new((p.x - self.origin.x) / self.side, 1.0 - (p.y - self.origin.y) / self.side)
  }

  fn ellipse(&self, e: &Ellipse) -> Ellipse {
    Ellipse::new(e.major / self.side, e.minor / self.side, -e.theta, self.point(e.centre))
  }
}

impl Scene {
  pub fn with_resolution(self, width: u32, height: u32) -> Self {
    Self { resolution: Size2D::new(width, height), ..self }
  }
  pub fn with_window(self, window: Box2D<f64, WorldSpace>) -> Self { Self { window: Some(window), ..self } }
  pub fn with_mesh(self, colour: Rgba<u8>) -> Self { Self { mesh: Some(colour), ..self } }
  pub fn with_stroke(self, stroke: f64) -> Self { Self { stroke, ..self } }
  pub fn with_threads(self, threads: usize) -> Self { Self { threads, ..self } }

  /// Draw `placement` over `domain`, layer by layer: glyph ellipses, mesh, arrows, then
  /// the boundary.
  pub fn render(&self, domain: &Domain, placement: &Placement, margin: &Margin) -> Result<RgbaImage> {
    let window = self.window.unwrap_or_else(|| domain.bounding_box());
    let frame = Frame::new(window)
      .ok_or_else(|| Error::Config(format!("empty drawing window {window:?}")))?;
    if self.resolution.is_empty() {
      return Err(Error::Config("empty image".into()));
    }
    let line = self.stroke / self.resolution.width.min(self.resolution.height) as f64;

    let ellipses = placement.arrows.iter()
      .enumerate()
      .map(|(i, arrow)| {
        let colour = if i < placement.fixed { self.fixed } else { self.interior };
        shared(frame.ellipse(&arrow.ellipse(margin)).texture(colour))
      })
      .collect::<Vec<_>>();
    let mesh = match self.mesh {
      Some(colour) => placement.edges.iter()
        .filter_map(|&(i, j)| Some((placement.arrows.get(i)?, placement.arrows.get(j)?)))
        .map(|(a, b)| shared(Stroke::segment(frame.point(a.centre), frame.point(b.centre), line)
          .texture(colour)))
        .collect::<Vec<_>>(),
      None => vec![]
    };
    let arrows = placement.arrows.iter()
      .map(|arrow| shared(arrow_shape(arrow, &frame, line).texture(self.arrow)))
      .collect::<Vec<_>>();
    let boundary = domain.polylines()
      .map(|polyline| {
        let mut points = polyline.vertices.iter().map(|&p| frame.point(p)).collect::<Vec<_>>();
        let first = points.first().copied();
        points.extend(first);
        shared(Stroke::new(points, line).texture(self.boundary))
      })
      .collect::<Vec<_>>();

    let mut image = RgbaImage::from_pixel(self.resolution.width, self.resolution.height, self.background);
    for layer in [ellipses, mesh, arrows, boundary] {
      let layer = draw_parallel(layer.into_iter(), self.resolution, self.threads)?;
      image::imageops::overlay(&mut image, &layer, 0, 0);
    }
    tracing::debug!(
      glyphs = placement.arrows.len(), edges = placement.edges.len(),
      width = self.resolution.width, height = self.resolution.height, "placement rendered"
    );
    Ok(image)
  }
}

impl Placement {
  pub fn render(&self, domain: &Domain, margin: &Margin, scene: &Scene) -> Result<RgbaImage> {
    scene.render(domain, self, margin)
  }
}

fn shared<T: DrawSync<RgbaImage> + 'static>(shape: T) -> Arc<dyn DrawSync<RgbaImage>> {
  Arc::new(shape)
}

/// Shaft along the arc, and a head of two barbs at the forward end.
fn arrow_shape(arrow: &Arrow, frame: &Frame, line: f64) -> Union<Stroke, Stroke> {
  let k = arrow.signed_curvature();
  let (forward, side) = (unit(arrow.theta), left_normal(unit(arrow.theta)));
  let at = |s: f64| -> P2 {
    if (k * arrow.length).abs() < 1e-6 {
      return arrow.centre + forward * s;
    }
    arrow.centre + forward * ((k * s).sin() / k) + side * ((1.0 - (k * s).cos()) / k)
  };
  let half = 0.5 * arrow.length;
  let segments = ((arrow.bend_angle() * ARC_DENSITY).ceil() as usize).clamp(1, 64);
  let shaft = (0..=segments)
    .map(|n| frame.point(at(-half + arrow.length * n as f64 / segments as f64)))
    .collect::<Vec<_>>();

  let tip = at(half);
  let heading = unit(arrow.theta + k * half);
  let barb = 0.25 * arrow.length;
  let head = [2.6f64, -2.6]
    .map(|turn| frame.point(tip + crate::geometry::rotate(heading, turn) * barb));
  let radius = (0.5 * arrow.width / frame.side).max(line);
  Union {
    s1: Stroke::new(shaft, radius),
    s2: Stroke::new(vec![head[0], frame.point(tip), head[1]], radius)
  }
}
