//! Raster output: glyph ellipses, arrows, the neighbour mesh and the domain boundary.
//!
//! Shapes are drawn in a normalised world where the unit square fits the shorter side of
//! the image; [`Scene`] maps the field's coordinates into it.

use {
  crate::geometry::{BoundingBox, P2, WorldSpace},
  euclid::{Box2D, Size2D, Vector2D},
};

mod impl_draw_rgbaimage;
mod scene;
pub mod sdf;

pub use {
  impl_draw_rgbaimage::draw_parallel,
  scene::Scene,
  sdf::{SDF, Stroke, Union}
};

/// Raster coordinate basis
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelSpace;

/// Anything with a signed distance and a bounding box.
pub trait Shape: SDF<f64> + BoundingBox<f64, WorldSpace> {
  fn texture<T>(self, texture: T) -> Texture<Self, T> where Self: Sized {
    Texture { shape: self, texture }
  }
}
impl<T> Shape for T where T: SDF<f64> + BoundingBox<f64, WorldSpace> {}

pub trait Draw<Backend>: Shape {
  fn draw(&self, image: &mut Backend);
}

pub trait DrawSync<Backend>: Draw<Backend> + Send + Sync {}
impl <T, Backend> DrawSync<Backend> for T where T: Draw<Backend> + Send + Sync {}

#[derive(Debug, Copy, Clone)]
pub struct Texture<S, T> {
  pub shape: S,
  pub texture: T
}
impl <S, T> SDF<f64> for Texture<S, T> where S: SDF<f64> {
  fn sdf(&self, pixel: P2) -> f64 { self.shape.sdf(pixel) } }
impl <S, T> BoundingBox<f64, WorldSpace> for Texture<S, T> where S: BoundingBox<f64, WorldSpace> {
  fn bounding_box(&self) -> Box2D<f64, WorldSpace> { self.shape.bounding_box() } }

// fit the unit square in the center of image, preserving aspect ratio
fn rescale_bounding_box(
  bounding_box: Box2D<f64, WorldSpace>,
  resolution: Size2D<u32, PixelSpace>
) -> (
  Option<Box2D<u32, PixelSpace>>, // bounding_box,
  Vector2D<f64, PixelSpace>, // offset
  f64 // min_side
) {
  let min_side = resolution.width.min(resolution.height) as f64;
  let offset = (resolution.to_vector().to_f64() - Vector2D::splat(min_side)) / 2.0;
  let bounding_box = bounding_box
    .scale(min_side, min_side).cast_unit()
    .round_out()
    .translate(offset)
    .intersection(&Box2D::from_size(resolution.to_f64()))
    .map(|x| x.to_u32());
  (bounding_box, offset, min_side)
}
