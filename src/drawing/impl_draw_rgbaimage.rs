#![allow(non_snake_case)]
use {
  std::{thread, sync::Arc, ops::Fn},
  euclid::{Point2D, Size2D},
  image::{Pixel, Rgba, RgbaImage},
  crate::{
    drawing::{Draw, DrawSync, PixelSpace, Shape, Texture, SDF, rescale_bounding_box},
    error::{Error, Result},
    geometry::{BoundingBox, P2}
  }
};

impl <Cutie> Draw<RgbaImage> for Texture<Cutie, Rgba<u8>>
  where Cutie: Shape + Clone
{
  fn draw(&self, image: &mut RgbaImage) {
    self.shape.clone()
      .texture(|_| self.texture)
      .draw(image);
  }
}

/// F: Fn(pixel: P2) -> Rgba<u8>
/// where pixel is in the normalised world.
impl <Cutie, F> Draw<RgbaImage> for Texture<Cutie, F>
  where Cutie: Shape,
        F: Fn(P2) -> Rgba<u8>
{
  fn draw(&self, image: &mut RgbaImage) {
    let resolution: Size2D<_, PixelSpace> = image.dimensions().into();
    let (bounding_box, offset, min_side) = rescale_bounding_box(self.bounding_box(), resolution);
    let bounding_box = match bounding_box {
      Some(x) => x,
      None => return // bounding box has no intersection with screen at all
    };
    let Δp = 1.0 / min_side;

    itertools::iproduct!(bounding_box.y_range(), bounding_box.x_range())
      .map(|(y, x)| Point2D::<_, PixelSpace>::new(x, y))
      .for_each(|pixel| {
        let pixel_world = ((pixel.to_f64() - offset).to_vector() / min_side)
          .cast_unit().to_point();
        let sdf = self.sdf(pixel_world);
        if sdf >= 0.5 * Δp {
          return;
        }
        let colour = (self.texture)(pixel_world);
        let pixel = image.get_pixel_mut(pixel.x, pixel.y);
        *pixel = sdf_overlay_aa(sdf, Δp, *pixel, colour);
      });
  }
}

pub(super) fn sdf_overlay_aa(sdf: f64, Δp: f64, mut col1: Rgba<u8>, mut col2: Rgba<u8>) -> Rgba<u8> {
  let Δf = (0.5 * Δp - sdf) // antialias
    .clamp(0.0, Δp);
  let alpha = Δf / Δp;
  // overlay blending with premultiplied alpha
  col2.0[3] = ((col2.0[3] as f64) * alpha) as u8;
  col1.blend(&col2);
  col1
}

/// Draw shapes, parallel, each thread into its own buffer; the buffers are overlaid in
/// thread order at the end.
/// Will use `resolution.width * resolution.height * num_threads * 4` bytes of memory.
pub fn draw_parallel(
  shapes: impl Iterator<Item = Arc<dyn DrawSync<RgbaImage>>>,
  resolution: Size2D<u32, PixelSpace>,
  num_threads: usize
) -> Result<RgbaImage> {
  use rand::prelude::*;

  let mut rng = rand_pcg::Pcg64::seed_from_u64(0);

  let mut draw_data = shapes
    .collect::<Vec<_>>();
  if draw_data.is_empty() {
    return Ok(RgbaImage::new(resolution.width, resolution.height));
  }
  // will distribute the load between threads [statistically] evenly
  draw_data.shuffle(&mut rng);

  let num_threads = num_threads.clamp(1, draw_data.len());
  let chunk_size = (draw_data.len() as f64 / num_threads as f64).ceil() as usize;

  let partial_buffers = draw_data
    .chunks(chunk_size)
    .map(|chunk| {
      let chunk = chunk.to_vec();
      thread::Builder::new()
        .name("glyph-draw".into())
        .spawn(move || {
          let mut framebuffer = RgbaImage::new(resolution.width, resolution.height);
          chunk.into_iter()
            .for_each(|shape| shape.draw(&mut framebuffer));
          framebuffer
        })
    })
    .collect::<std::io::Result<Vec<_>>>()? // thread handles
    .into_iter()
    .map(|thread| thread.join()
      .map_err(|_| Error::Concurrency("drawing thread panicked".into())))
    .collect::<Result<Vec<_>>>()?;

  let mut buffers = partial_buffers.into_iter();
  let mut final_buffer = buffers.next()
    .unwrap_or_else(|| RgbaImage::new(resolution.width, resolution.height));

  // merge partial buffers
  buffers.for_each(|buffer|
    image::imageops::overlay(&mut final_buffer, &buffer, 0, 0)
  );
  tracing::trace!(shapes = draw_data.len(), threads = num_threads, "layer drawn");

  Ok(final_buffer)
}
