//! This is a library for placing glyphs over 2D vector fields.
//!
//! Every glyph is an arrow bent along the field's streamline, bounded by an ellipse. The
//! glyphs are packed so that the ellipses do not overlap: first along the boundary of the
//! domain (corners, then edges), then in the interior by relaxing a particle system with
//! short range repulsion measured by the Perram–Wertheim contact function.
//!
//! It is split into modules along that pipeline: [`geometry`] for ellipses and their
//! contact, [`field`] for the vector field and its sampled glyph shapes, [`domain`] for
//! the region with its holes, [`solver`] for the placement itself, [`io`] for the file
//! formats, and [`drawing`] for rasterising the result (requires `drawing` feature).
//!
//! # Basic usage
//! ```no_run
//! # use glyph_packing::{
//! #   domain::Domain,
//! #   error::Result,
//! #   field::Field,
//! #   geometry::{P2, Polyline},
//! #   solver::{self, Dim2Options, Options}
//! # };
//! # fn main() -> Result<()> {
//! // A 6 × 3 rectangle with a square hole.
//! let mut domain = Domain::rect(P2::origin(), P2::new(6.0, 3.0));
//! domain.insert(Polyline::rect(P2::new(2.0, 1.0), P2::new(3.0, 2.0)))?;
//!
//! // (angle, magnitude) at every point; `None` where the field has no data.
//! let field = Field::new(|p| Some((0.3 * p.x, 0.5 + 0.1 * p.y)));
//!
//! let options = Options::default()
//!   .with_dim2(Dim2Options::default().with_cycles(50, 10).with_seed(1));
//! let placement = solver::place(&field, &domain, &options)?;
//! placement.to_vgs().save("out.vgs")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//! Force evaluation runs on a pool of `threads` workers owned by the relaxation, each on
//! a contiguous range of the neighbour mesh. Results are reduced in edge order, so the
//! outcome does not depend on the thread count. Grid sampling and neighbour queries use
//! `rayon`.
//!
//! # Logging
//! The library emits [`tracing`] events and never installs a subscriber.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(rustdoc::private_intra_doc_links)]

pub mod error;
pub mod geometry;
pub mod field;
pub mod arrow;
pub mod domain;
pub mod io;
pub mod solver;
#[cfg(feature = "drawing")]
#[cfg_attr(docsrs, doc(cfg(feature = "drawing")))]
pub mod drawing;

pub use {
  arrow::{Arrow, EvalOptions, Evaluator, Margin},
  domain::Domain,
  error::{Error, Result},
  field::Field,
  solver::{place, Options, Placement}
};
