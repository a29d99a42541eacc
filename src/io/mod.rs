//! State files: glyphs with their neighbour mesh (`vgs`), and vector samples on a grid
//! (`sag`). Both are line oriented text; readers accept gzip-compressed input as well.

use {
  crate::error::{Error, Result},
  std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr
  },
  flate2::read::GzDecoder
};

pub mod vgs;
pub mod sag;
#[cfg(test)] mod tests;

pub use {
  vgs::Vgs,
  sag::SagGrid
};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Buffer `reader`, decompressing on the fly if it starts with the gzip magic.
pub fn decompressing(reader: impl Read + 'static) -> Result<Box<dyn BufRead>> {
  let mut reader = BufReader::new(reader);
  let gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
  Ok(if gzip {
    tracing::debug!("gzip input");
    Box::new(BufReader::new(GzDecoder::new(reader)))
  } else {
    Box::new(reader)
  })
}

pub(crate) fn open(path: &Path) -> Result<Box<dyn BufRead>> {
  decompressing(File::open(path)?)
}

/// Numbered, trimmed, non-blank lines.
pub(crate) struct Lines<R> {
  inner: std::io::Lines<R>,
  number: usize
}

impl<R: BufRead> Lines<R> {
  pub fn new(reader: R) -> Self {
    Self { inner: reader.lines(), number: 0 }
  }

  /// Next line which is neither blank nor, if `comments` is set, a `#` comment.
  pub fn next_line(&mut self, comments: bool) -> Result<Option<(usize, String)>> {
    for line in self.inner.by_ref() {
      self.number += 1;
      let line = line?;
      let line = line.trim();
      if line.is_empty() || comments && line.starts_with('#') {
        continue;
      }
      return Ok(Some((self.number, line.to_owned())));
    }
    Ok(None)
  }

  pub fn expect_line(&mut self, what: &str) -> Result<(usize, String)> {
    self.next_line(true)?
      .ok_or_else(|| Error::parse(self.number, format!("unexpected end of input, expected {what}")))
  }
}

/// Parse exactly `N` whitespace separated fields.
pub(crate) fn fields<T: FromStr, const N: usize>(line: usize, text: &str) -> Result<[T; N]> {
  let parsed = text.split_whitespace()
    .map(|field| field.parse::<T>()
      .map_err(|_| Error::parse(line, format!("cannot parse `{field}`"))))
    .collect::<Result<Vec<T>>>()?;
  let count = parsed.len();
  parsed.try_into()
    .map_err(|_| Error::parse(line, format!("expected {N} fields, got {count}")))
}
