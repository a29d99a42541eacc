//! Error type of the crate.
//!
//! Absence of data (a query point outside the field support or the domain) is never an
//! error, it is reported as `Option::None` by the evaluating functions and skipped by
//! callers.

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Malformed domain, grid or glyph file.
  #[error("line {line}: {msg}")]
  Parse { line: usize, msg: String },

  /// Inconsistent options.
  #[error("invalid configuration: {0}")]
  Config(String),

  /// A solver produced an impossible result.
  #[error("numerical failure: {0}")]
  Numerical(String),

  /// The particle set collapsed, or the domain tree is inconsistent.
  #[error("bad topology: {0}")]
  BadTopology(String),

  /// Worker pool setup, synchronisation or teardown failed.
  #[error("concurrency failure: {0}")]
  Concurrency(String),
}

impl Error {
  pub(crate) fn parse(line: usize, msg: impl Into<String>) -> Self {
    Error::Parse { line, msg: msg.into() }
  }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
  fn from(e: std::sync::PoisonError<T>) -> Self {
    Error::Concurrency(e.to_string())
  }
}

/// Convenient wrapper around `std::Result`.
pub type Result<T> = std::result::Result<T, Error>;
