//! Error types for the advice CLI.

use thiserror::Error;

use super::*;

/// Error type alias used for the `adviced` crate.
pub type Result<T> = core::result::Result<T, AdvicedError>;

/// Errors surfaced by CLI commands.
#[derive(Error, Debug)]
pub enum AdvicedError {
  /// An error bubbled up from the library.
  #[error(transparent)]
  Advice(#[from] AdviceError),

  /// Output could not be serialized.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// Writing to the terminal failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A command line argument was malformed.
  #[error("Invalid argument: {0}")]
  Argument(String),
}
