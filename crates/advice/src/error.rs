//! Error types for the advice library.
//!
//! This module provides a single error type covering every failure mode the
//! rendering pipeline can run into:
//! - Network and settings-store errors
//! - Malformed JSON or TOML documents
//! - Image decoding and font loading
//! - Invalid canvas or viewport dimensions
//!
//! Most of these are recovered from before they reach a caller. The parameter
//! resolver, for example, swallows fetch failures and falls back to built-in
//! defaults (see [`crate::resolver`]).
//!
//! # Examples
//!
//! ```
//! use advice::{error::AdviceError, scale::scale_factor};
//!
//! match scale_factor(0, 720, 1024, 768) {
//!   Err(AdviceError::InvalidDimensions { .. }) => println!("viewport must be non-empty"),
//!   Err(e) => println!("Other error: {}", e),
//!   Ok(factor) => println!("scale by {factor}"),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`advice`](crate) crate.
pub type Result<T> = core::result::Result<T, AdviceError>;

/// Errors that can occur while resolving, laying out or rendering captions.
#[derive(Error, Debug)]
pub enum AdviceError {
  /// A network request failed.
  ///
  /// This can occur when:
  /// - The settings store or corpus host is unreachable
  /// - The request times out
  /// - TLS/SSL errors occur
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A remote endpoint answered with a non-success status.
  ///
  /// The string carries the status line and the locator for diagnostics.
  #[error("API error: {0}")]
  ApiError(String),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// A JSON document (corpus, settings record) could not be parsed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be serialized.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// A locator could not be parsed as a URL.
  #[error(transparent)]
  Url(#[from] url::ParseError),

  /// Decoding, resizing or encoding a bitmap failed.
  #[error(transparent)]
  Image(#[from] image::ImageError),

  /// Font bytes were read but are not a usable TrueType/OpenType face.
  #[error(transparent)]
  InvalidFont(#[from] ab_glyph::InvalidFont),

  /// No font face is registered that can satisfy the requested family/style.
  #[error("No font available for \"{0}\"")]
  FontUnavailable(String),

  /// A viewport or image has a zero-length side, so no scale factor exists.
  #[error("Invalid dimensions: viewport {viewport:?}, image {image:?}")]
  InvalidDimensions {
    /// Viewport width and height.
    viewport: (u32, u32),
    /// Image width and height.
    image:    (u32, u32),
  },

  /// Free-form configuration problem.
  #[error("{0}")]
  Config(String),
}
