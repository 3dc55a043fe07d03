//! Responsive scaling.
//!
//! One factor is computed per render from the viewport and background sizes
//! and applied to the canvas size and to every font size and position. Scaling
//! is expressed as a conversion from [`RenderParameters`] into
//! [`ScaledParameters`], so layout code can only ever see parameters that were
//! scaled exactly once.

use super::*;
use crate::parameters::{BubbleStyle, RenderParameters};

/// Canvas size in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
  /// Width in pixels.
  pub width:  u32,
  /// Height in pixels.
  pub height: u32,
}

impl Canvas {
  /// Fits an image into a viewport, keeping its aspect ratio. Returns the canvas
  /// and the factor that produced it.
  pub fn fit(viewport: (u32, u32), image: (u32, u32)) -> Result<(Self, f64)> {
    let factor = scale_factor(viewport.0, viewport.1, image.0, image.1)?;
    let canvas = Self { width: scale_value(image.0, factor), height: scale_value(image.1, factor) };
    debug!("Canvas {}x{} from image {:?} at factor {}", canvas.width, canvas.height, image, factor);
    Ok((canvas, factor))
  }
}

/// `min(viewport_width / image_width, viewport_height / image_height)`.
///
/// ```
/// use advice::scale::scale_factor;
///
/// assert_eq!(scale_factor(640, 480, 1280, 720).unwrap(), 0.5);
/// ```
pub fn scale_factor(viewport_width: u32, viewport_height: u32, image_width: u32, image_height: u32) -> Result<f64> {
  if viewport_width == 0 || viewport_height == 0 || image_width == 0 || image_height == 0 {
    return Err(AdviceError::InvalidDimensions {
      viewport: (viewport_width, viewport_height),
      image:    (image_width, image_height),
    });
  }
  let width_ratio = f64::from(viewport_width) / f64::from(image_width);
  let height_ratio = f64::from(viewport_height) / f64::from(image_height);
  Ok(width_ratio.min(height_ratio))
}

/// Multiplies a pre-scale value by `factor` and floors to a whole pixel.
pub fn scale_value(value: u32, factor: f64) -> u32 { (f64::from(value) * factor).floor() as u32 }

/// Parameters whose sizes and positions are in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledParameters {
  /// The scaled values.
  parameters: RenderParameters,
  /// Factor that was applied.
  factor:     f64,
}

impl ScaledParameters {
  /// Scales every font size and position in `parameters` by `factor`.
  pub fn new(parameters: &RenderParameters, factor: f64) -> Self {
    let bubble = |style: &BubbleStyle| BubbleStyle {
      font_size: scale_value(style.font_size, factor),
      position: scale_value(style.position, factor),
      ..style.clone()
    };
    let mut scaled = parameters.clone();
    scaled.top = bubble(&parameters.top);
    scaled.center = bubble(&parameters.center);
    scaled.bottom = bubble(&parameters.bottom);
    scaled.paragraph.font_size = scale_value(parameters.paragraph.font_size, factor);
    trace!("Scaled parameters by {}: {:?}", factor, scaled);
    Self { parameters: scaled, factor }
  }

  /// Factor that was applied.
  pub fn factor(&self) -> f64 { self.factor }
}

impl std::ops::Deref for ScaledParameters {
  type Target = RenderParameters;

  fn deref(&self) -> &RenderParameters { &self.parameters }
}
