//! Raster drawing surface.
//!
//! [`RasterSurface`] executes a [`Scene`] onto an in-memory RGBA canvas. Shapes and
//! text are drawn with `imageproc`, glyph metrics come from `ab_glyph` fonts held
//! in a [`FontBook`], and the background bitmap is decoded and stretched with
//! `image`.
//!
//! If the background bitmap could not be loaded, the surface paints a solid
//! fallback colour instead and the captions are still drawn on top.

use std::collections::HashMap;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut},
  rect::Rect as PixelRect,
};
use lazy_static::lazy_static;

use super::*;
use crate::{
  config::FontFace,
  geometry,
  layout::TextMeasurer,
  parameters::TextAlign,
  scale::Canvas,
  scene::{DrawOp, FontProvider, FontSpec, Scene},
  source::Locator,
};

lazy_static! {
  static ref NAMED_COLORS: HashMap<&'static str, [u8; 4]> = HashMap::from([
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("silver", [192, 192, 192, 255]),
    ("navy", [0, 0, 128, 255]),
    ("teal", [0, 128, 128, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("transparent", [0, 0, 0, 0]),
  ]);
}

/// Parses a colour name or a `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` hex string.
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
  let value = value.trim();
  if let Some(rgba) = NAMED_COLORS.get(value.to_ascii_lowercase().as_str()) {
    return Some(Rgba(*rgba));
  }
  let hex = value.strip_prefix('#')?;
  if !hex.is_ascii() {
    return None;
  }
  let channel = |s: &str| u8::from_str_radix(s, 16).ok();
  let short = |i: usize| channel(&hex[i..i + 1].repeat(2));
  match hex.len() {
    3 => Some(Rgba([short(0)?, short(1)?, short(2)?, 255])),
    4 => Some(Rgba([short(0)?, short(1)?, short(2)?, short(3)?])),
    6 => Some(Rgba([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 255])),
    8 => Some(Rgba([
      channel(&hex[0..2])?,
      channel(&hex[2..4])?,
      channel(&hex[4..6])?,
      channel(&hex[6..8])?,
    ])),
    _ => None,
  }
}

/// Like [`parse_color`], falling back to `fallback` with a warning.
pub fn color_or(value: &str, fallback: Rgba<u8>) -> Rgba<u8> {
  parse_color(value).unwrap_or_else(|| {
    warn!("Invalid color {:?}, using {:?}", value, fallback.0);
    fallback
  })
}

/// Width of `text` at `size` pixels, including kerning.
pub fn text_width(font: &impl Font, size: f32, text: &str) -> f32 {
  let scaled = font.as_scaled(PxScale::from(size));
  let mut width = 0.0;
  let mut previous = None;
  for c in text.chars() {
    let id = scaled.glyph_id(c);
    if let Some(prev) = previous {
      width += scaled.kern(prev, id);
    }
    width += scaled.h_advance(id);
    previous = Some(id);
  }
  width
}

/// A font face registered under a family and style.
struct LoadedFace {
  /// Lower-cased family name.
  family: String,
  /// Lower-cased style token.
  style:  String,
  /// Parsed font.
  font:   FontVec,
}

/// Font faces available for measuring and drawing.
#[derive(Default)]
pub struct FontBook {
  /// Faces in registration order; the first one is the last-resort fallback.
  faces: Vec<LoadedFace>,
}

impl std::fmt::Debug for FontBook {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list().entries(self.faces.iter().map(|face| (&face.family, &face.style))).finish()
  }
}

impl FontBook {
  /// Creates an empty book.
  pub fn new() -> Self { Self::default() }

  /// Loads every configured face. Faces that cannot be read are skipped with a warning.
  pub fn load(faces: &[FontFace]) -> Self {
    let mut book = Self::new();
    for face in faces {
      let loaded = std::fs::read(&face.path)
        .map_err(AdviceError::from)
        .and_then(|bytes| book.insert(&face.family, &face.style, bytes));
      if let Err(e) = loaded {
        warn!("Skipping font {} {} at {}: {}", face.family, face.style, face.path.display(), e);
      }
    }
    debug!("Loaded {} font faces", book.len());
    book
  }

  /// Registers a face from raw TrueType/OpenType bytes.
  pub fn insert(&mut self, family: &str, style: &str, bytes: Vec<u8>) -> Result<()> {
    let font = FontVec::try_from_vec(bytes)?;
    self.faces.push(LoadedFace {
      family: family.trim().to_ascii_lowercase(),
      style: style.trim().to_ascii_lowercase(),
      font,
    });
    Ok(())
  }

  /// Number of registered faces.
  pub fn len(&self) -> usize { self.faces.len() }

  /// Whether no faces are registered.
  pub fn is_empty(&self) -> bool { self.faces.is_empty() }

  /// Finds the best face for `spec`: exact family and style, then the family's
  /// regular face, then any face of the family, then the first registered face.
  pub fn face(&self, spec: &FontSpec) -> Result<&FontVec> {
    let family = spec.family.trim().to_ascii_lowercase();
    let style = spec.style.trim().to_ascii_lowercase();
    let wanted = family.as_str();
    let same_family = move || self.faces.iter().filter(move |f| f.family == wanted);

    same_family()
      .find(|f| f.style == style)
      .or_else(|| same_family().find(|f| matches!(f.style.as_str(), "normal" | "regular")))
      .or_else(|| same_family().next())
      .or_else(|| {
        let fallback = self.faces.first();
        if let Some(face) = fallback {
          trace!("No face for {}, falling back to {} {}", spec, face.family, face.style);
        }
        fallback
      })
      .map(|f| &f.font)
      .ok_or_else(|| AdviceError::FontUnavailable(spec.to_string()))
  }
}

impl FontProvider for FontBook {
  fn measurer<'a>(&'a self, font: &FontSpec) -> Result<Box<dyn TextMeasurer + 'a>> {
    let face = self.face(font)?;
    let size = font.size as f32;
    Ok(Box::new(move |text: &str| text_width(face, size, text)))
  }
}

/// Loads and decodes a background bitmap from a path or URL.
pub async fn load_background(locator: &str) -> Result<DynamicImage> {
  let bytes = Locator::parse(locator).fetch_bytes(&HashMap::new()).await?;
  let image = image::load_from_memory(&bytes)?;
  debug!("Loaded background {} ({}x{})", locator, image.width(), image.height());
  Ok(image)
}

/// Anything that can execute draw operations.
pub trait DrawingSurface {
  /// Executes one operation.
  fn draw(&mut self, op: &DrawOp) -> Result<()>;

  /// Executes a whole scene in order.
  fn render(&mut self, scene: &Scene) -> Result<()> {
    for op in &scene.ops {
      self.draw(op)?;
    }
    Ok(())
  }
}

/// In-memory RGBA canvas.
pub struct RasterSurface<'a> {
  /// Pixels drawn so far.
  image:      RgbaImage,
  /// Decoded background, if it could be loaded.
  background: Option<DynamicImage>,
  /// Fonts for text operations.
  fonts:      &'a FontBook,
  /// Colour painted instead of a missing background.
  fallback:   Rgba<u8>,
}

impl<'a> RasterSurface<'a> {
  /// Creates a transparent surface of the canvas size.
  pub fn new(canvas: Canvas, background: Option<DynamicImage>, fonts: &'a FontBook, fallback_color: &str) -> Self {
    Self {
      image: RgbaImage::new(canvas.width, canvas.height),
      background,
      fonts,
      fallback: color_or(fallback_color, Rgba([0, 0, 0, 255])),
    }
  }

  /// The drawn pixels.
  pub fn image(&self) -> &RgbaImage { &self.image }

  /// Consumes the surface, returning the drawn pixels.
  pub fn into_image(self) -> RgbaImage { self.image }

  /// Writes the drawn pixels as an image file; the format follows the extension.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    self.image.save(path.as_ref())?;
    info!("Wrote {}", path.as_ref().display());
    Ok(())
  }

  /// Stretches the background over the canvas, or fills it with the fallback colour.
  fn draw_background(&mut self, canvas: Canvas) {
    match &self.background {
      Some(background) => {
        self.image = background.resize_exact(canvas.width, canvas.height, FilterType::Triangle).to_rgba8();
      },
      None => {
        warn!("No background bitmap, filling with {:?}", self.fallback.0);
        self.image = RgbaImage::from_pixel(canvas.width, canvas.height, self.fallback);
      },
    }
  }

  /// Draws one line with its baseline at `y`, anchored at `x` per `align`.
  fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, color: &str, align: TextAlign) -> Result<()> {
    let face = self.fonts.face(font)?;
    let size = font.size as f32;
    let width = text_width(face, size, text);
    let left = match align {
      TextAlign::Start => x,
      TextAlign::Center => x - width / 2.0,
      TextAlign::End => x - width,
    };
    // `y` is a baseline; imageproc positions glyphs from the top of the ascent.
    let top = y - face.as_scaled(PxScale::from(size)).ascent();
    let color = color_or(color, Rgba([0, 0, 0, 255]));
    draw_text_mut(&mut self.image, color, left.round() as i32, top.round() as i32, PxScale::from(size), face, text);
    Ok(())
  }
}

/// Converts a float rectangle to pixels, or `None` if it has no area.
fn pixel_rect(rect: &geometry::Rect) -> Option<PixelRect> {
  let width = rect.width.round();
  let height = rect.height.round();
  if width < 1.0 || height < 1.0 {
    return None;
  }
  Some(PixelRect::at(rect.x.round() as i32, rect.y.round() as i32).of_size(width as u32, height as u32))
}

impl DrawingSurface for RasterSurface<'_> {
  fn draw(&mut self, op: &DrawOp) -> Result<()> {
    trace!("Drawing {:?}", op);
    match op {
      DrawOp::Background { canvas, .. } => self.draw_background(*canvas),
      DrawOp::Bubble { rect, fill, stroke } => {
        if let Some(pixels) = pixel_rect(rect) {
          draw_filled_rect_mut(&mut self.image, pixels, color_or(fill, Rgba([255, 255, 255, 255])));
          draw_hollow_rect_mut(&mut self.image, pixels, color_or(stroke, Rgba([0, 0, 0, 255])));
        }
      },
      DrawOp::Text { text, x, y, font, color, align } => self.draw_text(text, *x, *y, font, color, *align)?,
    }
    Ok(())
  }
}
