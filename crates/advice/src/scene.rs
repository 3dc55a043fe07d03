//! Scene composition.
//!
//! [`compose`] turns scaled parameters into an ordered list of [`DrawOp`]s.
//! The order is fixed:
//!
//! 1. the background, stretched to the canvas,
//! 2. the top bubble, if its caption is non-empty,
//! 3. the center bubble, if its caption is non-empty,
//! 4. the bottom bubble, if its caption is non-empty,
//! 5. the free paragraph, if non-empty, drawn last so bubbles never cover it.
//!
//! Text is wrapped with a measurer bound to each element's font, obtained from a
//! [`FontProvider`].

use super::*;
use crate::{
  config::BottomAnchor,
  geometry::{self, Anchor, PlacedLine, Rect},
  layout::{self, GapPolicy, TextMeasurer},
  parameters::{BubbleStyle, TextAlign},
  scale::{Canvas, ScaledParameters},
};

/// Bubble fill colour.
pub const BUBBLE_FILL: &str = "white";
/// Bubble outline colour.
pub const BUBBLE_STROKE: &str = "black";
/// Bubble text colour.
pub const BUBBLE_TEXT: &str = "black";

/// Font description used for measuring and drawing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
  /// Family name.
  pub family: String,
  /// Weight/slant token.
  pub style:  String,
  /// Size in pixels.
  pub size:   u32,
}

impl FontSpec {
  /// Font of a bubble style.
  pub fn of_bubble(style: &BubbleStyle) -> Self {
    Self { family: style.font_family.clone(), style: style.font_style.clone(), size: style.font_size }
  }
}

impl Display for FontSpec {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}px {}", self.style, self.size, self.family)
  }
}

/// Supplies a text measurer bound to one font.
pub trait FontProvider {
  /// Binds a measurer to `font`.
  fn measurer<'a>(&'a self, font: &FontSpec) -> Result<Box<dyn TextMeasurer + 'a>>;
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
  /// Fill the canvas with the background bitmap, stretched.
  Background {
    /// Locator of the bitmap.
    locator: String,
    /// Target canvas.
    canvas:  Canvas,
  },
  /// A filled, outlined bubble box.
  Bubble {
    /// Bubble box.
    rect:   Rect,
    /// Fill colour.
    fill:   String,
    /// Outline colour.
    stroke: String,
  },
  /// A single line of text; `y` is the baseline.
  Text {
    /// Line content.
    text:  String,
    /// Anchor x.
    x:     f32,
    /// Baseline y.
    y:     f32,
    /// Font to draw with.
    font:  FontSpec,
    /// Fill colour.
    color: String,
    /// How `x` anchors the line.
    align: TextAlign,
  },
}

/// The composed scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
  /// Canvas the operations target.
  pub canvas: Canvas,
  /// Operations in draw order.
  pub ops:    Vec<DrawOp>,
}

/// Layout knobs that come from configuration rather than parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeOptions {
  /// Bubble padding.
  pub padding:       u32,
  /// Bottom bubble anchoring mode.
  pub bottom_anchor: BottomAnchor,
}

impl Default for ComposeOptions {
  fn default() -> Self { Self { padding: geometry::DEFAULT_PADDING, bottom_anchor: BottomAnchor::Canvas } }
}

impl From<&Config> for ComposeOptions {
  fn from(config: &Config) -> Self { Self { padding: config.padding, bottom_anchor: config.bottom_anchor } }
}

/// Builds the ordered draw operations for one render.
pub fn compose(
  params: &ScaledParameters,
  canvas: Canvas,
  fonts: &dyn FontProvider,
  options: ComposeOptions,
) -> Result<Scene> {
  let padding = options.padding;
  let mut ops = vec![DrawOp::Background { locator: params.background.clone(), canvas }];

  let bubbles = [
    (&params.top_text, &params.top, Anchor::Top(params.top.position as f32)),
    (&params.center_text, &params.center, Anchor::Top(params.center.position as f32)),
    (
      &params.bottom_text,
      &params.bottom,
      Anchor::for_bottom(options.bottom_anchor, params.bottom.position),
    ),
  ];
  for (text, style, anchor) in bubbles {
    if text.is_empty() {
      continue;
    }
    let font = FontSpec::of_bubble(style);
    let measurer = fonts.measurer(&font)?;
    let lines = layout::wrap(
      text,
      geometry::bubble_text_width(canvas, padding),
      measurer.as_ref(),
      GapPolicy::After,
    );
    let bubble = geometry::layout_bubble(lines, font.size, anchor, canvas, padding);
    debug!("Bubble for {:?} at {:?}", text, bubble.rect);
    ops.push(DrawOp::Bubble {
      rect:   bubble.rect,
      fill:   BUBBLE_FILL.to_string(),
      stroke: BUBBLE_STROKE.to_string(),
    });
    push_lines(&mut ops, bubble.lines, &font, BUBBLE_TEXT, TextAlign::Center);
  }

  if !params.free_paragraph.is_empty() {
    let style = &params.paragraph;
    let font =
      FontSpec { family: style.font_family.clone(), style: style.font_style.clone(), size: style.font_size };
    let measurer = fonts.measurer(&font)?;
    let max_width = canvas.width.saturating_sub(padding.saturating_mul(2)) as f32;
    let lines = layout::wrap(&params.free_paragraph, max_width, measurer.as_ref(), GapPolicy::Between);
    let block = geometry::layout_paragraph(lines, font.size, style.text_align, canvas, padding);
    debug!("Free paragraph block at y={} height={}", block.start_y, block.height);
    push_lines(&mut ops, block.lines, &font, &style.text_color, style.text_align);
  }

  Ok(Scene { canvas, ops })
}

/// Emits text operations for placed lines, skipping empty paragraph gaps.
fn push_lines(ops: &mut Vec<DrawOp>, lines: Vec<PlacedLine>, font: &FontSpec, color: &str, align: TextAlign) {
  ops.extend(lines.into_iter().filter(|line| !line.text.is_empty()).map(|line| DrawOp::Text {
    text: line.text,
    x: line.x,
    y: line.y,
    font: font.clone(),
    color: color.to_string(),
    align,
  }));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parameters::RenderParameters;

  /// Every character is `size / 2` wide.
  struct HalfEm;

  impl FontProvider for HalfEm {
    fn measurer<'a>(&'a self, font: &FontSpec) -> Result<Box<dyn TextMeasurer + 'a>> {
      let advance = font.size as f32 / 2.0;
      Ok(Box::new(move |s: &str| s.chars().count() as f32 * advance))
    }
  }

  struct NoFonts;

  impl FontProvider for NoFonts {
    fn measurer<'a>(&'a self, font: &FontSpec) -> Result<Box<dyn TextMeasurer + 'a>> {
      Err(AdviceError::FontUnavailable(font.to_string()))
    }
  }

  fn params() -> RenderParameters {
    let mut params = RenderParameters::builtin();
    params.background = "./images/image.png".into();
    params
  }

  fn kinds(scene: &Scene) -> Vec<&'static str> {
    scene
      .ops
      .iter()
      .map(|op| match op {
        DrawOp::Background { .. } => "background",
        DrawOp::Bubble { .. } => "bubble",
        DrawOp::Text { .. } => "text",
      })
      .collect()
  }

  #[test]
  fn test_draw_order() {
    let mut p = params();
    p.top_text = "top".into();
    p.center_text = "center".into();
    p.bottom_text = "bottom".into();
    p.free_paragraph = "free".into();
    let canvas = Canvas { width: 800, height: 600 };
    let scene = compose(&ScaledParameters::new(&p, 1.0), canvas, &HalfEm, ComposeOptions::default()).unwrap();

    assert_eq!(kinds(&scene), ["background", "bubble", "text", "bubble", "text", "bubble", "text", "text"]);
    match scene.ops.last().unwrap() {
      DrawOp::Text { text, color, .. } => {
        assert_eq!(text, "free");
        assert_eq!(color, "white");
      },
      other => panic!("Expected free paragraph text, got {other:?}"),
    }
  }

  #[test]
  fn test_empty_captions_are_skipped() {
    let mut p = params();
    p.top_text.clear();
    p.center_text.clear();
    let canvas = Canvas { width: 800, height: 600 };
    let scene = compose(&ScaledParameters::new(&p, 1.0), canvas, &HalfEm, ComposeOptions::default()).unwrap();
    assert_eq!(kinds(&scene), ["background", "bubble", "text"]);
  }

  #[test]
  fn test_bottom_bubble_is_canvas_anchored() {
    let mut p = params();
    p.top_text.clear();
    p.bottom_text = "word ".repeat(60);
    let canvas = Canvas { width: 640, height: 480 };
    let scene = compose(&ScaledParameters::new(&p, 0.5), canvas, &HalfEm, ComposeOptions::default()).unwrap();
    let rect = scene
      .ops
      .iter()
      .find_map(|op| match op {
        DrawOp::Bubble { rect, .. } => Some(*rect),
        _ => None,
      })
      .unwrap();
    assert_eq!(rect.bottom(), 480.0 - 20.0);
  }

  #[test]
  fn test_bottom_bubble_position_mode() {
    let mut p = params();
    p.top_text.clear();
    let canvas = Canvas { width: 640, height: 480 };
    let options = ComposeOptions { bottom_anchor: BottomAnchor::Position, ..ComposeOptions::default() };
    let scene = compose(&ScaledParameters::new(&p, 1.0), canvas, &HalfEm, options).unwrap();
    match &scene.ops[1] {
      DrawOp::Bubble { rect, .. } => assert_eq!(rect.y, 150.0),
      other => panic!("Expected bubble, got {other:?}"),
    }
  }

  #[test]
  fn test_multi_paragraph_bubble_text() {
    let mut p = params();
    p.top_text = "Listen\nson".into();
    p.bottom_text.clear();
    let canvas = Canvas { width: 800, height: 600 };
    let scene = compose(&ScaledParameters::new(&p, 1.0), canvas, &HalfEm, ComposeOptions::default()).unwrap();

    match &scene.ops[1] {
      // Four lines including two gaps: 4 * 50 + 40.
      DrawOp::Bubble { rect, .. } => assert_eq!(rect.height, 240.0),
      other => panic!("Expected bubble, got {other:?}"),
    }
    let baselines: Vec<f32> = scene
      .ops
      .iter()
      .filter_map(|op| match op {
        DrawOp::Text { y, .. } => Some(*y),
        _ => None,
      })
      .collect();
    assert_eq!(baselines, vec![120.0, 220.0]);
  }

  #[test]
  fn test_huge_font_size_composes() {
    let mut p = params();
    p.top.font_size = 3_000_000_000;
    p.free_paragraph = "free".into();
    p.paragraph.font_size = u32::MAX;
    let canvas = Canvas { width: 1280, height: 720 };
    let scene = compose(&ScaledParameters::new(&p, 1.0), canvas, &HalfEm, ComposeOptions::default()).unwrap();
    match &scene.ops[1] {
      DrawOp::Bubble { rect, .. } => assert_eq!(rect.height, u32::MAX as f32),
      other => panic!("Expected bubble, got {other:?}"),
    }
  }

  #[test]
  fn test_missing_font_is_error() {
    let canvas = Canvas { width: 800, height: 600 };
    let result = compose(&ScaledParameters::new(&params(), 1.0), canvas, &NoFonts, ComposeOptions::default());
    assert!(matches!(result, Err(AdviceError::FontUnavailable(_))));
  }

  #[test]
  fn test_font_spec_display() {
    let font = FontSpec { family: "Arial".into(), style: "bold".into(), size: 40 };
    assert_eq!(font.to_string(), "bold 40px Arial");
  }
}
