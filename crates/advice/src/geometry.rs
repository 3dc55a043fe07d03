//! Bubble and paragraph geometry.
//!
//! All arithmetic is in canvas pixels after scaling. A line advances by
//! `font_size + 10`; a bubble is as tall as its lines plus `padding` above and
//! below. Baselines inside a bubble start one full line below the padded top,
//! whereas free-paragraph lines start at the block's top edge.

use super::*;
use crate::{config::BottomAnchor, parameters::TextAlign, scale::Canvas};

/// Default bubble padding.
pub const DEFAULT_PADDING: u32 = 20;

/// Extra leading added to the font size to get the line advance.
pub const LINE_LEADING: u32 = 10;

/// Vertical advance of one line.
pub fn line_height(font_size: u32) -> u32 { font_size.saturating_add(LINE_LEADING) }

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  /// Left edge.
  pub x:      f32,
  /// Top edge.
  pub y:      f32,
  /// Width.
  pub width:  f32,
  /// Height.
  pub height: f32,
}

impl Rect {
  /// Bottom edge.
  pub fn bottom(&self) -> f32 { self.y + self.height }
}

/// Height of a bubble wrapping `line_count` lines, saturating at `u32::MAX`.
pub fn bubble_height(line_count: usize, font_size: u32, padding: u32) -> u32 {
  let line_count = u32::try_from(line_count).unwrap_or(u32::MAX);
  line_count.saturating_mul(line_height(font_size)).saturating_add(padding.saturating_mul(2))
}

/// Baselines for bubble lines whose bubble top edge is at `origin_y`.
pub fn bubble_baselines(line_count: usize, origin_y: f32, font_size: u32, padding: u32) -> Vec<f32> {
  let advance = line_height(font_size) as f32;
  (0..line_count).map(|i| origin_y + padding as f32 + (i as f32 + 1.0) * advance).collect()
}

/// Top edge of a bottom-anchored bubble: its lower edge sits `padding` above the canvas bottom.
pub fn bottom_origin(canvas_height: u32, bubble_height: u32, padding: u32) -> f32 {
  canvas_height as f32 - bubble_height as f32 - padding as f32
}

/// Horizontal band every bubble occupies: `padding` in from both canvas edges.
pub fn bubble_band(canvas: Canvas, padding: u32) -> (f32, f32) {
  let width = canvas.width.saturating_sub(padding.saturating_mul(2));
  (padding as f32, width as f32)
}

/// Width available to bubble text: the bubble width less padding on both sides.
pub fn bubble_text_width(canvas: Canvas, padding: u32) -> f32 {
  canvas.width.saturating_sub(padding.saturating_mul(4)) as f32
}

/// How a bubble's top edge is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
  /// Drawn top-down from a fixed y.
  Top(f32),
  /// Computed backward from the canvas bottom.
  Bottom,
}

impl Anchor {
  /// Anchor for the bottom bubble under the configured mode.
  pub fn for_bottom(mode: BottomAnchor, position: u32) -> Self {
    match mode {
      BottomAnchor::Canvas => Self::Bottom,
      BottomAnchor::Position => Self::Top(position as f32),
    }
  }
}

/// One line of text placed on the canvas; `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
  /// Line content; empty for paragraph gaps.
  pub text: String,
  /// Anchor x, interpreted according to the text alignment.
  pub x:    f32,
  /// Baseline y.
  pub y:    f32,
}

/// A laid-out speech bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleLayout {
  /// Bubble box.
  pub rect:  Rect,
  /// Lines centered horizontally in the box.
  pub lines: Vec<PlacedLine>,
}

/// Places a bubble for already-wrapped `lines`.
pub fn layout_bubble(lines: Vec<String>, font_size: u32, anchor: Anchor, canvas: Canvas, padding: u32) -> BubbleLayout {
  let height = bubble_height(lines.len(), font_size, padding);
  let y = match anchor {
    Anchor::Top(y) => y,
    Anchor::Bottom => bottom_origin(canvas.height, height, padding),
  };
  let (x, width) = bubble_band(canvas, padding);
  let center = x + width / 2.0;
  let baselines = bubble_baselines(lines.len(), y, font_size, padding);
  let lines =
    lines.into_iter().zip(baselines).map(|(text, y)| PlacedLine { text, x: center, y }).collect();
  BubbleLayout { rect: Rect { x, y, width, height: height as f32 }, lines }
}

/// A laid-out free paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphLayout {
  /// Top of the block.
  pub start_y: f32,
  /// Total block height.
  pub height:  f32,
  /// Placed lines.
  pub lines:   Vec<PlacedLine>,
}

/// Anchor x for free-paragraph text.
pub fn paragraph_anchor(align: TextAlign, canvas: Canvas, padding: u32) -> f32 {
  match align {
    TextAlign::Start => padding as f32,
    TextAlign::Center => canvas.width as f32 / 2.0,
    TextAlign::End => canvas.width as f32 - padding as f32,
  }
}

/// Centers a block of `lines` vertically on the canvas. Line `i` is drawn at
/// `start_y + i * line_height`.
pub fn layout_paragraph(
  lines: Vec<String>,
  font_size: u32,
  align: TextAlign,
  canvas: Canvas,
  padding: u32,
) -> ParagraphLayout {
  let advance = line_height(font_size) as f32;
  let height = lines.len() as f32 * advance;
  let start_y = (canvas.height as f32 - height) / 2.0;
  let x = paragraph_anchor(align, canvas, padding);
  let lines = lines
    .into_iter()
    .enumerate()
    .map(|(i, text)| PlacedLine { text, x, y: start_y + i as f32 * advance })
    .collect();
  ParagraphLayout { start_y, height, lines }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lines(n: usize) -> Vec<String> { (0..n).map(|i| format!("line {i}")).collect() }

  #[test]
  fn test_bubble_height_and_baselines() {
    assert_eq!(bubble_height(4, 40, 20), 4 * 50 + 40);
    assert_eq!(bubble_baselines(2, 50.0, 40, 20), vec![120.0, 170.0]);
  }

  #[test]
  fn test_bottom_bubble_ends_padding_above_edge() {
    let canvas = Canvas { width: 800, height: 600 };
    for n in 1..12 {
      let bubble = layout_bubble(lines(n), 27, Anchor::Bottom, canvas, DEFAULT_PADDING);
      assert_eq!(bubble.rect.bottom(), 600.0 - 20.0);
    }
  }

  #[test]
  fn test_top_anchor_uses_position() {
    let canvas = Canvas { width: 800, height: 600 };
    let bubble = layout_bubble(lines(1), 40, Anchor::Top(50.0), canvas, 20);
    assert_eq!(bubble.rect, Rect { x: 20.0, y: 50.0, width: 760.0, height: 90.0 });
    assert_eq!(bubble.lines[0], PlacedLine { text: "line 0".into(), x: 400.0, y: 120.0 });
  }

  #[test]
  fn test_bottom_anchor_modes() {
    assert_eq!(Anchor::for_bottom(BottomAnchor::Canvas, 150), Anchor::Bottom);
    assert_eq!(Anchor::for_bottom(BottomAnchor::Position, 150), Anchor::Top(150.0));
  }

  #[test]
  fn test_paragraph_is_vertically_centered() {
    let canvas = Canvas { width: 800, height: 600 };
    let block = layout_paragraph(lines(3), 40, TextAlign::Center, canvas, 20);
    assert_eq!(block.height, 150.0);
    assert_eq!(block.start_y, 225.0);
    let ys: Vec<f32> = block.lines.iter().map(|l| l.y).collect();
    assert_eq!(ys, vec![225.0, 275.0, 325.0]);
    assert!(block.lines.iter().all(|l| l.x == 400.0));
  }

  #[test]
  fn test_paragraph_anchors() {
    let canvas = Canvas { width: 500, height: 100 };
    assert_eq!(paragraph_anchor(TextAlign::Start, canvas, 20), 20.0);
    assert_eq!(paragraph_anchor(TextAlign::End, canvas, 20), 480.0);
  }

  #[test]
  fn test_huge_font_size_saturates() {
    assert_eq!(line_height(u32::MAX), u32::MAX);
    assert_eq!(bubble_height(2, 3_000_000_000, 20), u32::MAX);
    assert_eq!(bubble_band(Canvas { width: 800, height: 600 }, u32::MAX), (u32::MAX as f32, 0.0));

    let canvas = Canvas { width: 1280, height: 720 };
    let bubble = layout_bubble(lines(2), 3_000_000_000, Anchor::Top(50.0), canvas, 20);
    assert_eq!(bubble.rect.height, u32::MAX as f32);
    assert_eq!(bubble.lines.len(), 2);
  }

  #[test]
  fn test_narrow_canvas_saturates() {
    let canvas = Canvas { width: 30, height: 100 };
    assert_eq!(bubble_band(canvas, 20), (20.0, 0.0));
    assert_eq!(bubble_text_width(canvas, 20), 0.0);
  }
}
