//! Greedy, paragraph-aware word wrapping.
//!
//! Text is first split into paragraphs on explicit break markers (a newline, or
//! its URL-escaped form `%0A`). Each paragraph is then wrapped greedily: words
//! are appended to the current line while the measured width of the candidate
//! line stays strictly below the limit. A word that is wider than the limit on
//! its own still gets a line to itself; words are never broken.
//!
//! ```
//! use advice::layout::{wrap, GapPolicy};
//!
//! // Ten pixels per character.
//! let measure = |s: &str| s.chars().count() as f32 * 10.0;
//! let lines = wrap("Listen\nson", 500.0, &measure, GapPolicy::After);
//! assert_eq!(lines, ["Listen", "", "son", ""]);
//! ```

use super::*;

/// Escaped paragraph marker as it appears in un-decoded query values.
const ESCAPED_BREAK: &str = "%0A";

/// Measures the rendered pixel width of a string in one fixed font.
///
/// Implementations are bound to a family, size and style before wrapping starts;
/// see [`crate::scene::FontProvider`].
pub trait TextMeasurer {
  /// Width of `text` in pixels.
  fn measure(&self, text: &str) -> f32;
}

impl<F> TextMeasurer for F
where F: Fn(&str) -> f32
{
  fn measure(&self, text: &str) -> f32 { self(text) }
}

/// Where paragraph-gap sentinel lines are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
  /// After every paragraph, including the last. Used for bubbles.
  #[default]
  After,
  /// Only between paragraphs. Used for the free paragraph.
  Between,
}

/// Splits text on `\n`, `\r\n` and the escaped `%0A` marker.
pub fn paragraphs(text: &str) -> Vec<String> {
  text
    .replace(ESCAPED_BREAK, "\n")
    .split('\n')
    .map(|p| p.strip_suffix('\r').unwrap_or(p).to_string())
    .collect()
}

/// Wraps one paragraph (no break markers) into lines narrower than `max_width`.
pub fn wrap_paragraph(paragraph: &str, max_width: f32, measurer: &dyn TextMeasurer) -> Vec<String> {
  let mut words = paragraph.split_whitespace();
  let mut lines = Vec::new();
  let mut current = words.next().unwrap_or_default().to_string();

  for word in words {
    let candidate = format!("{current} {word}");
    if measurer.measure(&candidate) < max_width {
      current = candidate;
    } else {
      lines.push(std::mem::replace(&mut current, word.to_string()));
    }
  }
  lines.push(current);
  lines
}

/// Splits `text` into paragraphs and wraps each one, inserting empty gap lines
/// according to `gaps`. Empty input produces a single empty line.
pub fn wrap(text: &str, max_width: f32, measurer: &dyn TextMeasurer, gaps: GapPolicy) -> Vec<String> {
  if text.is_empty() {
    return vec![String::new()];
  }
  let paragraphs = paragraphs(text);
  let count = paragraphs.len();
  let mut lines = Vec::new();

  for (i, paragraph) in paragraphs.iter().enumerate() {
    lines.extend(wrap_paragraph(paragraph, max_width, measurer));
    if gaps == GapPolicy::After || i + 1 < count {
      lines.push(String::new());
    }
  }
  trace!("Wrapped {:?} into {} lines at width {}", text, lines.len(), max_width);
  lines
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mono(s: &str) -> f32 { s.chars().count() as f32 * 10.0 }

  #[test]
  fn test_spec_example() {
    assert_eq!(wrap("Listen\nson", 1000.0, &mono, GapPolicy::After), ["Listen", "", "son", ""]);
    assert_eq!(wrap("Listen%0Ason", 1000.0, &mono, GapPolicy::After), ["Listen", "", "son", ""]);
    assert_eq!(wrap("Listen\r\nson", 1000.0, &mono, GapPolicy::Between), ["Listen", "", "son"]);
  }

  #[test]
  fn test_lines_fit_under_limit() {
    let text = "the quick brown fox jumps over the lazy dog and keeps running far away";
    let lines = wrap(text, 120.0, &mono, GapPolicy::Between);
    for line in &lines {
      assert!(mono(line) < 120.0, "{line:?} too wide");
    }
    assert_eq!(lines.join(" "), text);
  }

  #[test]
  fn test_exact_width_is_rejected() {
    // "ab cd" is exactly 50 wide, so it must not fit in 50.
    assert_eq!(wrap_paragraph("ab cd", 50.0, &mono), ["ab", "cd"]);
    assert_eq!(wrap_paragraph("ab cd", 50.1, &mono), ["ab cd"]);
  }

  #[test]
  fn test_long_word_gets_own_line() {
    let lines = wrap_paragraph("a supercalifragilistic b", 60.0, &mono);
    assert_eq!(lines, ["a", "supercalifragilistic", "b"]);
  }

  #[test]
  fn test_empty_inputs() {
    assert_eq!(wrap("", 100.0, &mono, GapPolicy::After), [""]);
    assert_eq!(wrap_paragraph("", 100.0, &mono), [""]);
    assert_eq!(wrap("a\n\nb", 100.0, &mono, GapPolicy::Between), ["a", "", "", "", "b"]);
  }

  #[test]
  fn test_paragraph_groups() {
    let text = "one two\nthree\nfour five six";
    let after = wrap(text, 1000.0, &mono, GapPolicy::After);
    let between = wrap(text, 1000.0, &mono, GapPolicy::Between);
    assert_eq!(after.iter().filter(|l| l.is_empty()).count(), 3);
    assert_eq!(between.iter().filter(|l| l.is_empty()).count(), 2);
    assert_eq!(after.last().map(String::as_str), Some(""));
    assert_eq!(between.last().map(String::as_str), Some("four five six"));
  }

  #[test]
  fn test_multibyte_words_are_untouched() {
    let lines = wrap_paragraph("Teď mě dobře poslouchej", 80.0, &mono);
    assert_eq!(lines, ["Teď mě", "dobře", "poslouchej"]);
  }
}
