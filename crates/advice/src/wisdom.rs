//! Wisdom corpus entries and caption sampling.
//!
//! A corpus document looks like
//!
//! ```json
//! { "wisdoms": [
//!     "Never give up.",
//!     ["Listen, son.", "Never give up."],
//!     ["Top", "Center", "Bottom"],
//!     { "topText": "Top", "bottomText": "Bottom", "bg": "./images/image3.webp" }
//! ] }
//! ```
//!
//! Each item decodes into one [`WisdomEntry`] variant. Anything else (numbers,
//! arrays of the wrong length, nested junk) decodes as an empty structured entry
//! rather than failing the whole document.

use rand::{seq::SliceRandom, Rng};
use serde_json::Value;

use super::*;
use crate::parameters::ParameterRecord;

/// One corpus item.
#[derive(Debug, Clone, PartialEq)]
pub enum WisdomEntry {
  /// A bare string; fills only the bottom caption.
  PlainBottom(String),
  /// A two-element array: top and bottom captions.
  TopBottom(String, String),
  /// A three-element array: top, center and bottom captions.
  TopCenterBottom(String, String, String),
  /// An object carrying any subset of parameter fields, including background and style.
  Structured(Box<ParameterRecord>),
}

/// Top/center/bottom caption triple distributed from a [`WisdomEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caption {
  /// Top bubble text.
  pub top:    String,
  /// Center bubble text.
  pub center: String,
  /// Bottom bubble text.
  pub bottom: String,
}

impl WisdomEntry {
  /// Decodes a single JSON corpus item.
  pub fn from_value(value: &Value) -> Self {
    match value {
      Value::String(text) => Self::PlainBottom(text.clone()),
      Value::Array(items) if items.len() == 2 => Self::TopBottom(text_of(&items[0]), text_of(&items[1])),
      Value::Array(items) if items.len() == 3 =>
        Self::TopCenterBottom(text_of(&items[0]), text_of(&items[1]), text_of(&items[2])),
      Value::Object(_) => match serde_json::from_value::<ParameterRecord>(value.clone()) {
        Ok(record) => Self::Structured(Box::new(record)),
        Err(e) => {
          warn!("Malformed structured wisdom entry, using empty captions: {}", e);
          Self::Structured(Box::default())
        },
      },
      other => {
        warn!("Malformed wisdom entry, using empty captions: {}", other);
        Self::Structured(Box::default())
      },
    }
  }

  /// Distributes this entry across the three caption slots.
  pub fn caption(&self) -> Caption {
    match self {
      Self::PlainBottom(bottom) => Caption { bottom: bottom.clone(), ..Caption::default() },
      Self::TopBottom(top, bottom) =>
        Caption { top: top.clone(), center: String::new(), bottom: bottom.clone() },
      Self::TopCenterBottom(top, center, bottom) =>
        Caption { top: top.clone(), center: center.clone(), bottom: bottom.clone() },
      Self::Structured(record) => Caption {
        top:    record.top_text.clone().unwrap_or_default(),
        center: record.center_text.clone().unwrap_or_default(),
        bottom: record.bottom_text.clone().unwrap_or_default(),
      },
    }
  }

  /// Background and style overrides carried by the entry, if any.
  pub fn overrides(&self) -> Option<&ParameterRecord> {
    match self {
      Self::Structured(record) => Some(record),
      _ => None,
    }
  }
}

impl<'de> Deserialize<'de> for WisdomEntry {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
  where D: serde::Deserializer<'de> {
    let value = Value::deserialize(deserializer)?;
    Ok(Self::from_value(&value))
  }
}

/// Array items are usually strings, but numbers show up in hand-edited corpora.
fn text_of(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

/// A collection of wisdom entries sampled for randomized captions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Corpus {
  /// Entries in document order.
  #[serde(default)]
  pub wisdoms: Vec<WisdomEntry>,
}

impl Corpus {
  /// Wraps a list of entries.
  pub fn new(wisdoms: Vec<WisdomEntry>) -> Self { Self { wisdoms } }

  /// Number of entries.
  pub fn len(&self) -> usize { self.wisdoms.len() }

  /// Whether the corpus has no entries.
  pub fn is_empty(&self) -> bool { self.wisdoms.is_empty() }

  /// Picks one entry uniformly at random.
  pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&WisdomEntry> {
    self.wisdoms.choose(rng)
  }

  /// Picks the entry at `index` when given and in range, otherwise samples uniformly.
  pub fn select<R: Rng + ?Sized>(&self, index: Option<usize>, rng: &mut R) -> Option<&WisdomEntry> {
    match index {
      Some(i) if i < self.wisdoms.len() => {
        trace!("Selected wisdom entry {} explicitly", i);
        self.wisdoms.get(i)
      },
      Some(i) => {
        warn!("Wisdom index {} out of range for {} entries, sampling instead", i, self.len());
        self.sample(rng)
      },
      None => self.sample(rng),
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;

  fn corpus() -> Corpus {
    serde_json::from_str(
      r#"{ "wisdoms": [
        "Never give up.",
        ["A", "B"],
        ["A", "B", "C"],
        { "topText": "T", "bg": "./images/image2.webp", "topFontSize": "32" },
        42,
        ["only one"]
      ] }"#,
    )
    .unwrap()
  }

  #[traced_test]
  #[test]
  fn test_variants_decode() {
    let corpus = corpus();
    assert_eq!(corpus.len(), 6);
    assert_eq!(corpus.wisdoms[0], WisdomEntry::PlainBottom("Never give up.".into()));
    assert_eq!(corpus.wisdoms[1], WisdomEntry::TopBottom("A".into(), "B".into()));
    assert_eq!(corpus.wisdoms[2], WisdomEntry::TopCenterBottom("A".into(), "B".into(), "C".into()));
    assert!(matches!(corpus.wisdoms[3], WisdomEntry::Structured(_)));
  }

  #[traced_test]
  #[test]
  fn test_malformed_entries_are_empty() {
    let corpus = corpus();
    assert_eq!(corpus.wisdoms[4].caption(), Caption::default());
    assert_eq!(corpus.wisdoms[5].caption(), Caption::default());
    assert!(logs_contain("Malformed wisdom entry"));
  }

  #[test]
  fn test_caption_distribution() {
    let corpus = corpus();
    assert_eq!(corpus.wisdoms[0].caption(), Caption {
      top:    String::new(),
      center: String::new(),
      bottom: "Never give up.".into(),
    });
    assert_eq!(corpus.wisdoms[1].caption(), Caption {
      top:    "A".into(),
      center: String::new(),
      bottom: "B".into(),
    });
    assert_eq!(corpus.wisdoms[3].caption().top, "T");

    let overrides = corpus.wisdoms[3].overrides().unwrap();
    assert_eq!(overrides.bg.as_deref(), Some("./images/image2.webp"));
    assert_eq!(overrides.top_font_size, Some(32));
  }

  #[test]
  fn test_select_explicit_and_out_of_range() {
    let corpus = corpus();
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(corpus.select(Some(1), &mut rng), Some(&corpus.wisdoms[1]));
    assert!(corpus.select(Some(99), &mut rng).is_some());
    assert!(Corpus::default().sample(&mut rng).is_none());
  }

  #[test]
  fn test_sample_visits_many_entries() {
    let corpus = corpus();
    let mut rng = StdRng::seed_from_u64(1);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
      let entry = corpus.sample(&mut rng).unwrap();
      seen.insert(format!("{entry:?}"));
    }
    assert!(seen.len() > 1);
  }
}
