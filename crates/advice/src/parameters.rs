//! Parameter records and the fully resolved render configuration.
//!
//! Three kinds of input carry the same optional fields:
//!
//! - [`RequestOverrides`]: query-string values supplied by the caller,
//! - the settings record fetched from a store or JSON document,
//! - structured wisdom entries.
//!
//! All of them are normalised into a [`ParameterRecord`] so the resolver can walk
//! them field by field. The output of resolution is a [`RenderParameters`], where
//! every field holds a concrete value.

use std::{collections::BTreeMap, str::FromStr};

use serde_json::Value;

use super::*;

/// Sentinel that requests a uniformly random value instead of a literal.
pub const RANDOM_SENTINEL: &str = "random()";

/// Built-in top caption.
pub const DEFAULT_TOP_TEXT: &str = "Teď mě dobře poslouchej, mé dítě.";
/// Built-in bottom caption.
pub const DEFAULT_BOTTOM_TEXT: &str = "Nikdy se nevzdávej.";

/// Horizontal alignment of free-paragraph text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
  /// Left edge (`start` or `left`).
  Start,
  /// Horizontal center.
  #[default]
  Center,
  /// Right edge (`end` or `right`).
  End,
}

impl FromStr for TextAlign {
  type Err = AdviceError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "start" | "left" => Ok(Self::Start),
      "center" | "centre" => Ok(Self::Center),
      "end" | "right" => Ok(Self::End),
      other => Err(AdviceError::Config(format!("Unknown text alignment: {other}"))),
    }
  }
}

impl Display for TextAlign {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Start => write!(f, "start"),
      Self::Center => write!(f, "center"),
      Self::End => write!(f, "end"),
    }
  }
}

/// A partial set of parameters as found in one source.
///
/// Field names follow the camel-cased keys used in settings documents; the short
/// request names (`top`, `center`, `bottom`) are accepted as aliases. Numeric
/// fields accept numbers or numeric strings. Values of the wrong type are
/// dropped with a warning instead of rejecting the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRecord {
  /// Top caption.
  #[serde(alias = "top", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub top_text:          Option<String>,
  /// Center caption.
  #[serde(alias = "center", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub center_text:       Option<String>,
  /// Bottom caption.
  #[serde(alias = "bottom", default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub bottom_text:       Option<String>,
  /// Background locator.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub bg:                Option<String>,
  /// Top bubble font size, pre-scale.
  #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
  pub top_font_size:     Option<u32>,
  /// Center bubble font size, pre-scale.
  #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
  pub center_font_size:  Option<u32>,
  /// Bottom bubble font size, pre-scale.
  #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
  pub bottom_font_size:  Option<u32>,
  /// Top bubble weight/slant token.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub top_font_style:    Option<String>,
  /// Center bubble weight/slant token.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub center_font_style: Option<String>,
  /// Bottom bubble weight/slant token.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub bottom_font_style: Option<String>,
  /// Top bubble vertical offset, pre-scale.
  #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
  pub top_position:      Option<u32>,
  /// Center bubble vertical offset, pre-scale.
  #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
  pub center_position:   Option<u32>,
  /// Bottom bubble vertical offset, pre-scale; only used in position-anchored mode.
  #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
  pub bottom_position:   Option<u32>,
  /// Top bubble font family.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub top_font:          Option<String>,
  /// Center bubble font family.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub center_font:       Option<String>,
  /// Bottom bubble font family.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub bottom_font:       Option<String>,
  /// Free paragraph text.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub text:              Option<String>,
  /// Free paragraph font size, pre-scale.
  #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
  pub font_size:         Option<u32>,
  /// Free paragraph weight/slant token.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub font_style:        Option<String>,
  /// Free paragraph font family.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub font_family:       Option<String>,
  /// Free paragraph colour.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub text_color:        Option<String>,
  /// Free paragraph alignment token.
  #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
  pub text_align:        Option<String>,
}

/// Accepts strings, and stringifies numbers and booleans; anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where D: serde::Deserializer<'de> {
  Ok(match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(s)) => Some(s),
    Some(Value::Number(n)) => Some(n.to_string()),
    Some(Value::Bool(b)) => Some(b.to_string()),
    Some(Value::Null) | None => None,
    Some(other) => {
      warn!("Ignoring non-text parameter value: {}", other);
      None
    },
  })
}

/// Accepts non-negative integers or numeric strings; anything else is absent.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where D: serde::Deserializer<'de> {
  Ok(match Option::<Value>::deserialize(deserializer)? {
    Some(Value::Number(n)) => n
      .as_u64()
      .and_then(|n| u32::try_from(n).ok())
      .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u32)),
    Some(Value::String(s)) => parse_number(&s),
    _ => None,
  })
}

/// Parses the leading integer of a numeric string, so `"40"` and `"40px"` both
/// yield 40. Empty or non-numeric strings are absent.
pub fn parse_number(raw: &str) -> Option<u32> {
  let trimmed = raw.trim();
  let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
  match digits.parse::<u32>() {
    Ok(n) => Some(n),
    Err(_) => {
      if !trimmed.is_empty() {
        warn!("Ignoring non-numeric parameter value: {:?}", raw);
      }
      None
    },
  }
}

/// Query-string values supplied by the caller.
///
/// Empty values are treated as absent, so `?top=&bottom=Hi` only overrides `bottom`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOverrides {
  /// Raw decoded key/value pairs; a repeated key keeps its first value.
  values: BTreeMap<String, String>,
}

impl RequestOverrides {
  /// Creates an empty set of overrides.
  pub fn new() -> Self { Self::default() }

  /// Parses an `application/x-www-form-urlencoded` query, with or without a leading `?`.
  ///
  /// ```
  /// use advice::parameters::RequestOverrides;
  ///
  /// let overrides = RequestOverrides::from_query("?top=Listen%0Ason&bottom=random()");
  /// assert_eq!(overrides.get("top"), Some("Listen\nson"));
  /// ```
  pub fn from_query(query: &str) -> Self {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut values = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
      values.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    Self { values }
  }

  /// Sets a single value, replacing any previous one.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.values.insert(key.into(), value.into());
    self
  }

  /// Returns a value if it is present and non-empty.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.values.get(key).map(String::as_str).filter(|v| !v.is_empty())
  }

  /// Encodes the overrides back into a query string, keys in sorted order.
  pub fn to_query(&self) -> String {
    url::form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.values).finish()
  }

  /// Alternate corpus locator (`json`).
  pub fn corpus_locator(&self) -> Option<&str> { self.get("json") }

  /// Alternate settings-record locator (`data`).
  pub fn settings_locator(&self) -> Option<&str> { self.get("data") }

  /// Explicit wisdom entry index (`wisdom`).
  pub fn wisdom_index(&self) -> Option<usize> { self.get("wisdom").and_then(|v| v.trim().parse().ok()) }

  /// Normalises the overrides into a record, mapping request names onto record fields.
  pub fn to_record(&self) -> ParameterRecord {
    let text = |key: &str| self.get(key).map(String::from);
    let number = |key: &str| self.get(key).and_then(parse_number);
    ParameterRecord {
      top_text:          text("top"),
      center_text:       text("center"),
      bottom_text:       text("bottom"),
      bg:                text("bg"),
      top_font_size:     number("topFontSize"),
      center_font_size:  number("centerFontSize"),
      bottom_font_size:  number("bottomFontSize"),
      top_font_style:    text("topFontStyle"),
      center_font_style: text("centerFontStyle"),
      bottom_font_style: text("bottomFontStyle"),
      top_position:      number("topPosition"),
      center_position:   number("centerPosition"),
      bottom_position:   number("bottomPosition"),
      top_font:          text("topFont"),
      center_font:       text("centerFont"),
      bottom_font:       text("bottomFont"),
      text:              text("text"),
      font_size:         number("fontSize"),
      font_style:        text("fontStyle"),
      font_family:       text("fontFamily"),
      text_color:        text("textColor"),
      text_align:        text("textAlign"),
    }
  }
}

/// Style of one speech bubble, in pre-scale canvas units until scaled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleStyle {
  /// Font size in pixels.
  pub font_size:   u32,
  /// Weight/slant token.
  pub font_style:  String,
  /// Font family name.
  pub font_family: String,
  /// Vertical offset of the bubble's top edge.
  pub position:    u32,
}

/// Style of the free paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
  /// Font size in pixels.
  pub font_size:   u32,
  /// Weight/slant token.
  pub font_style:  String,
  /// Font family name.
  pub font_family: String,
  /// Text colour, a CSS colour name or hex string.
  pub text_color:  String,
  /// Horizontal alignment.
  pub text_align:  TextAlign,
}

/// The resolved, ready-to-draw configuration.
///
/// Produced once per render by [`crate::resolver::Resolver`] and never mutated
/// afterwards; scaling produces a new value (see [`crate::scale`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParameters {
  /// Top caption; empty means no top bubble.
  pub top_text:       String,
  /// Center caption; empty means no center bubble.
  pub center_text:    String,
  /// Bottom caption; empty means no bottom bubble.
  pub bottom_text:    String,
  /// Free paragraph; empty means none.
  pub free_paragraph: String,
  /// Top bubble style.
  pub top:            BubbleStyle,
  /// Center bubble style.
  pub center:         BubbleStyle,
  /// Bottom bubble style.
  pub bottom:         BubbleStyle,
  /// Free paragraph style.
  pub paragraph:      ParagraphStyle,
  /// Background locator.
  pub background:     String,
}

impl RenderParameters {
  /// The hard-coded literal defaults. The background is left empty; the resolver
  /// always replaces it with a sample from the configured set.
  pub fn builtin() -> Self {
    let top = BubbleStyle {
      font_size:   40,
      font_style:  "bold".to_string(),
      font_family: "Arial".to_string(),
      position:    50,
    };
    Self {
      top_text:       DEFAULT_TOP_TEXT.to_string(),
      center_text:    String::new(),
      bottom_text:    DEFAULT_BOTTOM_TEXT.to_string(),
      free_paragraph: String::new(),
      center:         BubbleStyle { position: 100, ..top.clone() },
      bottom:         BubbleStyle {
        font_size:   40,
        font_style:  "italic".to_string(),
        font_family: "Arial".to_string(),
        position:    150,
      },
      top,
      paragraph:      ParagraphStyle {
        font_size:   40,
        font_style:  "bold".to_string(),
        font_family: "Arial".to_string(),
        text_color:  "white".to_string(),
        text_align:  TextAlign::Center,
      },
      background:     String::new(),
    }
  }

  /// Converts back into a record, e.g. for save-back. The free paragraph is only
  /// included when `include_paragraph` is set.
  pub fn to_record(&self, include_paragraph: bool) -> ParameterRecord {
    let mut record = ParameterRecord {
      top_text:          Some(self.top_text.clone()),
      center_text:       Some(self.center_text.clone()),
      bottom_text:       Some(self.bottom_text.clone()),
      bg:                Some(self.background.clone()),
      top_font_size:     Some(self.top.font_size),
      center_font_size:  Some(self.center.font_size),
      bottom_font_size:  Some(self.bottom.font_size),
      top_font_style:    Some(self.top.font_style.clone()),
      center_font_style: Some(self.center.font_style.clone()),
      bottom_font_style: Some(self.bottom.font_style.clone()),
      top_position:      Some(self.top.position),
      center_position:   Some(self.center.position),
      bottom_position:   Some(self.bottom.position),
      top_font:          Some(self.top.font_family.clone()),
      center_font:       Some(self.center.font_family.clone()),
      bottom_font:       Some(self.bottom.font_family.clone()),
      ..ParameterRecord::default()
    };
    if include_paragraph {
      record.text = Some(self.free_paragraph.clone());
      record.font_size = Some(self.paragraph.font_size);
      record.font_style = Some(self.paragraph.font_style.clone());
      record.font_family = Some(self.paragraph.font_family.clone());
      record.text_color = Some(self.paragraph.text_color.clone());
      record.text_align = Some(self.paragraph.text_align.to_string());
    }
    record
  }
}
