//! Parameter resolution.
//!
//! Every field of [`RenderParameters`] is resolved independently, taking the
//! first value found in this order:
//!
//! 1. the caller's [`RequestOverrides`],
//! 2. the fetched settings record,
//! 3. the selected [`WisdomEntry`] (captions, plus background and style for structured entries),
//! 4. the built-in literal defaults.
//!
//! A caption or background whose winning value is [`RANDOM_SENTINEL`] is replaced
//! by a sample: captions from the wisdom corpus, backgrounds from the configured
//! set. An absent or empty background is sampled too.
//!
//! A wisdom entry is only selected when something asks for it: a caption set to
//! `random()`, an explicit `wisdom` index, or no caption supplied by either the
//! overrides or the settings record.
//!
//! # Examples
//!
//! ```
//! use advice::{
//!   parameters::{ParameterRecord, RequestOverrides},
//!   resolver::Resolver,
//!   wisdom::{Corpus, WisdomEntry},
//! };
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let backgrounds = vec!["./images/image.png".to_string()];
//! let corpus = Corpus::new(vec![WisdomEntry::PlainBottom("Never give up.".into())]);
//! let overrides = RequestOverrides::from_query("top=Listen&bottom=random()");
//!
//! let resolution = Resolver::new(&backgrounds).resolve(
//!   &overrides,
//!   &ParameterRecord::default(),
//!   &corpus,
//!   &mut StdRng::seed_from_u64(0),
//! );
//! assert_eq!(resolution.parameters.top_text, "Listen");
//! assert_eq!(resolution.parameters.bottom_text, "Never give up.");
//! ```

use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};

use super::*;
use crate::{
  parameters::{
    BubbleStyle, ParagraphStyle, ParameterRecord, RenderParameters, RequestOverrides, TextAlign,
    RANDOM_SENTINEL,
  },
  wisdom::{Caption, Corpus, WisdomEntry},
};

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  /// Fully populated parameters.
  pub parameters: RenderParameters,
  /// Whether the built-in fallback was used because the settings could not be fetched.
  pub fell_back:  bool,
}

impl Resolution {
  /// Values to encode back into a shareable locator: `top`, `center`, `bottom`
  /// and `bg`. Empty captions map to empty strings, which the share module
  /// removes from the locator.
  pub fn share_fields(&self) -> BTreeMap<&'static str, String> {
    let p = &self.parameters;
    BTreeMap::from([
      ("top", p.top_text.clone()),
      ("center", p.center_text.clone()),
      ("bottom", p.bottom_text.clone()),
      ("bg", p.background.clone()),
    ])
  }
}

/// Merges parameter sources into [`RenderParameters`].
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
  /// Background set sampled for `bg=random()` or an absent background.
  backgrounds: &'a [String],
  /// Lowest-precedence literals.
  defaults:    RenderParameters,
}

impl<'a> Resolver<'a> {
  /// Creates a resolver over a background set with the built-in defaults.
  pub fn new(backgrounds: &'a [String]) -> Self {
    Self { backgrounds, defaults: RenderParameters::builtin() }
  }

  /// Replaces the built-in literal defaults.
  pub fn with_defaults(mut self, defaults: RenderParameters) -> Self {
    self.defaults = defaults;
    self
  }

  /// Resolves every field from the given sources.
  pub fn resolve<R: Rng + ?Sized>(
    &self,
    overrides: &RequestOverrides,
    settings: &ParameterRecord,
    corpus: &Corpus,
    rng: &mut R,
  ) -> Resolution {
    let request = overrides.to_record();

    let top = request.top_text.as_ref().or(settings.top_text.as_ref());
    let center = request.center_text.as_ref().or(settings.center_text.as_ref());
    let bottom = request.bottom_text.as_ref().or(settings.bottom_text.as_ref());

    let any_caption = top.is_some() || center.is_some() || bottom.is_some();
    let any_sentinel = [top, center, bottom].iter().any(|v| v.is_some_and(|v| v == RANDOM_SENTINEL));
    let index = overrides.wisdom_index();

    let entry = if !any_caption || any_sentinel || index.is_some() {
      let entry = corpus.select(index, rng);
      if entry.is_none() {
        warn!("Wisdom corpus is empty, captions fall back to defaults");
      }
      entry
    } else {
      None
    };
    debug!("Selected wisdom entry: {:?}", entry);

    let caption = entry.map(WisdomEntry::caption).unwrap_or_default();
    let empty = ParameterRecord::default();
    let carried = entry.and_then(WisdomEntry::overrides).unwrap_or(&empty);
    let sources = [&request, settings, carried];

    let Caption { top: entry_top, center: entry_center, bottom: entry_bottom } = caption;
    let d = &self.defaults;

    let top_style = BubbleStyle {
      font_size:   pick(&sources, |r| r.top_font_size).unwrap_or(d.top.font_size),
      font_style:  pick(&sources, |r| r.top_font_style.clone()).unwrap_or_else(|| d.top.font_style.clone()),
      font_family: pick(&sources, |r| r.top_font.clone()).unwrap_or_else(|| d.top.font_family.clone()),
      position:    pick(&sources, |r| r.top_position).unwrap_or(d.top.position),
    };
    // The center bubble inherits the top style unless a source styles it explicitly.
    let center_style = BubbleStyle {
      font_size:   pick(&sources, |r| r.center_font_size).unwrap_or(top_style.font_size),
      font_style:  pick(&sources, |r| r.center_font_style.clone())
        .unwrap_or_else(|| top_style.font_style.clone()),
      font_family: pick(&sources, |r| r.center_font.clone())
        .unwrap_or_else(|| top_style.font_family.clone()),
      position:    pick(&sources, |r| r.center_position).unwrap_or(d.center.position),
    };
    let bottom_style = BubbleStyle {
      font_size:   pick(&sources, |r| r.bottom_font_size).unwrap_or(d.bottom.font_size),
      font_style:  pick(&sources, |r| r.bottom_font_style.clone())
        .unwrap_or_else(|| d.bottom.font_style.clone()),
      font_family: pick(&sources, |r| r.bottom_font.clone())
        .unwrap_or_else(|| d.bottom.font_family.clone()),
      position:    pick(&sources, |r| r.bottom_position).unwrap_or(d.bottom.position),
    };

    let text_align = match pick(&sources, |r| r.text_align.clone()) {
      Some(raw) => raw.parse::<TextAlign>().unwrap_or_else(|e| {
        warn!("{}, using {}", e, d.paragraph.text_align);
        d.paragraph.text_align
      }),
      None => d.paragraph.text_align,
    };
    let paragraph = ParagraphStyle {
      font_size: pick(&sources, |r| r.font_size).unwrap_or(d.paragraph.font_size),
      font_style: pick(&sources, |r| r.font_style.clone())
        .unwrap_or_else(|| d.paragraph.font_style.clone()),
      font_family: pick(&sources, |r| r.font_family.clone())
        .unwrap_or_else(|| d.paragraph.font_family.clone()),
      text_color: pick(&sources, |r| r.text_color.clone())
        .unwrap_or_else(|| d.paragraph.text_color.clone()),
      text_align,
    };

    let background = match pick(&sources, |r| r.bg.clone().filter(|bg| !bg.is_empty())) {
      Some(bg) if bg != RANDOM_SENTINEL => bg,
      _ => self.sample_background(rng),
    };

    let parameters = RenderParameters {
      top_text: caption_slot(top, entry_top, &d.top_text),
      center_text: caption_slot(center, entry_center, &d.center_text),
      bottom_text: caption_slot(bottom, entry_bottom, &d.bottom_text),
      free_paragraph: pick(&sources, |r| r.text.clone()).unwrap_or_else(|| d.free_paragraph.clone()),
      top: top_style,
      center: center_style,
      bottom: bottom_style,
      paragraph,
      background,
    };
    trace!("Resolved parameters: {:?}", parameters);
    Resolution { parameters, fell_back: false }
  }

  /// The full built-in defaults with a sampled background, used when settings
  /// could not be fetched.
  pub fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> Resolution {
    let mut parameters = self.defaults.clone();
    parameters.background = self.sample_background(rng);
    Resolution { parameters, fell_back: true }
  }

  /// Picks one background uniformly from the configured set.
  pub fn sample_background<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
    match self.backgrounds.choose(rng) {
      Some(bg) => bg.clone(),
      None => {
        warn!("Background set is empty, no background will be drawn");
        String::new()
      },
    }
  }
}

/// First non-empty value across the sources, in precedence order.
fn pick<T>(sources: &[&ParameterRecord; 3], field: impl Fn(&ParameterRecord) -> Option<T>) -> Option<T> {
  sources.iter().find_map(|record| field(*record))
}

/// Resolves one caption slot. `explicit` comes from the overrides or settings
/// record; the sentinel and absence both defer to the wisdom entry, and an
/// empty entry value defers to the default.
fn caption_slot(explicit: Option<&String>, from_entry: String, default: &str) -> String {
  match explicit {
    Some(value) if value != RANDOM_SENTINEL => value.clone(),
    _ if !from_entry.is_empty() => from_entry,
    _ => default.to_string(),
  }
}
