//! Shareable locators and page metadata.
//!
//! After a render the resolved captions and background are written back into the
//! page locator so the exact composition can be reproduced from a link. Query
//! fields not managed here (`json`, `data`, style fields and so on) are kept.

use super::*;
use crate::{parameters::RenderParameters, resolver::Resolution};

/// Query keys rewritten from a resolution, in the order they are appended.
pub const SHARED_KEYS: [&str; 4] = ["top", "center", "bottom", "bg"];

/// Rewrites `base` so its query carries the resolved captions and background.
///
/// Empty values remove their key; every other query field is preserved in order.
///
/// ```
/// use advice::{parameters::RenderParameters, resolver::Resolution, share::share_link};
///
/// let mut parameters = RenderParameters::builtin();
/// parameters.top_text = "Listen".into();
/// parameters.bottom_text = "Never give up".into();
/// parameters.background = "./images/image3.webp".into();
/// let resolution = Resolution { parameters, fell_back: false };
///
/// let url = share_link("https://advice.test/?json=w.json&center=old", &resolution).unwrap();
/// assert_eq!(
///   url.as_str(),
///   "https://advice.test/?json=w.json&top=Listen&bottom=Never+give+up&bg=.%2Fimages%2Fimage3.webp"
/// );
/// ```
pub fn share_link(base: &str, resolution: &Resolution) -> Result<Url> {
  let mut url = Url::parse(base)?;
  let fields = resolution.share_fields();

  let kept: Vec<(String, String)> = url
    .query_pairs()
    .filter(|(key, _)| !SHARED_KEYS.iter().any(|shared| *shared == *key))
    .map(|(key, value)| (key.into_owned(), value.into_owned()))
    .collect();
  let shared: Vec<(&str, &str)> = SHARED_KEYS
    .iter()
    .filter_map(|key| fields.get(key).filter(|value| !value.is_empty()).map(|value| (*key, value.as_str())))
    .collect();

  if kept.is_empty() && shared.is_empty() {
    url.set_query(None);
  } else {
    url.query_pairs_mut().clear().extend_pairs(kept).extend_pairs(shared);
  }
  debug!("Share link: {}", url);
  Ok(url)
}

/// Title, description and preview image advertised for a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
  /// The top caption.
  pub title:       String,
  /// The bottom caption.
  pub description: String,
  /// The background locator.
  pub image:       String,
}

impl From<&RenderParameters> for PageMetadata {
  fn from(parameters: &RenderParameters) -> Self {
    Self {
      title:       parameters.top_text.clone(),
      description: parameters.bottom_text.clone(),
      image:       parameters.background.clone(),
    }
  }
}
