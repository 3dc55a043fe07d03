//! Speech-bubble captions over background images.
//!
//! `advice` composes a picture from a background bitmap and up to three speech
//! bubbles (top, center, bottom) plus an optional free paragraph. Every visible
//! property comes from layered sources:
//!
//! - per-request overrides (a query string),
//! - a settings record fetched from a URL or file,
//! - a randomly (or explicitly) chosen entry of a wisdom corpus,
//! - built-in literal defaults.
//!
//! # Getting Started
//!
//! ```no_run
//! use advice::{prelude::*, surface::FontBook};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::load_or_default(Config::default_path())?;
//!   let fonts = FontBook::load(&config.fonts);
//!   let advice = Advice::new(config);
//!
//!   let overrides = RequestOverrides::from_query("top=Listen%0Ason&bottom=random()");
//!   let rendered = advice.render(&overrides, (1280, 720), &fonts).await?;
//!   rendered.save("advice.png")?;
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`parameters`], [`wisdom`]: the parameter model and the wisdom corpus
//! - [`resolver`], [`source`]: precedence merging and document retrieval
//! - [`layout`], [`geometry`], [`scale`]: wrapping, placement and responsive scaling
//! - [`scene`], [`surface`]: draw operations and the raster surface executing them
//! - [`share`]: shareable links and page metadata

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fmt::Display,
  path::{Path, PathBuf},
};

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};
use url::Url;
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod parameters;
pub mod resolver;
pub mod scale;
pub mod scene;
pub mod share;
pub mod source;
pub mod surface;
pub mod wisdom;

use crate::{
  config::Config,
  error::*,
  parameters::{RenderParameters, RequestOverrides, RANDOM_SENTINEL},
  resolver::{Resolution, Resolver},
  scale::{Canvas, ScaledParameters},
  scene::{ComposeOptions, FontProvider, Scene},
  source::{DocumentSource, LayeredSource, Locator, SettingsSource, SettingsStore},
  surface::{load_background, DrawingSurface, FontBook, RasterSurface},
};

/// Common types for ergonomic imports.
///
/// ```no_run
/// use advice::prelude::*;
///
/// async fn example() -> Result<(), AdviceError> {
///   let advice = Advice::new(Config::default());
///   let resolution = advice.resolve(&RequestOverrides::new()).await;
///   println!("{}", resolution.parameters.top_text);
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    config::Config,
    error::AdviceError,
    parameters::{RenderParameters, RequestOverrides},
    resolver::Resolution,
    scene::Scene,
    source::SettingsSource,
    surface::DrawingSurface,
    Advice,
  };
}

/// Everything needed to compose a scene: resolved parameters, the background and
/// the canvas they were fitted to.
#[derive(Debug, Clone)]
pub struct Prepared {
  /// The resolution the scene is built from.
  pub resolution: Resolution,
  /// Decoded background, or `None` if it could not be loaded.
  pub background: Option<DynamicImage>,
  /// Canvas fitted to the viewport.
  pub canvas:     Canvas,
  /// Parameters scaled to the canvas.
  pub scaled:     ScaledParameters,
}

/// Output of a full render.
#[derive(Debug, Clone)]
pub struct Rendered {
  /// Final pixels.
  pub image:      RgbaImage,
  /// Parameters that were rendered.
  pub resolution: Resolution,
  /// Operations that produced the image.
  pub scene:      Scene,
}

impl Rendered {
  /// Writes the image; the format follows the file extension.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    self.image.save(path.as_ref())?;
    info!("Wrote {}", path.as_ref().display());
    Ok(())
  }
}

/// Runs the resolve, load, scale, compose and draw pipeline with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Advice {
  /// Configuration every step reads from.
  pub config: Config,
}

impl Advice {
  /// Creates a pipeline over `config`.
  pub fn new(config: Config) -> Self { Self { config } }

  /// Builds the document source for a request: the `json` corpus (or the configured
  /// one) layered with the `data` settings record, if given.
  pub fn source(&self, overrides: &RequestOverrides) -> LayeredSource {
    let corpus = overrides.corpus_locator().unwrap_or(&self.config.corpus);
    let settings = overrides.settings_locator().map(|data| {
      let source = DocumentSource::new(Locator::parse(data));
      match &self.config.access_key {
        Some(key) => source.with_header(&self.config.access_key_header, key),
        None => source,
      }
    });
    LayeredSource { corpus: DocumentSource::new(Locator::parse(corpus)), settings }
  }

  /// Resolves the request against the sources from [`Advice::source`].
  pub async fn resolve(&self, overrides: &RequestOverrides) -> Resolution {
    self.resolve_from(&self.source(overrides), overrides).await
  }

  /// Resolves the request against `source`. A failed fetch yields the built-in
  /// fallback and is logged; it never surfaces as an error.
  pub async fn resolve_from(&self, source: &dyn SettingsSource, overrides: &RequestOverrides) -> Resolution {
    let fetched = source.fetch().await;
    let resolver = Resolver::new(&self.config.backgrounds);
    let mut rng = rand::thread_rng();
    match fetched {
      Ok(document) => resolver.resolve(overrides, &document.record, &document.corpus, &mut rng),
      Err(e) => {
        error!("Failed to fetch settings, using defaults: {}", e);
        resolver.fallback(&mut rng)
      },
    }
  }

  /// Resolves parameters and loads the background, then fits both to `viewport`.
  ///
  /// An explicit `bg` override is fetched while the settings are still being
  /// resolved. If the background cannot be loaded the canvas takes the viewport
  /// size and the surface paints the fallback colour.
  pub async fn prepare(&self, overrides: &RequestOverrides, viewport: (u32, u32)) -> Result<Prepared> {
    let explicit = overrides.get("bg").filter(|bg| *bg != RANDOM_SENTINEL);
    let prefetch = async {
      match explicit {
        Some(bg) => Some(load_background(bg).await),
        None => None,
      }
    };
    let (resolution, prefetched) = tokio::join!(self.resolve(overrides), prefetch);

    let locator = resolution.parameters.background.clone();
    let loaded = match prefetched {
      Some(result) if explicit == Some(locator.as_str()) => result,
      _ if locator.is_empty() => Err(AdviceError::Config("No background to load".to_string())),
      _ => load_background(&locator).await,
    };
    let background = match loaded {
      Ok(image) => Some(image),
      Err(e) => {
        error!("Failed to load background {:?}: {}", locator, e);
        None
      },
    };

    let image_size = background.as_ref().map_or(viewport, |image| (image.width(), image.height()));
    let (canvas, factor) = Canvas::fit(viewport, image_size)?;
    let scaled = ScaledParameters::new(&resolution.parameters, factor);
    Ok(Prepared { resolution, background, canvas, scaled })
  }

  /// Composes the draw operations for prepared parameters.
  pub fn compose(&self, prepared: &Prepared, fonts: &dyn FontProvider) -> Result<Scene> {
    scene::compose(&prepared.scaled, prepared.canvas, fonts, ComposeOptions::from(&self.config))
  }

  /// Runs the full pipeline and rasterizes the result.
  pub async fn render(&self, overrides: &RequestOverrides, viewport: (u32, u32), fonts: &FontBook) -> Result<Rendered> {
    let prepared = self.prepare(overrides, viewport).await?;
    let scene = self.compose(&prepared, fonts)?;
    let Prepared { resolution, background, canvas, .. } = prepared;

    let mut surface = RasterSurface::new(canvas, background, fonts, &self.config.fallback_color);
    surface.render(&scene)?;
    info!("Rendered {} operations onto {}x{}", scene.ops.len(), canvas.width, canvas.height);
    Ok(Rendered { image: surface.into_image(), resolution, scene })
  }

  /// Shareable link for a resolution, keeping the unmanaged fields of `query`.
  pub fn share_link(&self, query: &str, resolution: &Resolution) -> Result<Url> {
    let mut base = Url::parse(&self.config.share_base)?;
    let query = query.strip_prefix('?').unwrap_or(query);
    base.set_query(Some(query).filter(|q| !q.is_empty()));
    share::share_link(base.as_str(), resolution)
  }

  /// Saves the resolved style and captions to the settings store. The free
  /// paragraph is not saved.
  pub async fn save(&self, parameters: &RenderParameters) -> Result<Option<String>> {
    let store = SettingsStore::from_config(&self.config).map_err(save_failed)?;
    let id = store.save(&parameters.to_record(false)).await.map_err(save_failed)?;
    match &id {
      Some(id) => info!("Saved settings as {}", id),
      None => warn!("Settings store accepted the record but returned no id"),
    }
    Ok(id)
  }
}

/// Logs a save-back failure before it is propagated.
fn save_failed(e: AdviceError) -> AdviceError {
  error!("Failed to save settings: {}", e);
  e
}
