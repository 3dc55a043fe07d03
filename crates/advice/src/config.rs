//! Persistent configuration for the rendering pipeline.
//!
//! The configuration is a TOML document. Every key has a default, so an empty
//! file (or no file at all) yields a working setup that reads the corpus from
//! `./js/wisdoms16k.json` and picks backgrounds from `./images/`.
//!
//! ```toml
//! corpus = "./js/wisdoms16k.json"
//! bottom_anchor = "canvas"
//! padding = 20
//!
//! [[fonts]]
//! family = "Arial"
//! style = "bold"
//! path = "/usr/share/fonts/truetype/msttcorefonts/Arial_Bold.ttf"
//! ```

use super::*;

/// Where the bottom bubble is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BottomAnchor {
  /// Computed backward from the canvas bottom so the bubble ends `padding` above the edge.
  #[default]
  Canvas,
  /// Drawn top-down from the scaled `bottomPosition`, like the top and center bubbles.
  Position,
}

/// One font face available to the raster surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFace {
  /// Family name as used in parameters, e.g. `Arial`.
  pub family: String,
  /// Weight/slant token, e.g. `bold`, `italic` or `normal`.
  #[serde(default = "default_font_style")]
  pub style:  String,
  /// Path to a TrueType/OpenType file.
  pub path:   PathBuf,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Default wisdom corpus locator (URL or path); the `json` request field overrides it.
  pub corpus:            String,
  /// Fixed background set sampled for `bg=random()` or an absent background.
  pub backgrounds:       Vec<String>,
  /// Remote settings store used by save-back.
  pub settings_store:    Option<String>,
  /// Fixed credential sent with settings-store requests.
  pub access_key:        Option<String>,
  /// Header name carrying [`Config::access_key`].
  pub access_key_header: String,
  /// Base locator that shareable links are built from.
  pub share_base:        String,
  /// Bottom bubble anchoring mode.
  pub bottom_anchor:     BottomAnchor,
  /// Bubble padding in canvas pixels.
  pub padding:           u32,
  /// Colour painted when the background bitmap cannot be loaded.
  pub fallback_color:    String,
  /// Viewport used when the caller does not provide one.
  pub viewport:          (u32, u32),
  /// Registered font faces.
  pub fonts:             Vec<FontFace>,
}

impl Default for Config {
  fn default() -> Self {
    let mut backgrounds = vec!["./images/image.png".to_string()];
    backgrounds.extend((1..=10).map(|i| format!("./images/image{i}.webp")));
    Self {
      corpus: "./js/wisdoms16k.json".to_string(),
      backgrounds,
      settings_store: None,
      access_key: None,
      access_key_header: "X-Access-Key".to_string(),
      share_base: "http://localhost/".to_string(),
      bottom_anchor: BottomAnchor::default(),
      padding: 20,
      fallback_color: "black".to_string(),
      viewport: (1280, 720),
      fonts: Vec::new(),
    }
  }
}

impl Config {
  /// Returns the default path for the configuration file.
  ///
  /// - On Unix: `~/.config/advice/config.toml`
  /// - On macOS: `~/Library/Application Support/advice/config.toml`
  /// - On Windows: `%APPDATA%\advice\config.toml`
  /// - Fallback: `./advice/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("advice").join("config.toml")
  }

  /// Reads a configuration file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config: Config = toml::from_str(&content)?;
    debug!("Loaded config from {}", path.as_ref().display());
    Ok(config)
  }

  /// Reads a configuration file, using defaults if it does not exist.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
    if path.as_ref().exists() {
      Self::load(path)
    } else {
      debug!("No config at {}, using defaults", path.as_ref().display());
      Ok(Self::default())
    }
  }

  /// Writes this configuration as TOML, creating parent directories.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Sets the default corpus locator.
  pub fn with_corpus(mut self, corpus: impl Into<String>) -> Self {
    self.corpus = corpus.into();
    self
  }

  /// Replaces the background set.
  pub fn with_backgrounds(mut self, backgrounds: Vec<String>) -> Self {
    self.backgrounds = backgrounds;
    self
  }

  /// Sets the settings store used by save-back.
  pub fn with_settings_store(mut self, url: impl Into<String>) -> Self {
    self.settings_store = Some(url.into());
    self
  }

  /// Sets the settings-store credential.
  pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
    self.access_key = Some(key.into());
    self
  }

  /// Sets the base locator for share links.
  pub fn with_share_base(mut self, base: impl Into<String>) -> Self {
    self.share_base = base.into();
    self
  }

  /// Sets the bottom bubble anchoring mode.
  pub fn with_bottom_anchor(mut self, anchor: BottomAnchor) -> Self {
    self.bottom_anchor = anchor;
    self
  }

  /// Registers a font face.
  pub fn with_font(mut self, face: FontFace) -> Self {
    self.fonts.push(face);
    self
  }
}

/// Style assumed when a font entry names none.
fn default_font_style() -> String { "normal".to_string() }
