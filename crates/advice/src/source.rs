//! Retrieval of settings records and wisdom corpora, and settings save-back.
//!
//! A locator is either an `http(s)` URL, fetched with `reqwest`, or anything
//! else, read from the local filesystem. The same locator handling serves the
//! background bitmap loader in [`crate::surface`].
//!
//! # Examples
//!
//! ```no_run
//! use advice::source::{DocumentSource, Locator, SettingsSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = DocumentSource::new(Locator::parse("./js/wisdoms16k.json"));
//! let document = source.fetch().await?;
//! println!("{} wisdoms", document.corpus.len());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::*;
use crate::{parameters::ParameterRecord, wisdom::Corpus};

/// Where a document or bitmap lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
  /// Fetched over HTTP(S).
  Remote(Url),
  /// Read from disk.
  Local(PathBuf),
}

impl Locator {
  /// Classifies a raw locator string. `file://` URLs become local paths.
  pub fn parse(raw: &str) -> Self {
    match Url::parse(raw) {
      Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
      Ok(url) if url.scheme() == "file" =>
        url.to_file_path().map(Self::Local).unwrap_or_else(|_| Self::Local(PathBuf::from(raw))),
      _ => Self::Local(PathBuf::from(raw)),
    }
  }

  /// Reads the full contents behind this locator.
  pub async fn fetch_bytes(&self, headers: &HashMap<String, String>) -> Result<Vec<u8>> {
    match self {
      Self::Remote(url) => {
        debug!("Fetching {}", url);
        let client = reqwest::Client::new();
        let mut request = client.get(url.clone());
        for (key, value) in headers {
          request = request.header(key, value);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
          return Err(AdviceError::ApiError(format!("{status} from {url}")));
        }
        Ok(response.bytes().await?.to_vec())
      },
      Self::Local(path) => {
        debug!("Reading {}", path.display());
        Ok(tokio::fs::read(path).await?)
      },
    }
  }
}

impl Display for Locator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Remote(url) => write!(f, "{url}"),
      Self::Local(path) => write!(f, "{}", path.display()),
    }
  }
}

/// A parsed settings document: the record fields plus any wisdom corpus it carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
  /// Parameter fields found on the document.
  pub record: ParameterRecord,
  /// Wisdom entries found on the document.
  pub corpus: Corpus,
}

impl SettingsDocument {
  /// Parses a JSON document. The record may sit at the root or one level down
  /// under `record`; `wisdoms` is looked up in both places.
  pub fn from_slice(data: &[u8]) -> Result<Self> {
    let root: Value = serde_json::from_slice(data)?;
    if !root.is_object() {
      return Err(AdviceError::ApiError("Settings document is not a JSON object".to_string()));
    }
    let body = root.get("record").filter(|r| r.is_object()).unwrap_or(&root);
    let record: ParameterRecord = serde_json::from_value(body.clone())?;

    let wisdoms = body.get("wisdoms").or_else(|| root.get("wisdoms"));
    let corpus = match wisdoms {
      Some(w) => Corpus::new(serde_json::from_value(w.clone())?),
      None => Corpus::default(),
    };
    trace!("Parsed settings document with {} wisdoms: {:?}", corpus.len(), record);
    Ok(Self { record, corpus })
  }
}

/// Anything that can asynchronously produce a settings document.
#[async_trait]
pub trait SettingsSource: Send + Sync {
  /// Fetches and parses the document.
  async fn fetch(&self) -> Result<SettingsDocument>;
}

/// A settings or corpus document behind a [`Locator`].
#[derive(Debug, Clone)]
pub struct DocumentSource {
  /// Where the document lives.
  pub locator: Locator,
  /// Extra request headers, e.g. the access credential.
  pub headers: HashMap<String, String>,
}

impl DocumentSource {
  /// Creates a source with no extra headers.
  pub fn new(locator: Locator) -> Self { Self { locator, headers: HashMap::new() } }

  /// Adds a request header.
  pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.insert(key.into(), value.into());
    self
  }
}

#[async_trait]
impl SettingsSource for DocumentSource {
  async fn fetch(&self) -> Result<SettingsDocument> {
    let data = self.locator.fetch_bytes(&self.headers).await?;
    SettingsDocument::from_slice(&data)
  }
}

/// Combines a corpus document with a separate settings record.
///
/// Both are fetched concurrently; failure of either fails the whole fetch. The
/// record fields of the settings document take priority over any record fields
/// on the corpus document, and the corpus document supplies the wisdoms unless
/// it has none.
#[derive(Debug, Clone)]
pub struct LayeredSource {
  /// Wisdom corpus document.
  pub corpus:   DocumentSource,
  /// Optional settings record document.
  pub settings: Option<DocumentSource>,
}

#[async_trait]
impl SettingsSource for LayeredSource {
  async fn fetch(&self) -> Result<SettingsDocument> {
    let Some(settings) = &self.settings else {
      return self.corpus.fetch().await;
    };
    let (corpus, settings) = tokio::try_join!(self.corpus.fetch(), settings.fetch())?;
    let corpus = if corpus.corpus.is_empty() { settings.corpus } else { corpus.corpus };
    Ok(SettingsDocument { record: settings.record, corpus })
  }
}

/// Remote settings store accepting resolved parameters for later retrieval via `data`.
#[derive(Debug, Clone)]
pub struct SettingsStore {
  /// Endpoint receiving the POST.
  pub url:         Url,
  /// Header carrying the access credential.
  pub auth_header: String,
  /// Access credential.
  pub access_key:  Option<String>,
}

impl SettingsStore {
  /// Builds a store from the configured endpoint and credential.
  pub fn from_config(config: &Config) -> Result<Self> {
    let url = config
      .settings_store
      .as_deref()
      .ok_or_else(|| AdviceError::Config("No settings_store configured".to_string()))?;
    Ok(Self {
      url:         Url::parse(url)?,
      auth_header: config.access_key_header.clone(),
      access_key:  config.access_key.clone(),
    })
  }

  /// POSTs a record as JSON. Returns the stored record's id when the store reports one
  /// (as `id` or `metadata.id`).
  pub async fn save(&self, record: &ParameterRecord) -> Result<Option<String>> {
    let client = reqwest::Client::new();
    let mut request = client.post(self.url.clone()).json(record);
    if let Some(key) = &self.access_key {
      request = request.header(&self.auth_header, key);
    }
    debug!("Saving settings to {}", self.url);
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(AdviceError::ApiError(format!("{status} from {}", self.url)));
    }
    let body: Value = response.json().await.unwrap_or(Value::Null);
    trace!("Settings store response: {}", body);
    let id = body
      .get("metadata")
      .and_then(|m| m.get("id"))
      .or_else(|| body.get("id"))
      .and_then(Value::as_str)
      .map(String::from);
    Ok(id)
  }
}
