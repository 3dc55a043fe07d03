use advice::share::PageMetadata;
use anyhow::Context;

use super::*;

#[tokio::test]
async fn test_no_parameters_produce_captions() {
  let (advice, _dir) = create_test_advice(WISDOMS);
  for _ in 0..20 {
    let resolution = advice.resolve(&RequestOverrides::new()).await;
    let p = &resolution.parameters;
    assert!(!resolution.fell_back);
    assert!(!p.top_text.is_empty());
    assert!(!p.bottom_text.is_empty());
    assert_eq!(p.background, advice.config.backgrounds[0]);
  }
}

#[tokio::test]
async fn test_listen_with_random_bottom() {
  let (advice, _dir) = create_test_advice(r#"{ "wisdoms": ["Never give up."] }"#);
  let overrides = RequestOverrides::from_query("top=Listen&bottom=random()");
  let p = advice.resolve(&overrides).await.parameters;

  assert_eq!(p.top_text, "Listen");
  assert_eq!(p.bottom_text, "Never give up.");
  assert_eq!(p.center_text, "");
  assert_eq!(p.top.font_size, 40);
  assert_eq!(p.bottom.font_style, "italic");
}

#[tokio::test]
async fn test_explicit_wisdom_index() {
  let (advice, _dir) = create_test_advice(WISDOMS);
  let p = advice.resolve(&RequestOverrides::from_query("wisdom=2")).await.parameters;
  assert_eq!((p.top_text.as_str(), p.center_text.as_str(), p.bottom_text.as_str()), ("A", "B", "C"));

  let p = advice.resolve(&RequestOverrides::from_query("wisdom=3")).await.parameters;
  assert_eq!(p.top_text, "Structured");
  assert_eq!(p.top.font_size, 12);
  // Unstyled center follows the top bubble.
  assert_eq!(p.center.font_size, 12);
}

#[tokio::test]
async fn test_missing_corpus_falls_back() {
  let (advice, dir) = create_test_advice(WISDOMS);
  let missing = dir.path().join("nope.json");
  let overrides = RequestOverrides::new().with("json", missing.to_string_lossy()).with("top", "lost");

  let resolution = advice.resolve(&overrides).await;
  assert!(resolution.fell_back);
  assert_eq!(resolution.parameters.top_text, advice::parameters::DEFAULT_TOP_TEXT);
  assert_eq!(resolution.parameters.background, advice.config.backgrounds[0]);
}

#[tokio::test]
async fn test_settings_record_is_layered() -> anyhow::Result<()> {
  let (advice, dir) = create_test_advice(WISDOMS);
  let settings = dir.path().join("settings.json");
  std::fs::write(
    &settings,
    r#"{ "record": { "topText": "From settings", "bottomFontSize": "33", "topPosition": "abc" } }"#,
  )
  .context("writing settings document")?;

  let qs = query(&[("data", &settings.to_string_lossy()), ("bottom", "Override")]);
  let p = advice.resolve(&RequestOverrides::from_query(&qs)).await.parameters;
  assert_eq!(p.top_text, "From settings");
  assert_eq!(p.bottom_text, "Override");
  assert_eq!(p.bottom.font_size, 33);
  assert_eq!(p.top.position, 50);
  Ok(())
}

#[tokio::test]
async fn test_share_link_reproduces_render() -> anyhow::Result<()> {
  let (advice, _dir) = create_test_advice(WISDOMS);
  let qs = "top=Listen&bottom=random()&topFontSize=30";
  let first = advice.resolve(&RequestOverrides::from_query(qs)).await;

  let link = advice.share_link(qs, &first)?;
  assert!(link.as_str().starts_with("https://advice.test/?topFontSize=30&top=Listen"));

  let second = advice.resolve(&RequestOverrides::from_query(link.query().unwrap_or_default())).await;
  assert_eq!(second.parameters, first.parameters);

  let metadata = PageMetadata::from(&second.parameters);
  assert_eq!(metadata.title, "Listen");
  assert_eq!(metadata.description, first.parameters.bottom_text);
  Ok(())
}
