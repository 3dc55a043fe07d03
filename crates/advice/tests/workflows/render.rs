use advice::{
  error::AdviceError,
  scale::Canvas,
  surface::{FontBook, RasterSurface},
};

use super::*;

#[tokio::test]
async fn test_prepare_fits_background() -> anyhow::Result<()> {
  let (advice, _dir) = create_test_advice(WISDOMS);
  let prepared = advice.prepare(&RequestOverrides::from_query("top=Hi&bottom=Yo"), (100, 100)).await?;

  assert!(prepared.background.is_some());
  assert_eq!(prepared.canvas, Canvas { width: 100, height: 50 });
  assert_eq!(prepared.scaled.factor(), 0.5);
  assert_eq!(prepared.scaled.top.font_size, 20);
  assert_eq!(prepared.scaled.top.position, 25);
  // Unscaled values are kept on the resolution.
  assert_eq!(prepared.resolution.parameters.top.font_size, 40);
  Ok(())
}

#[tokio::test]
async fn test_explicit_background_is_loaded() -> anyhow::Result<()> {
  let (advice, dir) = create_test_advice(WISDOMS);
  let square = dir.path().join("square.png");
  RgbaImage::from_pixel(50, 50, Rgba([1, 1, 1, 255])).save(&square)?;

  let qs = query(&[("bg", &square.to_string_lossy())]);
  let prepared = advice.prepare(&RequestOverrides::from_query(&qs), (300, 200)).await?;
  assert_eq!(prepared.resolution.parameters.background, square.to_string_lossy());
  assert_eq!(prepared.canvas, Canvas { width: 200, height: 200 });
  Ok(())
}

#[tokio::test]
async fn test_background_and_bubbles_are_drawn() -> anyhow::Result<()> {
  let (advice, _dir) = create_test_advice(WISDOMS);
  let prepared = advice.prepare(&RequestOverrides::from_query("top=Hi&bottom=Yo"), (100, 100)).await?;
  let scene = advice.compose(&prepared, &FixedAdvance)?;
  assert!(matches!(scene.ops[0], DrawOp::Background { .. }));
  assert_eq!(scene.ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })).count(), 2);

  let fonts = FontBook::new();
  let mut surface = RasterSurface::new(prepared.canvas, prepared.background, &fonts, "black");
  for op in scene.ops.iter().filter(|op| !matches!(op, DrawOp::Text { .. })) {
    surface.draw(op)?;
  }
  let image = surface.into_image();

  assert_eq!(image.dimensions(), (100, 50));
  assert!(close(*image.get_pixel(0, 0), BACKGROUND));
  assert!(close(*image.get_pixel(5, 45), BACKGROUND));
  // Inside the top bubble, below the bottom bubble's lower edge.
  assert_eq!(*image.get_pixel(50, 40), Rgba([255, 255, 255, 255]));
  Ok(())
}

#[tokio::test]
async fn test_missing_background_paints_fallback() -> anyhow::Result<()> {
  let (mut advice, dir) = create_test_advice(WISDOMS);
  advice.config.backgrounds = vec![dir.path().join("gone.webp").to_string_lossy().into_owned()];
  advice.config.fallback_color = "#ff0000".to_string();

  let prepared = advice.prepare(&RequestOverrides::new(), (80, 60)).await?;
  assert!(prepared.background.is_none());
  assert_eq!(prepared.canvas, Canvas { width: 80, height: 60 });

  let scene = advice.compose(&prepared, &FixedAdvance)?;
  let fonts = FontBook::new();
  let mut surface = RasterSurface::new(prepared.canvas, None, &fonts, &advice.config.fallback_color);
  surface.draw(&scene.ops[0])?;
  assert_eq!(*surface.image().get_pixel(79, 59), Rgba([255, 0, 0, 255]));
  Ok(())
}

#[tokio::test]
async fn test_render_needs_fonts() {
  let (advice, _dir) = create_test_advice(WISDOMS);
  let result = advice.render(&RequestOverrides::from_query("top=Hi"), (100, 100), &FontBook::new()).await;
  assert!(matches!(result, Err(AdviceError::FontUnavailable(_))));
}
