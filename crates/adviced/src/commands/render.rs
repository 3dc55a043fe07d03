//! Renders a request to an image file.

use super::*;

/// Arguments for [`Commands::Render`]
#[derive(Args, Clone, Debug)]
pub struct RenderArgs {
  /// Request fields
  #[command(flatten)]
  pub request: RequestArgs,

  /// Viewport as WIDTHxHEIGHT; defaults to the configured viewport
  #[arg(long, value_parser = parse_viewport)]
  pub viewport: Option<(u32, u32)>,

  /// Image file to write; the format follows the extension
  #[arg(long, short)]
  pub output: PathBuf,
}

/// Parses `WIDTHxHEIGHT`.
fn parse_viewport(raw: &str) -> core::result::Result<(u32, u32), String> {
  let (width, height) = raw
    .split_once(|c| c == 'x' || c == 'X')
    .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
  let dimension = |s: &str| s.trim().parse::<u32>().map_err(|e| format!("bad dimension {s:?}: {e}"));
  Ok((dimension(width)?, dimension(height)?))
}

/// Function for the [`Commands::Render`] in the CLI.
pub async fn render<I: UserInteraction>(interaction: &I, advice: &Advice, args: RenderArgs) -> Result<()> {
  let fonts = FontBook::load(&advice.config.fonts);
  if fonts.is_empty() {
    interaction
      .reply(ResponseContent::Warning("No fonts could be loaded; add [[fonts]] entries to the configuration"))?;
  }
  let viewport = args.viewport.unwrap_or(advice.config.viewport);
  if viewport.0 == 0 || viewport.1 == 0 {
    return Err(AdvicedError::Argument(format!(
      "viewport must be non-empty, got {}x{}",
      viewport.0, viewport.1
    )));
  }

  let rendered = advice.render(&args.request.overrides(), viewport, &fonts).await?;
  if rendered.resolution.fell_back {
    interaction.reply(ResponseContent::Warning("Settings could not be fetched; rendered built-in defaults"))?;
  }
  rendered.save(&args.output)?;
  interaction.reply(ResponseContent::Success(&format!(
    "Rendered {}x{} to {}",
    rendered.image.width(),
    rendered.image.height(),
    args.output.display()
  )))
}
