//! Prints what a request resolves to.

use advice::share::PageMetadata;
use serde_json::json;

use super::*;

/// Function for the [`Commands::Resolve`] in the CLI.
pub async fn resolve<I: UserInteraction>(interaction: &I, advice: &Advice, args: RequestArgs) -> Result<()> {
  let overrides = args.overrides();
  let resolution = advice.resolve(&overrides).await;
  if resolution.fell_back {
    interaction.reply(ResponseContent::Warning("Settings could not be fetched; showing built-in defaults"))?;
  }

  let share = advice.share_link(&overrides.to_query(), &resolution)?;
  let output = json!({
    "parameters": resolution.parameters,
    "fellBack": resolution.fell_back,
    "share": share.as_str(),
    "metadata": PageMetadata::from(&resolution.parameters),
  });
  interaction.reply(ResponseContent::Json(&output))
}
