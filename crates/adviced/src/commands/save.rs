//! Saves resolved settings to the remote settings store.

use super::*;

/// Function for the [`Commands::Save`] in the CLI.
pub async fn save<I: UserInteraction>(interaction: &I, advice: &Advice, args: RequestArgs) -> Result<()> {
  let resolution = advice.resolve(&args.overrides()).await;
  if resolution.fell_back {
    interaction.reply(ResponseContent::Warning("Settings could not be fetched; saving built-in defaults"))?;
  }
  match advice.save(&resolution.parameters).await? {
    Some(id) => interaction.reply(ResponseContent::Success(&format!("Saved settings; load them with data={id}"))),
    None => interaction.reply(ResponseContent::Info("Saved settings; the store returned no id")),
  }
}
