//! Writes the default configuration file.

use super::*;

/// Arguments for [`Commands::Init`]
#[derive(Args, Clone, Debug)]
pub struct InitArgs {
  /// Overwrite an existing configuration file
  #[arg(long)]
  pub force: bool,
}

/// Function for the [`Commands::Init`] in the CLI.
pub fn init<I: UserInteraction>(interaction: &I, path: &Path, args: InitArgs) -> Result<()> {
  if path.exists() && !args.force {
    interaction.reply(ResponseContent::Warning(&format!(
      "Configuration already exists at {}; pass --force to overwrite it",
      path.display()
    )))?;
    return Ok(());
  }
  Config::default().save(path)?;
  interaction.reply(ResponseContent::Success(&format!("Wrote configuration to {}", path.display())))
}
