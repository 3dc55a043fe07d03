use super::*;

pub mod init;
pub mod render;
pub mod resolve;
pub mod save;

pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use resolve::resolve;
pub use save::save;

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Write the default configuration file
  Init(InitArgs),

  /// Resolve a request and print the parameters, share link and page metadata as JSON
  Resolve(RequestArgs),

  /// Resolve a request and render it to an image file
  Render(RenderArgs),

  /// Resolve a request and save the result to the settings store
  Save(RequestArgs),
}

/// Request fields shared by every command that resolves parameters.
#[derive(Args, Clone, Debug, Default)]
pub struct RequestArgs {
  /// URL-encoded query string, e.g. "top=Listen&bottom=random()"
  #[arg(long, short, default_value = "")]
  pub query: String,

  /// A single request field, applied after --query (repeatable), e.g. --set bg=random()
  #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
  pub set: Vec<(String, String)>,
}

impl RequestArgs {
  /// Merges the query string with the individual `--set` fields.
  pub fn overrides(&self) -> RequestOverrides {
    self
      .set
      .iter()
      .fold(RequestOverrides::from_query(&self.query), |overrides, (key, value)| overrides.with(key, value))
  }
}

/// Parses a `KEY=VALUE` argument.
fn parse_key_value(raw: &str) -> core::result::Result<(String, String), String> {
  raw
    .split_once('=')
    .filter(|(key, _)| !key.is_empty())
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}
