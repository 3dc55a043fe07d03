//! Styled terminal output.

use std::io::Write;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";

/// Something to tell the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// A finished action.
  Success(&'a str),
  /// Neutral information.
  Info(&'a str),
  /// Something degraded but the command carried on.
  Warning(&'a str),
  /// The command failed.
  Error(&'a AdvicedError),
  /// Machine-readable output, printed bare on stdout.
  Json(&'a serde_json::Value),
}

/// Where responses are shown.
pub trait UserInteraction {
  /// Shows one response.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// The process's stdout and stderr. Status lines go to stderr so stdout stays
/// parseable.
pub struct Terminal;

impl UserInteraction for Terminal {
  fn reply(&self, content: ResponseContent) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    match content {
      ResponseContent::Success(message) => writeln!(stderr, "{} {}", style(SUCCESS_PREFIX).green(), message)?,
      ResponseContent::Info(message) => writeln!(stderr, "{} {}", style(INFO_PREFIX).blue(), message)?,
      ResponseContent::Warning(message) => writeln!(stderr, "{} {}", style(WARNING_PREFIX).yellow(), message)?,
      ResponseContent::Error(e) => writeln!(stderr, "{} {}", style(ERROR_PREFIX).red(), style(e).red())?,
      ResponseContent::Json(value) => writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?,
    }
    Ok(())
  }
}
