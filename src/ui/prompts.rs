//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{LazydepError, LazydepResult};

/// Prompt for confirmation
///
/// `auto_yes` approves without asking; a non-interactive context returns
/// `default`.
pub async fn confirm(
    ctx: &UiContext,
    message: &str,
    default: bool,
    auto_yes: bool,
) -> LazydepResult<bool> {
    if auto_yes {
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // Run blocking cliclack prompt in spawn_blocking
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| LazydepError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| LazydepError::User(format!("Prompt failed: {}", e)))
}
