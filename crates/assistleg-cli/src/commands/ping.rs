use anyhow::{Context, Result};
use assistleg::providers::factory::get_provider;
use console::style;

use crate::configuration::Settings;

pub async fn run(settings: &Settings) -> Result<()> {
    let provider = get_provider(settings.provider.clone().into_config()?)?;

    let (reply, usage) = provider
        .complete_prompt("Responde únicamente con la palabra: pong")
        .await
        .context("The language model did not answer")?;

    tracing::debug!("usage: {}", serde_json::to_string(&usage)?);
    println!("{} {}", style("ok").green().bold(), reply.answer_text().trim());
    Ok(())
}
