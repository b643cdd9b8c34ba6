use anyhow::{Context, Result};

use crate::configuration::Settings;
use crate::render;

pub async fn run(settings: &Settings, topic: &str, session: &str, question: &str) -> Result<()> {
    let factory = settings.agent_factory()?;
    let agent = factory
        .build(topic)
        .with_context(|| format!("Failed to open topic '{}'", topic))?;

    let outcome = agent.ask(session, question).await;
    tracing::debug!(grounding = ?outcome.grounding(), "answered");

    render(outcome.text())
}
