use anyhow::{Context, Result};
use cliclack::{input, spinner};
use console::style;

use crate::configuration::Settings;
use crate::render;

pub async fn run(settings: &Settings, topic: &str, session: &str) -> Result<()> {
    let factory = settings.agent_factory()?;
    let agent = factory
        .build(topic)
        .with_context(|| format!("Failed to open topic '{}'", topic))?;

    println!(
        "{} {} {}",
        style("assistleg").bold(),
        style(format!("[{}]", agent.topic())).cyan(),
        style("- type \"exit\" to end the session").dim()
    );
    println!();

    loop {
        let question: String = input("Pregunta:").placeholder("").interact()?;

        if question.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let spin = spinner();
        spin.start("buscando respuesta");
        let outcome = agent.ask(session, &question).await;
        spin.stop("");

        render(outcome.text())?;
        println!();
    }

    tracing::debug!(
        session,
        turns = agent.history(session).await.len(),
        "chat closed"
    );
    Ok(())
}
