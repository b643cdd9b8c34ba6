use anyhow::Result;
use console::style;

use crate::configuration::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let catalog = settings.catalog();
    let topics = catalog.topics()?;

    if topics.is_empty() {
        println!(
            "{}",
            style(format!("No topic indices under {}", catalog.root().display())).dim()
        );
        return Ok(());
    }

    for topic in topics {
        println!("{}", topic);
    }
    Ok(())
}
