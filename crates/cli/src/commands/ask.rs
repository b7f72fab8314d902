//! `deskmate ask`: Single-message mode.

use super::{CommandResult, load_config, start_assistant};
use std::path::Path;

pub async fn run(config_path: Option<&Path>, message: &str) -> CommandResult {
    let config = load_config(config_path)?;
    let assistant = start_assistant(config).await?;

    let message = message.trim();
    if message.is_empty() {
        println!("{}", assistant.config().response_templates.get("empty_input"));
        return Ok(());
    }

    let mut state = assistant.new_session();
    let outcome = assistant.process_turn(&mut state, message).await;
    println!("{}", outcome.message());

    Ok(())
}
