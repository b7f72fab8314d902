//! `deskmate status`: Show resolved configuration.

use super::{CommandResult, load_config};
use deskmate_config::DEFAULT_CONFIG_FILE;
use deskmate_memory::detect_mode;
use std::path::{Path, PathBuf};

pub async fn run(config_path: Option<&Path>) -> CommandResult {
    let config = load_config(config_path)?;
    let file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mcp_path = config.mcp.resolved_path();
    let on_off = |b: bool| if b { "enabled" } else { "disabled" };

    println!("🦀 {} v{}", config.assistant_config.name, config.assistant_config.version);
    println!("==================");
    println!(
        "  Config file:   {}{}",
        file.display(),
        if file.exists() { "" } else { " (not found, using defaults)" }
    );
    println!("  Endpoint:      {}", config.llm.base_url);
    println!("  Model:         {}", config.llm.model);
    println!("  Temperature:   {}", config.llm.temperature);
    println!(
        "  API key:       {} ({})",
        if config.has_api_key() { "set" } else { "missing" },
        config.llm.api_key_env
    );
    println!("  History:       {} turns", config.context_window());
    println!("  Archival:      {}", on_off(config.should_store_interaction()));
    println!("  Vector memory: {}", on_off(config.assistant_config.features.vector_memory));
    println!(
        "  Vector store:  {} ({})",
        detect_mode(&mcp_path),
        mcp_path.display()
    );
    println!(
        "  Collection:    {} ({} dims, {})",
        config.qdrant_config.collection_name,
        config.qdrant_config.vector_size,
        config.qdrant_config.distance_metric
    );

    let enabled: Vec<&str> = config
        .capabilities
        .iter()
        .filter(|c| c.enabled)
        .map(|c| c.name.as_str())
        .collect();
    println!("  Capabilities:  {}", enabled.join(", "));

    Ok(())
}
