//! `deskmate doctor`: Diagnose configuration and connectivity.

use super::CommandResult;
use deskmate_config::{AssistantConfig, DEFAULT_CONFIG_FILE};
use deskmate_core::error::ErrorKind;
use std::path::{Path, PathBuf};

pub async fn run(config_path: Option<&Path>) -> CommandResult {
    println!("🩺 Deskmate Doctor: System Diagnostics");
    println!("=======================================\n");

    let mut issues = 0;

    let file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    if file.exists() {
        println!("  ✅ Config file found: {}", file.display());
    } else {
        println!("  ⚠️  No config file at {}, built-in defaults apply", file.display());
    }

    let config = match AssistantConfig::load(Some(file.as_path())) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. Fix the config file and run doctor again.");
            return Ok(());
        }
    };

    let mcp_path = config.mcp.resolved_path();
    if mcp_path.exists() {
        println!("  ✅ MCP config found: {} (live vector store)", mcp_path.display());
    } else {
        println!(
            "  ⚠️  No MCP config at {}, vector store runs simulated",
            mcp_path.display()
        );
    }

    if config.has_api_key() {
        println!("  ✅ API key set ({})", config.llm.api_key_env);
    }
    match super::connect(&config).await {
        Ok(provider) => println!("  ✅ Endpoint reachable: {}", provider.base_url()),
        Err(e) if e.kind() == ErrorKind::Config => {
            println!("  ❌ Credentials: {e}, check {}", config.llm.api_key_env);
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ Endpoint check failed: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
