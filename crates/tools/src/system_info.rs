//! System snapshot tool: operating system name, version and architecture.

use async_trait::async_trait;
use deskmate_core::error::ToolError;
use deskmate_core::tool::{Tool, ToolResult};
use serde::Serialize;

pub struct SystemInfoTool;

/// What the host reports about itself at call time.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSnapshot {
    pub system: String,
    pub version: String,
    pub machine: String,
    pub hostname: Option<String>,
}

impl SystemSnapshot {
    pub fn capture() -> Self {
        Self {
            system: sysinfo::System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            version: sysinfo::System::kernel_version()
                .or_else(sysinfo::System::os_version)
                .unwrap_or_else(|| "desconocida".into()),
            machine: std::env::consts::ARCH.to_string(),
            hostname: sysinfo::System::host_name(),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "Tu sistema es {} {} en arquitectura {}",
            self.system, self.version, self.machine
        )
    }
}

#[async_trait]
impl Tool for SystemInfoTool {
    fn name(&self) -> &str {
        "system_info"
    }

    fn description(&self) -> &str {
        "Obtiene información del sistema"
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let snapshot = SystemSnapshot::capture();
        let mut result = ToolResult::text(snapshot.describe());
        result.data = serde_json::to_value(&snapshot).ok();
        Ok(result)
    }
}
