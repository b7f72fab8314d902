//! Memory snapshot tool: total RAM and current utilisation.

use async_trait::async_trait;
use deskmate_core::error::ToolError;
use deskmate_core::tool::{Tool, ToolResult};
use serde::Serialize;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub struct MemoryUsageTool;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MemorySnapshot {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

impl MemorySnapshot {
    pub fn capture() -> Self {
        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        Self {
            total_bytes: sys.total_memory(),
            used_bytes: sys.used_memory(),
        }
    }

    pub fn percent_used(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.total_bytes as f64 * 100.0
    }

    pub fn describe(&self) -> String {
        format!(
            "Tu computadora tiene {:.1}GB de RAM y está usando el {:.1}%",
            self.total_bytes as f64 / GIB,
            self.percent_used()
        )
    }
}

#[async_trait]
impl Tool for MemoryUsageTool {
    fn name(&self) -> &str {
        "memory_usage"
    }

    fn description(&self) -> &str {
        "Obtiene el uso de memoria del sistema"
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let snapshot = MemorySnapshot::capture();
        if snapshot.total_bytes == 0 {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: "the platform reported no physical memory".into(),
            });
        }
        let mut result = ToolResult::text(snapshot.describe());
        result.data = serde_json::to_value(snapshot).ok();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_format() {
        let snapshot = MemorySnapshot {
            total_bytes: 16 * 1024 * 1024 * 1024,
            used_bytes: 4 * 1024 * 1024 * 1024,
        };
        assert_eq!(
            snapshot.describe(),
            "Tu computadora tiene 16.0GB de RAM y está usando el 25.0%"
        );
    }

    #[test]
    fn zero_total_is_zero_percent() {
        let snapshot = MemorySnapshot { total_bytes: 0, used_bytes: 0 };
        assert_eq!(snapshot.percent_used(), 0.0);
    }

    #[test]
    fn live_snapshot_is_consistent() {
        let snapshot = MemorySnapshot::capture();
        assert!(snapshot.used_bytes <= snapshot.total_bytes);
        assert!((0.0..=100.0).contains(&snapshot.percent_used()));
    }
}
