//! Rolling conversation history.
//!
//! Each turn adds a `"user:..."` and an `"assistant:..."` line. Once the
//! history holds more than `2 × window` lines the oldest ones are split
//! off and handed back to the caller for archival.

/// Bounded list of history lines, oldest first.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    lines: Vec<String>,
    window: usize,
}

impl ConversationHistory {
    /// A window of zero is treated as one.
    pub fn new(window: usize) -> Self {
        Self {
            lines: Vec::new(),
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Maximum number of lines kept after a turn.
    pub fn capacity(&self) -> usize {
        self.window * 2
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append one turn and evict past capacity.
    ///
    /// Returns the evicted lines joined with newlines, oldest first, or
    /// `None` when nothing was evicted.
    pub fn record_turn(&mut self, user: &str, assistant: &str) -> Option<String> {
        self.lines.push(format!("user:{user}"));
        self.lines.push(format!("assistant:{assistant}"));

        let excess = self.lines.len().saturating_sub(self.capacity());
        if excess == 0 {
            return None;
        }
        let evicted: Vec<String> = self.lines.drain(..excess).collect();
        Some(evicted.join("\n"))
    }
}
