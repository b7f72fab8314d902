//! The Deskmate session loop.
//!
//! Each turn follows a **classify → dispatch → record** cycle:
//!
//! 1. **Classify** the user's text into an intent with the keyword classifier
//! 2. **Dispatch** the intent to its tool (OS lookups, calculator, vector
//!    memory, or the LLM as fallback)
//! 3. **Record** the turn in the rolling history, archiving whatever falls
//!    out of the window to the vector store

pub mod history;
pub mod intent;
pub mod session;

pub use history::ConversationHistory;
pub use intent::{Intent, IntentCategory, IntentClassifier};
pub use session::{Assistant, SessionState, TurnOutcome};
