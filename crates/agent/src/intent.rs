//! Keyword-based intent classification.
//!
//! Categories are tested in a fixed order and the first one with a keyword
//! contained in the lower-cased input wins. Matching is plain substring
//! membership, so short keywords like `pc` also fire inside longer words.
//! Anything unmatched falls through to the LLM with recent history attached.

use deskmate_config::{AssistantConfig, IntentPatterns};
use serde_json::json;
use tracing::debug;

/// Characters stripped around an extracted argument.
const ARGUMENT_TRIM: &[char] = &[':', '?', '¿', '='];

/// Keyword-driven intent categories, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentCategory {
    System,
    Time,
    Memory,
    Calculation,
    Store,
    Search,
    Stats,
}

impl IntentCategory {
    pub const ORDER: [IntentCategory; 7] = [
        Self::System,
        Self::Time,
        Self::Memory,
        Self::Calculation,
        Self::Store,
        Self::Search,
        Self::Stats,
    ];

    /// The tool that handles this category.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::System => "system_info",
            Self::Time => "get_time",
            Self::Memory => "memory_usage",
            Self::Calculation => "calculator",
            Self::Store => "vector_store",
            Self::Search => "vector_search",
            Self::Stats => "vector_stats",
        }
    }

    fn keywords<'a>(&self, patterns: &'a IntentPatterns) -> &'a [String] {
        match self {
            Self::System => &patterns.system,
            Self::Time => &patterns.time,
            Self::Memory => &patterns.memory,
            Self::Calculation => &patterns.calculation,
            Self::Store => &patterns.store,
            Self::Search => &patterns.search,
            Self::Stats => &patterns.stats,
        }
    }
}

/// A classified utterance: which tool to call and with what.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub tool: String,
    pub arguments: serde_json::Value,
    /// `None` when the input fell through to the LLM.
    pub category: Option<IntentCategory>,
}

pub struct IntentClassifier {
    patterns: IntentPatterns,
    window: usize,
}

impl IntentClassifier {
    pub fn new(patterns: IntentPatterns, window: usize) -> Self {
        Self {
            patterns: lowercase_patterns(patterns),
            window: window.max(1),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(config.intent_patterns.clone(), config.context_window())
    }

    /// Classify `input`. `history` holds the `"user:..."` / `"assistant:..."`
    /// lines so far; only the trailing `window` lines go to the LLM.
    pub fn classify(&self, input: &str, history: &[String]) -> Intent {
        let lowered = input.to_lowercase();

        for category in IntentCategory::ORDER {
            let Some((keyword, end)) = first_match(category.keywords(&self.patterns), &lowered) else {
                continue;
            };
            debug!(category = ?category, keyword, "Intent matched");

            let argument = || extract_argument(input, &lowered, end);
            let arguments = match category {
                IntentCategory::Calculation => json!({ "expression": argument() }),
                IntentCategory::Store => json!({
                    "content": argument(),
                    "metadata": { "source": "chat" }
                }),
                IntentCategory::Search => json!({ "query": argument() }),
                _ => json!({}),
            };

            return Intent {
                tool: category.tool_name().into(),
                arguments,
                category: Some(category),
            };
        }

        let start = history.len().saturating_sub(self.window);
        debug!(context_lines = history.len() - start, "No intent matched; forwarding to LLM");
        Intent {
            tool: "ask_llm".into(),
            arguments: json!({ "query": input, "context": &history[start..] }),
            category: None,
        }
    }
}

fn lowercase_patterns(patterns: IntentPatterns) -> IntentPatterns {
    let lower = |list: Vec<String>| -> Vec<String> {
        list.into_iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    };
    IntentPatterns {
        system: lower(patterns.system),
        time: lower(patterns.time),
        memory: lower(patterns.memory),
        calculation: lower(patterns.calculation),
        store: lower(patterns.store),
        search: lower(patterns.search),
        stats: lower(patterns.stats),
    }
}

/// First keyword (in list order) found in `lowered`, with the byte offset
/// just past its first occurrence.
fn first_match<'a>(keywords: &'a [String], lowered: &str) -> Option<(&'a str, usize)> {
    keywords.iter().find_map(|keyword| {
        lowered
            .find(keyword.as_str())
            .map(|start| (keyword.as_str(), start + keyword.len()))
    })
}

/// Text after the matched keyword, or the whole input when nothing follows.
///
/// The original casing is kept when lower-casing did not shift byte offsets.
fn extract_argument(input: &str, lowered: &str, end: usize) -> String {
    let rest = if input.len() == lowered.len() && input.is_char_boundary(end) {
        &input[end..]
    } else {
        &lowered[end..]
    };
    let trimmed = rest.trim_matches(|c: char| c.is_whitespace() || ARGUMENT_TRIM.contains(&c));
    if trimmed.is_empty() {
        input.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::from_config(&AssistantConfig::default())
    }

    fn history(turns: usize) -> Vec<String> {
        (0..turns)
            .flat_map(|i| [format!("user:q{i}"), format!("assistant:a{i}")])
            .collect()
    }

    #[test]
    fn system_keyword_selects_system_info() {
        let intent = classifier().classify("¿Qué SISTEMA tengo?", &[]);
        assert_eq!(intent.tool, "system_info");
        assert_eq!(intent.category, Some(IntentCategory::System));
        assert_eq!(intent.arguments, json!({}));
    }

    #[test]
    fn time_and_memory_keywords() {
        assert_eq!(classifier().classify("qué hora es", &[]).tool, "get_time");
        assert_eq!(classifier().classify("cuánta RAM uso", &[]).tool, "memory_usage");
    }

    #[test]
    fn earlier_category_wins() {
        // "memoria" (memory) and "hora" (time) both present; time is tested first.
        let intent = classifier().classify("a qué hora se llena la memoria", &[]);
        assert_eq!(intent.tool, "get_time");
    }

    #[test]
    fn calculation_extracts_expression() {
        let intent = classifier().classify("Calcula: 2 + 2 * 3?", &[]);
        assert_eq!(intent.tool, "calculator");
        assert_eq!(intent.arguments["expression"], "2 + 2 * 3");

        let intent = classifier().classify("cuánto es sqrt(16)", &[]);
        assert_eq!(intent.arguments["expression"], "sqrt(16)");
    }

    #[test]
    fn store_prefers_longer_leading_keyword() {
        let intent = classifier().classify("Recuerda que mi perro se llama Toby", &[]);
        assert_eq!(intent.tool, "vector_store");
        assert_eq!(intent.arguments["content"], "mi perro se llama Toby");
        assert_eq!(intent.arguments["metadata"]["source"], "chat");
    }

    #[test]
    fn search_and_stats() {
        let intent = classifier().classify("qué sabes de Rust?", &[]);
        assert_eq!(intent.tool, "vector_search");
        assert_eq!(intent.arguments["query"], "Rust");

        assert_eq!(classifier().classify("stats", &[]).tool, "vector_stats");
    }

    #[test]
    fn keyword_alone_falls_back_to_whole_input() {
        let intent = classifier().classify("  busca  ", &[]);
        assert_eq!(intent.tool, "vector_search");
        assert_eq!(intent.arguments["query"], "busca");
    }

    #[test]
    fn unmatched_goes_to_llm_with_recent_history() {
        let lines = history(8);
        let intent = classifier().classify("cuéntame un chiste", &lines);
        assert_eq!(intent.tool, "ask_llm");
        assert_eq!(intent.category, None);
        assert_eq!(intent.arguments["query"], "cuéntame un chiste");

        let context = intent.arguments["context"].as_array().unwrap();
        assert_eq!(context.len(), 10);
        assert_eq!(context[0], "user:q3");
        assert_eq!(context[9], "assistant:a7");
    }

    #[test]
    fn short_history_is_sent_whole() {
        let lines = history(2);
        let intent = classifier().classify("hola", &lines);
        assert_eq!(intent.arguments["context"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn custom_keywords_are_case_insensitive() {
        let mut config = AssistantConfig::default();
        config.intent_patterns.time = vec!["CLOCK".into()];
        let intent = IntentClassifier::from_config(&config).classify("show the clock", &[]);
        assert_eq!(intent.tool, "get_time");
    }

    #[test]
    fn non_ascii_casing_does_not_break_extraction() {
        // 'İ' lower-cases to two code points, shifting byte offsets.
        let intent = classifier().classify("İ calcula 3*3", &[]);
        assert_eq!(intent.tool, "calculator");
        assert_eq!(intent.arguments["expression"], "3*3");
    }
}
