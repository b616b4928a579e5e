//! Grounded-prompt assembly.

use crate::llm::ChatMessage;
use crate::search::SearchHit;

pub const NO_CONTEXT_PLACEHOLDER: &str = "No context available.";

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the CONTEXT when relevant. If unsure, say so.";

/// Concatenate retrieved document texts and web hits into one context block.
///
/// Returns the placeholder when neither source contributed anything.
pub fn build_context(doc_texts: &[String], web_hits: &[SearchHit]) -> String {
    let mut sections = Vec::new();

    if !doc_texts.is_empty() {
        sections.push(format!("DOCUMENT CONTEXT:\n{}", doc_texts.join("\n\n")));
    }

    if !web_hits.is_empty() {
        let rows: Vec<String> = web_hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("{}. {} - {} ({})", i + 1, hit.title, hit.snippet, hit.url))
            .collect();
        sections.push(format!("WEB SEARCH RESULTS:\n{}", rows.join("\n")));
    }

    if sections.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        sections.join("\n\n")
    }
}

/// Build the system + user message pair sent to the completion endpoint.
pub fn build_prompt(question: &str, context: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user".to_string(),
            content: format!("QUESTION:\n{question}\n\nCONTEXT:\n{context}"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, snippet: &str, url: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            snippet: snippet.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn no_sources_yields_placeholder() {
        assert_eq!(build_context(&[], &[]), NO_CONTEXT_PLACEHOLDER);
    }

    #[test]
    fn documents_only() {
        let ctx = build_context(&["first".to_string(), "second".to_string()], &[]);
        assert_eq!(ctx, "DOCUMENT CONTEXT:\nfirst\n\nsecond");
    }

    #[test]
    fn web_hits_are_numbered_with_title_snippet_url() {
        let hits = vec![
            hit("A", "about a", "https://a.example"),
            hit("B", "about b", "https://b.example"),
        ];
        let ctx = build_context(&[], &hits);
        assert!(ctx.starts_with("WEB SEARCH RESULTS:\n"));
        assert!(ctx.contains("1. A - about a (https://a.example)"));
        assert!(ctx.contains("2. B - about b (https://b.example)"));
    }

    #[test]
    fn documents_come_before_web_results() {
        let ctx = build_context(
            &["doc".to_string()],
            &[hit("T", "s", "https://t.example")],
        );
        let doc_pos = ctx.find("DOCUMENT CONTEXT:").unwrap();
        let web_pos = ctx.find("WEB SEARCH RESULTS:").unwrap();
        assert!(doc_pos < web_pos);
    }

    #[test]
    fn prompt_embeds_question_and_context() {
        let messages = build_prompt("what is rust?", "some context");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("QUESTION:\nwhat is rust?"));
        assert!(messages[1].content.contains("CONTEXT:\nsome context"));
    }
}
