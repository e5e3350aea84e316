//! Prompt templates for diagram generation.
//!
//! Both templates pin the output contract: proper Mermaid syntax inside a
//! ```mermaid fence and nothing else, so the extractor has something
//! deterministic to find.

use crate::api::PromptMessage;

const DIAGRAM_RULES: &str = "Follow these rules:
1. Focus on function calls, class relationships, and data flow
2. Use proper Mermaid syntax
3. Include clear node labels and relationships
4. Use appropriate Mermaid diagram types (flowchart, classDiagram, etc.)
5. Add comments to explain complex relationships
6. Format the response with ```mermaid``` code blocks
7. Only include the Mermaid diagram in your response, no additional text";

/// Prompt for snippet mode: the query itself is the code to analyze.
pub fn snippet_prompt(query: &str) -> PromptMessage {
    PromptMessage::user(format!(
        "You are an AI assistant that generates Mermaid flowcharts. Given a code snippet, \
         create a flowchart showing the relationships and flow. {}\n\n\
         Here is the code snippet to analyze and generate a Mermaid flowchart for:\n\n{}",
        DIAGRAM_RULES, query
    ))
}

/// Prompt for repository mode: the composed code context is the subject.
pub fn repository_prompt(code_context: &str) -> PromptMessage {
    PromptMessage::user(format!(
        "Analyze this code and generate a Mermaid flowchart showing the relationships \
         and flow. {}\n\nHere is the code to analyze:\n\n{}",
        DIAGRAM_RULES, code_context
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_prompt_embeds_query() {
        let msg = snippet_prompt("fn main() {}");
        assert_eq!(msg.role, "user");
        assert!(msg.content.contains("fn main() {}"));
        assert!(msg.content.contains("```mermaid```"));
    }

    #[test]
    fn test_repository_prompt_embeds_context() {
        let msg = repository_prompt("File: a.rs\n...");
        assert!(msg.content.contains("File: a.rs"));
        assert!(msg.content.contains("no additional text"));
    }
}
