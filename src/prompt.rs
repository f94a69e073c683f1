//! Prompt assembly for the generation collaborator.
//!
//! The collaborator receives exactly one string, laid out as persona,
//! style guidance, stage guidance, conversation context, an optional
//! suggested question, then closing instructions.

use crate::coverage::AdaptiveQuestion;

const PERSONA: &str = "You are a wise, compassionate guide helping someone discover their gifts, strengths and sense of purpose.";

const CLOSING: &str = "Respond naturally while following the style guidance. Reference previous insights when relevant. Ask thoughtful follow-up questions that build on what you've learned about them.";

const CLOSING_WITH_SUGGESTION: &str = "Respond naturally while following the style guidance. Reference previous insights when relevant. Lead toward the suggested next question without repeating it word for word; it will be asked separately.";

/// Everything the prompt is built from for one turn.
#[derive(Debug, Clone, Copy)]
pub struct PromptParts<'a> {
    pub style_guidance: &'a str,
    pub contextual_guidance: &'a str,
    pub context: &'a str,
    pub suggestion: Option<&'a AdaptiveQuestion>,
}

pub fn build_prompt(parts: &PromptParts<'_>) -> String {
    let mut sections = vec![
        PERSONA.to_string(),
        parts.style_guidance.to_string(),
        parts.contextual_guidance.to_string(),
        format!("CONVERSATION CONTEXT:\n{}", parts.context),
    ];

    let closing = match parts.suggestion {
        Some(question) => {
            sections.push(format!(
                "SUGGESTED NEXT QUESTION ({}): {}",
                question.kind, question.text
            ));
            CLOSING_WITH_SUGGESTION
        }
        None => CLOSING,
    };
    sections.push(closing.to_string());
    sections.push("Your response:".to_string());

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{QuestionKind, QuestionTarget};
    use crate::stage::Stage;

    fn parts<'a>(suggestion: Option<&'a AdaptiveQuestion>) -> PromptParts<'a> {
        PromptParts {
            style_guidance: "Respond naturally with warmth and insight.",
            contextual_guidance: "STAGE GUIDANCE: Explore skills",
            context: "CURRENT USER INPUT: I teach",
            suggestion,
        }
    }

    #[test]
    fn test_sections_in_order() {
        let prompt = build_prompt(&parts(None));
        let persona = prompt.find("You are a wise").unwrap();
        let style = prompt.find("Respond naturally with warmth").unwrap();
        let stage = prompt.find("STAGE GUIDANCE").unwrap();
        let context = prompt.find("CONVERSATION CONTEXT:\nCURRENT USER INPUT").unwrap();
        let closing = prompt.find("Your response:").unwrap();
        assert!(persona < style && style < stage && stage < context && context < closing);
        assert!(!prompt.contains("SUGGESTED NEXT QUESTION"));
    }

    #[test]
    fn test_suggestion_included_before_closing() {
        let question = AdaptiveQuestion {
            text: "What energizes you?".to_string(),
            kind: QuestionKind::FollowUp,
            target: QuestionTarget::Stage(Stage::PassionExploration),
            reasoning: "test".to_string(),
            priority: 0.7,
        };
        let prompt = build_prompt(&parts(Some(&question)));
        let suggestion = prompt
            .find("SUGGESTED NEXT QUESTION (follow_up): What energizes you?")
            .unwrap();
        let context = prompt.find("CONVERSATION CONTEXT:").unwrap();
        let closing = prompt.find("it will be asked separately").unwrap();
        assert!(context < suggestion && suggestion < closing);
    }
}
