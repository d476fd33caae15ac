//! Deterministic prompt assembly from ranked memory context.

use crate::model::{RankedCandidate, Role};

/// Fixed instruction prepended to every generation request.
const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant with access to the user's \
conversation history. Use the relevant memories below to ground your answer. If the \
memories do not help, answer from the message alone.";

/// Render the ranked context plus the new message into one prompt blob.
///
/// Pure function: identical inputs produce byte-identical output. Empty
/// context produces a valid prompt with an empty memory section.
pub fn assemble(context: &[RankedCandidate], message: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(SYSTEM_INSTRUCTION);
    prompt.push_str("\n\nRelevant memories:\n");
    if context.is_empty() {
        prompt.push_str("(none)\n");
    } else {
        for item in context {
            let role = item.role().unwrap_or(Role::User);
            prompt.push_str("- (");
            prompt.push_str(role.as_str());
            prompt.push_str(") ");
            prompt.push_str(item.text());
            prompt.push('\n');
        }
    }
    prompt.push_str("\nUser: ");
    prompt.push_str(message);
    prompt.push_str("\nAssistant:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::assemble;
    use crate::model::{Candidate, RankedCandidate, Role};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn ranked(text: &str, role: Option<Role>) -> RankedCandidate {
        RankedCandidate {
            candidate: Candidate {
                text: text.to_string(),
                role,
                created_at: Some(Utc::now()),
                similarity: 0.5,
            },
            fused_score: 0.5,
        }
    }

    #[test]
    fn renders_context_lines_in_ranked_order() {
        let context = vec![
            ranked("likes rust", Some(Role::User)),
            ranked("recommended a book", Some(Role::Assistant)),
        ];
        let prompt = assemble(&context, "what was the book?");
        let user_line = prompt.find("- (user) likes rust").expect("user line");
        let assistant_line = prompt
            .find("- (assistant) recommended a book")
            .expect("assistant line");
        assert!(user_line < assistant_line);
        assert!(prompt.ends_with("User: what was the book?\nAssistant:"));
    }

    #[test]
    fn empty_context_is_a_valid_prompt() {
        let prompt = assemble(&[], "hello");
        assert!(prompt.contains("Relevant memories:\n(none)"));
        assert!(prompt.contains("User: hello"));
    }

    #[test]
    fn missing_role_falls_back_to_user() {
        let prompt = assemble(&[ranked("untagged", None)], "hi");
        assert!(prompt.contains("- (user) untagged"));
    }

    #[test]
    fn identical_inputs_produce_identical_prompts() {
        let context = vec![ranked("a", Some(Role::User)), ranked("b", None)];
        assert_eq!(assemble(&context, "again"), assemble(&context, "again"));
    }
}
