//! crates/quiz_core/src/recovery.rs
//!
//! Best-effort reconstruction of a quiz from the model's free-form completion.

use crate::domain::QuizSchema;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

/// First `{` through last `}`, across newlines.
static BRACE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("brace span pattern is valid"));

/// Recovers a quiz from a completion, or `None` when no structure can be found.
///
/// The whole text is parsed strictly first. Failing that, the greedy span from
/// the first `{` to the last `}` is parsed. Several independent JSON fragments,
/// or stray braces in the surrounding prose, make the second attempt fail.
pub fn recover_quiz(completion: &str) -> Option<QuizSchema> {
    if let Some(quiz) = parse_object(completion) {
        return Some(quiz);
    }

    let span = BRACE_SPAN.find(completion)?;
    debug!(
        "Completion is not bare JSON, retrying with the {}-byte brace span",
        span.len()
    );
    parse_object(span.as_str())
}

/// Only a top-level object counts as a quiz.
fn parse_object(text: &str) -> Option<QuizSchema> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(QuizSchema::from(map)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_quiz() -> QuizSchema {
        serde_json::from_value(json!({
            "q2": {
                "mcq": "Which organelle produces ATP?",
                "options": {"D": "Nucleus", "A": "Mitochondria", "C": "Ribosome"},
                "correct": "A"
            },
            "q1": {
                "mcq": "2+2?",
                "options": {"A": "3", "B": "4"},
                "correct": "B"
            }
        }))
        .unwrap()
    }

    #[test]
    fn valid_json_round_trips_with_order_intact() {
        let quiz = sample_quiz();
        let recovered = recover_quiz(&serde_json::to_string_pretty(&quiz).unwrap()).unwrap();

        assert_eq!(recovered, quiz);
        let keys: Vec<&str> = recovered.questions().map(|(key, _)| key).collect();
        assert_eq!(keys, ["q2", "q1"]);
    }

    #[test]
    fn json_wrapped_in_prose_is_recovered() {
        let completion = r#"Sure! Here is your quiz:
{ "q1": {"mcq": "2+2?", "options": {"A": "3", "B": "4"}, "correct": "B"} }
Let me know if you need more."#;

        let quiz = recover_quiz(completion).unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.as_map()["q1"]["correct"], "B");
    }

    #[test]
    fn code_fenced_json_is_recovered() {
        let completion = "```json\n{\"q1\": {\"mcq\": \"X\"}}\n```";
        assert_eq!(recover_quiz(completion).unwrap().len(), 1);
    }

    #[test]
    fn plain_text_is_unrecoverable() {
        assert_eq!(recover_quiz("not json at all"), None);
        assert_eq!(recover_quiz(""), None);
    }

    #[test]
    fn two_separate_fragments_defeat_the_span() {
        let completion = r#"First {"q1": {"mcq": "A"}} and then {"q2": {"mcq": "B"}}"#;
        assert_eq!(recover_quiz(completion), None);
    }

    #[test]
    fn unbalanced_braces_are_unrecoverable() {
        assert_eq!(recover_quiz(r#"{"q1": {"mcq": "cut off"#), None);
    }

    #[test]
    fn top_level_array_falls_back_to_inner_object() {
        let quiz = recover_quiz(r#"[{"q1": {"mcq": "X"}}]"#).unwrap();
        assert_eq!(quiz.len(), 1);
    }

    #[test]
    fn empty_object_is_an_empty_quiz() {
        assert!(recover_quiz("{}").unwrap().is_empty());
    }
}
