//! crates/quiz_core/src/projection.rs
//!
//! Flattens a recovered quiz into table rows for display and CSV export.

use crate::domain::{QuestionRecord, QuizSchema, TableRow, PLACEHOLDER};

const CHOICE_SEPARATOR: &str = " || ";

/// Projects every question into a row, in insertion order.
///
/// Row indices are positional and start at 1; question keys are never parsed.
/// Each missing field becomes [`PLACEHOLDER`] independently of the others.
pub fn project(quiz: &QuizSchema) -> Vec<TableRow> {
    quiz.questions()
        .enumerate()
        .map(|(position, (_key, record))| to_row(position + 1, record))
        .collect()
}

fn to_row(index: usize, record: QuestionRecord) -> TableRow {
    TableRow {
        index,
        question: record.prompt_text.unwrap_or_else(placeholder),
        choices: record
            .options
            .map(|options| render_choices(&options))
            .unwrap_or_else(placeholder),
        correct: record.correct_label.unwrap_or_else(placeholder),
    }
}

fn render_choices(options: &[(String, String)]) -> String {
    options
        .iter()
        .map(|(label, text)| format!("{label} -> {text}"))
        .collect::<Vec<_>>()
        .join(CHOICE_SEPARATOR)
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiz(value: serde_json::Value) -> QuizSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_quiz_has_no_rows() {
        assert!(project(&QuizSchema::default()).is_empty());
    }

    #[test]
    fn complete_question_renders_every_column() {
        let rows = project(&quiz(json!({
            "q1": {"mcq": "2+2?", "options": {"A": "3", "B": "4"}, "correct": "B"}
        })));

        assert_eq!(
            rows,
            vec![TableRow {
                index: 1,
                question: "2+2?".to_string(),
                choices: "A -> 3 || B -> 4".to_string(),
                correct: "B".to_string(),
            }]
        );
    }

    #[test]
    fn missing_fields_degrade_independently() {
        let rows = project(&quiz(json!({ "q1": {"mcq": "X"} })));
        assert_eq!(rows[0].question, "X");
        assert_eq!(rows[0].choices, "N/A");
        assert_eq!(rows[0].correct, "N/A");

        let rows = project(&quiz(json!({ "q1": {"options": {"A": "yes"}, "correct": "A"} })));
        assert_eq!(rows[0].question, "N/A");
        assert_eq!(rows[0].choices, "A -> yes");
        assert_eq!(rows[0].correct, "A");
    }

    #[test]
    fn non_mapping_options_become_placeholder() {
        let rows = project(&quiz(json!({
            "q1": {"mcq": "Pick one", "options": ["red", "blue"], "correct": "A"}
        })));
        assert_eq!(rows[0].choices, "N/A");
        assert_eq!(rows[0].correct, "A");
    }

    #[test]
    fn indices_are_positional_not_parsed_from_keys() {
        let rows = project(&quiz(json!({
            "q7": {"mcq": "first"},
            "question_one": {"mcq": "second"},
            "q1": {"mcq": "third"}
        })));

        let summary: Vec<(usize, &str)> =
            rows.iter().map(|row| (row.index, row.question.as_str())).collect();
        assert_eq!(summary, [(1, "first"), (2, "second"), (3, "third")]);
    }

    #[test]
    fn option_order_follows_the_model() {
        let rows = project(&quiz(json!({
            "q1": {"mcq": "?", "options": {"C": "c", "A": "a", "B": "b"}}
        })));
        assert_eq!(rows[0].choices, "C -> c || A -> a || B -> b");
    }

    #[test]
    fn empty_options_mapping_renders_empty_choices() {
        let rows = project(&quiz(json!({ "q1": {"mcq": "?", "options": {}} })));
        assert_eq!(rows[0].choices, "");
    }

    #[test]
    fn correct_label_is_not_checked_against_options() {
        let rows = project(&quiz(json!({
            "q1": {"mcq": "?", "options": {"A": "a"}, "correct": "Z"}
        })));
        assert_eq!(rows[0].correct, "Z");
    }
}
