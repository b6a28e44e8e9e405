//! crates/quiz_core/src/prompts.rs
//!
//! Renders the two prompts of a run: quiz generation, then quiz review.
//! User text and document content are embedded verbatim.

use crate::domain::QuizRequestParameters;
use serde_json::json;

const QUIZ_TEMPLATE: &str = r#"
Text:{text}
You are an expert MCQ maker. Given the above text, create {number} multiple choice questions for {subject} students in {tone} tone.

Rules:
- Return ONLY valid JSON.
- Do not add any text outside the JSON.
- Follow exactly the format in RESPONSE_JSON.
- Ensure there are {number} questions.

### RESPONSE_JSON
{response_json}
"#;

const REVIEW_TEMPLATE: &str = r#"
You are an expert English grammarian and writer. Given a Multiple Choice Quiz for {subject} students.
You need to evaluate the complexity of the question and give a complete analysis of the quiz. Only use at max 50 words for complexity analysis.
If the quiz is not at par with the cognitive and analytical abilities of the students,
update the quiz questions which need to be changed and change the tone such that it perfectly fits the student abilities
Quiz_MCQs:
{quiz}
Just do the analysis.
Dont send the updated quiz.
Check from an expert English Writer of the above quiz:
"#;

/// The one-question example that anchors the model's output format.
pub fn response_json_example() -> String {
    let example = json!({
        "q1": {
            "mcq": "Question text",
            "options": {
                "A": "Option 1",
                "B": "Option 2",
                "C": "Option 3",
                "D": "Option 4"
            },
            "correct": "A"
        }
    });
    // A `Value` always serializes.
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

pub fn compose_quiz_prompt(params: &QuizRequestParameters) -> String {
    let number = params.question_count().to_string();
    let example = response_json_example();
    render(
        QUIZ_TEMPLATE,
        &[
            ("text", params.source_text()),
            ("number", &number),
            ("subject", params.subject()),
            ("tone", params.tone().label()),
            ("response_json", &example),
        ],
    )
}

/// The review only ever sees the subject and the raw quiz completion.
pub fn compose_review_prompt(subject: &str, quiz_text: &str) -> String {
    render(REVIEW_TEMPLATE, &[("subject", subject), ("quiz", quiz_text)])
}

/// Substitutes `{name}` placeholders in a single pass, so braces inside the
/// substituted values are never themselves treated as placeholders.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
