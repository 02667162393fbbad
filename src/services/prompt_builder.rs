//! 判分提示词构建
//!
//! 客观题只允许 0 / 10 两种分数，主观题按 1-10 分档评分

use crate::models::question::{AnswerSubmission, Question, QuestionType};
use crate::utils::logging::truncate_text;

/// 参考资料在提示词中保留的最大字符数
const MATERIAL_CONTEXT_LIMIT: usize = 2000;

pub const GRADING_SYSTEM_MESSAGE: &str =
    "You are an expert academic examiner. You grade student answers fairly and reply with JSON only.";

/// 构建判分提示词
pub fn build_grading_prompt(
    submission: &AnswerSubmission,
    question: &Question,
    material_context: &str,
) -> String {
    let material = material_section(material_context);
    match question.question_type {
        QuestionType::MultipleChoice | QuestionType::TrueFalse => {
            build_objective_prompt(submission, question, &material)
        }
        QuestionType::ShortAnswer | QuestionType::Essay => {
            build_subjective_prompt(submission, question, &material)
        }
    }
}

fn material_section(material_context: &str) -> String {
    let trimmed = material_context.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(
            "\nREFERENCE MATERIAL:\n{}\n",
            truncate_text(trimmed, MATERIAL_CONTEXT_LIMIT)
        )
    }
}

fn build_objective_prompt(submission: &AnswerSubmission, question: &Question, material: &str) -> String {
    let options_text = if question.options().is_empty() {
        String::new()
    } else {
        format!("\nOPTIONS: {}", question.options().join(", "))
    };
    let type_name = question.question_type.display_name();

    format!(
        r#"You are an expert academic examiner. Evaluate this {type_name} question.
{material}
QUESTION: {question_text}{options_text}
CORRECT ANSWER: {correct}
STUDENT ANSWER: {student}
EXPLANATION: {explanation}

SCORING RULES FOR {type_upper}:
- If the student selected the correct answer (either by letter like "A" or by typing the full text): Score = 10.0
- If the student selected an incorrect answer: Score = 0.0
- No partial credit for objective questions
- Accept both letter answers ("A", "B", "C", "D") and full text answers

For multiple choice, the student might answer with:
1. Just the letter: "A", "B", "C", or "D"
2. The full option text: e.g., if option A is "Electric field", they might type "Electric field"
3. Partial text that clearly indicates the correct option

Check if the student's answer matches the correct option in any of these formats.

Respond with JSON only:
{{"score": 10.0, "feedback": "Correct! The student selected the right answer.", "reasoning": "Student chose the correct option"}}"#,
        type_name = type_name,
        material = material,
        question_text = question.text,
        options_text = options_text,
        correct = question.correct_answer,
        student = submission.answer_text,
        explanation = question.explanation,
        type_upper = question.question_type.as_str().to_uppercase(),
    )
}

fn build_subjective_prompt(submission: &AnswerSubmission, question: &Question, material: &str) -> String {
    format!(
        r#"You are an expert academic examiner. Evaluate this student's answer on a scale of 1-10.
{material}
QUESTION TYPE: {question_type}
QUESTION: {question_text}

CORRECT ANSWER: {correct}
STUDENT ANSWER: {student}

EXPLANATION: {explanation}

For short answers and essays: Evaluate conceptual understanding and key points covered, not verbatim wording.

SCORING:
- 9-10: Excellent (comprehensive, accurate understanding)
- 7-8: Good (mostly correct with good understanding)
- 5-6: Satisfactory (basic understanding with some gaps)
- 3-4: Needs improvement (limited understanding, some errors)
- 1-2: Poor (significant misunderstanding or major errors)

Respond with JSON only:
{{"score": 8.0, "feedback": "Your detailed feedback here", "reasoning": "Brief explanation"}}"#,
        material = material,
        question_type = question.question_type,
        question_text = question.text,
        correct = question.correct_answer,
        student = submission.answer_text,
        explanation = question.explanation,
    )
}
