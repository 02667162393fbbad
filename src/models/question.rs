use serde::{Deserialize, Serialize};
use std::fmt;

/// 题型
///
/// 判分器和提示词构建都对它做穷尽匹配，新增题型会在编译期暴露所有需要改动的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// 客观题（只有对错两种分数）
    pub fn is_objective(self) -> bool {
        match self {
            QuestionType::MultipleChoice | QuestionType::TrueFalse => true,
            QuestionType::ShortAnswer | QuestionType::Essay => false,
        }
    }

    /// 序列化用的标签，如 `multiple_choice`
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::Essay => "essay",
        }
    }

    /// 面向人的名称，如 `multiple choice`
    pub fn display_name(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::TrueFalse => "true false",
            QuestionType::ShortAnswer => "short answer",
            QuestionType::Essay => "essay",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 题目（由调用方持有，判分期间不可变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    /// 难度 1-5
    #[serde(default = "default_difficulty")]
    pub difficulty_level: u8,
}

fn default_difficulty() -> u8 {
    3
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        question_type: QuestionType,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            question_type,
            options: None,
            correct_answer: correct_answer.into(),
            explanation: String::new(),
            difficulty_level: default_difficulty(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty_level: u8) -> Self {
        self.difficulty_level = difficulty_level;
        self
    }

    /// 选项列表，缺省为空切片
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }
}

/// 自评信心取值范围
pub const MIN_CONFIDENCE: u8 = 1;
pub const MAX_CONFIDENCE: u8 = 5;

/// 学生提交的一次作答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: String,
    #[serde(default)]
    pub answer_text: String,
    /// 自评信心 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<u8>,
    /// 作答耗时（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken_seconds: Option<u32>,
}

impl AnswerSubmission {
    pub fn new(question_id: impl Into<String>, answer_text: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer_text: answer_text.into(),
            confidence_level: None,
            time_taken_seconds: None,
        }
    }

    pub fn with_confidence(mut self, confidence_level: u8) -> Self {
        self.confidence_level = Some(confidence_level);
        self
    }

    pub fn with_time_taken(mut self, seconds: u32) -> Self {
        self.time_taken_seconds = Some(seconds);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_type_serde_labels() {
        let json = serde_json::to_string(&QuestionType::MultipleChoice).unwrap();
        assert_eq!(json, "\"multiple_choice\"");
        let parsed: QuestionType = serde_json::from_str("\"true_false\"").unwrap();
        assert_eq!(parsed, QuestionType::TrueFalse);
        assert!(serde_json::from_str::<QuestionType>("\"matching\"").is_err());
    }

    #[test]
    fn test_question_defaults_when_fields_missing() {
        let question: Question =
            serde_json::from_str(r#"{"id": "q1", "type": "essay"}"#).unwrap();
        assert_eq!(question.difficulty_level, 3);
        assert!(question.options().is_empty());
        assert!(question.correct_answer.is_empty());
    }

    #[test]
    fn test_objective_types() {
        assert!(QuestionType::MultipleChoice.is_objective());
        assert!(QuestionType::TrueFalse.is_objective());
        assert!(!QuestionType::ShortAnswer.is_objective());
        assert!(!QuestionType::Essay.is_objective());
    }
}
