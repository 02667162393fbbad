use serde::{Deserialize, Serialize};

use crate::models::question::AnswerSubmission;

/// 判分结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    /// 大模型判分
    Oracle,
    /// 本地规则兜底
    Fallback,
}

/// 单题判分结果，生成后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 0.0 - 10.0
    pub score: f64,
    pub is_correct: bool,
    pub feedback: String,
    pub source: EvaluationSource,
}

impl EvaluationResult {
    pub fn is_fallback(&self) -> bool {
        self.source == EvaluationSource::Fallback
    }
}

/// 一次作答及其判分结果，按题目顺序追加到会话里
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub submission: AnswerSubmission,
    pub result: EvaluationResult,
}

impl GradedAnswer {
    pub fn new(submission: AnswerSubmission, result: EvaluationResult) -> Self {
        Self { submission, result }
    }

    pub fn is_correct(&self) -> bool {
        self.result.is_correct
    }
}
