//! 判分编排
//!
//! 先用本地规则算出兜底结果，再按模型梯队请求大模型判分。
//! 任何一级模型成功即采用它的结果；全部失败或未配置大模型时返回兜底结果。
//! `evaluate` 永远不会返回错误。

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::evaluation::{EvaluationResult, EvaluationSource};
use crate::models::question::{AnswerSubmission, Question, QuestionType};
use crate::services::matching_service::answer_matches;
use crate::services::prompt_builder::{build_grading_prompt, GRADING_SYSTEM_MESSAGE};
use crate::services::response_parser::GradingPayload;
use crate::services::tier_chain::TierChain;

/// 大模型打分的合法范围
const MIN_ORACLE_SCORE: f64 = 1.0;
const MAX_ORACLE_SCORE: f64 = 10.0;
/// 客观题二值化阈值
const OBJECTIVE_PASS_SCORE: f64 = 5.0;
/// 主观题判为正确的最低分
const SUBJECTIVE_PASS_SCORE: f64 = 6.0;

/// 兜底分数
const OBJECTIVE_CORRECT_SCORE: f64 = 10.0;
const OBJECTIVE_INCORRECT_SCORE: f64 = 0.0;
const SUBJECTIVE_MATCH_SCORE: f64 = 8.5;
const SUBJECTIVE_MISMATCH_SCORE: f64 = 4.5;

const DEFAULT_ORACLE_FEEDBACK: &str = "Evaluation completed.";

/// 判分服务
#[derive(Clone, Default)]
pub struct GradingService {
    chain: Option<TierChain>,
}

impl GradingService {
    /// 根据配置创建；未配置大模型时只使用本地规则
    pub fn new(config: &Config) -> Self {
        let chain = TierChain::from_config(config);
        if chain.is_none() {
            info!("ℹ️ 未配置大模型，判分将只使用本地规则");
        }
        Self { chain }
    }

    pub fn with_chain(chain: TierChain) -> Self {
        Self { chain: Some(chain) }
    }

    /// 只使用本地规则判分
    pub fn fallback_only() -> Self {
        Self { chain: None }
    }

    pub fn chain(&self) -> Option<&TierChain> {
        self.chain.as_ref()
    }

    /// 对一道题的作答进行判分
    pub async fn evaluate(
        &self,
        submission: &AnswerSubmission,
        question: &Question,
        material_context: &str,
    ) -> EvaluationResult {
        let matched = answer_matches(
            question.question_type,
            &submission.answer_text,
            &question.correct_answer,
            question.options(),
        );
        let fallback = fallback_result(question.question_type, matched);

        let Some(chain) = &self.chain else {
            debug!("题目 {} 使用本地规则判分: {}", question.id, matched);
            return fallback;
        };

        let prompt = build_grading_prompt(submission, question, material_context);
        match chain
            .first_parsed(&prompt, Some(GRADING_SYSTEM_MESSAGE), GradingPayload::parse)
            .await
        {
            Some(success) => {
                let result = oracle_result(question.question_type, success.value);
                info!(
                    "✅ 题目 {} 由 {} 判分: {:.1} 分",
                    question.id, success.model, result.score
                );
                result
            }
            None => {
                warn!("🔄 题目 {} 所有模型均失败，使用本地规则判分", question.id);
                fallback
            }
        }
    }
}

/// 本地规则的判分结果
pub fn fallback_result(question_type: QuestionType, matched: bool) -> EvaluationResult {
    if question_type.is_objective() {
        EvaluationResult {
            score: if matched {
                OBJECTIVE_CORRECT_SCORE
            } else {
                OBJECTIVE_INCORRECT_SCORE
            },
            is_correct: matched,
            feedback: format!(
                "{} answer for {} question.",
                if matched { "Correct" } else { "Incorrect" },
                question_type.display_name()
            ),
            source: EvaluationSource::Fallback,
        }
    } else {
        EvaluationResult {
            score: if matched {
                SUBJECTIVE_MATCH_SCORE
            } else {
                SUBJECTIVE_MISMATCH_SCORE
            },
            is_correct: matched,
            feedback: format!(
                "Smart evaluation completed. Answer appears {} based on content analysis.",
                if matched { "correct" } else { "incorrect" }
            ),
            source: EvaluationSource::Fallback,
        }
    }
}

/// 把大模型返回的数据整理成判分结果
fn oracle_result(question_type: QuestionType, payload: GradingPayload) -> EvaluationResult {
    let clamped = payload.score.clamp(MIN_ORACLE_SCORE, MAX_ORACLE_SCORE);

    let (score, is_correct) = if question_type.is_objective() {
        let score = if clamped >= OBJECTIVE_PASS_SCORE {
            OBJECTIVE_CORRECT_SCORE
        } else {
            OBJECTIVE_INCORRECT_SCORE
        };
        (score, score == OBJECTIVE_CORRECT_SCORE)
    } else {
        (clamped, clamped >= SUBJECTIVE_PASS_SCORE)
    };

    let mut feedback = payload
        .feedback
        .unwrap_or_else(|| DEFAULT_ORACLE_FEEDBACK.to_string());
    if let Some(reasoning) = payload.reasoning {
        feedback.push_str("\n\nReasoning: ");
        feedback.push_str(&reasoning);
    }

    EvaluationResult {
        score,
        is_correct,
        feedback,
        source: EvaluationSource::Oracle,
    }
}
