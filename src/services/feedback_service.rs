//! 考后学习反馈
//!
//! 根据综合得分和逐题表现，请求大模型给出优点、不足与学习建议。
//! 与判分共用同一个模型梯队，全部失败时返回固定的默认反馈。

use serde_json::json;
use tracing::{info, warn};

use crate::models::breakdown::ScoreBreakdown;
use crate::models::evaluation::GradedAnswer;
use crate::models::exam::PerformanceFeedback;
use crate::models::question::Question;
use crate::services::response_parser::{parse_structured, string_list_field};
use crate::services::tier_chain::TierChain;

const FEEDBACK_MAX_TOKENS: u32 = 1500;
const FEEDBACK_TEMPERATURE: f32 = 0.7;

const FEEDBACK_SYSTEM_MESSAGE: &str =
    "You are an expert academic tutor providing personalized feedback to students.";

/// 生成反馈所需的考试信息
#[derive(Debug, Clone, Copy)]
pub struct FeedbackRequest<'a> {
    pub subject: &'a str,
    pub material_title: &'a str,
    pub answers: &'a [GradedAnswer],
    pub questions: &'a [Question],
    pub breakdown: &'a ScoreBreakdown,
}

#[derive(Clone, Default)]
pub struct FeedbackService {
    chain: Option<TierChain>,
}

impl FeedbackService {
    pub fn new(chain: Option<&TierChain>) -> Self {
        Self {
            chain: chain.map(|c| c.with_sampling(FEEDBACK_MAX_TOKENS, FEEDBACK_TEMPERATURE)),
        }
    }

    /// 生成学习反馈，不会失败
    pub async fn generate(&self, request: FeedbackRequest<'_>) -> PerformanceFeedback {
        let Some(chain) = &self.chain else {
            return PerformanceFeedback::default();
        };

        let prompt = build_feedback_prompt(&request);
        match chain
            .first_parsed(&prompt, Some(FEEDBACK_SYSTEM_MESSAGE), parse_feedback)
            .await
        {
            Some(success) => {
                info!("💬 学习反馈由 {} 生成", success.model);
                success.value
            }
            None => {
                warn!("🔄 学习反馈生成失败，使用默认反馈");
                PerformanceFeedback::default()
            }
        }
    }
}

/// 解析反馈回复；三个列表都为空时视为无效
pub fn parse_feedback(response: &str) -> Option<PerformanceFeedback> {
    let (_, map) = parse_structured(response)?;
    let feedback = PerformanceFeedback {
        strengths: string_list_field(&map, "strengths"),
        weaknesses: string_list_field(&map, "weaknesses"),
        recommendations: string_list_field(&map, "recommendations"),
    };

    let is_empty = feedback.strengths.is_empty()
        && feedback.weaknesses.is_empty()
        && feedback.recommendations.is_empty();
    (!is_empty).then_some(feedback)
}

fn build_feedback_prompt(request: &FeedbackRequest<'_>) -> String {
    let breakdown = request.breakdown;

    let question_analysis: Vec<_> = request
        .answers
        .iter()
        .zip(request.questions)
        .map(|(answer, question)| {
            json!({
                "question_type": question.question_type.as_str(),
                "difficulty": question.difficulty_level,
                "correct": answer.is_correct(),
                "confidence": answer.submission.confidence_level.unwrap_or(3),
                "time_taken": answer.submission.time_taken_seconds.unwrap_or(0),
            })
        })
        .collect();

    let question_json =
        serde_json::to_string_pretty(&question_analysis).unwrap_or_else(|_| "[]".to_string());
    let difficulty_json = serde_json::to_string_pretty(&breakdown.difficulty_distribution)
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are an expert academic tutor analyzing a student's exam performance. Provide personalized feedback.

EXAM PERFORMANCE SUMMARY:
Subject: {subject}
Material: {material}
Final Score: {final_score}/10
Overall Accuracy: {accuracy}%
Questions Answered: {answered}
Time Efficiency: {time}%
Confidence Calibration: {calibration}%

DETAILED QUESTION ANALYSIS:
{question_json}

DIFFICULTY BREAKDOWN:
{difficulty_json}

Provide specific, actionable feedback in the following format:

{{
    "strengths": ["2-3 specific strengths, covering content knowledge and exam-taking skills"],
    "weaknesses": ["2-3 specific, constructive areas for improvement"],
    "recommendations": ["3-4 actionable study recommendations specific to the subject"]
}}

Consider the student's confidence calibration, time management, and performance across difficulty levels."#,
        subject = request.subject,
        material = request.material_title,
        final_score = breakdown.final_score,
        accuracy = breakdown.basic_accuracy,
        answered = breakdown.questions_answered,
        time = breakdown.time_efficiency,
        calibration = breakdown.confidence_calibration,
        question_json = question_json,
        difficulty_json = difficulty_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluation::{EvaluationResult, EvaluationSource};
    use crate::models::question::{AnswerSubmission, QuestionType};
    use crate::services::scoring_service::aggregate;
    use crate::services::tier_chain::tests::{three_tiers, ScriptedOracle};
    use std::sync::Arc;
    use std::time::Duration;

    fn sample() -> (Vec<GradedAnswer>, Vec<Question>) {
        let questions = vec![
            Question::new("q1", QuestionType::TrueFalse, "True").with_difficulty(4),
        ];
        let answers = vec![GradedAnswer::new(
            AnswerSubmission::new("q1", "true").with_confidence(5),
            EvaluationResult {
                score: 10.0,
                is_correct: true,
                feedback: String::new(),
                source: EvaluationSource::Fallback,
            },
        )];
        (answers, questions)
    }

    #[test]
    fn test_parse_feedback() {
        let feedback = parse_feedback(
            r#"Here you go: {"strengths": ["Good recall"], "weaknesses": [], "recommendations": ["Practice essays"]}"#,
        )
        .unwrap();
        assert_eq!(feedback.strengths, vec!["Good recall"]);
        assert!(feedback.weaknesses.is_empty());
        assert_eq!(feedback.recommendations, vec!["Practice essays"]);

        assert!(parse_feedback(r#"{"summary": "fine"}"#).is_none());
        assert!(parse_feedback("no feedback").is_none());
    }

    #[test]
    fn test_prompt_contains_summary() {
        let (answers, questions) = sample();
        let breakdown = aggregate(&answers, &questions);
        let prompt = build_feedback_prompt(&FeedbackRequest {
            subject: "Physics",
            material_title: "Optics",
            answers: &answers,
            questions: &questions,
            breakdown: &breakdown,
        });
        assert!(prompt.contains("Subject: Physics"));
        assert!(prompt.contains("Material: Optics"));
        assert!(prompt.contains("\"question_type\": \"true_false\""));
        assert!(prompt.contains("Overall Accuracy: 100%"));
    }

    #[tokio::test]
    async fn test_generate_uses_oracle_then_default() {
        let (answers, questions) = sample();
        let breakdown = aggregate(&answers, &questions);
        let request = FeedbackRequest {
            subject: "Physics",
            material_title: "Optics",
            answers: &answers,
            questions: &questions,
            breakdown: &breakdown,
        };

        let oracle = Arc::new(ScriptedOracle::replying(&[
            "garbage",
            r#"{"strengths": ["Confident"], "weaknesses": ["Speed"], "recommendations": ["Timed drills"]}"#,
        ]));
        let chain = TierChain::new(oracle.clone(), three_tiers(), Duration::from_secs(5)).unwrap();
        let feedback = FeedbackService::new(Some(&chain)).generate(request).await;
        assert_eq!(feedback.weaknesses, vec!["Speed"]);
        assert_eq!(oracle.calls(), vec!["fast", "general"]);

        let oracle = Arc::new(ScriptedOracle::replying(&["a", "b", "c"]));
        let chain = TierChain::new(oracle, three_tiers(), Duration::from_secs(5)).unwrap();
        let feedback = FeedbackService::new(Some(&chain)).generate(request).await;
        assert_eq!(feedback, PerformanceFeedback::default());

        let feedback = FeedbackService::new(None).generate(request).await;
        assert_eq!(feedback, PerformanceFeedback::default());
    }
}
