use async_trait::async_trait;
use exam_grader::config::Config;
use exam_grader::error::OracleError;
use exam_grader::logger;
use exam_grader::{
    aggregate, AnswerSubmission, EvaluationSource, ExamSession, GradingOracle, GradingService,
    ModelTier, Question, QuestionType, TierChain,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 按顺序返回预设回复的 oracle
struct CannedOracle {
    replies: Mutex<VecDeque<Result<String, OracleError>>>,
}

impl CannedOracle {
    fn new(replies: Vec<Result<String, OracleError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait]
impl GradingOracle for CannedOracle {
    async fn complete(
        &self,
        tier: &ModelTier,
        _prompt: &str,
        _system_message: Option<&str>,
    ) -> Result<String, OracleError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(OracleError::EmptyContent {
                model: tier.model.clone(),
            }))
    }
}

fn tiers() -> Vec<ModelTier> {
    vec![ModelTier::new("primary"), ModelTier::new("secondary")]
}

fn questions() -> Vec<Question> {
    vec![
        Question::new("q1", QuestionType::MultipleChoice, "B) Paris")
            .with_text("What is the capital of France?")
            .with_options(["A) London", "B) Paris", "C) Berlin", "D) Madrid"])
            .with_difficulty(2),
        Question::new("q2", QuestionType::TrueFalse, "False")
            .with_text("The sun orbits the earth.")
            .with_difficulty(1),
        Question::new(
            "q3",
            QuestionType::Essay,
            "Photosynthesis converts light energy into chemical energy stored in glucose",
        )
        .with_difficulty(5),
    ]
}

#[tokio::test]
async fn test_session_with_oracle_and_fallback() {
    logger::init();

    let oracle = CannedOracle::new(vec![
        // q1: 第一级返回无法解析的内容，第二级成功
        Ok("Looks right to me".to_string()),
        Ok(r#"{"score": 9, "feedback": "Correct choice"}"#.to_string()),
        // q2: 两级都失败，走本地规则
        Err(OracleError::EmptyContent {
            model: "primary".to_string(),
        }),
        Ok("```\nnot json\n```".to_string()),
        // q3: 第一级成功
        Ok(r#"Evaluation: {"score": 7.5, "feedback": "Good", "reasoning": "Mentions glucose"}"#
            .to_string()),
    ]);
    let chain = TierChain::new(oracle, tiers(), Duration::from_secs(5)).unwrap();
    let mut session = ExamSession::new(questions(), "", GradingService::with_chain(chain));

    let graded = session
        .submit(
            AnswerSubmission::new("q1", "paris")
                .with_confidence(5)
                .with_time_taken(20),
        )
        .await
        .unwrap();
    assert_eq!(graded.result.score, 10.0);
    assert_eq!(graded.result.source, EvaluationSource::Oracle);

    let graded = session
        .submit(AnswerSubmission::new("q2", "false").with_time_taken(15))
        .await
        .unwrap();
    assert_eq!(graded.result.source, EvaluationSource::Fallback);
    assert!(graded.result.is_correct);

    let graded = session
        .submit(
            AnswerSubmission::new("q3", "Plants turn light into glucose")
                .with_confidence(3)
                .with_time_taken(400),
        )
        .await
        .unwrap();
    assert_eq!(graded.result.score, 7.5);
    assert!(graded.result.is_correct);
    assert!(graded.result.feedback.ends_with("Reasoning: Mentions glucose"));

    let breakdown = session.breakdown();
    assert_eq!(breakdown.questions_answered, 3);
    assert_eq!(breakdown.correct_answers, 3);
    assert_eq!(breakdown.basic_accuracy, 100.0);
    assert!(breakdown.final_score > 9.0 && breakdown.final_score <= 10.0);
    assert_eq!(breakdown.difficulty_distribution.len(), 3);
    assert_eq!(breakdown.time_statistics.total_time, 435);
}

#[test]
fn test_aggregate_matches_session_breakdown() {
    tokio_test::block_on(async {
        let mut session = ExamSession::new(questions(), "", GradingService::fallback_only());
        session
            .submit(AnswerSubmission::new("q1", "A"))
            .await
            .unwrap();
        session
            .submit(AnswerSubmission::new("q2", "F"))
            .await
            .unwrap();

        let from_session = session.breakdown();
        let direct = aggregate(session.answers(), session.questions());
        assert_eq!(from_session, direct);
        assert_eq!(from_session.correct_answers, 1);
        assert_eq!(session.progress().remaining_questions, 1);
    });
}

#[tokio::test]
#[ignore] // 需要配置 LLM_API_KEY，手动运行：cargo test -- --ignored
async fn test_live_oracle_grading() {
    logger::init();

    let config = Config::from_env();
    let service = GradingService::new(&config);
    assert!(service.chain().is_some(), "需要配置 LLM_API_KEY");

    let question = &questions()[0];
    let result = service
        .evaluate(&AnswerSubmission::new("q1", "B"), question, "")
        .await;

    assert!(result.is_correct);
    assert_eq!(result.score, 10.0);
}
