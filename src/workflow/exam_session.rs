//! 考试会话 - 流程层
//!
//! 核心职责：按题目顺序接收作答、判分并保存结果
//!
//! - 每次提交只对应当前题目，判分结果按值追加到会话里
//! - 综合得分和进度每次查询都重新计算，不做缓存

use tracing::{debug, info};

use crate::error::{AppResult, SessionError};
use crate::models::breakdown::{ProgressSummary, ScoreBreakdown};
use crate::models::evaluation::GradedAnswer;
use crate::models::exam::ReportEntry;
use crate::models::question::{AnswerSubmission, Question};
use crate::services::{scoring_service, GradingService};
use crate::workflow::session_ctx::SessionCtx;

/// 单场考试的作答状态
pub struct ExamSession {
    paper_name: String,
    paper_index: usize,
    questions: Vec<Question>,
    material_context: String,
    answers: Vec<GradedAnswer>,
    grading: GradingService,
    verbose_logging: bool,
}

impl ExamSession {
    pub fn new(
        questions: Vec<Question>,
        material_context: impl Into<String>,
        grading: GradingService,
    ) -> Self {
        Self {
            paper_name: String::new(),
            paper_index: 0,
            questions,
            material_context: material_context.into(),
            answers: Vec::new(),
            grading,
            verbose_logging: false,
        }
    }

    /// 设置日志中显示的试卷信息
    pub fn with_label(mut self, paper_name: impl Into<String>, paper_index: usize) -> Self {
        self.paper_name = paper_name.into();
        self.paper_index = paper_index;
        self
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[GradedAnswer] {
        &self.answers
    }

    /// 下一道待作答的题目
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.answers.len())
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() >= self.questions.len()
    }

    /// 提交当前题目的作答并判分
    ///
    /// 所有题目都已作答或题目 ID 不一致时返回错误，会话状态不变
    pub async fn submit(&mut self, submission: AnswerSubmission) -> AppResult<&GradedAnswer> {
        let index = self.answers.len();
        let question = self
            .questions
            .get(index)
            .ok_or(SessionError::NoMoreQuestions {
                total: self.questions.len(),
            })?;

        if submission.question_id != question.id {
            return Err(SessionError::QuestionMismatch {
                expected: question.id.clone(),
                actual: submission.question_id.clone(),
            }
            .into());
        }

        let ctx = SessionCtx::new(&self.paper_name, self.paper_index, index + 1, &question.id);
        if self.verbose_logging {
            debug!("{} 作答: {}", ctx, submission.answer_text);
        }

        let result = self
            .grading
            .evaluate(&submission, question, &self.material_context)
            .await;

        info!(
            "{} {} {:.1} 分 ({:?})",
            ctx,
            if result.is_correct { "✓" } else { "✗" },
            result.score,
            result.source
        );

        self.answers.push(GradedAnswer::new(submission, result));
        Ok(&self.answers[index])
    }

    /// 当前的综合得分
    pub fn breakdown(&self) -> ScoreBreakdown {
        scoring_service::aggregate(&self.answers, &self.questions)
    }

    /// 当前的进度
    pub fn progress(&self) -> ProgressSummary {
        scoring_service::progress(&self.answers, &self.questions)
    }

    /// 带题目信息的作答记录，用于报告
    pub fn transcript(&self) -> Vec<ReportEntry> {
        self.answers
            .iter()
            .zip(&self.questions)
            .map(|(answer, question)| ReportEntry::new(question, answer.clone()))
            .collect()
    }
}
