//! 单个试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责批改单份试卷，是试卷级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **逐题提交**：按顺序把作答交给 `ExamSession` 判分
//! 2. **综合评分**：所有作答提交后计算综合得分和进度
//! 3. **学习反馈**：生成优点、不足和学习建议
//! 4. **报告输出**：把 `SessionReport` 写成 JSON 文件
//! 5. **统计输出**：记录判分成功/兜底/拒绝数量

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::exam::{ExamPaper, PerformanceFeedback, SessionReport};
use crate::services::{FeedbackRequest, FeedbackService, GradingService};
use crate::workflow::ExamSession;

/// 作答判分统计
#[derive(Debug, Default)]
pub struct AnswerStats {
    pub graded: usize,
    /// 其中由本地规则判分的数量
    pub fallback: usize,
    pub rejected: usize,
}

/// 批改单份试卷
///
/// # 参数
/// - `paper`: 试卷数据（题目 + 作答）
/// - `paper_index`: 试卷索引（用于日志）
/// - `grading`: 判分服务
/// - `feedback`: 学习反馈服务
/// - `config`: 配置
///
/// # 返回
/// 返回完整的批改报告
pub async fn process_paper(
    paper: ExamPaper,
    paper_index: usize,
    grading: &GradingService,
    feedback: &FeedbackService,
    config: &Config,
) -> Result<SessionReport> {
    log_paper_start(paper_index, &paper);

    let mut session = ExamSession::new(
        paper.questions.clone(),
        paper.material_context.clone(),
        grading.clone(),
    )
    .with_label(&paper.name, paper_index)
    .with_verbose_logging(config.verbose_logging);

    let mut stats = AnswerStats::default();
    let mut rejected_answers = Vec::new();

    for submission in paper.answers.iter().cloned() {
        let question_id = submission.question_id.clone();
        match session.submit(submission).await {
            Ok(graded) => {
                stats.graded += 1;
                if graded.result.is_fallback() {
                    stats.fallback += 1;
                }
            }
            Err(e) => {
                warn!("[试卷 {}] ⚠️ 作答 {} 被拒绝: {}", paper_index, question_id, e);
                stats.rejected += 1;
                rejected_answers.push(format!("{}: {}", question_id, e));
            }
        }
    }

    let breakdown = session.breakdown();
    let progress = session.progress();

    let performance = if breakdown.no_answers_submitted {
        PerformanceFeedback::default()
    } else {
        feedback
            .generate(FeedbackRequest {
                subject: &paper.subject,
                material_title: &paper.material_title,
                answers: session.answers(),
                questions: session.questions(),
                breakdown: &breakdown,
            })
            .await
    };

    log_paper_complete(paper_index, &stats, breakdown.final_score);

    Ok(SessionReport {
        name: paper.name,
        subject: paper.subject,
        answers: session.transcript(),
        progress,
        breakdown,
        feedback: performance,
        rejected_answers,
    })
}

/// 把报告写入 `report_folder`，返回报告文件路径
pub fn write_report(
    report: &SessionReport,
    file_name: &str,
    report_folder: &str,
) -> AppResult<PathBuf> {
    let folder = Path::new(report_folder);
    fs::create_dir_all(folder).map_err(|e| AppError::file_write_failed(report_folder, e))?;

    let path = folder.join(file_name);
    let path_str = path.display().to_string();
    let content = serde_json::to_string_pretty(report)
        .map_err(|e| AppError::file_write_failed(&path_str, e))?;
    fs::write(&path, content).map_err(|e| AppError::file_write_failed(&path_str, e))?;

    Ok(path)
}

// ========== 日志辅助函数 ==========

fn log_paper_start(paper_index: usize, paper: &ExamPaper) {
    info!("[试卷 {}] 开始批改", paper_index);
    info!("[试卷 {}] 名称: {}", paper_index, paper.name);
    if !paper.subject.is_empty() {
        info!("[试卷 {}] 科目: {}", paper_index, paper.subject);
    }
    info!(
        "[试卷 {}] 题目总数: {}, 作答数: {}",
        paper_index,
        paper.questions.len(),
        paper.answers.len()
    );
}

fn log_paper_complete(paper_index: usize, stats: &AnswerStats, final_score: f64) {
    info!(
        "[试卷 {}] 作答统计: 判分 {} (本地规则 {}), 拒绝 {}",
        paper_index, stats.graded, stats.fallback, stats.rejected
    );
    info!(
        "\n[试卷 {}] ✅ 批改完成，综合得分 {:.2}\n",
        paper_index, final_score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileError;
    use crate::models::question::{AnswerSubmission, Question, QuestionType};

    fn paper() -> ExamPaper {
        ExamPaper {
            name: "Biology/Unit 1".to_string(),
            subject: "Biology".to_string(),
            material_title: "Cells".to_string(),
            material_context: String::new(),
            questions: vec![
                Question::new("q1", QuestionType::TrueFalse, "False")
                    .with_text("Plant cells lack a cell wall.")
                    .with_explanation("Plant cells have a cellulose cell wall.")
                    .with_difficulty(1),
                Question::new("q2", QuestionType::MultipleChoice, "A) Nucleus")
                    .with_options(["A) Nucleus", "B) Ribosome"])
                    .with_difficulty(3),
            ],
            answers: vec![
                AnswerSubmission::new("q1", "false")
                    .with_confidence(4)
                    .with_time_taken(10),
                AnswerSubmission::new("q2", "nucleus").with_time_taken(200),
                AnswerSubmission::new("q3", "extra"),
            ],
            file_path: None,
        }
    }

    #[tokio::test]
    async fn test_process_paper_without_oracle() {
        let report = process_paper(
            paper(),
            1,
            &GradingService::fallback_only(),
            &FeedbackService::default(),
            &Config::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.answers.len(), 2);
        assert!(report.answers.iter().all(|a| a.is_correct()));
        assert_eq!(report.rejected_answers.len(), 1);
        assert!(report.rejected_answers[0].starts_with("q3"));
        assert_eq!(report.breakdown.basic_accuracy, 100.0);
        assert_eq!(report.progress.remaining_questions, 0);
        assert_eq!(report.feedback, PerformanceFeedback::default());
    }

    #[tokio::test]
    async fn test_write_report() {
        let paper = paper();
        let file_name = paper.report_file_name();
        let report = process_paper(
            paper,
            1,
            &GradingService::fallback_only(),
            &FeedbackService::default(),
            &Config::default(),
        )
        .await
        .unwrap();

        let folder = std::env::temp_dir().join(format!("exam_grader_reports_{}", std::process::id()));
        let path = write_report(&report, &file_name, &folder.to_string_lossy()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["name"], "Biology/Unit 1");
        assert!(value["breakdown"]["final_score"].is_number());
        assert_eq!(path.file_name().unwrap(), "Biology_Unit 1.report.json");

        let first = &value["answers"][0];
        assert_eq!(first["question_text"], "Plant cells lack a cell wall.");
        assert_eq!(first["explanation"], "Plant cells have a cellulose cell wall.");
        assert_eq!(first["submission"]["answer_text"], "false");
        assert_eq!(first["result"]["is_correct"], true);
        assert!(value["answers"][1].get("explanation").is_none());

        let _ = fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn test_write_report_into_file_path_fails() {
        let report = process_paper(
            paper(),
            1,
            &GradingService::fallback_only(),
            &FeedbackService::default(),
            &Config::default(),
        )
        .await
        .unwrap();

        // 报告目录位置已经被一个普通文件占用
        let blocker = std::env::temp_dir().join(format!("exam_grader_blocker_{}", std::process::id()));
        fs::write(&blocker, "not a folder").unwrap();

        let err = write_report(&report, "x.report.json", &blocker.to_string_lossy()).unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::WriteFailed { .. })
        ));

        let _ = fs::remove_file(&blocker);
    }
}
