//! 批量试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量批改试卷。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建日志文件，根据配置创建判分和反馈服务
//! 2. **批量加载**：扫描并加载所有待批改的试卷（`Vec<ExamPaper>`）
//! 3. **并发控制**：使用 Semaphore 限制同时批改的试卷数量
//! 4. **分批处理**：将试卷分批次处理，每批完成后再开始下一批
//! 5. **报告输出**：每份试卷写一个 JSON 报告
//! 6. **全局统计**：汇总所有试卷的批改结果
//!
//! ## 设计特点
//!
//! - 每份试卷在独立任务中批改，任务之间不共享可变状态
//! - 判分服务只持有只读配置和 `Arc` 包装的客户端，可以直接 clone 给任务

use anyhow::Result;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::ExamPaper;
use crate::orchestrator::paper_processor;
use crate::services::{FeedbackService, GradingService};
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_papers_loaded, log_startup,
    print_final_stats,
};

/// 应用主结构
pub struct App {
    config: Config,
    grading: GradingService,
    feedback: FeedbackService,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let grading = GradingService::new(&config);
        let feedback = FeedbackService::new(grading.chain());

        Ok(Self {
            config,
            grading,
            feedback,
        })
    }

    /// 使用指定的服务创建应用
    pub fn with_services(config: Config, grading: GradingService, feedback: FeedbackService) -> Self {
        Self {
            config,
            grading,
            feedback,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        // 加载所有待批改的试卷
        let all_papers = self.load_papers().await?;

        if all_papers.is_empty() {
            warn!("⚠️ 没有找到待批改的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_papers_loaded(all_papers.len(), self.config.max_concurrent_sessions);

        let stats = self.process_all_papers(all_papers).await?;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            stats.average_score(),
            &self.config,
        );

        Ok(stats)
    }

    async fn load_papers(&self) -> Result<Vec<ExamPaper>> {
        info!("\n📁 正在扫描待批改的试卷...");
        Ok(crate::models::load_all_exam_papers(&self.config.exam_folder).await?)
    }

    /// 处理所有试卷
    async fn process_all_papers(&self, all_papers: Vec<ExamPaper>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_sessions.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_papers = all_papers.len();
        let total_batches = total_papers.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total: total_papers,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total_papers).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(total_papers);
            let batch_num = batch_start / batch_size + 1;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_papers,
            );

            let batch_result = self
                .process_batch(&all_papers[batch_start..batch_end], batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;
            stats.final_scores.extend(batch_result.final_scores);

            log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_papers: &[ExamPaper],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, paper) in batch_papers.iter().enumerate() {
            let paper_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let paper = paper.clone();
            let grading = self.grading.clone();
            let feedback = self.feedback.clone();
            let config = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let file_name = paper.report_file_name();

                let report = paper_processor::process_paper(
                    paper,
                    paper_index,
                    &grading,
                    &feedback,
                    &config,
                )
                .await?;

                let path =
                    paper_processor::write_report(&report, &file_name, &config.report_folder)?;
                info!("[试卷 {}] 📄 报告已写入: {}", paper_index, path.display());

                Ok::<f64, anyhow::Error>(report.breakdown.final_score)
            });
            batch_handles.push((paper_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        let (indices, handles): (Vec<usize>, Vec<_>) = batch_handles.into_iter().unzip();
        let outcomes = join_all(handles).await;

        for (paper_index, outcome) in indices.into_iter().zip(outcomes) {
            match outcome {
                Ok(Ok(final_score)) => {
                    result.success += 1;
                    result.final_scores.push(final_score);
                }
                Ok(Err(e)) => {
                    error!("[试卷 {}] ❌ 批改过程中发生错误: {}", paper_index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[试卷 {}] 任务执行失败: {}", paper_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 批改统计
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    pub final_scores: Vec<f64>,
}

impl ProcessingStats {
    pub fn average_score(&self) -> Option<f64> {
        if self.final_scores.is_empty() {
            None
        } else {
            Some(self.final_scores.iter().sum::<f64>() / self.final_scores.len() as f64)
        }
    }
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
    final_scores: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_run_grades_every_paper() {
        let root = std::env::temp_dir().join(format!("exam_grader_batch_{}", std::process::id()));
        let exam_folder = root.join("exams");
        let report_folder = root.join("reports");
        fs::create_dir_all(&exam_folder).unwrap();

        for (name, answer) in [("Quiz A", "true"), ("Quiz B", "false")] {
            let content = format!(
                r#"
name = "{name}"
subject = "Logic"

[[questions]]
id = "q1"
text = "Is the sky blue?"
type = "true_false"
correct_answer = "True"

[[answers]]
question_id = "q1"
answer_text = "{answer}"
"#
            );
            fs::write(exam_folder.join(format!("{name}.toml")), content).unwrap();
        }

        let config = Config {
            exam_folder: exam_folder.to_string_lossy().to_string(),
            report_folder: report_folder.to_string_lossy().to_string(),
            max_concurrent_sessions: 1,
            ..Config::default()
        };
        let app = App::with_services(
            config,
            GradingService::fallback_only(),
            FeedbackService::default(),
        );

        let stats = app.run().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.failed, 0);
        assert!(report_folder.join("Quiz A.report.json").exists());
        assert!(report_folder.join("Quiz B.report.json").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_same_named_papers_keep_separate_reports() {
        let root = std::env::temp_dir().join(format!("exam_grader_same_name_{}", std::process::id()));
        let exam_folder = root.join("exams");
        let report_folder = root.join("reports");
        fs::create_dir_all(&exam_folder).unwrap();

        for (file, answer) in [("a", "true"), ("b", "false")] {
            let content = format!(
                r#"
name = "Week 1 Quiz"

[[questions]]
id = "q1"
type = "true_false"
correct_answer = "True"

[[answers]]
question_id = "q1"
answer_text = "{answer}"
"#
            );
            fs::write(exam_folder.join(format!("{file}.toml")), content).unwrap();
        }

        let config = Config {
            exam_folder: exam_folder.to_string_lossy().to_string(),
            report_folder: report_folder.to_string_lossy().to_string(),
            max_concurrent_sessions: 2,
            ..Config::default()
        };
        let app = App::with_services(
            config,
            GradingService::fallback_only(),
            FeedbackService::default(),
        );

        let stats = app.run().await.unwrap();
        assert_eq!(stats.success, 2);

        let reports: Vec<_> = fs::read_dir(&report_folder).unwrap().collect();
        assert_eq!(reports.len(), 2);
        let a: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report_folder.join("a.report.json")).unwrap())
                .unwrap();
        let b: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report_folder.join("b.report.json")).unwrap())
                .unwrap();
        assert_eq!(a["breakdown"]["correct_answers"], 1);
        assert_eq!(b["breakdown"]["correct_answers"], 0);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_average_score() {
        let stats = ProcessingStats {
            final_scores: vec![8.0, 6.0],
            ..Default::default()
        };
        assert_eq!(stats.average_score(), Some(7.0));
        assert_eq!(ProcessingStats::default().average_score(), None);
    }
}
