//! # Exam Grader
//!
//! 试卷作答判分与综合评分引擎
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 外部客户端层（Clients）
//! - `clients/` - 持有外部资源（LLM API 客户端），只暴露能力
//! - `GradingOracle` - 评分 oracle 抽象，输入提示词，返回自由文本
//! - `LlmClient` - 基于 async-openai 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个作答或单个结果序列
//! - `matching_service` - 按题型的本地规则判分（兜底）
//! - `GradingService` - 本地规则 + 模型梯队的判分编排
//! - `scoring_service` - 综合得分与进度计算（纯函数）
//! - `FeedbackService` - 考后学习反馈
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一场考试"的作答流程
//! - `ExamSession` - 按题目顺序提交作答并保存判分结果
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量试卷处理器，管理并发
//! - `orchestrator/paper_processor` - 单份试卷处理器，生成报告
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GradingOracle, LlmClient, ModelTier};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    AnswerSubmission, EvaluationResult, EvaluationSource, ExamPaper, GradedAnswer,
    PerformanceFeedback, Question, QuestionType, ReportEntry, ScoreBreakdown, SessionReport,
};
pub use orchestrator::{process_paper, App};
pub use services::{aggregate, answer_matches, FeedbackService, GradingService, TierChain};
pub use workflow::ExamSession;
