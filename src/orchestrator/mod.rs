//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量批改和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量试卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载试卷（Vec<ExamPaper>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `paper_processor` - 单个试卷处理器
//! - 把单份试卷的作答逐题交给 ExamSession
//! - 计算综合得分、生成学习反馈
//! - 写出 JSON 报告
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ExamPaper>)
//!     ↓
//! paper_processor (处理 Vec<AnswerSubmission>)
//!     ↓
//! workflow::ExamSession (处理单个作答)
//!     ↓
//! services (能力层：matching / grading / scoring / feedback)
//!     ↓
//! clients (外部大模型)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，paper_processor 管单份
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务逻辑**：只做调度和统计，不做具体判分

pub mod batch_processor;
pub mod paper_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use paper_processor::{process_paper, write_report, AnswerStats};
