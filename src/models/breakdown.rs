use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 某一难度下的作答统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTally {
    pub total: usize,
    pub correct: usize,
}

/// 作答时间统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeStatistics {
    /// 总耗时（秒）
    pub total_time: u64,
    /// 只统计有耗时记录的题目
    pub average_time: f64,
}

/// 各分项折算后的分值
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// 满分 5
    pub accuracy_score: f64,
    /// 难题加成，可以为负
    pub difficulty_bonus: f64,
    /// 满分 1
    pub efficiency_score: f64,
    /// 满分 1
    pub confidence_score: f64,
}

/// 会话综合得分及明细
///
/// 纯粹由判分结果序列和题目元数据推导而来，每次查询都重新计算；
/// `final_score` 是唯一用于排名比较的数值，其余字段仅用于展示
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0.0 - 10.0
    pub final_score: f64,
    /// 没有任何作答时为 true，此时其余字段全为 0
    pub no_answers_submitted: bool,
    // 以下四项均为百分比
    pub basic_accuracy: f64,
    pub weighted_accuracy: f64,
    pub time_efficiency: f64,
    pub confidence_calibration: f64,
    /// 平均自评信心（百分比）
    pub average_confidence: f64,
    pub questions_answered: usize,
    pub correct_answers: usize,
    pub difficulty_distribution: BTreeMap<u8, DifficultyTally>,
    pub time_statistics: TimeStatistics,
    pub components: ScoreComponents,
}

impl ScoreBreakdown {
    /// 没有任何作答时的结果
    pub fn no_answers() -> Self {
        Self {
            no_answers_submitted: true,
            ..Self::default()
        }
    }
}

/// 考试进度视图
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_questions: usize,
    pub answered_questions: usize,
    pub remaining_questions: usize,
    pub progress_percentage: f64,
    pub correct_answers: usize,
    pub accuracy_percentage: f64,
    pub total_time_seconds: u64,
    pub average_time_per_question: f64,
    pub difficulty_breakdown: BTreeMap<u8, DifficultyTally>,
    /// 提前交卷时使用的简单得分：正确率 × 10
    pub basic_score: f64,
}
