//! 综合评分
//!
//! 把一次考试的判分结果序列与题目元数据合成 0-10 的综合得分：
//!
//! ```text
//! final = 10 × (0.5 × 正确率 + 0.3 × 难度加权正确率 + 0.1 × 平均用时得分 + 0.1 × 平均自信度校准)
//! ```
//!
//! 这里只做纯计算，不访问任何外部资源，可以在考试进行中随时重复调用。

use phf::phf_map;
use std::collections::BTreeMap;

use crate::models::breakdown::{
    DifficultyTally, ProgressSummary, ScoreBreakdown, ScoreComponents, TimeStatistics,
};
use crate::models::evaluation::GradedAnswer;
use crate::models::question::{Question, MAX_CONFIDENCE, MIN_CONFIDENCE};

/// 各难度的预期用时（秒）
static EXPECTED_SECONDS: phf::Map<u8, u32> = phf_map! {
    1u8 => 30,
    2u8 => 45,
    3u8 => 60,
    4u8 => 90,
    5u8 => 120,
};

/// 各难度的权重
static DIFFICULTY_WEIGHTS: phf::Map<u8, f64> = phf_map! {
    1u8 => 1.0,
    2u8 => 1.2,
    3u8 => 1.5,
    4u8 => 2.0,
    5u8 => 2.5,
};

const DEFAULT_EXPECTED_SECONDS: u32 = 60;
const DEFAULT_DIFFICULTY_WEIGHT: f64 = 1.5;
/// 找不到对应题目时按中等难度计算用时
const DEFAULT_DIFFICULTY: u8 = 3;
const DEFAULT_CONFIDENCE: u8 = 3;

const ACCURACY_WEIGHT: f64 = 0.5;
const WEIGHTED_ACCURACY_WEIGHT: f64 = 0.3;
const TIME_WEIGHT: f64 = 0.1;
const CALIBRATION_WEIGHT: f64 = 0.1;

pub fn expected_seconds(difficulty: u8) -> u32 {
    EXPECTED_SECONDS
        .get(&difficulty)
        .copied()
        .unwrap_or(DEFAULT_EXPECTED_SECONDS)
}

pub fn difficulty_weight(difficulty: u8) -> f64 {
    DIFFICULTY_WEIGHTS
        .get(&difficulty)
        .copied()
        .unwrap_or(DEFAULT_DIFFICULTY_WEIGHT)
}

/// 单题用时得分
///
/// 没有用时记录（或为 0）记 0.5；不超过预期 1.0；不超过两倍预期 0.8；否则 0.6
pub fn time_efficiency(time_taken_seconds: Option<u32>, difficulty: u8) -> f64 {
    let expected = expected_seconds(difficulty);
    match time_taken_seconds {
        None | Some(0) => 0.5,
        Some(t) if t <= expected => 1.0,
        Some(t) if t <= expected.saturating_mul(2) => 0.8,
        Some(_) => 0.6,
    }
}

/// 单题自信度校准得分
pub fn confidence_calibration(is_correct: bool, confidence: u8) -> f64 {
    match (is_correct, confidence) {
        (true, c) if c >= 4 => 1.0,
        (false, c) if c <= 2 => 0.8,
        (true, c) if c >= 3 => 0.9,
        (false, c) if c <= 3 => 0.6,
        _ => 0.3,
    }
}

/// 自信度（1-5）归一化到 [0, 1]
fn normalized_confidence(confidence: u8) -> f64 {
    (f64::from(confidence) - 1.0) / 4.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 按题目顺序统计各难度的作答与正确数，超出题目列表的作答不计入
fn difficulty_tallies(answers: &[GradedAnswer], questions: &[Question]) -> BTreeMap<u8, DifficultyTally> {
    let mut tallies: BTreeMap<u8, DifficultyTally> = BTreeMap::new();
    for (answer, question) in answers.iter().zip(questions) {
        let tally = tallies.entry(question.difficulty_level).or_default();
        tally.total += 1;
        if answer.is_correct() {
            tally.correct += 1;
        }
    }
    tallies
}

fn time_statistics(answers: &[GradedAnswer]) -> TimeStatistics {
    let recorded: Vec<f64> = answers
        .iter()
        .filter_map(|a| a.submission.time_taken_seconds)
        .filter(|&t| t > 0)
        .map(f64::from)
        .collect();

    TimeStatistics {
        total_time: answers
            .iter()
            .filter_map(|a| a.submission.time_taken_seconds)
            .map(u64::from)
            .sum(),
        average_time: mean(&recorded),
    }
}

/// 计算综合得分
///
/// `answers` 与 `questions` 按下标对齐；空输入返回带“未作答”标记的 0 分结果。
/// 同样的输入总是得到完全相同的结果。
pub fn aggregate(answers: &[GradedAnswer], questions: &[Question]) -> ScoreBreakdown {
    if answers.is_empty() {
        return ScoreBreakdown::no_answers();
    }

    let total = answers.len();
    let correct = answers.iter().filter(|a| a.is_correct()).count();
    let accuracy = correct as f64 / total as f64;

    let mut time_scores = Vec::with_capacity(total);
    let mut calibration_scores = Vec::with_capacity(total);
    let mut confidences = Vec::with_capacity(total);
    let mut total_weight = 0.0;
    let mut correct_weight = 0.0;

    for (index, answer) in answers.iter().enumerate() {
        let question = questions.get(index);
        let difficulty = question.map_or(DEFAULT_DIFFICULTY, |q| q.difficulty_level);

        time_scores.push(time_efficiency(answer.submission.time_taken_seconds, difficulty));

        let confidence = answer
            .submission
            .confidence_level
            .map_or(DEFAULT_CONFIDENCE, |c| c.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE));
        calibration_scores.push(confidence_calibration(answer.is_correct(), confidence));
        confidences.push(normalized_confidence(confidence));

        if question.is_some() {
            let weight = difficulty_weight(difficulty);
            total_weight += weight;
            if answer.is_correct() {
                correct_weight += weight;
            }
        }
    }

    let weighted_accuracy = if total_weight > 0.0 {
        correct_weight / total_weight
    } else {
        0.0
    };
    let avg_time = mean(&time_scores);
    let avg_calibration = mean(&calibration_scores);

    let final_score = (ACCURACY_WEIGHT * accuracy
        + WEIGHTED_ACCURACY_WEIGHT * weighted_accuracy
        + TIME_WEIGHT * avg_time
        + CALIBRATION_WEIGHT * avg_calibration)
        * 10.0;

    ScoreBreakdown {
        final_score: round_to(final_score.clamp(0.0, 10.0), 2),
        no_answers_submitted: false,
        basic_accuracy: round_to(accuracy * 100.0, 1),
        weighted_accuracy: round_to(weighted_accuracy * 100.0, 1),
        time_efficiency: round_to(avg_time * 100.0, 1),
        confidence_calibration: round_to(avg_calibration * 100.0, 1),
        average_confidence: round_to(mean(&confidences) * 100.0, 1),
        questions_answered: total,
        correct_answers: correct,
        difficulty_distribution: difficulty_tallies(answers, questions),
        time_statistics: time_statistics(answers),
        components: ScoreComponents {
            accuracy_score: round_to(accuracy * 5.0, 2),
            difficulty_bonus: round_to((weighted_accuracy - accuracy) * 5.0, 2),
            efficiency_score: round_to(avg_time, 2),
            confidence_score: round_to(avg_calibration, 2),
        },
    }
}

/// 考试进度视图；`basic_score` 为提前交卷时使用的正确率 × 10
pub fn progress(answers: &[GradedAnswer], questions: &[Question]) -> ProgressSummary {
    let total_questions = questions.len();
    let answered = answers.len();
    let correct = answers.iter().filter(|a| a.is_correct()).count();

    let accuracy = if answered > 0 {
        correct as f64 / answered as f64
    } else {
        0.0
    };
    let progress = if total_questions > 0 {
        answered as f64 / total_questions as f64
    } else {
        0.0
    };
    let total_time = time_statistics(answers).total_time;
    let average_time = if answered > 0 {
        total_time as f64 / answered as f64
    } else {
        0.0
    };

    ProgressSummary {
        total_questions,
        answered_questions: answered,
        remaining_questions: total_questions.saturating_sub(answered),
        progress_percentage: round_to(progress * 100.0, 1),
        correct_answers: correct,
        accuracy_percentage: round_to(accuracy * 100.0, 1),
        total_time_seconds: total_time,
        average_time_per_question: round_to(average_time, 1),
        difficulty_breakdown: difficulty_tallies(answers, questions),
        basic_score: round_to(accuracy * 10.0, 2),
    }
}
