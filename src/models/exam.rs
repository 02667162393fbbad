use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::breakdown::{ProgressSummary, ScoreBreakdown};
use crate::models::evaluation::GradedAnswer;
use crate::models::question::{
    AnswerSubmission, Question, QuestionType, MAX_CONFIDENCE, MIN_CONFIDENCE,
};

/// 一份待批改的试卷（题目 + 学生作答），从 TOML 文件加载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamPaper {
    pub name: String,
    #[serde(default)]
    pub subject: String,
    /// 学习资料标题
    #[serde(default)]
    pub material_title: String,
    /// 学习资料正文，作为判分参考
    #[serde(default)]
    pub material_context: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl ExamPaper {
    /// 把超出 1-5 的自评信心截断到边界，返回被修正的作答数量
    pub fn clamp_confidence_levels(&mut self) -> usize {
        let mut clamped = 0;
        for level in self.answers.iter_mut().filter_map(|a| a.confidence_level.as_mut()) {
            let fixed = (*level).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
            if fixed != *level {
                *level = fixed;
                clamped += 1;
            }
        }
        clamped
    }

    /// 报告文件名，去掉路径分隔符等不适合作为文件名的字符
    ///
    /// 从文件加载的试卷使用源文件名，同一目录下不会重名；否则使用试卷名称
    pub fn report_file_name(&self) -> String {
        let source_stem = self
            .file_path
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .map(|s| s.to_string_lossy().into_owned());
        let stem: String = source_stem
            .as_deref()
            .unwrap_or(&self.name)
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                _ => c,
            })
            .collect();
        format!("{}.report.json", stem.trim())
    }
}

/// 考后学习反馈
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceFeedback {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for PerformanceFeedback {
    fn default() -> Self {
        Self {
            strengths: vec!["Completed the exam successfully".to_string()],
            weaknesses: vec!["AI feedback generation failed".to_string()],
            recommendations: vec!["Review the material and try again".to_string()],
        }
    }
}

/// 报告中的一道题：题目信息和对应的作答、判分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub question_text: String,
    pub question_type: QuestionType,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub explanation: String,
    #[serde(flatten)]
    pub answer: GradedAnswer,
}

impl ReportEntry {
    pub fn new(question: &Question, answer: GradedAnswer) -> Self {
        Self {
            question_text: question.text.clone(),
            question_type: question.question_type,
            correct_answer: question.correct_answer.clone(),
            explanation: question.explanation.clone(),
            answer,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.answer.is_correct()
    }
}

/// 单份试卷的完整批改报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub name: String,
    pub subject: String,
    /// 按题目顺序排列的作答记录
    pub answers: Vec<ReportEntry>,
    pub progress: ProgressSummary,
    pub breakdown: ScoreBreakdown,
    pub feedback: PerformanceFeedback,
    /// 被拒绝的作答（超出题目数量或题目不匹配）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_answers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;

    #[test]
    fn test_parse_exam_paper_toml() {
        let content = r#"
name = "Geography quiz"
subject = "Geography"

[[questions]]
id = "q1"
text = "What is the capital of France?"
type = "multiple_choice"
options = ["A) London", "B) Paris", "C) Rome", "D) Berlin"]
correct_answer = "B) Paris"
difficulty_level = 2

[[answers]]
question_id = "q1"
answer_text = "paris"
confidence_level = 4
time_taken_seconds = 20
"#;
        let paper: ExamPaper = toml::from_str(content).unwrap();
        assert_eq!(paper.questions.len(), 1);
        assert_eq!(paper.questions[0].question_type, QuestionType::MultipleChoice);
        assert_eq!(paper.questions[0].options().len(), 4);
        assert_eq!(paper.answers[0].confidence_level, Some(4));
        assert_eq!(paper.answers[0].time_taken_seconds, Some(20));
        assert!(paper.material_context.is_empty());
    }

    #[test]
    fn test_report_file_name_sanitised() {
        let paper: ExamPaper = toml::from_str(r#"name = "Unit 3/4: Cells""#).unwrap();
        assert_eq!(paper.report_file_name(), "Unit 3_4_ Cells.report.json");
    }

    #[test]
    fn test_clamp_confidence_levels() {
        let content = r#"
name = "Quiz"

[[answers]]
question_id = "q1"
confidence_level = 9

[[answers]]
question_id = "q2"
confidence_level = 0

[[answers]]
question_id = "q3"
confidence_level = 4

[[answers]]
question_id = "q4"
"#;
        let mut paper: ExamPaper = toml::from_str(content).unwrap();
        assert_eq!(paper.clamp_confidence_levels(), 2);

        let levels: Vec<_> = paper.answers.iter().map(|a| a.confidence_level).collect();
        assert_eq!(levels, vec![Some(5), Some(1), Some(4), None]);
    }

    #[test]
    fn test_report_file_name_prefers_source_file() {
        let mut paper: ExamPaper = toml::from_str(r#"name = "Week 1 Quiz""#).unwrap();
        paper.file_path = Some("/tmp/exams/period_2.toml".to_string());
        assert_eq!(paper.report_file_name(), "period_2.report.json");
    }
}
