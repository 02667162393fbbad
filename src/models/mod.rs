pub mod breakdown;
pub mod evaluation;
pub mod exam;
pub mod loaders;
pub mod question;

pub use breakdown::{
    DifficultyTally, ProgressSummary, ScoreBreakdown, ScoreComponents, TimeStatistics,
};
pub use evaluation::{EvaluationResult, EvaluationSource, GradedAnswer};
pub use exam::{ExamPaper, PerformanceFeedback, ReportEntry, SessionReport};
pub use loaders::{load_all_exam_papers, load_exam_paper};
pub use question::{AnswerSubmission, Question, QuestionType};
