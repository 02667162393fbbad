//! 作答处理上下文
//!
//! 封装"我正在批改哪张卷子的第几题"这一信息

use std::fmt::Display;

/// 作答处理上下文，仅用于日志
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 试卷名称
    pub paper_name: String,

    /// 试卷索引（仅用于日志显示）
    pub paper_index: usize,

    /// 题目在试卷中的序号（从1开始）
    pub question_number: usize,

    /// 题目ID
    pub question_id: String,
}

impl SessionCtx {
    pub fn new(
        paper_name: impl Into<String>,
        paper_index: usize,
        question_number: usize,
        question_id: impl Into<String>,
    ) -> Self {
        Self {
            paper_name: paper_name.into(),
            paper_index,
            question_number,
            question_id: question_id.into(),
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[试卷 {}#{} 题目#{} ID#{}]",
            self.paper_name, self.paper_index, self.question_number, self.question_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = SessionCtx::new("Biology", 2, 5, "q5");
        assert_eq!(ctx.to_string(), "[试卷 Biology#2 题目#5 ID#q5]");
    }
}
