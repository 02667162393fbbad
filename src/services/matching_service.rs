//! 本地规则判分 - 业务能力层
//!
//! 不依赖任何外部服务的确定性判分，是 LLM 判分的兜底。
//! 所有函数都是纯函数：空字符串、缺失的标准答案都只会得到 `false`，不会报错。

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::question::QuestionType;

const AFFIRMATIVE_TOKENS: [&str; 4] = ["true", "yes", "correct", "t"];
const NEGATIVE_TOKENS: [&str; 4] = ["false", "no", "incorrect", "f"];

/// 选项文本的词重合率阈值
const OPTION_OVERLAP_THRESHOLD: f64 = 0.6;
/// 主观题关键词重合率阈值
const KEYWORD_OVERLAP_THRESHOLD: f64 = 0.25;
/// 主观题核心概念命中率阈值
const CONCEPT_RATIO_THRESHOLD: f64 = 0.3;
/// 与 0.25 的条件重复，保留以维持既有判分行为
const HIGH_OVERLAP_THRESHOLD: f64 = 0.4;

/// 单独出现的选项字母 / 数字
static OPTION_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-D1-4])\b").expect("选项字母正则无效"));

/// 常见的包裹写法："ANSWER A"、"OPTION 2"、"(A)"、"A)"、"A."
static OPTION_WRAPPER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"ANSWER\s*:?\s*([A-D1-4])\b",
        r"OPTION\s*:?\s*([A-D1-4])\b",
        r"\(([A-D1-4])\)",
        r"\b([A-D1-4])\)",
        r"\b([A-D1-4])\.",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("选项包裹正则无效"))
    .collect()
});

/// 选项开头的字母标签，如 "B) Paris"、"(C) Rome"、"D. Berlin"
static OPTION_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?([A-D])[\).:\-]\s*(.*)$").expect("选项标签正则无效"));

/// 判断学生作答是否正确
///
/// # 参数
/// - `question_type`: 题型
/// - `student_answer`: 学生作答
/// - `correct_answer`: 标准答案
/// - `options`: 选择题选项（其他题型传空切片）
pub fn answer_matches(
    question_type: QuestionType,
    student_answer: &str,
    correct_answer: &str,
    options: &[String],
) -> bool {
    match question_type {
        QuestionType::TrueFalse => matches_true_false(student_answer, correct_answer),
        QuestionType::MultipleChoice => {
            matches_multiple_choice(student_answer, correct_answer, options)
        }
        QuestionType::ShortAnswer | QuestionType::Essay => {
            keyword_overlap(student_answer, correct_answer).is_match()
        }
    }
}

// ========== 判断题 ==========

/// 判断文本表达的是"对"还是"错"
///
/// 同时出现或都没有出现肯定/否定词时无法判断，返回 None
pub fn classify_true_false(text: &str) -> Option<bool> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let affirms = tokens.iter().any(|t| AFFIRMATIVE_TOKENS.contains(t));
    let negates = tokens.iter().any(|t| NEGATIVE_TOKENS.contains(t));

    match (affirms, negates) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

fn matches_true_false(student_answer: &str, correct_answer: &str) -> bool {
    match (
        classify_true_false(student_answer),
        classify_true_false(correct_answer),
    ) {
        (Some(student), Some(correct)) => student == correct,
        _ => false,
    }
}

// ========== 选择题 ==========

fn matches_multiple_choice(student_answer: &str, correct_answer: &str, options: &[String]) -> bool {
    let student = student_answer.trim().to_uppercase();
    let correct = correct_answer.trim().to_uppercase();

    if student.is_empty() || correct.is_empty() {
        return false;
    }

    // 第一步：选项字母匹配
    let student_letters = extract_option_letters(&student);
    let mut correct_letters = extract_option_letters(&correct);
    if correct_letters.is_empty() {
        // 标准答案只写了选项内容时，反查它对应的字母
        if let Some(letter) = letter_for_option_text(options, &correct) {
            correct_letters.insert(letter);
        }
    }

    debug!(
        "选择题判分: 学生字母 {:?}, 标准字母 {:?}",
        student_letters, correct_letters
    );

    if !student_letters.is_disjoint(&correct_letters) {
        debug!("✓ 选项字母一致");
        return true;
    }

    // 学生只写了字母且字母不一致，结论已确定
    if is_bare_letter_answer(&student, &student_letters) {
        return false;
    }

    // 第二步：学生直接写了正确选项的内容
    if let Some(option_text) = correct_option_text(options, &correct_letters) {
        if option_text_matches(&student, &option_text) {
            debug!("✓ 选项内容一致: {}", option_text);
            return true;
        }
    }

    // 标准答案只有字母时，字符串包含没有意义
    if is_bare_letter_answer(&correct, &correct_letters) {
        return false;
    }

    // 第三步：字符串包含
    let fallback = correct.contains(&student) || student.contains(&correct);
    debug!("选择题兜底匹配: {}", fallback);
    fallback
}

/// 提取文本中的选项字母（输入需已转为大写）
pub fn extract_option_letters(normalized: &str) -> HashSet<char> {
    let mut letters: HashSet<char> = OPTION_TOKEN_RE
        .captures_iter(normalized)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| m.as_str().chars().next())
        .collect();

    for re in OPTION_WRAPPER_RES.iter() {
        letters.extend(
            re.captures_iter(normalized)
                .filter_map(|cap| cap.get(1))
                .filter_map(|m| m.as_str().chars().next()),
        );
    }

    letters
}

/// 作答只由选项字母及其包裹写法组成（没有其他实义词）
fn is_bare_letter_answer(normalized: &str, letters: &HashSet<char>) -> bool {
    !letters.is_empty()
        && significant_words(normalized)
            .iter()
            .all(|w| w == "ANSWER" || w == "OPTION")
}

/// 拆分选项的字母标签和内容；没有标签时按位置对应 A-D
fn labelled_options(options: &[String]) -> impl Iterator<Item = (Option<char>, String)> + '_ {
    options.iter().enumerate().map(|(idx, option)| {
        let upper = option.trim().to_uppercase();
        match OPTION_LABEL_RE.captures(&upper) {
            Some(cap) => {
                let letter = cap.get(1).and_then(|m| m.as_str().chars().next());
                let text = cap.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
                (letter, text.to_string())
            }
            None => {
                let letter = u8::try_from(idx)
                    .ok()
                    .filter(|i| *i < 4)
                    .map(|i| char::from(b'A' + i));
                (letter, upper)
            }
        }
    })
}

fn correct_option_text(options: &[String], correct_letters: &HashSet<char>) -> Option<String> {
    labelled_options(options)
        .find(|(letter, _)| letter.is_some_and(|l| correct_letters.contains(&l)))
        .map(|(_, text)| text)
        .filter(|text| !text.is_empty())
}

fn letter_for_option_text(options: &[String], correct: &str) -> Option<char> {
    labelled_options(options)
        .find(|(_, text)| !text.is_empty() && text == correct)
        .and_then(|(letter, _)| letter)
}

fn option_text_matches(student: &str, option_text: &str) -> bool {
    let option_words = significant_words(option_text);
    let student_words = significant_words(student);

    if !option_words.is_empty() {
        let overlap = option_words.intersection(&student_words).count();
        let ratio = overlap as f64 / option_words.len() as f64;
        debug!("选项内容重合率: {:.2}", ratio);
        if ratio >= OPTION_OVERLAP_THRESHOLD {
            return true;
        }
    }

    option_text.contains(student) || student.contains(option_text)
}

/// 长度大于 2 的词，去掉首尾标点
fn significant_words(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > 2)
        .map(String::from)
        .collect()
}

// ========== 简答题 / 论述题 ==========

/// 主观题关键词比对结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordOverlap {
    /// 标准答案关键词中被学生覆盖的比例
    pub overlap_ratio: f64,
    /// 标准答案核心概念（长度 > 4）被命中的比例
    pub concept_ratio: f64,
    /// 标准答案没有任何关键词
    pub no_reference: bool,
}

impl KeywordOverlap {
    pub fn is_match(&self) -> bool {
        if self.no_reference {
            return false;
        }
        self.overlap_ratio >= KEYWORD_OVERLAP_THRESHOLD
            || self.concept_ratio >= CONCEPT_RATIO_THRESHOLD
            || self.overlap_ratio >= HIGH_OVERLAP_THRESHOLD
    }
}

/// 计算主观题的关键词重合率与核心概念命中率
pub fn keyword_overlap(student_answer: &str, correct_answer: &str) -> KeywordOverlap {
    let correct_keywords = keywords(correct_answer);
    let student_keywords = keywords(student_answer);

    if correct_keywords.is_empty() {
        return KeywordOverlap {
            overlap_ratio: 0.0,
            concept_ratio: 0.0,
            no_reference: true,
        };
    }

    let overlap = correct_keywords.intersection(&student_keywords).count();
    let overlap_ratio = overlap as f64 / correct_keywords.len() as f64;

    let concepts: Vec<&String> = correct_keywords
        .iter()
        .filter(|w| w.chars().count() > 4)
        .collect();

    let concept_ratio = if concepts.is_empty() {
        overlap_ratio
    } else {
        let matched = concepts
            .iter()
            .filter(|concept| {
                student_keywords
                    .iter()
                    .any(|s| concept.contains(s.as_str()) || s.contains(concept.as_str()))
            })
            .count();
        matched as f64 / concepts.len() as f64
    };

    KeywordOverlap {
        overlap_ratio,
        concept_ratio,
        no_reference: false,
    }
}

/// 小写、去标点后长度大于 2 的词集合
fn keywords(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .map(String::from)
        .collect()
}
