//! 大模型返回内容解析
//!
//! 大模型的回复是自由文本，里面通常嵌着一段 JSON。这里按固定顺序尝试几种提取方式，
//! 第一个能解析成 JSON 对象的结果胜出：
//!
//! 1. `BraceSpan` - 第一个 `{` 到最后一个 `}`
//! 2. `WholeText` - 整段回复
//! 3. `FencedBlock` - Markdown 代码块（```json ... ```）

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::sync::LazyLock;
use tracing::debug;

static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)```").expect("代码块正则无效")
});

/// JSON 提取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    BraceSpan,
    WholeText,
    FencedBlock,
}

impl ExtractionStrategy {
    /// 尝试顺序
    pub const ORDER: [ExtractionStrategy; 3] = [
        ExtractionStrategy::BraceSpan,
        ExtractionStrategy::WholeText,
        ExtractionStrategy::FencedBlock,
    ];

    /// 截取候选文本，不做解析
    pub fn extract<'a>(&self, response: &'a str) -> Option<&'a str> {
        match self {
            ExtractionStrategy::BraceSpan => {
                let start = response.find('{')?;
                let end = response.rfind('}')?;
                (end > start).then(|| &response[start..=end])
            }
            ExtractionStrategy::WholeText => {
                let trimmed = response.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            ExtractionStrategy::FencedBlock => FENCED_BLOCK_RE
                .captures(response)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// 按顺序尝试所有提取方式，返回第一个解析成功的 JSON 对象
pub fn parse_structured(response: &str) -> Option<(ExtractionStrategy, Map<String, JsonValue>)> {
    ExtractionStrategy::ORDER.iter().find_map(|strategy| {
        let candidate = strategy.extract(response)?;
        match serde_json::from_str::<JsonValue>(candidate) {
            Ok(JsonValue::Object(map)) => {
                debug!("使用 {:?} 解析成功", strategy);
                Some((*strategy, map))
            }
            Ok(_) => {
                debug!("{:?} 解析结果不是 JSON 对象", strategy);
                None
            }
            Err(e) => {
                debug!("{:?} 解析失败: {}", strategy, e);
                None
            }
        }
    })
}

/// 从大模型回复中解析出的评分数据
#[derive(Debug, Clone, PartialEq)]
pub struct GradingPayload {
    /// 原始分数，尚未截断到合法范围
    pub score: f64,
    pub feedback: Option<String>,
    pub reasoning: Option<String>,
}

/// 缺少 score 字段时的默认分
const DEFAULT_PARSED_SCORE: f64 = 5.0;

impl GradingPayload {
    /// 解析评分回复；没有可用 JSON 或分数不是有限数值时返回 None
    ///
    /// 空白的 `feedback` 和 `reasoning` 与缺失同样处理，判分结果会换成默认评语，
    /// 不会给学生展示空评语
    pub fn parse(response: &str) -> Option<Self> {
        let (_, map) = parse_structured(response)?;

        let score = match map.get("score") {
            None | Some(JsonValue::Null) => DEFAULT_PARSED_SCORE,
            Some(value) => number_from(value)?,
        };
        if !score.is_finite() {
            return None;
        }

        Some(Self {
            score,
            feedback: string_field(&map, "feedback"),
            reasoning: string_field(&map, "reasoning"),
        })
    }
}

/// 数字或数字字符串（如 "8.5"）
fn number_from(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 非空字符串字段
pub fn string_field(map: &Map<String, JsonValue>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// 字符串数组字段，忽略非字符串元素
pub fn string_list_field(map: &Map<String, JsonValue>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
