use crate::clients::ModelTier;
use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时批改的试卷数量
    pub max_concurrent_sessions: usize,
    /// 试卷 TOML 文件存放目录
    pub exam_folder: String,
    /// 评分报告输出目录
    pub report_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    /// 为空时视为大模型不可用，全部走本地兜底判分
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    /// 按顺序尝试的模型列表
    pub llm_model_names: Vec<String>,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    /// 单次调用超时（秒）
    pub attempt_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: 8,
            exam_folder: "exams".to_string(),
            report_folder: "reports".to_string(),
            verbose_logging: false,
            output_log_file: "grading_log.txt".to_string(),
            llm_api_key: None,
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_names: vec![
                "gpt-4o-mini".to_string(),
                "gpt-3.5-turbo".to_string(),
                "gpt-4o".to_string(),
            ],
            llm_max_tokens: 800,
            llm_temperature: 0.2,
            attempt_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_sessions: std::env::var("MAX_CONCURRENT_SESSIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_sessions),
            exam_folder: std::env::var("EXAM_FOLDER").unwrap_or(default.exam_folder),
            report_folder: std::env::var("REPORT_FOLDER").unwrap_or(default.report_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok()
                .filter(|key| !key.trim().is_empty()),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_names: std::env::var("LLM_MODEL_TIERS").ok().map(|v| parse_model_list(&v)).unwrap_or(default.llm_model_names),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            attempt_timeout_secs: std::env::var("LLM_ATTEMPT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.attempt_timeout_secs),
        }
    }

    /// 检查配置取值是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_sessions".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        if self.attempt_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "attempt_timeout_secs".to_string(),
                reason: "必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 大模型是否已配置
    pub fn oracle_enabled(&self) -> bool {
        self.llm_api_key.is_some() && !self.llm_model_names.is_empty()
    }

    /// 按配置顺序生成模型梯队
    pub fn model_tiers(&self) -> Vec<ModelTier> {
        self.llm_model_names
            .iter()
            .map(|name| ModelTier {
                model: name.clone(),
                max_tokens: self.llm_max_tokens,
                temperature: self.llm_temperature,
            })
            .collect()
    }
}

fn parse_model_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_follow_configured_order() {
        let config = Config::default();
        let tiers = config.model_tiers();
        let names: Vec<&str> = tiers.iter().map(|t| t.model.as_str()).collect();
        assert_eq!(names, vec!["gpt-4o-mini", "gpt-3.5-turbo", "gpt-4o"]);
        assert!(tiers.iter().all(|t| t.max_tokens == 800));
    }

    #[test]
    fn test_oracle_disabled_without_key() {
        let config = Config::default();
        assert!(!config.oracle_enabled());

        let config = Config {
            llm_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert!(config.oracle_enabled());
    }

    #[test]
    fn test_parse_model_list_skips_blanks() {
        assert_eq!(parse_model_list(" a, ,b ,"), vec!["a", "b"]);
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrent_sessions: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
