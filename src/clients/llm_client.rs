//! LLM API 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点，兼容 OpenAI API 的服务均可使用
//!
//! 判分服务只依赖 [`GradingOracle`] 这一抽象，测试时可以换成脚本化的实现

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::OracleError;

/// 模型梯队中的一级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTier {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ModelTier {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 800,
            temperature: 0.2,
        }
    }
}

/// 外部评分 oracle：输入自由文本提示词，返回自由文本
#[async_trait]
pub trait GradingOracle: Send + Sync {
    async fn complete(
        &self,
        tier: &ModelTier,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<String, OracleError>;
}

/// 基于 async-openai 的 LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
}

impl LlmClient {
    /// 根据配置创建客户端，未配置 API Key 时返回 None
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.llm_api_key.as_deref()?;
        Some(Self::new(api_key, &config.llm_api_base_url))
    }

    /// 创建新的 LLM 客户端
    pub fn new(api_key: &str, api_base_url: &str) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
        }
    }
}

#[async_trait]
impl GradingOracle for LlmClient {
    async fn complete(
        &self,
        tier: &ModelTier,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<String, OracleError> {
        debug!("调用 LLM API，模型: {}", tier.model);
        debug!("用户消息长度: {} 字符", prompt.len());

        let model = tier.model.as_str();
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| OracleError::api_call_failed(model, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| OracleError::api_call_failed(model, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(tier.temperature)
            .max_tokens(tier.max_tokens)
            .build()
            .map_err(|e| OracleError::api_call_failed(model, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败 ({}): {}", model, e);
            OracleError::api_call_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| OracleError::EmptyContent {
                model: model.to_string(),
            })?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = Config::default();
        assert!(LlmClient::from_config(&config).is_none());

        let config = Config {
            llm_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert!(LlmClient::from_config(&config).is_some());
    }

    #[test]
    fn test_model_tier_defaults() {
        let tier = ModelTier::new("gpt-4o-mini");
        assert_eq!(tier.max_tokens, 800);
        assert!((tier.temperature - 0.2).abs() < f32::EPSILON);
    }

    /// 测试真实 API 连通性
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_llm_api_connectivity -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_llm_api_connectivity() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let client = LlmClient::from_config(&config).expect("需要设置 LLM_API_KEY");
        let tier = config.model_tiers().remove(0);

        let response = client
            .complete(&tier, "Reply with the JSON {\"ok\": true}", None)
            .await
            .expect("LLM 调用失败");
        println!("LLM 响应: {}", response);
        assert!(!response.is_empty());
    }
}
