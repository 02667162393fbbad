//! 模型梯队调用
//!
//! 按配置顺序逐个尝试模型，每个模型只尝试一次、不做退避，
//! 第一个返回可解析内容的模型即为最终结果，后面的模型不会再被调用。

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::{GradingOracle, LlmClient, ModelTier};
use crate::config::Config;
use crate::error::OracleError;
use crate::utils::logging::truncate_text;

/// 某一级模型成功返回并解析的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TierSuccess<T> {
    pub model: String,
    pub value: T,
}

/// 带超时的有序模型梯队
#[derive(Clone)]
pub struct TierChain {
    oracle: Arc<dyn GradingOracle>,
    tiers: Vec<ModelTier>,
    attempt_timeout: Duration,
}

impl TierChain {
    /// 模型列表为空时视为不可用，返回 None
    pub fn new(
        oracle: Arc<dyn GradingOracle>,
        tiers: Vec<ModelTier>,
        attempt_timeout: Duration,
    ) -> Option<Self> {
        if tiers.is_empty() {
            return None;
        }
        Some(Self {
            oracle,
            tiers,
            attempt_timeout,
        })
    }

    /// 根据配置创建；未配置 API Key 或模型列表为空时返回 None
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.oracle_enabled() {
            return None;
        }
        let client = LlmClient::from_config(config)?;
        Self::new(
            Arc::new(client),
            config.model_tiers(),
            Duration::from_secs(config.attempt_timeout_secs),
        )
    }

    pub fn tiers(&self) -> &[ModelTier] {
        &self.tiers
    }

    /// 模型顺序不变，替换每一级的采样参数
    pub fn with_sampling(&self, max_tokens: u32, temperature: f32) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            tiers: self
                .tiers
                .iter()
                .map(|tier| ModelTier {
                    model: tier.model.clone(),
                    max_tokens,
                    temperature,
                })
                .collect(),
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// 最坏情况下的总耗时上限
    pub fn worst_case_latency(&self) -> Duration {
        self.attempt_timeout * self.tiers.len() as u32
    }

    /// 依次尝试每个模型，返回第一个能被 `parse` 解析的结果
    pub async fn first_parsed<T, F>(
        &self,
        prompt: &str,
        system_message: Option<&str>,
        parse: F,
    ) -> Option<TierSuccess<T>>
    where
        F: Fn(&str) -> Option<T>,
    {
        for (attempt, tier) in self.tiers.iter().enumerate() {
            info!("🤖 第 {} 次尝试: 模型 {}", attempt + 1, tier.model);

            let response = match self.attempt(tier, prompt, system_message).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("⚠️ {}", e);
                    continue;
                }
            };

            debug!("📝 {} 返回: {}", tier.model, truncate_text(&response, 200));

            match parse(&response) {
                Some(value) => {
                    return Some(TierSuccess {
                        model: tier.model.clone(),
                        value,
                    })
                }
                None => {
                    let err = OracleError::Unparsable {
                        model: tier.model.clone(),
                        preview: truncate_text(&response, 80),
                    };
                    warn!("⚠️ {}", err);
                }
            }
        }

        None
    }

    async fn attempt(
        &self,
        tier: &ModelTier,
        prompt: &str,
        system_message: Option<&str>,
    ) -> Result<String, OracleError> {
        match tokio::time::timeout(
            self.attempt_timeout,
            self.oracle.complete(tier, prompt, system_message),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout {
                model: tier.model.clone(),
                timeout: self.attempt_timeout,
            }),
        }
    }
}
