//! HTTP 客户端 - 基础设施层
//!
//! 持有唯一的 reqwest::Client，只暴露"发 JSON 请求"的能力

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, AppResult, ConfigError};
use crate::models::envelope::ErrorBody;

/// GET 请求的重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// 第 `attempt` 次重试（从 1 开始）前的等待时间：base * 2^attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// HTTP 客户端
///
/// 职责：
/// - 持有唯一的 reqwest::Client（内部是 Arc，可以放心 clone）
/// - 附加 `Authorization: Bearer` 头
/// - 幂等的 GET 请求按指数退避重试，POST 只发一次
/// - 不认识 Question / Quiz
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl ApiClient {
    /// 根据配置创建客户端（未登录）
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            token: None,
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(config.retry_base_delay_ms),
            ),
        })
    }

    /// 返回携带（或去掉）登录令牌的副本
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// 拼接完整 URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET 并解析 JSON，网络错误或 5xx 时重试
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let mut attempt = 0;
        loop {
            match self.send(self.request(Method::GET, path), path).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "GET {} 失败 (重试 {}/{}), {:?} 后重试: {}",
                        path, attempt, self.retry.max_retries, delay, e
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// POST JSON 并解析响应，不重试
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).json(body);
        Ok(self.send(builder, path).await?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|source| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|source| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source,
        })?;
        debug!("{} -> {} ({} 字节)", endpoint, status, bytes.len());

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message);
            return Err(ApiError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
