//! 后端响应外壳
//!
//! 后端的返回格式并不统一：有的带 `status`，有的只带 `data` / `results` / `analysis`。
//! 这里把它们统一收敛成"成功带数据 / 失败带消息"，在进入业务层之前完成校验。

use crate::error::ApiError;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// 通用响应外壳 `{status?, message?, data?}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// `status == false` 或缺少 `data` 都视为失败
    pub fn into_result(self, endpoint: &str) -> Result<T, ApiError> {
        if self.status == Some(false) {
            return Err(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                message: self.message,
            });
        }
        self.data.ok_or_else(|| ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            message: self.message.or_else(|| Some("响应缺少 data 字段".to_string())),
        })
    }
}

/// 只携带状态的响应 `{status, message?}`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusReply {
    /// 没有 `status` 字段时按 HTTP 成功处理
    pub fn into_result(self, endpoint: &str) -> Result<Option<String>, ApiError> {
        match self.status {
            Some(false) => Err(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                message: self.message,
            }),
            _ => Ok(self.message),
        }
    }
}

/// 错误响应体里的 `message`
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

fn path_segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("path segment regex"))
}

/// 校验即将拼进 URL 路径的 id
pub fn validate_path_segment(value: &str) -> Result<&str, ApiError> {
    if path_segment_regex().is_match(value) {
        Ok(value)
    } else {
        Err(ApiError::InvalidPathSegment(value.to_string()))
    }
}
