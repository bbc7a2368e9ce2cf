use crate::error::{AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// 默认配置文件名（可通过 QUIZ_CONFIG 覆盖）
pub const DEFAULT_CONFIG_FILE: &str = "quiz-client.toml";

/// 计时结束时的提交策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// 与手动提交一致：有未作答的题目就拒绝提交
    #[default]
    RequireComplete,
    /// 只提交已作答的题目
    SubmitAnswered,
}

impl ExpiryPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "require_complete" => Some(ExpiryPolicy::RequireComplete),
            "submit_answered" => Some(ExpiryPolicy::SubmitAnswered),
            _ => None,
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端地址
    pub backend_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// GET 请求最大重试次数
    pub max_retries: u32,
    /// 重试退避基数（毫秒），第 n 次重试等待 base * 2^n
    pub retry_base_delay_ms: u64,
    /// 登录令牌存放文件
    pub token_file: String,
    /// 管理员令牌存放文件
    pub admin_token_file: String,
    /// 验证码冷却记录文件
    pub otp_state_file: String,
    /// 两次发送验证码的最短间隔（秒）
    pub otp_cooldown_secs: u64,
    /// 聊天记录文件
    pub chat_history_file: String,
    /// 答题时限（秒）
    pub quiz_time_limit_secs: u32,
    /// 计时结束时的提交策略
    pub expiry_policy: ExpiryPolicy,
    // --- 监考浏览器 ---
    /// 监考浏览器调试端口，不设置则不启用全屏监考
    pub proctor_browser_port: Option<u16>,
    /// 监考页面地址
    pub proctor_page_url: Option<String>,
    /// 全屏状态轮询间隔（毫秒）
    pub proctor_poll_interval_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            token_file: ".user_token".to_string(),
            admin_token_file: ".admin_token".to_string(),
            otp_state_file: ".otp_cooldown.json".to_string(),
            otp_cooldown_secs: 60,
            chat_history_file: ".chat_history.json".to_string(),
            quiz_time_limit_secs: 10 * 60,
            expiry_policy: ExpiryPolicy::RequireComplete,
            proctor_browser_port: None,
            proctor_page_url: None,
            proctor_poll_interval_ms: 500,
            verbose_logging: false,
            output_log_file: "quiz-session.log".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（可选）+ 环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("QUIZ_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            info!("正在加载配置文件: {}", path);
            Self::from_toml_file(&path)?
        } else {
            debug!("未找到配置文件 {}，使用默认配置", path);
            Self::default()
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            crate::error::AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                ConfigError::TomlParseFailed {
                    path: path.to_string(),
                    source,
                }
                .into()
            }
            other => other,
        })
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()
    }

    /// 只使用默认值与环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Self {
            backend_url: std::env::var("BACKEND_URL").unwrap_or(self.backend_url),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?.unwrap_or(self.request_timeout_secs),
            max_retries: env_parse("MAX_RETRIES", "u32")?.unwrap_or(self.max_retries),
            retry_base_delay_ms: env_parse("RETRY_BASE_DELAY_MS", "u64")?.unwrap_or(self.retry_base_delay_ms),
            token_file: std::env::var("TOKEN_FILE").unwrap_or(self.token_file),
            admin_token_file: std::env::var("ADMIN_TOKEN_FILE").unwrap_or(self.admin_token_file),
            otp_state_file: std::env::var("OTP_STATE_FILE").unwrap_or(self.otp_state_file),
            otp_cooldown_secs: env_parse("OTP_COOLDOWN_SECS", "u64")?.unwrap_or(self.otp_cooldown_secs),
            chat_history_file: std::env::var("CHAT_HISTORY_FILE").unwrap_or(self.chat_history_file),
            quiz_time_limit_secs: env_parse("QUIZ_TIME_LIMIT_SECS", "u32")?.unwrap_or(self.quiz_time_limit_secs),
            expiry_policy: match std::env::var("EXPIRY_POLICY") {
                Ok(value) => ExpiryPolicy::parse(&value).ok_or_else(|| ConfigError::EnvVarParseFailed {
                    var_name: "EXPIRY_POLICY".to_string(),
                    value,
                    expected_type: "require_complete | submit_answered".to_string(),
                })?,
                Err(_) => self.expiry_policy,
            },
            proctor_browser_port: env_parse("PROCTOR_BROWSER_PORT", "u16")?.or(self.proctor_browser_port),
            proctor_page_url: std::env::var("PROCTOR_PAGE_URL").ok().or(self.proctor_page_url),
            proctor_poll_interval_ms: env_parse("PROCTOR_POLL_INTERVAL_MS", "u64")?.unwrap_or(self.proctor_poll_interval_ms),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
        .validate()
    }

    /// 周期和时限必须大于零
    fn validate(self) -> AppResult<Self> {
        let zero_fields = [
            ("request_timeout_secs", self.request_timeout_secs == 0),
            ("quiz_time_limit_secs", self.quiz_time_limit_secs == 0),
            ("proctor_poll_interval_ms", self.proctor_poll_interval_ms == 0),
        ];
        if let Some((field, _)) = zero_fields.iter().find(|(_, is_zero)| *is_zero) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                reason: "必须大于 0".to_string(),
            }
            .into());
        }
        Ok(self)
    }
}

/// 读取并解析环境变量；不存在时返回 None，格式错误时报错
fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}
