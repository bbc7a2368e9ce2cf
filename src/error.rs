use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 答题会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 登录/身份错误
    #[error("身份错误: {0}")]
    Auth(#[from] AuthError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 表单/题目本地校验失败，内容是给用户看的提示
    #[error("校验失败: {0}")]
    Validation(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// HTTP 状态码异常
    #[error("API返回状态码 {status} ({endpoint}): {message:?}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// API 返回错误响应（status=false 或缺少数据）
    #[error("API返回错误响应 ({endpoint}): {message:?}")]
    BadResponse {
        endpoint: String,
        message: Option<String>,
    },
    /// 返回数据不符合约定
    #[error("API返回数据无效 ({endpoint}): {reason}")]
    InvalidPayload { endpoint: String, reason: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
    /// 路径参数不合法
    #[error("非法的路径参数: {0:?}")]
    InvalidPathSegment(String),
}

impl ApiError {
    /// 服务端给出的提示信息（如果有）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { message, .. } | ApiError::BadResponse { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// 是否值得对幂等请求重试：网络错误或 5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RequestFailed { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            ApiError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// 答题会话错误
///
/// 这些都是"校验失败"：报告给用户，不改变会话状态。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 题目列表为空
    #[error("没有可用的题目")]
    NoQuestions,
    /// 会话尚未开始
    #[error("答题尚未开始")]
    NotStarted,
    /// 会话已经开始
    #[error("答题已经开始")]
    AlreadyStarted,
    /// 只能回答当前题目
    #[error("只能回答当前题目 (当前: {current}, 请求: {requested})")]
    NotCurrentQuestion { current: usize, requested: usize },
    /// 选项超出范围
    #[error("选项 {option} 超出范围 [0, {max_option}]")]
    OptionOutOfRange { option: usize, max_option: usize },
    /// 当前题目未作答
    #[error("当前题目 #{index} 尚未作答")]
    Unanswered { index: usize },
    /// 已经是第一题
    #[error("已经是第一题")]
    AtFirstQuestion,
    /// 所有题目已经浏览完毕
    #[error("已经到达最后")]
    Completed,
    /// 仍有未作答的题目
    #[error("还有 {count} 道题未作答")]
    Incomplete { count: usize },
    /// 已经提交过
    #[error("本次答题已经提交过")]
    AlreadySubmitted,
}

/// 登录/身份错误
#[derive(Debug, Error)]
pub enum AuthError {
    /// 本地校验未通过
    #[error("邮箱或密码无效")]
    InvalidCredentials,
    /// 服务端拒绝
    #[error("登录被拒绝: {0}")]
    Rejected(String),
    /// 未登录
    #[error("尚未登录")]
    NotSignedIn,
    /// 验证码发送过于频繁
    #[error("验证码发送过于频繁，请 {remaining_secs} 秒后重试")]
    OtpCooldown { remaining_secs: u64 },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 无效: {reason}")]
    InvalidValue { field: String, reason: String },
    /// 无法构建 HTTP 客户端
    #[error("无法构建 HTTP 客户端: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除文件失败
    #[error("删除文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed(err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API错误响应
    pub fn bad_response(endpoint: impl Into<String>, message: Option<String>) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            message,
        })
    }

    /// 创建本地校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// 服务端给出的提示信息（如果有）
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Api(e) => e.server_message(),
            AppError::Auth(AuthError::Rejected(msg)) => Some(msg),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
