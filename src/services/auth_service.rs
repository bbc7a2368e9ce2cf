//! 登录与应用上下文 - 业务能力层
//!
//! 登录身份放在显式传递的 `AppContext` 里：
//! - `hydrate()` 用保存的令牌恢复身份
//! - `login()` 换取新令牌
//! - `sign_out()` 清掉令牌和身份

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ApiError, AppError, AppResult, AuthError, FileError};
use crate::infrastructure::ApiClient;
use crate::models::user::{LoginReply, LoginRequest, UserReply};
use crate::models::{Role, User};

/// 密码最短长度，短于此长度直接视为无效，不请求后端
pub const MIN_PASSWORD_LEN: usize = 8;

/// 令牌文件
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    /// 读取令牌；文件不存在或为空时返回 None
    pub fn load(&self) -> AppResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FileError::ReadFailed {
                path: self.display(),
                source,
            }
            .into()),
        }
    }

    pub fn save(&self, token: &str) -> AppResult<()> {
        std::fs::write(&self.path, token).map_err(|source| {
            FileError::WriteFailed {
                path: self.display(),
                source,
            }
            .into()
        })
    }

    pub fn clear(&self) -> AppResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(FileError::DeleteFailed {
                path: self.display(),
                source,
            }
            .into()),
        }
    }
}

/// 应用上下文：HTTP 客户端 + 当前身份
///
/// 普通用户和管理员各用一个上下文，令牌文件分开保存。
pub struct AppContext {
    role: Role,
    client: ApiClient,
    tokens: TokenStore,
    user: Option<User>,
}

impl AppContext {
    /// 创建未登录的普通用户上下文
    pub fn new(client: ApiClient, tokens: TokenStore) -> Self {
        Self::for_role(Role::User, client, tokens)
    }

    pub fn for_role(role: Role, client: ApiClient, tokens: TokenStore) -> Self {
        Self {
            role,
            client: client.with_token(None),
            tokens,
            user: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// 当前（可能已带令牌的）客户端
    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> AppResult<&User> {
        self.user.as_ref().ok_or_else(|| AuthError::NotSignedIn.into())
    }

    /// 用保存的令牌恢复身份
    ///
    /// 后端明确拒绝（status=false 或 4xx）时删除令牌。
    /// 网络错误和 5xx 原样返回，令牌保留：网页端在拿不到响应时也会删除 cookie，
    /// 这里不跟随，断网重启后不必重新登录。
    pub async fn hydrate(&mut self) -> AppResult<Option<&User>> {
        let Some(token) = self.tokens.load()? else {
            debug!("没有保存的令牌，保持未登录");
            return Ok(None);
        };

        self.client = self.client.with_token(Some(token));
        match self.client.get_json::<UserReply>(self.role.profile_path()).await {
            Ok(UserReply {
                status: true,
                user: Some(user),
                ..
            }) => {
                info!("✓ 已恢复登录身份: {}", user.email);
                self.user = Some(user);
                Ok(self.user.as_ref())
            }
            Ok(reply) => {
                warn!("令牌已失效: {:?}", reply.message);
                self.forget()?;
                Ok(None)
            }
            Err(AppError::Api(ApiError::HttpStatus { status, .. })) if status < 500 => {
                warn!("令牌被后端拒绝 (HTTP {})", status);
                self.forget()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// 邮箱密码登录，成功后保存令牌并恢复身份
    pub async fn login(&mut self, email: &str, password: &str) -> AppResult<&User> {
        if password.chars().count() < MIN_PASSWORD_LEN || email.trim().is_empty() {
            return Err(AuthError::InvalidCredentials.into());
        }

        let request = LoginRequest { email, password };
        let reply: LoginReply = match self
            .client
            .with_token(None)
            .post_json(&self.role.login_path(), &request)
            .await
        {
            Ok(reply) => reply,
            Err(AppError::Api(ApiError::HttpStatus { message, .. })) => {
                return Err(AuthError::Rejected(
                    message.unwrap_or_else(|| "An error occurred".to_string()),
                )
                .into());
            }
            Err(e) => return Err(e),
        };

        let token = reply.token.ok_or_else(|| {
            AuthError::Rejected(reply.message.unwrap_or_else(|| "登录响应缺少 token".to_string()))
        })?;
        self.adopt_token(&token).await
    }

    /// 保存新令牌（登录或验证码校验得到的）并恢复身份
    pub async fn adopt_token(&mut self, token: &str) -> AppResult<&User> {
        self.tokens.save(token)?;
        self.hydrate().await?;
        self.require_user()
    }

    /// 退出登录
    pub fn sign_out(&mut self) -> AppResult<()> {
        self.forget()?;
        info!("{} 已退出登录", self.role);
        Ok(())
    }

    fn forget(&mut self) -> AppResult<()> {
        self.user = None;
        self.client = self.client.with_token(None);
        self.tokens.clear()
    }
}
