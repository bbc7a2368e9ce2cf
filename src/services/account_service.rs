//! 账号服务 - 业务能力层
//!
//! 注册、验证码校验与重发、找回密码。
//! 只负责和后端交互，拿到的令牌交给 `AppContext::adopt_token` 保存。

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{ApiError, AppError, AppResult, AuthError};
use crate::infrastructure::ApiClient;
use crate::models::envelope::{validate_path_segment, StatusReply};
use crate::models::user::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginReply, OtpRequest, PendingUser,
    SignupReply,
};
use crate::models::{Role, SignupForm};
use crate::services::otp_cooldown::{reset_key, signup_key, OtpCooldown};

/// 注册成功、等待验证码的账号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignup {
    pub user_id: String,
    pub message: Option<String>,
}

pub struct AccountService {
    client: ApiClient,
    cooldown: OtpCooldown,
}

impl AccountService {
    pub fn new(client: ApiClient, cooldown: OtpCooldown) -> Self {
        Self {
            client: client.with_token(None),
            cooldown,
        }
    }

    /// 注册新用户，后端随后把验证码发到邮箱
    pub async fn signup(&self, form: &SignupForm) -> AppResult<PendingSignup> {
        form.validate().map_err(AppError::validation)?;

        let endpoint = "/user/signup";
        let reply: SignupReply = self.client.post_json(endpoint, form).await.map_err(rejected)?;
        match reply {
            SignupReply {
                status: Some(true),
                user: Some(PendingUser { id }),
                message,
            } => {
                info!("✓ 注册成功，等待验证码: {}", id);
                Ok(PendingSignup { user_id: id, message })
            }
            SignupReply { message, .. } => Err(AuthError::Rejected(
                message.unwrap_or_else(|| "An error occurred".to_string()),
            )
            .into()),
        }
    }

    /// 校验注册验证码，成功后返回登录令牌
    pub async fn verify_otp(&self, user_id: &str, otp: &str) -> AppResult<String> {
        if otp.trim().is_empty() {
            return Err(AppError::validation("Please enter the OTP."));
        }
        let endpoint = format!("/user/verify-otp/{}", validate_path_segment(user_id)?);
        let reply: LoginReply = self
            .client
            .post_json(&endpoint, &OtpRequest { otp: otp.trim() })
            .await
            .map_err(rejected)?;

        match reply {
            LoginReply {
                status: Some(true),
                token: Some(token),
                ..
            } => Ok(token),
            LoginReply { message, .. } => Err(AuthError::Rejected(
                message.unwrap_or_else(|| "OTP verification failed".to_string()),
            )
            .into()),
        }
    }

    /// 重发注册验证码，冷却期内在本地拒绝
    pub async fn resend_otp(&self, user_id: &str, now: DateTime<Utc>) -> AppResult<Option<String>> {
        let key = signup_key(user_id);
        self.cooldown.check(&key, now)?;

        let endpoint = format!("/user/resend-otp/{}", validate_path_segment(user_id)?);
        let reply: StatusReply = self
            .client
            .post_json(&endpoint, &serde_json::json!({}))
            .await
            .map_err(rejected)?;
        let message = reply.into_result(&endpoint).map_err(AppError::from).map_err(rejected)?;

        self.cooldown.record(&key, now)?;
        Ok(message)
    }

    /// 请求找回密码的验证码；再次调用即重发，受同一冷却限制
    pub async fn forgot_password(&self, role: Role, email: &str, now: DateTime<Utc>) -> AppResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::validation("Please enter your email first."));
        }
        let key = reset_key(role, email);
        self.cooldown.check(&key, now)?;

        let request = ForgotPasswordRequest {
            email,
            user_type: role.prefix(),
        };
        let endpoint = role.forgot_password_path();
        let reply: StatusReply = self.client.post_json(&endpoint, &request).await?;
        reply.into_result(&endpoint)?;

        self.cooldown.record(&key, now)?;
        info!("✓ 已向 {} 发送找回密码验证码 ({})", email, role);
        Ok(())
    }

    /// 用验证码设置新密码
    pub async fn change_password(
        &self,
        role: Role,
        email: &str,
        otp: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        if password != confirm_password {
            return Err(AppError::validation("Passwords do not match!"));
        }

        let request = ChangePasswordRequest {
            email: email.trim(),
            otp: otp.trim(),
            password,
        };
        let endpoint = role.change_password_path();
        let reply: StatusReply = self.client.post_json(&endpoint, &request).await?;
        match reply.status {
            Some(true) => {
                info!("✓ {} 的密码已更新", request.email);
                Ok(())
            }
            _ => Err(ApiError::BadResponse {
                endpoint,
                message: reply.message,
            }
            .into()),
        }
    }
}

/// 后端拒绝（4xx/5xx 或 status=false）时把服务端的提示交给用户
fn rejected(err: AppError) -> AppError {
    match err {
        AppError::Api(ApiError::HttpStatus { message, .. })
        | AppError::Api(ApiError::BadResponse { message, .. }) => {
            AuthError::Rejected(message.unwrap_or_else(|| "An error occurred".to_string())).into()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::infrastructure::stub_server::StubServer;
    use chrono::TimeZone;

    fn service(name: &str, url: &str) -> AccountService {
        let config = Config {
            backend_url: url.to_string(),
            max_retries: 0,
            request_timeout_secs: 5,
            ..Config::default()
        };
        let path = std::env::temp_dir().join(format!("quiz-account-{}-{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        AccountService::new(ApiClient::new(&config).unwrap(), OtpCooldown::new(path, 60))
    }

    fn form() -> SignupForm {
        SignupForm {
            name: "Asha Rani".to_string(),
            email: "asha@example.com".to_string(),
            phone_number: "9876543210".to_string(),
            address: "12 College Road, Ludhiana".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_signup_returns_pending_user() {
        let server = StubServer::start(&[(
            200,
            r#"{"status": true, "message": "OTP sent to your email", "user": {"_id": "u42"}}"#,
        )])
        .await;

        let pending = service("signup", &server.url).signup(&form()).await.unwrap();
        assert_eq!(pending.user_id, "u42");
        assert_eq!(pending.message.as_deref(), Some("OTP sent to your email"));

        let request = &server.requests()[0];
        assert!(request.starts_with("post /user/signup"));
        assert!(request.contains(r#""phone_number":"9876543210""#));
        assert!(!request.contains("confirm_password"));
    }

    #[tokio::test]
    async fn test_signup_validates_before_sending() {
        let server = StubServer::start(&[(200, "{}")]).await;
        let mut bad = form();
        bad.phone_number = "123".to_string();

        let err = service("signup-invalid", &server.url).signup(&bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Phone number must contain exactly 10 digits."));
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn test_signup_conflict_shows_server_message() {
        let server = StubServer::start(&[(409, r#"{"status": false, "message": "User already exists"}"#)]).await;

        let err = service("signup-409", &server.url).signup(&form()).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::Rejected(ref m)) if m == "User already exists"));
    }

    #[tokio::test]
    async fn test_verify_otp_returns_token() {
        let server = StubServer::start(&[(200, r#"{"status": true, "message": "Verified", "token": "tok-9"}"#)]).await;

        let token = service("verify", &server.url).verify_otp("u42", " 123456 ").await.unwrap();
        assert_eq!(token, "tok-9");

        let request = &server.requests()[0];
        assert!(request.starts_with("post /user/verify-otp/u42"));
        assert!(request.contains(r#"{"otp":"123456"}"#));
    }

    #[tokio::test]
    async fn test_verify_otp_rejects_wrong_code() {
        let server = StubServer::start(&[(400, r#"{"status": false, "message": "Invalid OTP"}"#)]).await;
        let svc = service("verify-bad", &server.url);

        let err = svc.verify_otp("u42", "000000").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::Rejected(ref m)) if m == "Invalid OTP"));
        assert!(svc.verify_otp("../u42", "1").await.is_err());
    }

    #[tokio::test]
    async fn test_resend_otp_enforces_cooldown() {
        let server = StubServer::start(&[(200, r#"{"status": true, "message": "OTP resent"}"#)]).await;
        let svc = service("resend", &server.url);

        assert_eq!(svc.resend_otp("u42", at(0)).await.unwrap().as_deref(), Some("OTP resent"));
        let err = svc.resend_otp("u42", at(20)).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::OtpCooldown { remaining_secs: 40 })));
        assert_eq!(server.hits(), 1);

        svc.resend_otp("u42", at(60)).await.unwrap();
        assert_eq!(server.hits(), 2);
        assert!(server.requests()[0].starts_with("post /user/resend-otp/u42"));
    }

    #[tokio::test]
    async fn test_failed_resend_does_not_start_cooldown() {
        let server = StubServer::start(&[
            (500, r#"{"message": "mail server down"}"#),
            (200, r#"{"status": true}"#),
        ])
        .await;
        let svc = service("resend-failed", &server.url);

        let err = svc.resend_otp("u42", at(0)).await.unwrap_err();
        assert_eq!(err.server_message(), Some("mail server down"));
        assert!(svc.resend_otp("u42", at(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_forgot_password_for_admin() {
        let server = StubServer::start(&[(200, r#"{"status": true}"#)]).await;
        let svc = service("forgot", &server.url);

        svc.forgot_password(Role::Admin, "boss@example.com", at(0)).await.unwrap();
        let request = &server.requests()[0];
        assert!(request.starts_with("post /admin/forgot-password"));
        assert!(request.contains(r#""usertype":"admin""#));

        let err = svc.forgot_password(Role::Admin, "Boss@example.com", at(5)).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::OtpCooldown { .. })));
        assert!(svc.forgot_password(Role::User, "boss@example.com", at(5)).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password() {
        let server = StubServer::start(&[
            (200, r#"{"status": true}"#),
            (200, r#"{"status": false, "message": "OTP expired"}"#),
        ])
        .await;
        let svc = service("change", &server.url);

        let mismatch = svc
            .change_password(Role::User, "a@b.co", "1234", "newpass123", "newpass124")
            .await
            .unwrap_err();
        assert!(matches!(mismatch, AppError::Validation(_)));
        assert_eq!(server.hits(), 0);

        svc.change_password(Role::User, "a@b.co", "1234", "newpass123", "newpass123")
            .await
            .unwrap();
        assert!(server.requests()[0].contains(r#""password":"newpass123""#));

        let expired = svc
            .change_password(Role::User, "a@b.co", "1234", "newpass123", "newpass123")
            .await
            .unwrap_err();
        assert_eq!(expired.server_message(), Some("OTP expired"));
    }
}
