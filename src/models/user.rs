use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// 账号类型，决定接口前缀
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// 接口路径前缀，同时也是找回密码时的 `userType`
    pub fn prefix(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn login_path(self) -> String {
        format!("/{}/login", self.prefix())
    }

    /// 用令牌换取身份的接口
    pub fn profile_path(self) -> &'static str {
        match self {
            Role::User => "/user/getUser",
            Role::Admin => "/admin/getAdmin",
        }
    }

    pub fn forgot_password_path(self) -> String {
        format!("/{}/forgot-password", self.prefix())
    }

    pub fn change_password_path(self) -> String {
        format!("/{}/change-password", self.prefix())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// 当前登录用户（管理员也是同样的结构）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// `GET /user/getUser` / `GET /admin/getAdmin` 的响应
#[derive(Debug, Deserialize)]
pub struct UserReply {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /{role}/login` 的请求体
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// 登录和验证码校验成功后都会返回令牌
#[derive(Debug, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z\s]+$").expect("name regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.-]+@([\w-]+\.)+[\w-]{2,4}$").expect("email regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"))
}

/// 注册表单，序列化后就是 `POST /user/signup` 的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

impl SignupForm {
    pub const MIN_NAME_LEN: usize = 3;
    pub const MIN_ADDRESS_LEN: usize = 10;
    pub const MIN_PASSWORD_LEN: usize = 8;

    /// 按表单顺序逐项校验，返回第一条给用户看的错误
    pub fn validate(&self) -> Result<(), &'static str> {
        if !name_regex().is_match(&self.name) {
            return Err("Name must contain only letters and spaces.");
        }
        if self.name.chars().count() < Self::MIN_NAME_LEN {
            return Err("Name must be at least 3 characters long.");
        }
        if !email_regex().is_match(&self.email) {
            return Err("Please enter a valid email address.");
        }
        if !phone_regex().is_match(&self.phone_number) {
            return Err("Phone number must contain exactly 10 digits.");
        }
        if self.address.chars().count() < Self::MIN_ADDRESS_LEN {
            return Err("Address must be at least 10 characters long.");
        }
        if self.password.chars().count() < Self::MIN_PASSWORD_LEN {
            return Err("Password must be at least 8 characters long.");
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match.");
        }
        Ok(())
    }
}

/// 注册成功后待验证的账号
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingUser {
    #[serde(rename = "_id")]
    pub id: String,
}

/// `POST /user/signup` 的响应
#[derive(Debug, Deserialize)]
pub struct SignupReply {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<PendingUser>,
}

#[derive(Debug, Serialize)]
pub struct OtpRequest<'a> {
    pub otp: &'a str,
}

/// `POST /{role}/forgot-password` 的请求体
#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
    #[serde(rename = "userType")]
    pub user_type: &'a str,
}

/// `POST /{role}/change-password` 的请求体
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SignupForm {
        SignupForm {
            name: "Asha Rani".to_string(),
            email: "asha.rani@example.com".to_string(),
            phone_number: "9876543210".to_string(),
            address: "12 College Road, Ludhiana".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        }
    }

    #[test]
    fn test_valid_signup_form() {
        assert_eq!(form().validate(), Ok(()));

        let body = serde_json::to_value(form()).unwrap();
        assert_eq!(body["phone_number"], "9876543210");
        assert!(body.get("confirm_password").is_none());
    }

    #[test]
    fn test_signup_form_reports_first_problem() {
        let cases: [(fn(&mut SignupForm), &str); 7] = [
            (|f: &mut SignupForm| f.name = "R2D2".into(), "Name must contain only letters and spaces."),
            (|f: &mut SignupForm| f.name = "Al".into(), "Name must be at least 3 characters long."),
            (|f: &mut SignupForm| f.email = "asha@".into(), "Please enter a valid email address."),
            (|f: &mut SignupForm| f.phone_number = "12345".into(), "Phone number must contain exactly 10 digits."),
            (|f: &mut SignupForm| f.address = "Short".into(), "Address must be at least 10 characters long."),
            (|f: &mut SignupForm| f.password = "short".into(), "Password must be at least 8 characters long."),
            (|f: &mut SignupForm| f.confirm_password = "different1".into(), "Passwords do not match."),
        ];
        for (mutate, expected) in cases {
            let mut f = form();
            mutate(&mut f);
            assert_eq!(f.validate(), Err(expected));
        }
    }

    #[test]
    fn test_role_paths() {
        assert_eq!(Role::User.login_path(), "/user/login");
        assert_eq!(Role::Admin.login_path(), "/admin/login");
        assert_eq!(Role::Admin.profile_path(), "/admin/getAdmin");
        assert_eq!(Role::Admin.forgot_password_path(), "/admin/forgot-password");
        assert_eq!(Role::User.change_password_path(), "/user/change-password");
    }

    #[test]
    fn test_forgot_password_body_uses_user_type() {
        let body = serde_json::to_value(ForgotPasswordRequest {
            email: "a@b.co",
            user_type: Role::Admin.prefix(),
        })
        .unwrap();
        assert_eq!(body["userType"], "admin");
    }
}
