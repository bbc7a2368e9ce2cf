//! 提示服务 - 业务能力层
//!
//! 只负责"把一条简短提示交给用户"，不关心提示从哪个流程产生

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::{info, warn};

/// 面向用户的提示文案
pub mod messages {
    pub const NO_QUESTIONS: &str = "No questions available!";
    pub const LOAD_FAILED: &str = "Failed to load questions.";
    pub const GOOD_LUCK: &str = "Good luck! Let's ace this quiz! 🎉";
    pub const SELECT_BEFORE_NEXT: &str = "Please select an answer before proceeding!";
    pub const UNANSWERED: &str = "You have unanswered questions!";
    pub const TIME_UP: &str = "Time's up! Submitting quiz...";
    pub const SUBMITTED: &str = "Quiz submitted successfully!";
    pub const SUBMIT_FAILED: &str = "Failed to submit the quiz.";
    pub const CHEATING: &str = "Cheating attempt detected: Exiting fullscreen mode.";
    pub const INVALID_LOGIN: &str = "Invalid email or password";
    pub const LOGGED_IN: &str = "Logged In Successfully";
    pub const LOGIN_REQUIRED: &str = "Please log in to continue.";
    pub const GENERIC_ERROR: &str = "An error occurred";
    pub const OTP_VERIFIED: &str = "Account verified successfully!";
    pub const OTP_RESENT: &str = "OTP resent to your email!";
    pub const OTP_SENT: &str = "OTP sent to your email!";
    pub const SEND_OTP_FAILED: &str = "Failed to send OTP. Your account not available";
    pub const PASSWORD_CHANGED: &str = "Password changed successfully!";
    pub const CHANGE_PASSWORD_FAILED: &str = "Failed to change password. Please try again.";
    pub const QUESTIONS_LOADED: &str = "Questions loaded successfully!";
    pub const PREPARE_FAILED: &str = "Failed to fetch questions. Redirecting to home.";
    pub const QUESTIONS_ADDED: &str = "Questions added successfully!";
    pub const ADD_QUESTIONS_FAILED: &str = "An error occurred while adding questions.";
    pub const CHAT_CLEARED: &str = "Your chat history has been cleared.";

    pub fn time_left(minutes: u32) -> String {
        format!("Time left: {} minutes", minutes)
    }

    pub fn otp_cooldown(remaining_secs: u64) -> String {
        format!("Resend OTP in {}s", remaining_secs)
    }

    /// 请求失败时给用户看的文案
    ///
    /// 本地校验和冷却用各自的提示；后端拒绝时优先用服务端的 message，
    /// `trust_server` 为 false 时一律用 `fallback`。
    pub fn for_app_error(err: &crate::error::AppError, fallback: &str, trust_server: bool) -> String {
        use crate::error::{AppError, AuthError};
        match err {
            AppError::Validation(message) => message.clone(),
            AppError::Auth(AuthError::OtpCooldown { remaining_secs }) => otp_cooldown(*remaining_secs),
            AppError::Auth(AuthError::InvalidCredentials) => INVALID_LOGIN.to_string(),
            AppError::Auth(AuthError::NotSignedIn) => LOGIN_REQUIRED.to_string(),
            other => match other.server_message() {
                Some(message) if trust_server => message.to_string(),
                _ => fallback.to_string(),
            },
        }
    }

    /// 操作被会话拒绝时给用户看的文案
    pub fn for_session_error(err: &crate::error::SessionError) -> &'static str {
        use crate::error::SessionError::*;
        match err {
            NoQuestions => NO_QUESTIONS,
            Unanswered { .. } => SELECT_BEFORE_NEXT,
            Incomplete { .. } => UNANSWERED,
            NotCurrentQuestion { .. } => "You can only answer the current question.",
            OptionOutOfRange { .. } => "Please choose one of the listed options.",
            AtFirstQuestion => "This is the first question.",
            Completed => "You have reached the end of the quiz.",
            NotStarted => "The quiz has not started yet.",
            AlreadyStarted => "The quiz is already in progress.",
            AlreadySubmitted => "This quiz has already been submitted.",
        }
    }
}

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// 一条提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.level {
            NoticeLevel::Info => "ℹ️",
            NoticeLevel::Success => "✅",
            NoticeLevel::Error => "❌",
        };
        write!(f, "{} {}", icon, self.message)
    }
}

/// 提示出口
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 终端提示：打印到标准输出，并追加到会话日志文件
pub struct ConsoleNotifier {
    log_file_path: Option<String>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            log_file_path: None,
        }
    }

    /// 同时把提示追加到日志文件
    pub fn with_log_file(path: impl Into<String>) -> Self {
        Self {
            log_file_path: Some(path.into()),
        }
    }

    fn append(&self, path: &str, notice: &Notice) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "[{}] {:?} | {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            notice.level,
            notice.message
        )
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", notice);
        info!("提示: {}", notice.message);

        if let Some(path) = &self.log_file_path {
            if let Err(e) = self.append(path, &notice) {
                warn!("写入日志文件失败 ({}): {}", path, e);
            }
        }
    }
}
