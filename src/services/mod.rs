pub mod account_service;
pub mod auth_service;
pub mod chat_service;
pub mod navigation;
pub mod notice;
pub mod otp_cooldown;
pub mod quiz_api;

pub use account_service::{AccountService, PendingSignup};
pub use auth_service::{AppContext, TokenStore};
pub use chat_service::{ChatHistory, ChatService};
pub use navigation::{Navigator, Route, RouteRecorder};
pub use notice::{messages, ConsoleNotifier, Notice, NoticeLevel, Notifier};
pub use otp_cooldown::OtpCooldown;
pub use quiz_api::{QuestionSource, QuizApi, SubmissionSink};
