//! # Quiz Client
//!
//! 限时答题平台的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 客户端、监考页面），只暴露能力
//! - `ApiClient` - 带令牌和重试的 JSON 客户端
//! - `FullscreenHost` - 进入全屏、监听退出全屏
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `QuizApi` - 取题 / 交卷 / 分类 / 成绩 / 复习 / 录题
//! - `AppContext` - 登录身份（用户和管理员各一份令牌）
//! - `AccountService` - 注册、验证码、找回密码
//! - `ChatService` - 学习助手聊天
//! - `Notifier` / `Navigator` - 提示和页面跳转
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次限时答题"的状态和规则
//! - `QuizSession` - 会话状态机
//! - `QuizTimer` / `ProctorGuard` / `Submitter` - 计时、监考、交卷
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/quiz_controller` - 串行处理答题事件
//! - `orchestrator/app` - 命令行应用，管理资源
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::{Config, ExpiryPolicy};
pub use error::{AppError, AppResult, SessionError};
pub use infrastructure::{ApiClient, FullscreenHost};
pub use models::{Question, SubmissionPayload};
pub use orchestrator::{App, Command, QuizController, QuizOutcome};
pub use workflow::{QuizCtx, QuizEvent, QuizSession};
