//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源接线和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、命令分发）
//! - 持有登录上下文（AppContext）和监考浏览器（Browser）
//! - 把标准输入和界面渲染接到答题控制器
//!
//! ### `quiz_controller` - 答题控制器
//! - 加载题目，启动会话、监考和计时器
//! - 串行处理答题事件
//! - 结束时释放计时器和监听
//!
//! ### `terminal` - 终端界面
//! - 命令行解析和键盘输入映射
//! - 文本渲染
//!
//! ## 层次关系
//!
//! ```text
//! app (命令分发)
//!     ↓
//! quiz_controller (处理 QuizEvent)
//!     ↓
//! workflow (QuizSession / QuizTimer / ProctorGuard / Submitter)
//!     ↓
//! services (能力层：quiz_api / notice / navigation / auth)
//!     ↓
//! infrastructure (基础设施：ApiClient / FullscreenHost)
//! ```

pub mod app;
pub mod quiz_controller;
pub mod terminal;

// 重新导出主要类型
pub use app::App;
pub use quiz_controller::{QuizController, QuizHandles, QuizInbox, QuizOutcome, QuizSettings};
pub use terminal::Command;
