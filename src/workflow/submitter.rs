//! 交卷 - 流程层
//!
//! 手动交卷和超时交卷走同一条路径：
//! 1. 完整性检查（超时且策略为 `SubmitAnswered` 时跳过）
//! 2. 调用交卷接口，每次答题最多一次
//! 3. 成功 → 提示 + 跳到仪表盘；失败 → 提示 + 回到首页

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::ExpiryPolicy;
use crate::error::SessionError;
use crate::models::{SubmissionPayload, SubmitReceipt};
use crate::services::{messages, Navigator, Notice, Notifier, Route, SubmissionSink};
use crate::workflow::session::QuizSession;

/// 交卷触发方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    TimerExpired,
}

/// 交卷结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 后端已接收
    Accepted(SubmitReceipt),
    /// 没有发出请求，答题继续
    Rejected(SessionError),
    /// 请求已发出但失败
    Failed(String),
}

/// 交卷器
pub struct Submitter {
    sink: Arc<dyn SubmissionSink>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    policy: ExpiryPolicy,
    attempted: bool,
}

impl Submitter {
    pub fn new(
        sink: Arc<dyn SubmissionSink>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        policy: ExpiryPolicy,
    ) -> Self {
        Self {
            sink,
            notifier,
            navigator,
            policy,
            attempted: false,
        }
    }

    /// 是否已经发出过交卷请求
    pub fn has_attempted(&self) -> bool {
        self.attempted
    }

    /// 按触发方式和策略生成答卷
    pub fn prepare(
        &self,
        session: &QuizSession,
        trigger: SubmitTrigger,
    ) -> Result<SubmissionPayload, SessionError> {
        if self.attempted {
            return Err(SessionError::AlreadySubmitted);
        }
        if !session.is_started() {
            return Err(SessionError::NotStarted);
        }

        match (trigger, self.policy) {
            (SubmitTrigger::TimerExpired, ExpiryPolicy::SubmitAnswered) => {
                Ok(session.answered_payload())
            }
            _ => session.payload(),
        }
    }

    /// 交卷
    pub async fn submit(&mut self, session: &QuizSession, trigger: SubmitTrigger) -> SubmitOutcome {
        let payload = match self.prepare(session, trigger) {
            Ok(payload) => payload,
            Err(e) => {
                match &e {
                    SessionError::Incomplete { count } => {
                        info!("还有 {} 道题未作答，暂不交卷 ({:?})", count, trigger);
                        self.notifier.notify(Notice::error(messages::UNANSWERED));
                    }
                    other => debug!("忽略交卷请求: {}", other),
                }
                return SubmitOutcome::Rejected(e);
            }
        };

        self.attempted = true;
        info!(
            "📤 交卷 ({:?}): 分类 {} 共 {} 题",
            trigger,
            payload.category_id,
            payload.len()
        );

        match self.sink.submit_quiz(&payload).await {
            Ok(receipt) => {
                info!("✓ 交卷成功: {:?}", receipt.message);
                self.notifier.notify(Notice::success(messages::SUBMITTED));
                self.navigator.navigate(Route::Dashboard);
                SubmitOutcome::Accepted(receipt)
            }
            Err(e) => {
                error!("❌ 交卷失败: {}", e);
                self.notifier.notify(Notice::error(messages::SUBMIT_FAILED));
                self.navigator.navigate(Route::Home);
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }
}
