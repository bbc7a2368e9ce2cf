//! 答题控制器 - 编排层
//!
//! ## 职责
//!
//! 驱动一次完整的限时答题：
//!
//! 1. **加载**：按分类取题，失败时提示并回到首页
//! 2. **开始**：启动会话、请求全屏监考、启动计时器
//! 3. **事件循环**：逐个处理用户输入、计时和退出全屏事件
//! 4. **结束**：交卷 / 违规中止 / 离开页面，任何一种都会停掉计时器和监听
//!
//! 所有输入都经过同一个 `mpsc` 队列，会话只在这个循环里被修改；
//! 每处理完一个事件就通过 `watch` 发布一次快照给界面。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::{Config, ExpiryPolicy};
use crate::infrastructure::{FullscreenHost, NoFullscreen};
use crate::models::{Question, SubmitReceipt};
use crate::services::{
    messages, Navigator, Notice, Notifier, QuestionSource, Route, SubmissionSink,
};
use crate::utils::logging::log_quiz_loaded;
use crate::workflow::{
    minutes_notice, ProctorGuard, ProctorState, QuizCtx, QuizEvent, QuizSession, QuizTimer,
    SessionSnapshot, SubmitOutcome, SubmitTrigger, Submitter, TickOutcome,
};

/// 事件队列容量
const EVENT_QUEUE_CAPACITY: usize = 64;

/// 答题参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    pub time_limit_secs: u32,
    /// 计时周期，正常为 1 秒
    pub tick_period: Duration,
    pub expiry_policy: ExpiryPolicy,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: crate::workflow::DEFAULT_TIME_LIMIT_SECS,
            tick_period: Duration::from_secs(1),
            expiry_policy: ExpiryPolicy::default(),
        }
    }
}

impl From<&Config> for QuizSettings {
    fn from(config: &Config) -> Self {
        Self {
            time_limit_secs: config.quiz_time_limit_secs,
            expiry_policy: config.expiry_policy,
            ..Self::default()
        }
    }
}

/// 一次答题的结束方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    /// 没有题目，未开始
    NotStarted,
    /// 交卷成功
    Submitted(SubmitReceipt),
    /// 交卷请求失败，会话已丢弃
    SubmitFailed,
    /// 退出全屏被判定违规
    Aborted,
    /// 用户离开
    Disposed,
}

impl QuizOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            QuizOutcome::NotStarted => "未开始",
            QuizOutcome::Submitted(_) => "交卷成功",
            QuizOutcome::SubmitFailed => "交卷失败",
            QuizOutcome::Aborted => "违规中止",
            QuizOutcome::Disposed => "中途离开",
        }
    }
}

/// 控制器一侧的队列端
pub struct QuizInbox {
    events_tx: mpsc::Sender<QuizEvent>,
    events_rx: mpsc::Receiver<QuizEvent>,
    view: watch::Sender<SessionSnapshot>,
}

/// 界面一侧的队列端
#[derive(Clone)]
pub struct QuizHandles {
    pub events: mpsc::Sender<QuizEvent>,
    pub snapshots: watch::Receiver<SessionSnapshot>,
}

impl QuizInbox {
    /// 创建一对队列端
    pub fn channel() -> (QuizInbox, QuizHandles) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (view, snapshots) = watch::channel(SessionSnapshot::default());
        (
            QuizInbox {
                events_tx: events_tx.clone(),
                events_rx,
                view,
            },
            QuizHandles {
                events: events_tx,
                snapshots,
            },
        )
    }
}

/// 一次答题运行中持有的资源
struct Running {
    session: QuizSession,
    timer: QuizTimer,
    guard: ProctorGuard,
    submitter: Submitter,
}

/// 答题控制器
pub struct QuizController {
    source: Arc<dyn QuestionSource>,
    sink: Arc<dyn SubmissionSink>,
    fullscreen: Arc<dyn FullscreenHost>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    settings: QuizSettings,
}

impl QuizController {
    /// 创建控制器，默认不启用全屏监考
    pub fn new(
        source: Arc<dyn QuestionSource>,
        sink: Arc<dyn SubmissionSink>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        settings: QuizSettings,
    ) -> Self {
        Self {
            source,
            sink,
            fullscreen: Arc::new(NoFullscreen),
            notifier,
            navigator,
            settings,
        }
    }

    /// 使用指定的全屏宿主
    pub fn with_fullscreen(mut self, host: Arc<dyn FullscreenHost>) -> Self {
        self.fullscreen = host;
        self
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// 取题
    ///
    /// 失败时提示并回到首页，返回 None
    pub async fn load(&self, ctx: &QuizCtx) -> Option<Vec<Question>> {
        match self.source.fetch_questions(&ctx.category_id).await {
            Ok(questions) => {
                log_quiz_loaded(&ctx.to_string(), questions.len(), self.settings.time_limit_secs);
                Some(questions)
            }
            Err(e) => {
                error!("{} ❌ 取题失败: {}", ctx, e);
                self.notifier.notify(Notice::error(messages::LOAD_FAILED));
                self.navigator.navigate(Route::Home);
                None
            }
        }
    }

    /// 开始答题并运行事件循环，直到答题结束
    pub async fn run(&self, ctx: &QuizCtx, questions: Vec<Question>, inbox: QuizInbox) -> QuizOutcome {
        let QuizInbox {
            events_tx,
            mut events_rx,
            view,
        } = inbox;

        let mut session = QuizSession::new(ctx.category_id.clone(), self.settings.time_limit_secs);
        if let Err(e) = session.start(questions) {
            warn!("{} 无法开始答题: {}", ctx, e);
            self.notifier
                .notify(Notice::error(messages::for_session_error(&e)));
            return QuizOutcome::NotStarted;
        }
        self.notifier.notify(Notice::success(messages::GOOD_LUCK));

        let mut guard = ProctorGuard::new();
        let state = guard.arm(self.fullscreen.as_ref(), events_tx.clone()).await;
        session.set_started_fullscreen(state == ProctorState::Active);

        let timer = QuizTimer::start(self.settings.tick_period, events_tx);
        let submitter = Submitter::new(
            self.sink.clone(),
            self.notifier.clone(),
            self.navigator.clone(),
            self.settings.expiry_policy,
        );

        let mut running = Running {
            session,
            timer,
            guard,
            submitter,
        };
        info!(
            "{} ▶️ 开始答题: {} 道题 (全屏: {})",
            ctx,
            running.session.len(),
            running.session.started_fullscreen()
        );
        view.send_replace(running.session.snapshot());

        let outcome = loop {
            let Some(event) = events_rx.recv().await else {
                break QuizOutcome::Disposed;
            };
            debug!("{} 事件: {:?}", ctx, event);

            if let Some(outcome) = self.handle(ctx, &mut running, event).await {
                break outcome;
            }
            view.send_replace(running.session.snapshot());
        };

        running.timer.cancel();
        running.guard.disarm();
        view.send_replace(running.session.snapshot());
        info!("{} ⏹️ 答题结束: {}", ctx, outcome.label());
        outcome
    }

    /// 处理单个事件，返回 Some 表示答题结束
    async fn handle(&self, ctx: &QuizCtx, run: &mut Running, event: QuizEvent) -> Option<QuizOutcome> {
        match event {
            QuizEvent::Select { index, option } => {
                if let Err(e) = run.session.select_answer(index, option) {
                    self.reject(ctx, &e);
                }
                None
            }
            QuizEvent::Advance => {
                if let Err(e) = run.session.advance() {
                    self.reject(ctx, &e);
                }
                None
            }
            QuizEvent::Retreat => {
                if let Err(e) = run.session.retreat() {
                    self.reject(ctx, &e);
                }
                None
            }
            QuizEvent::Submit => self.submit(run, SubmitTrigger::Manual).await,
            QuizEvent::Tick => match run.session.tick() {
                TickOutcome::Idle => None,
                TickOutcome::Counting { previous, .. } => {
                    if let Some(minutes) = minutes_notice(previous) {
                        self.notifier.notify(Notice::info(messages::time_left(minutes)));
                    }
                    None
                }
                TickOutcome::Expired { .. } => {
                    info!("{} ⏰ 时间到", ctx);
                    run.timer.cancel();
                    self.notifier.notify(Notice::error(messages::TIME_UP));
                    self.submit(run, SubmitTrigger::TimerExpired).await
                }
            },
            QuizEvent::FullscreenExited => {
                if !run.guard.on_fullscreen_exit() {
                    return None;
                }
                warn!("{} 🚨 检测到退出全屏，中止答题", ctx);
                self.notifier.notify(Notice::error(messages::CHEATING));
                self.navigator.navigate(Route::Home);
                Some(QuizOutcome::Aborted)
            }
            QuizEvent::Dispose => Some(QuizOutcome::Disposed),
        }
    }

    async fn submit(&self, run: &mut Running, trigger: SubmitTrigger) -> Option<QuizOutcome> {
        match run.submitter.submit(&run.session, trigger).await {
            SubmitOutcome::Accepted(receipt) => Some(QuizOutcome::Submitted(receipt)),
            SubmitOutcome::Failed(_) => Some(QuizOutcome::SubmitFailed),
            SubmitOutcome::Rejected(_) => None,
        }
    }

    fn reject(&self, ctx: &QuizCtx, err: &crate::error::SessionError) {
        debug!("{} 操作被拒绝: {}", ctx, err);
        self.notifier
            .notify(Notice::error(messages::for_session_error(err)));
    }
}
