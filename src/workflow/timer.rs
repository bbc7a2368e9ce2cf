//! 答题计时器 - 流程层
//!
//! 每个周期往事件队列投递一次 `QuizEvent::Tick`。
//! 计时器随句柄销毁而停止，答题无论怎样结束都不会留下后台任务。

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::workflow::events::QuizEvent;

/// 最短周期，`interval` 不接受零周期
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// 计时器句柄
pub struct QuizTimer {
    handle: Option<JoinHandle<()>>,
}

impl QuizTimer {
    /// 启动计时器，第一次 Tick 在一个周期之后
    pub fn start(period: Duration, events: mpsc::Sender<QuizEvent>) -> Self {
        let period = period.max(MIN_TICK_PERIOD);
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if events.send(QuizEvent::Tick).await.is_err() {
                    debug!("事件队列已关闭，计时器退出");
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// 停止计时，可重复调用
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("⏹️ 计时器已停止");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for QuizTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 整分钟时的剩余分钟数
///
/// `previous` 是递减前的剩余秒数，所以 600 秒时第一次 Tick 就会提示 10 分钟。
pub fn minutes_notice(previous: u32) -> Option<u32> {
    (previous > 0 && previous % 60 == 0).then_some(previous / 60)
}
