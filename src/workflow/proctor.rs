//! 全屏监考 - 流程层
//!
//! 答题开始时请求全屏；请求成功后监听退出全屏，并把退出转成 `QuizEvent::FullscreenExited`。
//! 宿主不支持或拒绝全屏时不启用监考，答题照常进行。

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::infrastructure::FullscreenHost;
use crate::workflow::events::QuizEvent;

/// 监考状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProctorState {
    /// 未启用
    Inactive,
    /// 全屏中，正在监听
    Active,
    /// 已判定违规，不再响应
    Tripped,
}

/// 监考守卫
pub struct ProctorGuard {
    state: ProctorState,
    listener: Option<JoinHandle<()>>,
}

impl ProctorGuard {
    pub fn new() -> Self {
        Self {
            state: ProctorState::Inactive,
            listener: None,
        }
    }

    pub fn state(&self) -> ProctorState {
        self.state
    }

    /// 请求全屏并开始监听
    pub async fn arm(
        &mut self,
        host: &dyn FullscreenHost,
        events: mpsc::Sender<QuizEvent>,
    ) -> ProctorState {
        if self.state != ProctorState::Inactive {
            return self.state;
        }

        match host.request_fullscreen().await {
            Ok(true) => {}
            Ok(false) => {
                info!("宿主未进入全屏，不启用监考");
                return self.state;
            }
            Err(e) => {
                warn!("请求全屏失败，不启用监考: {}", e);
                return self.state;
            }
        }

        let mut exits = match host.subscribe_exit().await {
            Ok(rx) => rx,
            Err(e) => {
                warn!("无法监听全屏状态，不启用监考: {}", e);
                return self.state;
            }
        };

        self.listener = Some(tokio::spawn(async move {
            if exits.recv().await.is_some() {
                let _ = events.send(QuizEvent::FullscreenExited).await;
            }
        }));
        self.state = ProctorState::Active;
        info!("🖥️ 已进入全屏，监考开始");
        self.state
    }

    /// 处理退出全屏
    ///
    /// 只有监听中才算违规，而且只算一次。返回 true 表示本次应当中止答题。
    pub fn on_fullscreen_exit(&mut self) -> bool {
        if self.state != ProctorState::Active {
            debug!("忽略退出全屏事件 (状态: {:?})", self.state);
            return false;
        }
        self.state = ProctorState::Tripped;
        self.stop_listener();
        true
    }

    /// 停止监听
    pub fn disarm(&mut self) {
        self.stop_listener();
        if self.state == ProctorState::Active {
            self.state = ProctorState::Inactive;
        }
    }

    fn stop_listener(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.abort();
        }
    }
}

impl Default for ProctorGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProctorGuard {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::NoFullscreen;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Granted {
        exits: Mutex<Option<mpsc::Receiver<()>>>,
    }

    #[async_trait]
    impl FullscreenHost for Granted {
        async fn request_fullscreen(&self) -> anyhow::Result<bool> {
            Ok(true)
        }

        async fn subscribe_exit(&self) -> anyhow::Result<mpsc::Receiver<()>> {
            self.exits
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| anyhow::anyhow!("already subscribed"))
        }
    }

    #[tokio::test]
    async fn test_denied_fullscreen_stays_inactive() {
        let (tx, _rx) = mpsc::channel(4);
        let mut guard = ProctorGuard::new();
        assert_eq!(guard.arm(&NoFullscreen, tx).await, ProctorState::Inactive);
        assert!(!guard.on_fullscreen_exit());
    }

    #[tokio::test]
    async fn test_exit_is_forwarded_and_trips_once() {
        let (exit_tx, exit_rx) = mpsc::channel(4);
        let host = Granted {
            exits: Mutex::new(Some(exit_rx)),
        };
        let (tx, mut rx) = mpsc::channel(4);
        let mut guard = ProctorGuard::new();

        assert_eq!(guard.arm(&host, tx).await, ProctorState::Active);
        exit_tx.send(()).await.unwrap();
        assert_eq!(rx.recv().await, Some(QuizEvent::FullscreenExited));

        assert!(guard.on_fullscreen_exit());
        assert!(!guard.on_fullscreen_exit());
        assert_eq!(guard.state(), ProctorState::Tripped);
    }

    #[tokio::test]
    async fn test_disarm_stops_listening() {
        let (exit_tx, exit_rx) = mpsc::channel(4);
        let host = Granted {
            exits: Mutex::new(Some(exit_rx)),
        };
        let (tx, mut rx) = mpsc::channel(4);
        let mut guard = ProctorGuard::new();
        guard.arm(&host, tx).await;

        guard.disarm();
        assert_eq!(guard.state(), ProctorState::Inactive);
        assert!(!guard.on_fullscreen_exit());

        let _ = exit_tx.send(()).await;
        // 监听任务被取消后发送端随之释放
        assert_eq!(rx.recv().await, None);
    }
}
