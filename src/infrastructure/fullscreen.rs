//! 全屏能力 - 基础设施层
//!
//! 把宿主的全屏 API 当作不透明的能力：请求进入全屏、订阅"退出全屏"事件。
//! 不认识会话，也不决定违规后怎么处理。

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// 全屏宿主
#[async_trait]
pub trait FullscreenHost: Send + Sync {
    /// 请求进入全屏，`Ok(false)` 表示宿主拒绝
    async fn request_fullscreen(&self) -> Result<bool>;

    /// 订阅退出全屏事件；接收端被丢弃即取消订阅
    async fn subscribe_exit(&self) -> Result<mpsc::Receiver<()>>;
}

/// 没有全屏能力的宿主（例如纯终端），请求总是被拒绝
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreen;

#[async_trait]
impl FullscreenHost for NoFullscreen {
    async fn request_fullscreen(&self) -> Result<bool> {
        Ok(false)
    }

    async fn subscribe_exit(&self) -> Result<mpsc::Receiver<()>> {
        anyhow::bail!("当前宿主不支持全屏")
    }
}

const REQUEST_FULLSCREEN_JS: &str = r#"
(async () => {
    try {
        if (!document.documentElement.requestFullscreen) {
            return false;
        }
        await document.documentElement.requestFullscreen();
        return document.fullscreenElement !== null;
    } catch (err) {
        return false;
    }
})()
"#;

/// 最短轮询间隔，`interval` 不接受零周期
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// `requestFullscreen()` 需要用户激活，所以按用户手势执行
fn request_fullscreen_params() -> Result<EvaluateParams> {
    EvaluateParams::builder()
        .expression(REQUEST_FULLSCREEN_JS)
        .await_promise(true)
        .return_by_value(true)
        .user_gesture(true)
        .build()
        .map_err(anyhow::Error::msg)
}

const IS_FULLSCREEN_JS: &str = "document.fullscreenElement !== null";

/// 通过 Chrome DevTools 协议控制的监考浏览器页面
///
/// 浏览器没有"全屏变化"的 CDP 事件，所以退出检测靠轮询 `document.fullscreenElement`。
#[derive(Clone)]
pub struct CdpFullscreen {
    page: Page,
    poll_interval: Duration,
}

impl CdpFullscreen {
    pub fn new(page: Page, poll_interval: Duration) -> Self {
        Self {
            page,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    async fn eval_bool(page: &Page, script: &str) -> Result<bool> {
        let value = page
            .evaluate(script)
            .await
            .context("无法执行全屏脚本")?
            .into_value::<bool>()
            .context("全屏脚本返回值不是布尔值")?;
        Ok(value)
    }
}

#[async_trait]
impl FullscreenHost for CdpFullscreen {
    async fn request_fullscreen(&self) -> Result<bool> {
        let entered = self
            .page
            .evaluate_expression(request_fullscreen_params()?)
            .await
            .context("无法执行全屏脚本")?
            .into_value::<bool>()
            .context("全屏脚本返回值不是布尔值")?;
        debug!("监考页面全屏请求结果: {}", entered);
        Ok(entered)
    }

    async fn subscribe_exit(&self) -> Result<mpsc::Receiver<()>> {
        let (tx, rx) = mpsc::channel(1);
        let page = self.page.clone();
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {
                        match Self::eval_bool(&page, IS_FULLSCREEN_JS).await {
                            Ok(true) => {}
                            Ok(false) => {
                                let _ = tx.send(()).await;
                                break;
                            }
                            Err(e) => warn!("读取全屏状态失败: {}", e),
                        }
                    }
                }
            }
            debug!("全屏轮询任务结束");
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_fullscreen_denies() {
        let host = NoFullscreen;
        assert!(!host.request_fullscreen().await.unwrap());
        assert!(host.subscribe_exit().await.is_err());
    }

    #[test]
    fn test_fullscreen_request_runs_as_user_gesture() {
        let params = request_fullscreen_params().unwrap();
        assert_eq!(params.user_gesture, Some(true));
        assert_eq!(params.await_promise, Some(true));
        assert!(params.expression.contains("requestFullscreen"));
    }
}
