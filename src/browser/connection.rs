use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到监考浏览器并获取答题页面
///
/// 浏览器需要以 `--remote-debugging-port=<port>` 启动。已打开的页面中
/// 如果有 URL 以 `target_url` 开头的就复用，否则新建一个页面。
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到监考浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    if let Some(url) = target_url {
        for page in browser.pages().await? {
            if let Ok(Some(page_url)) = page.url().await {
                if page_url.starts_with(url) {
                    info!("✓ 复用已打开的答题页面: {}", page_url);
                    return Ok((browser, page));
                }
            }
        }
    }

    let page = browser
        .new_page(target_url.unwrap_or("about:blank"))
        .await
        .map_err(|e| {
            error!("创建答题页面失败: {}", e);
            e
        })?;
    info!("已打开答题页面: {}", target_url.unwrap_or("about:blank"));

    Ok((browser, page))
}
