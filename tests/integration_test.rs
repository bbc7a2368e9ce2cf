use quiz_client::browser::connect_to_browser_and_page;
use quiz_client::config::Config;
use quiz_client::infrastructure::{ApiClient, CdpFullscreen, FullscreenHost};
use std::time::Duration;
use quiz_client::services::{AppContext, QuestionSource, QuizApi, TokenStore};
use quiz_client::utils::logging;

#[tokio::test]
#[ignore] // 默认忽略，需要本地后端：cargo test -- --ignored
async fn test_categories_and_questions_live() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::load().expect("配置无效");

    let api = QuizApi::new(ApiClient::new(&config).expect("无法创建客户端"));
    let categories = api.categories().await.expect("获取分类失败");
    println!("找到 {} 个分类", categories.len());

    if let Some(category) = categories.first() {
        let questions = api
            .fetch_questions(&category.id)
            .await
            .expect("取题失败");
        println!("分类 {} 有 {} 道题", category.name, questions.len());
        assert!(questions.iter().all(|q| q.validate().is_ok()));
    }
}

#[tokio::test]
#[ignore]
async fn test_hydrate_saved_token_live() {
    logging::init(true);

    let config = Config::load().expect("配置无效");
    let client = ApiClient::new(&config).expect("无法创建客户端");
    let mut context = AppContext::new(client, TokenStore::new(&config.token_file));

    let user = context.hydrate().await.expect("恢复身份失败");
    println!("当前用户: {:?}", user.map(|u| u.email.clone()));
}

#[tokio::test]
#[ignore]
async fn test_browser_connection() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::load().expect("配置无效");
    let port = config.proctor_browser_port.unwrap_or(9222);

    // 测试浏览器连接
    let result = connect_to_browser_and_page(port, config.proctor_page_url.as_deref()).await;

    assert!(result.is_ok(), "应该能够成功连接监考浏览器");
}

#[tokio::test]
#[ignore]
async fn test_kiosk_page_enters_fullscreen() {
    logging::init(true);

    let config = Config::load().expect("配置无效");
    let port = config.proctor_browser_port.unwrap_or(9222);
    let (_browser, page) = connect_to_browser_and_page(port, config.proctor_page_url.as_deref())
        .await
        .expect("无法连接监考浏览器");

    let host = CdpFullscreen::new(page, Duration::from_millis(config.proctor_poll_interval_ms));
    let entered = host.request_fullscreen().await;
    assert!(matches!(entered, Ok(true)), "监考页面应当进入全屏: {:?}", entered);
}
