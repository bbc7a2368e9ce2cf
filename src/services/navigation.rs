//! 导航服务 - 业务能力层

use std::sync::Mutex;
use tracing::info;

/// 客户端页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// 首页（安全落脚点）
    Home,
    Login,
    /// 用户仪表盘
    Dashboard,
    /// 某次成绩的分析页
    Result(String),
    /// 某分类的复习页
    Prepare(String),
    AdminLogin,
    AdminDashboard,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/user/login".to_string(),
            Route::Dashboard => "/user/dashboard".to_string(),
            Route::Result(id) => format!("/result/{}", id),
            Route::Prepare(id) => format!("/prepare/{}", id),
            Route::AdminLogin => "/admin/login".to_string(),
            Route::AdminDashboard => "/admin/dashboard".to_string(),
        }
    }
}

/// 导航出口
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// 记录导航历史的导航器，终端程序据此决定下一步显示什么
#[derive(Debug, Default)]
pub struct RouteRecorder {
    history: Mutex<Vec<Route>>,
}

impl RouteRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一次导航
    pub fn current(&self) -> Option<Route> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl Navigator for RouteRecorder {
    fn navigate(&self, route: Route) {
        info!("➡️ 跳转到 {}", route.path());
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}
