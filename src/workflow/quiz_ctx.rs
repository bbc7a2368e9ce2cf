//! 答题上下文
//!
//! 封装"谁在答哪个分类"这一信息，主要用于日志前缀

use std::fmt::Display;

/// 答题上下文
#[derive(Debug, Clone)]
pub struct QuizCtx {
    /// 分类ID
    pub category_id: String,

    /// 答题人（邮箱，仅用于日志显示）
    pub user_label: String,
}

impl QuizCtx {
    /// 创建新的答题上下文
    pub fn new(category_id: impl Into<String>, user_label: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            user_label: user_label.into(),
        }
    }
}

impl Display for QuizCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[分类 #{} 用户 {}]", self.category_id, self.user_label)
    }
}
