use serde::{Deserialize, Serialize};

/// 题目分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    /// 分类下的题目总数
    #[serde(default)]
    pub total: u32,
}
