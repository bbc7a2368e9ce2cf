use serde::Deserialize;

use crate::models::question::Level;

/// 复习模式下的题目，带正确答案和解析
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudyQuestion {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswerIndex")]
    pub correct_answer_index: usize,
    #[serde(default)]
    pub explanation: String,
    pub level: Level,
}

impl StudyQuestion {
    /// 正确选项的文本；下标越界时返回 None
    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(self.correct_answer_index)
            .map(String::as_str)
    }
}

/// 复习列表的筛选条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyFilter {
    /// 标题关键字（忽略大小写）
    pub search: Option<String>,
    /// 只看某个难度
    pub level: Option<Level>,
}

impl StudyFilter {
    pub fn matches(&self, question: &StudyQuestion) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => question
                .title
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        };
        let level_ok = self.level.map_or(true, |level| question.level == level);
        search_ok && level_ok
    }

    /// 保持原有顺序
    pub fn apply<'a>(&self, questions: &'a [StudyQuestion]) -> Vec<&'a StudyQuestion> {
        questions.iter().filter(|q| self.matches(q)).collect()
    }
}
