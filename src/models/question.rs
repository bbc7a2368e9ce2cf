use serde::{Deserialize, Serialize};

/// 题目难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    /// 后端使用的小写名称
    pub fn name(self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }

    /// 展示用的大写标签
    pub fn badge(self) -> &'static str {
        match self {
            Level::Easy => "EASY",
            Level::Medium => "MEDIUM",
            Level::Hard => "HARD",
        }
    }

    /// 从字符串解析难度（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Level::Easy),
            "medium" => Some(Level::Medium),
            "hard" => Some(Level::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 一道选择题，加载后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub options: Vec<String>,
    pub level: Level,
}

impl Question {
    /// 最少选项数
    pub const MIN_OPTIONS: usize = 2;

    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        options: Vec<String>,
        level: Level,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            options,
            level,
        }
    }

    /// 选项下标是否合法
    pub fn has_option(&self, option: usize) -> bool {
        option < self.options.len()
    }

    /// 边界校验，返回不合格的原因
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("题目缺少 _id".to_string());
        }
        if self.options.len() < Self::MIN_OPTIONS {
            return Err(format!(
                "题目 {} 只有 {} 个选项",
                self.id,
                self.options.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_question() {
        let raw = r#"{
            "_id": "6650a1",
            "title": "What is 2 + 2?",
            "options": ["3", "4", "5", "22"],
            "level": "easy",
            "correctAnswerIndex": 1
        }"#;
        let q: Question = serde_json::from_str(raw).unwrap();
        assert_eq!(q.id, "6650a1");
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.level, Level::Easy);
        assert!(q.has_option(3));
        assert!(!q.has_option(4));
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let raw = r#"{"_id": "x", "title": "t", "options": ["a", "b"], "level": "extreme"}"#;
        assert!(serde_json::from_str::<Question>(raw).is_err());
    }

    #[test]
    fn test_validate_requires_two_options() {
        let q = Question::new("q1", "Only one?", vec!["yes".to_string()], Level::Hard);
        assert!(q.validate().is_err());

        let q = Question::new("", "No id", vec!["a".into(), "b".into()], Level::Hard);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(Level::parse(" Medium "), Some(Level::Medium));
        assert_eq!(Level::Hard.badge(), "HARD");
        assert_eq!(Level::Easy.to_string(), "easy");
    }
}
