use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ConfigError, FileError};
use crate::models::question::Level;

/// 管理员录入的新题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub title: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswerIndex")]
    pub correct_answer_index: usize,
    pub explanation: String,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl NewQuestion {
    /// 每道题固定四个选项
    pub const OPTION_COUNT: usize = 4;

    /// 校验一道题，`number` 是从 1 开始的题号，用于提示
    pub fn validate(&self, number: usize) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err(format!("Question {}: Title is required.", number));
        }
        if self.options.len() != Self::OPTION_COUNT
            || self.options.iter().any(|o| o.trim().is_empty())
        {
            return Err(format!("Question {}: All options must be filled.", number));
        }
        if self.correct_answer_index >= Self::OPTION_COUNT {
            return Err(format!(
                "Question {}: Correct answer index must be between 0 and 3.",
                number
            ));
        }
        if self.explanation.trim().is_empty() {
            return Err(format!("Question {}: Explanation is required.", number));
        }
        Ok(())
    }
}

/// 题目文件：
///
/// ```toml
/// [[questions]]
/// title = "2 + 2 = ?"
/// options = ["3", "4", "5", "22"]
/// correctAnswerIndex = 1
/// explanation = "Basic arithmetic."
/// level = "easy"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionBatch {
    pub questions: Vec<NewQuestion>,
}

impl QuestionBatch {
    /// 读取题目文件
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    /// 逐题校验，返回第一条错误
    pub fn validate(&self) -> Result<(), String> {
        if self.questions.is_empty() {
            return Err("Add at least one question.".to_string());
        }
        self.questions
            .iter()
            .enumerate()
            .try_for_each(|(i, q)| q.validate(i + 1))
    }
}

/// `POST /question/add` 的请求体，每道题都带上分类
#[derive(Debug, Serialize)]
pub struct AddQuestionsRequest<'a> {
    pub category_id: &'a str,
    pub questions: Vec<NewQuestion>,
}

impl<'a> AddQuestionsRequest<'a> {
    pub fn new(category_id: &'a str, questions: &[NewQuestion]) -> Self {
        let questions = questions
            .iter()
            .cloned()
            .map(|q| NewQuestion {
                category_id: Some(category_id.to_string()),
                ..q
            })
            .collect();
        Self {
            category_id,
            questions,
        }
    }
}
