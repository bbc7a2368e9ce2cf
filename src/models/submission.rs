use serde::{Deserialize, Serialize};

/// 单题答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub question_id: String,
    pub user_answer: usize,
}

/// 提交到 `/quiz/submit-quiz` 的请求体，答案按原题顺序排列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub category_id: String,
    pub answers: Vec<AnswerEntry>,
}

impl SubmissionPayload {
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// 提交成功后的回执
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub message: Option<String>,
}

/// 后端批改后的单题结果，只在后端返回后才存在
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub question_id: String,
    /// 未作答时后端记为 -1 或缺省
    #[serde(default)]
    pub user_answer: Option<i64>,
    #[serde(default, rename = "isCorrect", alias = "is_correct")]
    pub is_correct: bool,
}
