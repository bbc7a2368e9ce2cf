use serde::Deserialize;

use crate::models::submission::SubmissionResult;

/// 成绩评级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl Grade {
    /// 按正确率（百分比）评级
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 90.0 {
            Grade::Excellent
        } else if accuracy >= 75.0 {
            Grade::Good
        } else if accuracy >= 50.0 {
            Grade::NeedsImprovement
        } else {
            Grade::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::NeedsImprovement => "Needs Improvement",
            Grade::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 成绩里引用的分类（后端已 populate）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// 仪表盘上的一次答题成绩
#[derive(Debug, Clone, Deserialize)]
pub struct QuizResult {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "category_id", default)]
    pub category: CategoryRef,
    #[serde(default)]
    pub marks: u32,
    #[serde(default)]
    pub answers: Vec<SubmissionResult>,
}

impl QuizResult {
    pub fn total_questions(&self) -> usize {
        self.answers.len()
    }

    /// 正确率（百分比，保留两位小数）；没有题目时为 0
    pub fn accuracy(&self) -> f64 {
        let total = self.total_questions();
        if total == 0 {
            return 0.0;
        }
        let raw = f64::from(self.marks) / total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }

    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy())
    }

    /// 后端明细中答对的题数
    pub fn correct_answers(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}

/// `GET /quiz/user-results` 的响应
#[derive(Debug, Deserialize)]
pub struct UserResultsReply {
    #[serde(default)]
    pub results: Option<Vec<QuizResult>>,
}

/// 成绩分析中的一题
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisItem {
    pub question_title: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub user_option: String,
    #[serde(default)]
    pub correct_option: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(rename = "isCorrect", default)]
    pub is_correct: bool,
}

/// `GET /quiz/result-analysis/{id}` 的响应
#[derive(Debug, Deserialize)]
pub struct AnalysisReply {
    #[serde(default)]
    pub analysis: Option<Vec<AnalysisItem>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(marks: u32, total: usize) -> QuizResult {
        QuizResult {
            id: "r1".to_string(),
            category: CategoryRef::default(),
            marks,
            answers: vec![SubmissionResult::default(); total],
        }
    }

    #[test]
    fn test_accuracy_rounds_to_two_decimals() {
        assert_eq!(result_with(2, 3).accuracy(), 66.67);
        assert_eq!(result_with(3, 3).accuracy(), 100.0);
        assert_eq!(result_with(0, 0).accuracy(), 0.0);
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(Grade::from_accuracy(90.0), Grade::Excellent);
        assert_eq!(Grade::from_accuracy(89.99), Grade::Good);
        assert_eq!(Grade::from_accuracy(75.0), Grade::Good);
        assert_eq!(Grade::from_accuracy(50.0), Grade::NeedsImprovement);
        assert_eq!(Grade::from_accuracy(49.0), Grade::Poor);
        assert_eq!(result_with(1, 4).grade().label(), "Poor");
    }

    #[test]
    fn test_deserialize_dashboard_row() {
        let raw = r#"{
            "results": [{
                "_id": "r9",
                "category_id": {"name": "DSA", "image": "https://img/dsa.png"},
                "marks": 2,
                "answers": [
                    {"question_id": "q1", "user_answer": 1, "isCorrect": true},
                    {"question_id": "q2", "user_answer": 0, "isCorrect": true},
                    {"question_id": "q3", "user_answer": 3, "isCorrect": false}
                ]
            }]
        }"#;
        let reply: UserResultsReply = serde_json::from_str(raw).unwrap();
        let results = reply.results.unwrap();
        assert_eq!(results[0].category.name, "DSA");
        assert_eq!(results[0].total_questions(), 3);
        assert_eq!(results[0].correct_answers(), 2);
        assert_eq!(results[0].grade(), Grade::NeedsImprovement);
    }
}
