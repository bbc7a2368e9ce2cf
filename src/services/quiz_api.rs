//! 答题 API 服务 - 业务能力层
//!
//! 封装所有与答题后端的交互：取题、交卷、分类、成绩、成绩分析，
//! 以及复习模式取题和管理员录题。
//! 响应在这里完成校验，进入会话之前都是强类型数据。

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::ApiClient;
use crate::models::envelope::{validate_path_segment, Envelope, StatusReply};
use crate::models::result::{AnalysisReply, UserResultsReply};
use crate::models::question_bank::AddQuestionsRequest;
use crate::models::{
    AnalysisItem, Category, NewQuestion, Question, QuestionBatch, QuizResult, StudyQuestion,
    SubmissionPayload, SubmitReceipt,
};

const SUBMIT_ENDPOINT: &str = "/quiz/submit-quiz";

/// 题目来源
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// 按分类取一组有序题目
    async fn fetch_questions(&self, category_id: &str) -> AppResult<Vec<Question>>;
}

/// 交卷出口
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit_quiz(&self, payload: &SubmissionPayload) -> AppResult<SubmitReceipt>;
}

/// 答题后端 API
#[derive(Clone)]
pub struct QuizApi {
    client: ApiClient,
}

impl QuizApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// 全部分类
    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        let endpoint = "/category";
        let envelope: Envelope<Vec<Category>> = self.client.get_json(endpoint).await?;
        Ok(envelope.into_result(endpoint)?)
    }

    /// 当前用户的历史成绩
    pub async fn user_results(&self) -> AppResult<Vec<QuizResult>> {
        let reply: UserResultsReply = self.client.get_json("/quiz/user-results").await?;
        Ok(reply.results.unwrap_or_default())
    }

    /// 某次成绩的逐题分析
    pub async fn result_analysis(&self, result_id: &str) -> AppResult<Vec<AnalysisItem>> {
        let endpoint = format!("/quiz/result-analysis/{}", validate_path_segment(result_id)?);
        let reply: AnalysisReply = self.client.get_json(&endpoint).await?;
        Ok(reply.analysis.unwrap_or_default())
    }

    /// 复习模式：某分类的全部题目，带答案和解析
    pub async fn study_questions(&self, category_id: &str) -> AppResult<Vec<StudyQuestion>> {
        let endpoint = format!("/question/{}/all", validate_path_segment(category_id)?);
        let envelope: Envelope<Vec<StudyQuestion>> = self.client.get_json(&endpoint).await?;
        let questions = envelope.into_result(&endpoint)?;
        info!("✓ 复习分类 {} 共 {} 道题", category_id, questions.len());
        Ok(questions)
    }

    /// 管理员录题，需要管理员令牌；先在本地逐题校验
    pub async fn add_questions(&self, category_id: &str, questions: &[NewQuestion]) -> AppResult<Option<String>> {
        let endpoint = "/question/add";
        let category_id = validate_path_segment(category_id)?;
        QuestionBatch {
            questions: questions.to_vec(),
        }
        .validate()
        .map_err(AppError::Validation)?;

        let request = AddQuestionsRequest::new(category_id, questions);
        let reply: StatusReply = self.client.post_json(endpoint, &request).await?;
        let message = reply.into_result(endpoint)?;
        info!("✓ 向分类 {} 添加了 {} 道题", category_id, questions.len());
        Ok(message)
    }
}

/// 校验题目列表，任何一题不合格都视为加载失败
pub fn validate_questions(endpoint: &str, questions: &[Question]) -> Result<(), ApiError> {
    for question in questions {
        question
            .validate()
            .map_err(|reason| ApiError::InvalidPayload {
                endpoint: endpoint.to_string(),
                reason,
            })?;
    }
    Ok(())
}

#[async_trait]
impl QuestionSource for QuizApi {
    async fn fetch_questions(&self, category_id: &str) -> AppResult<Vec<Question>> {
        let endpoint = format!("/question/{}", validate_path_segment(category_id)?);
        let envelope: Envelope<Vec<Question>> = self.client.get_json(&endpoint).await?;
        let questions = envelope.into_result(&endpoint)?;
        validate_questions(&endpoint, &questions)?;

        info!("✓ 分类 {} 加载了 {} 道题", category_id, questions.len());
        Ok(questions)
    }
}

#[async_trait]
impl SubmissionSink for QuizApi {
    async fn submit_quiz(&self, payload: &SubmissionPayload) -> AppResult<SubmitReceipt> {
        debug!(
            "交卷 Payload: 分类 {} 共 {} 题",
            payload.category_id,
            payload.len()
        );
        let reply: StatusReply = self.client.post_json(SUBMIT_ENDPOINT, payload).await?;
        let message = reply.into_result(SUBMIT_ENDPOINT)?;
        Ok(SubmitReceipt { message })
    }
}
